//! Maintenance record REST API handlers
//!
//! Create, amend and delete go through `BillingService`, which serializes
//! writes per member. Only a member's latest record can be amended or
//! deleted; older ones answer 409.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use super::dto::{
    CreateMaintenanceRequest, InvoicePreviewResponse, MaintenanceListQuery,
    MaintenanceRecordResponse, UpdateMaintenanceRequest,
};
use crate::application::InvoiceFilter;
use crate::domain::Invoice;
use crate::interfaces::http::common::{
    domain_error, ApiError, ApiResponse, ApiResult, PaginatedResponse, ValidatedJson,
};
use crate::interfaces::http::AppState;
use crate::shared::PaginationParams;

fn record(state: &AppState, invoice: Invoice) -> MaintenanceRecordResponse {
    MaintenanceRecordResponse::new(invoice, state.billing.invoice_prefix(), &state.currency)
}

#[utoipa::path(
    get,
    path = "/api/v1/maintenance",
    tag = "Maintenance",
    params(MaintenanceListQuery),
    responses(
        (status = 200, description = "Records, newest first", body = ApiResponse<PaginatedResponse<MaintenanceRecordResponse>>)
    )
)]
pub async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<MaintenanceListQuery>,
) -> ApiResult<PaginatedResponse<MaintenanceRecordResponse>> {
    let filter = InvoiceFilter {
        search: query.search,
        member_id: query.member_id,
    };
    let params = PaginationParams::from_query(query.page, query.limit);
    let page = state
        .billing
        .list_invoices(&filter, params)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(
        page,
        |invoice| record(&state, invoice),
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/maintenance/{id}",
    tag = "Maintenance",
    params(("id" = i32, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Record with update history", body = ApiResponse<MaintenanceRecordResponse>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<MaintenanceRecordResponse> {
    let invoice = state.billing.get_invoice(id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(record(&state, invoice))))
}

#[utoipa::path(
    post,
    path = "/api/v1/maintenance/preview",
    tag = "Maintenance",
    request_body = CreateMaintenanceRequest,
    responses(
        (status = 200, description = "Computed charges, nothing stored", body = ApiResponse<InvoicePreviewResponse>),
        (status = 404, description = "Member not found"),
        (status = 422, description = "Reading regression, overpayment or missing rates")
    )
)]
pub async fn preview_record(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateMaintenanceRequest>,
) -> ApiResult<InvoicePreviewResponse> {
    let (member_id, input) = req.into_input(Utc::now().date_naive());
    let computation = state
        .billing
        .preview_invoice(member_id, input)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(InvoicePreviewResponse::new(
        computation,
        &state.currency,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/maintenance",
    tag = "Maintenance",
    request_body = CreateMaintenanceRequest,
    responses(
        (status = 201, description = "Invoice created, member balance advanced", body = ApiResponse<MaintenanceRecordResponse>),
        (status = 404, description = "Member not found"),
        (status = 409, description = "Member changed concurrently"),
        (status = 422, description = "Reading regression, overpayment or missing rates")
    )
)]
pub async fn create_record(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateMaintenanceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MaintenanceRecordResponse>>), ApiError> {
    let (member_id, input) = req.into_input(Utc::now().date_naive());
    let invoice = state
        .billing
        .create_invoice(member_id, input)
        .await
        .map_err(domain_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(record(&state, invoice))),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/maintenance/{id}",
    tag = "Maintenance",
    params(("id" = i32, Path, description = "Record ID")),
    request_body = UpdateMaintenanceRequest,
    responses(
        (status = 200, description = "Updated record", body = ApiResponse<MaintenanceRecordResponse>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Not the member's latest record"),
        (status = 422, description = "Invalid amendment")
    )
)]
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<UpdateMaintenanceRequest>,
) -> ApiResult<MaintenanceRecordResponse> {
    let invoice = state
        .billing
        .update_invoice(id, req.into())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(record(&state, invoice))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/maintenance/{id}",
    tag = "Maintenance",
    params(("id" = i32, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Deleted, member restored to its prior state"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Not the member's latest record")
    )
)]
pub async fn delete_record(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<()> {
    state
        .billing
        .delete_invoice(id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(())))
}
