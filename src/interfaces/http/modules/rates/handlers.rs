//! Rate REST API handlers
//!
//! At most one maintenance rate and one water rate exist; billing refuses
//! to run until both are configured.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    CreateMaintenanceRateRequest, MaintenanceRateResponse, RateScheduleResponse,
    UpdateMaintenanceRateRequest, WaterRateRequest, WaterRateResponse,
};
use crate::interfaces::http::common::{
    domain_error, ApiError, ApiResponse, ApiResult, ValidatedJson,
};
use crate::interfaces::http::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/rates",
    tag = "Rates",
    responses(
        (status = 200, description = "Current rate schedule", body = ApiResponse<RateScheduleResponse>),
        (status = 422, description = "A rate is not configured yet")
    )
)]
pub async fn get_schedule(State(state): State<AppState>) -> ApiResult<RateScheduleResponse> {
    let schedule = state.rates.schedule().await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(schedule.into())))
}

// ── Maintenance rate ────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/v1/rates/maintenance",
    tag = "Rates",
    responses(
        (status = 200, description = "Maintenance rate", body = ApiResponse<MaintenanceRateResponse>),
        (status = 404, description = "Not configured")
    )
)]
pub async fn get_maintenance_rate(
    State(state): State<AppState>,
) -> ApiResult<MaintenanceRateResponse> {
    let rate = state
        .rates
        .get_maintenance_rate()
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(rate.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/rates/maintenance",
    tag = "Rates",
    request_body = CreateMaintenanceRateRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<MaintenanceRateResponse>),
        (status = 409, description = "Already configured"),
        (status = 422, description = "Negative rate")
    )
)]
pub async fn create_maintenance_rate(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateMaintenanceRateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MaintenanceRateResponse>>), ApiError> {
    let rate = state
        .rates
        .create_maintenance_rate(req.owner_rate, req.rent_rate)
        .await
        .map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(rate.into()))))
}

#[utoipa::path(
    put,
    path = "/api/v1/rates/maintenance/{id}",
    tag = "Rates",
    params(("id" = i32, Path, description = "Maintenance rate ID")),
    request_body = UpdateMaintenanceRateRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<MaintenanceRateResponse>),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_maintenance_rate(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<UpdateMaintenanceRateRequest>,
) -> ApiResult<MaintenanceRateResponse> {
    let rate = state
        .rates
        .update_maintenance_rate(id, req.owner_rate, req.rent_rate)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(rate.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/rates/maintenance/{id}",
    tag = "Rates",
    params(("id" = i32, Path, description = "Maintenance rate ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_maintenance_rate(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    state
        .rates
        .delete_maintenance_rate(id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(())))
}

// ── Water rate ──────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/v1/rates/water",
    tag = "Rates",
    responses(
        (status = 200, description = "Water rate", body = ApiResponse<WaterRateResponse>),
        (status = 404, description = "Not configured")
    )
)]
pub async fn get_water_rate(State(state): State<AppState>) -> ApiResult<WaterRateResponse> {
    let rate = state.rates.get_water_rate().await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(rate.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/rates/water",
    tag = "Rates",
    request_body = WaterRateRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<WaterRateResponse>),
        (status = 409, description = "Already configured"),
        (status = 422, description = "Negative rate")
    )
)]
pub async fn create_water_rate(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<WaterRateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WaterRateResponse>>), ApiError> {
    let rate = state
        .rates
        .create_water_rate(req.unit_rate)
        .await
        .map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(rate.into()))))
}

#[utoipa::path(
    put,
    path = "/api/v1/rates/water/{id}",
    tag = "Rates",
    params(("id" = i32, Path, description = "Water rate ID")),
    request_body = WaterRateRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<WaterRateResponse>),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_water_rate(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<WaterRateRequest>,
) -> ApiResult<WaterRateResponse> {
    let rate = state
        .rates
        .update_water_rate(id, req.unit_rate)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(rate.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/rates/water/{id}",
    tag = "Rates",
    params(("id" = i32, Path, description = "Water rate ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_water_rate(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<()> {
    state
        .rates
        .delete_water_rate(id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(())))
}
