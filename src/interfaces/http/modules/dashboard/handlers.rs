//! Dashboard handler

use axum::extract::{Query, State};
use axum::Json;

use super::dto::{DashboardQuery, DashboardResponse};
use crate::interfaces::http::common::{domain_error, ApiResponse, ApiResult};
use crate::interfaces::http::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "Dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Collection and expense summary", body = ApiResponse<DashboardResponse>),
        (status = 422, description = "Month outside 1..12")
    )
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<DashboardResponse> {
    let summary = state
        .dashboard
        .summary(query.into())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(DashboardResponse::new(
        summary,
        state.billing.invoice_prefix(),
        state.expenses.expense_prefix(),
        &state.currency,
    ))))
}
