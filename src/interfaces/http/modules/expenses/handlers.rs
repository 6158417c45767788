//! Expense REST API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{CreateExpenseRequest, ExpenseListQuery, ExpenseResponse, UpdateExpenseRequest};
use crate::domain::Expense;
use crate::interfaces::http::common::{
    domain_error, unprocessable, ApiError, ApiResponse, ApiResult, PaginatedResponse,
    ValidatedJson,
};
use crate::interfaces::http::AppState;
use crate::shared::PaginationParams;

fn to_response(state: &AppState, expense: Expense) -> ExpenseResponse {
    ExpenseResponse::new(expense, state.expenses.expense_prefix(), &state.currency)
}

#[utoipa::path(
    get,
    path = "/api/v1/expenses",
    tag = "Expenses",
    params(ExpenseListQuery),
    responses(
        (status = 200, description = "Expenses, latest period first", body = ApiResponse<PaginatedResponse<ExpenseResponse>>),
        (status = 422, description = "Unknown category or status, or inverted date range")
    )
)]
pub async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<ExpenseListQuery>,
) -> ApiResult<PaginatedResponse<ExpenseResponse>> {
    let filter = query.filter().map_err(unprocessable)?;
    let params = PaginationParams::from_query(query.page, query.limit);
    let page = state
        .expenses
        .list(&filter, params)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(
        page,
        |e| to_response(&state, e),
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/expenses/{id}",
    tag = "Expenses",
    params(("id" = i32, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense details", body = ApiResponse<ExpenseResponse>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<ExpenseResponse> {
    let expense = state.expenses.get(id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(to_response(&state, expense))))
}

#[utoipa::path(
    post,
    path = "/api/v1/expenses",
    tag = "Expenses",
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<ExpenseResponse>),
        (status = 422, description = "Invalid data")
    )
)]
pub async fn create_expense(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ExpenseResponse>>), ApiError> {
    let expense = req.into_new_expense().map_err(unprocessable)?;
    let created = state.expenses.create(expense).await.map_err(domain_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(to_response(&state, created))),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/expenses/{id}",
    tag = "Expenses",
    params(("id" = i32, Path, description = "Expense ID")),
    request_body = UpdateExpenseRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<ExpenseResponse>),
        (status = 404, description = "Not found"),
        (status = 422, description = "Invalid data")
    )
)]
pub async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<UpdateExpenseRequest>,
) -> ApiResult<ExpenseResponse> {
    let update = req.into_update().map_err(unprocessable)?;
    let expense = state
        .expenses
        .update(id, update)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(to_response(&state, expense))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/expenses/{id}",
    tag = "Expenses",
    params(("id" = i32, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_expense(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<()> {
    state.expenses.delete(id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(())))
}
