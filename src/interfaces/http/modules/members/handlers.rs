//! Member REST API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    BulkCreateMembersRequest, BulkCreateMembersResponse, BulkFailureResponse,
    CreateMemberRequest, MemberListQuery, MemberResponse, UpdateMemberRequest,
};
use crate::domain::member::BulkCreateFailure;
use crate::interfaces::http::common::{
    domain_error, unprocessable, ApiError, ApiResponse, ApiResult, PaginatedResponse,
    ValidatedJson,
};
use crate::interfaces::http::AppState;
use crate::shared::PaginationParams;

#[utoipa::path(
    get,
    path = "/api/v1/members",
    tag = "Members",
    params(MemberListQuery),
    responses(
        (status = 200, description = "Members ordered by flat number", body = ApiResponse<PaginatedResponse<MemberResponse>>)
    )
)]
pub async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<MemberListQuery>,
) -> ApiResult<PaginatedResponse<MemberResponse>> {
    let params = PaginationParams::from_query(query.page, query.limit);
    let page = state
        .members
        .list(query.search.as_deref(), params)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(
        page,
        MemberResponse::from,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/members/{id}",
    tag = "Members",
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member details", body = ApiResponse<MemberResponse>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<MemberResponse> {
    let member = state.members.get(id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(member.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/members",
    tag = "Members",
    request_body = CreateMemberRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<MemberResponse>),
        (status = 409, description = "Flat already registered"),
        (status = 422, description = "Invalid data")
    )
)]
pub async fn create_member(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateMemberRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MemberResponse>>), ApiError> {
    let member = req.into_new_member().map_err(unprocessable)?;
    let created = state.members.create(member).await.map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created.into()))))
}

#[utoipa::path(
    post,
    path = "/api/v1/members/bulk",
    tag = "Members",
    request_body = BulkCreateMembersRequest,
    responses(
        (status = 200, description = "Per-entry outcome", body = ApiResponse<BulkCreateMembersResponse>),
        (status = 422, description = "Empty or oversized batch")
    )
)]
pub async fn bulk_create_members(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<BulkCreateMembersRequest>,
) -> ApiResult<BulkCreateMembersResponse> {
    let mut accepted = Vec::with_capacity(req.members.len());
    let mut rejected = Vec::new();
    for entry in req.members {
        let flat_number = entry.flat_number.trim().to_string();
        match entry.into_new_member() {
            Ok(member) => accepted.push(member),
            Err(reason) => rejected.push(BulkCreateFailure {
                flat_number,
                reason,
            }),
        }
    }

    let result = state
        .members
        .bulk_create(accepted)
        .await
        .map_err(domain_error)?;
    let mut response = BulkCreateMembersResponse::from(result);
    response
        .failed
        .extend(rejected.into_iter().map(BulkFailureResponse::from));
    Ok(Json(ApiResponse::success(response)))
}

#[utoipa::path(
    put,
    path = "/api/v1/members/{id}",
    tag = "Members",
    params(("id" = i32, Path, description = "Member ID")),
    request_body = UpdateMemberRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<MemberResponse>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Flat already registered"),
        (status = 422, description = "Invalid data")
    )
)]
pub async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<UpdateMemberRequest>,
) -> ApiResult<MemberResponse> {
    let update = req.into_update().map_err(unprocessable)?;
    let member = state
        .members
        .update(id, update)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(member.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/members/{id}",
    tag = "Members",
    params(("id" = i32, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Member still has invoices")
    )
)]
pub async fn delete_member(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<()> {
    state.members.delete(id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(())))
}
