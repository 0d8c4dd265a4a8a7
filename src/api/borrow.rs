//! Borrow request endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow::{
            ApproveBorrowRequest, BookingEntry, BorrowRequestDetails, BorrowRequestQuery,
            CreateBorrowRequest, RejectBorrowRequest, ReturnBorrowRequest,
        },
        enums::RequestStatus,
    },
};

use super::AuthenticatedUser;

/// Submit response
#[derive(Serialize, ToSchema)]
pub struct SubmitResponse {
    /// Borrow request ID
    pub id: i32,
    /// Request status after submission
    pub status: RequestStatus,
    /// Status message
    pub message: String,
}

/// Submit a new borrow request
#[utoipa::path(
    post,
    path = "/borrow-requests",
    tag = "borrow",
    security(("bearer_auth" = [])),
    request_body = CreateBorrowRequest,
    responses(
        (status = 201, description = "Request submitted", body = SubmitResponse),
        (status = 400, description = "Invalid dates or quantity"),
        (status = 404, description = "Equipment or user not found"),
        (status = 409, description = "Not enough equipment available")
    )
)]
pub async fn submit_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateBorrowRequest>,
) -> AppResult<(StatusCode, Json<SubmitResponse>)> {
    let request = state.services.borrow.submit(&data, claims.user_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            id: request.id,
            status: request.status(),
            message: "Request submitted for approval".to_string(),
        }),
    ))
}

/// Get a borrow request by ID
#[utoipa::path(
    get,
    path = "/borrow-requests/{id}",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrow request ID")),
    responses(
        (status = 200, description = "Request details", body = BorrowRequestDetails),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BorrowRequestDetails>> {
    let details = state.services.borrow.get_by_id(id).await?;
    // Students may only see their own requests
    if !claims.role.is_staff() && details.requested_by != claims.user_id {
        return Err(AppError::Authorization(
            "You can only view your own borrow requests".to_string(),
        ));
    }
    Ok(Json(details))
}

/// List the authenticated user's borrow requests
#[utoipa::path(
    get,
    path = "/borrow-requests/my",
    tag = "borrow",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own borrow requests", body = Vec<BorrowRequestDetails>)
    )
)]
pub async fn list_my_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowRequestDetails>>> {
    let requests = state.services.borrow.list_by_requester(claims.user_id).await?;
    Ok(Json(requests))
}

/// List borrow requests with optional status/user filters (staff only)
#[utoipa::path(
    get,
    path = "/borrow-requests",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(
        ("status" = Option<String>, Query, description = "PENDING, APPROVED, REJECTED or RETURNED"),
        ("user_id" = Option<i32>, Query, description = "Filter by requester")
    ),
    responses(
        (status = 200, description = "Borrow requests", body = Vec<BorrowRequestDetails>),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<BorrowRequestQuery>,
) -> AppResult<Json<Vec<BorrowRequestDetails>>> {
    claims.require_staff()?;

    let status = match &query.status {
        Some(s) => Some(RequestStatus::parse(s).ok_or_else(|| {
            AppError::Validation(format!("Unknown request status '{}'", s))
        })?),
        None => None,
    };

    let requests = state
        .services
        .borrow
        .list_with_filters(status, query.user_id)
        .await?;
    Ok(Json(requests))
}

/// Approve a pending borrow request
#[utoipa::path(
    post,
    path = "/borrow-requests/{id}/approve",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrow request ID")),
    request_body = ApproveBorrowRequest,
    responses(
        (status = 200, description = "Request approved", body = BorrowRequestDetails),
        (status = 404, description = "Request or approver not found"),
        (status = 409, description = "Equipment no longer available"),
        (status = 422, description = "Request is not pending")
    )
)]
pub async fn approve_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<ApproveBorrowRequest>,
) -> AppResult<Json<BorrowRequestDetails>> {
    claims.require_staff()?;
    let details = state
        .services
        .borrow
        .approve(id, claims.user_id, data.remarks)
        .await?;
    Ok(Json(details))
}

/// Reject a pending borrow request
#[utoipa::path(
    post,
    path = "/borrow-requests/{id}/reject",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrow request ID")),
    request_body = RejectBorrowRequest,
    responses(
        (status = 200, description = "Request rejected", body = BorrowRequestDetails),
        (status = 404, description = "Request not found"),
        (status = 422, description = "Request is not pending")
    )
)]
pub async fn reject_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<RejectBorrowRequest>,
) -> AppResult<Json<BorrowRequestDetails>> {
    claims.require_staff()?;
    let details = state.services.borrow.reject(id, data.remarks).await?;
    Ok(Json(details))
}

/// Mark an approved borrow request as returned
#[utoipa::path(
    post,
    path = "/borrow-requests/{id}/return",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrow request ID")),
    request_body = ReturnBorrowRequest,
    responses(
        (status = 200, description = "Request marked as returned", body = BorrowRequestDetails),
        (status = 404, description = "Request not found"),
        (status = 422, description = "Request is not approved")
    )
)]
pub async fn return_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<ReturnBorrowRequest>,
) -> AppResult<Json<BorrowRequestDetails>> {
    claims.require_staff()?;
    let details = state
        .services
        .borrow
        .mark_returned(id, data.return_date, data.condition_after_use)
        .await?;
    Ok(Json(details))
}

/// Booking ledger rows of a borrow request (staff only)
#[utoipa::path(
    get,
    path = "/borrow-requests/{id}/bookings",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrow request ID")),
    responses(
        (status = 200, description = "Booking entries", body = Vec<BookingEntry>),
        (status = 404, description = "Request not found")
    )
)]
pub async fn list_request_bookings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<BookingEntry>>> {
    claims.require_staff()?;
    let bookings = state.services.borrow.list_bookings(id).await?;
    Ok(Json(bookings))
}
