//! Dashboard endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::borrow::RequestSummary,
    services::availability::AvailabilityCalendar,
};

use super::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

/// Counts of borrow requests by status
#[utoipa::path(
    get,
    path = "/dashboard/summary",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Request summary", body = RequestSummary),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn request_summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<RequestSummary>> {
    claims.require_staff()?;
    let summary = state.services.dashboard.request_summary().await?;
    Ok(Json(summary))
}

/// Per-day availability calendar for one equipment item
#[utoipa::path(
    get,
    path = "/dashboard/equipment/{id}/availability",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Equipment ID"),
        ("from_date" = NaiveDate, Query, description = "Range start (inclusive)"),
        ("to_date" = NaiveDate, Query, description = "Range end (inclusive)")
    ),
    responses(
        (status = 200, description = "Per-day availability", body = AvailabilityCalendar),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn equipment_availability(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityCalendar>> {
    let calendar = state
        .services
        .dashboard
        .equipment_availability(id, query.from_date, query.to_date)
        .await?;
    Ok(Json(calendar))
}
