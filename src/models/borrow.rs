//! Borrow request and booking ledger models
//!
//! A `BorrowRequest` is an immutable value per lifecycle state: each
//! transition is a pure function consuming the loaded value and returning
//! the next one (or an error), so partial mutation cannot leak out of a
//! failed operation. Persistence happens afterwards, inside the calling
//! service's transaction.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use super::enums::{BookingStatus, RequestStatus};

/// Borrow request record. Never deleted; rejected and returned requests
/// remain as the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BorrowRequest {
    pub id: i32,
    pub equipment_id: i32,
    pub requested_by: i32,
    pub approved_by: Option<i32>,
    pub quantity: i32,
    /// Inclusive start of the borrow period
    pub from_date: NaiveDate,
    /// Inclusive end of the borrow period
    pub to_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub reason: Option<String>,
    /// Status (0=pending, 1=approved, 2=rejected, 3=returned)
    pub status: i16,
    pub remarks: Option<String>,
    pub condition_after_use: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl BorrowRequest {
    pub fn status(&self) -> RequestStatus {
        RequestStatus::from(self.status)
    }

    /// Number of calendar days covered by the request, inclusive on both
    /// ends. A single-day request counts one day.
    pub fn day_count(&self) -> i64 {
        (self.to_date - self.from_date).num_days() + 1
    }

    /// PENDING -> APPROVED
    pub fn approve(self, approver_id: i32, remarks: Option<String>) -> AppResult<Self> {
        if self.status() != RequestStatus::Pending {
            return Err(AppError::InvalidOperation(format!(
                "Only pending requests can be approved (current status: {})",
                self.status()
            )));
        }
        Ok(Self {
            status: RequestStatus::Approved.into(),
            approved_by: Some(approver_id),
            remarks,
            ..self
        })
    }

    /// PENDING -> REJECTED
    pub fn reject(self, remarks: Option<String>) -> AppResult<Self> {
        if self.status() != RequestStatus::Pending {
            return Err(AppError::InvalidOperation(format!(
                "Only pending requests can be rejected (current status: {})",
                self.status()
            )));
        }
        Ok(Self {
            status: RequestStatus::Rejected.into(),
            remarks,
            ..self
        })
    }

    /// APPROVED -> RETURNED
    pub fn mark_returned(
        self,
        return_date: NaiveDate,
        condition_after_use: Option<String>,
    ) -> AppResult<Self> {
        if self.status() != RequestStatus::Approved {
            return Err(AppError::InvalidOperation(format!(
                "Only approved requests can be marked as returned (current status: {})",
                self.status()
            )));
        }
        Ok(Self {
            status: RequestStatus::Returned.into(),
            return_date: Some(return_date),
            condition_after_use,
            ..self
        })
    }
}

/// Day-level booking ledger row. One row per calendar day of an approved
/// request; flipped to RELEASED on return, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookingEntry {
    pub id: i32,
    pub request_id: i32,
    /// Denormalized from the request for the per-day sum query
    pub equipment_id: i32,
    pub booking_date: NaiveDate,
    pub quantity: i32,
    /// Status (0=active, 1=released)
    pub status: i16,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl BookingEntry {
    pub fn status(&self) -> BookingStatus {
        BookingStatus::from(self.status)
    }
}

/// Submit borrow request payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBorrowRequest {
    pub equipment_id: i32,
    pub quantity: i32,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub reason: Option<String>,
}

/// Approve payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveBorrowRequest {
    pub remarks: Option<String>,
}

/// Reject payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectBorrowRequest {
    pub remarks: Option<String>,
}

/// Return payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnBorrowRequest {
    pub return_date: NaiveDate,
    pub condition_after_use: Option<String>,
}

/// List query filters; omitted filter means "match all"
#[derive(Debug, Default, Deserialize)]
pub struct BorrowRequestQuery {
    pub status: Option<String>,
    pub user_id: Option<i32>,
}

/// Borrow request view with denormalized display names
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowRequestDetails {
    pub id: i32,
    pub equipment_id: i32,
    pub equipment_name: String,
    pub requested_by: i32,
    pub requester_name: String,
    pub quantity: i32,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub status: RequestStatus,
    pub remarks: Option<String>,
    pub condition_after_use: Option<String>,
    pub approver_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Counts of requests by status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestSummary {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub returned: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> BorrowRequest {
        BorrowRequest {
            id: 1,
            equipment_id: 7,
            requested_by: 3,
            approved_by: None,
            quantity: 2,
            from_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            return_date: None,
            reason: None,
            status: RequestStatus::Pending.into(),
            remarks: None,
            condition_after_use: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_day_count_inclusive() {
        let r = pending();
        assert_eq!(r.day_count(), 6);

        let mut single = pending();
        single.to_date = single.from_date;
        assert_eq!(single.day_count(), 1);
    }

    #[test]
    fn test_approve_pending() {
        let approved = pending().approve(9, Some("ok".into())).unwrap();
        assert_eq!(approved.status(), RequestStatus::Approved);
        assert_eq!(approved.approved_by, Some(9));
        assert_eq!(approved.remarks.as_deref(), Some("ok"));
    }

    #[test]
    fn test_reject_pending() {
        let rejected = pending().reject(Some("no".into())).unwrap();
        assert_eq!(rejected.status(), RequestStatus::Rejected);
        assert!(rejected.approved_by.is_none());
    }

    #[test]
    fn test_return_approved() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 21).unwrap();
        let returned = pending()
            .approve(9, None)
            .unwrap()
            .mark_returned(date, Some("Good".into()))
            .unwrap();
        assert_eq!(returned.status(), RequestStatus::Returned);
        assert_eq!(returned.return_date, Some(date));
        assert_eq!(returned.condition_after_use.as_deref(), Some("Good"));
    }

    #[test]
    fn test_status_is_monotonic() {
        // approve from anything but PENDING fails
        let approved = pending().approve(9, None).unwrap();
        assert!(matches!(
            approved.clone().approve(9, None),
            Err(AppError::InvalidOperation(_))
        ));
        assert!(matches!(
            approved.clone().reject(None),
            Err(AppError::InvalidOperation(_))
        ));

        // rejected is terminal
        let rejected = pending().reject(None).unwrap();
        assert!(rejected.clone().approve(9, None).is_err());
        assert!(rejected
            .mark_returned(NaiveDate::from_ymd_opt(2024, 1, 21).unwrap(), None)
            .is_err());

        // returned is terminal
        let returned = approved
            .mark_returned(NaiveDate::from_ymd_opt(2024, 1, 21).unwrap(), None)
            .unwrap();
        assert!(returned
            .mark_returned(NaiveDate::from_ymd_opt(2024, 1, 22).unwrap(), None)
            .is_err());
    }

    #[test]
    fn test_return_requires_approval_first() {
        assert!(matches!(
            pending().mark_returned(NaiveDate::from_ymd_opt(2024, 1, 21).unwrap(), None),
            Err(AppError::InvalidOperation(_))
        ));
    }
}
