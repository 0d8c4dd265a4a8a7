//! Borrow request state machine service
//!
//! Orchestrates the request lifecycle: validates preconditions, applies the
//! pure transitions from `models::borrow`, and drives the availability
//! ledger inside a single transaction for the commitment-changing
//! operations (approve, return). Submission commits nothing shared, so
//! overlapping PENDING requests may oversubscribe; contention is resolved
//! at approval time, first approved wins.

use chrono::{NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        borrow::{BookingEntry, BorrowRequest, BorrowRequestDetails, CreateBorrowRequest},
        enums::RequestStatus,
    },
    repository::Repository,
};

use super::availability::AvailabilityService;

#[derive(Clone)]
pub struct BorrowService {
    repository: Repository,
    availability: AvailabilityService,
}

impl BorrowService {
    pub fn new(repository: Repository, availability: AvailabilityService) -> Self {
        Self {
            repository,
            availability,
        }
    }

    /// Submit a new borrow request. Creates a PENDING request only; no
    /// bookings are materialized and the availability counter is untouched
    /// until approval.
    pub async fn submit(
        &self,
        data: &CreateBorrowRequest,
        requester_id: i32,
    ) -> AppResult<BorrowRequest> {
        tracing::info!(
            equipment_id = data.equipment_id,
            requester_id,
            quantity = data.quantity,
            from = %data.from_date,
            to = %data.to_date,
            "creating borrow request"
        );

        // Precondition order is part of the contract: first failure wins.
        self.repository.equipment.get_by_id(data.equipment_id).await?;
        self.repository.users.get_by_id(requester_id).await?;

        if data.quantity < 1 {
            return Err(AppError::Validation(
                "Quantity must be at least 1".to_string(),
            ));
        }
        if data.from_date > data.to_date {
            tracing::warn!(from = %data.from_date, to = %data.to_date, "from date after to date");
            return Err(AppError::Validation(
                "From date cannot be after to date".to_string(),
            ));
        }
        if data.from_date < Utc::now().date_naive() {
            tracing::warn!(from = %data.from_date, "from date in the past");
            return Err(AppError::Validation(
                "From date cannot be in the past".to_string(),
            ));
        }

        let available = self
            .availability
            .is_available(data.equipment_id, data.quantity, data.from_date, data.to_date)
            .await?;
        if !available {
            tracing::warn!(
                equipment_id = data.equipment_id,
                quantity = data.quantity,
                "equipment not available for requested period"
            );
            return Err(AppError::NotAvailable(
                "Not enough equipment available for the requested period".to_string(),
            ));
        }

        let request = self
            .repository
            .requests
            .insert(
                data.equipment_id,
                requester_id,
                data.quantity,
                data.from_date,
                data.to_date,
                data.reason.as_deref(),
            )
            .await?;

        tracing::info!(request_id = request.id, "borrow request created");
        Ok(request)
    }

    /// Approve a pending request. One atomic unit: status transition,
    /// booking materialization and counter decrement all commit together
    /// or not at all. The equipment row lock plus the in-transaction
    /// availability re-check make concurrent approvals of the same item
    /// first-come-first-served.
    pub async fn approve(
        &self,
        request_id: i32,
        approver_id: i32,
        remarks: Option<String>,
    ) -> AppResult<BorrowRequestDetails> {
        tracing::info!(request_id, approver_id, "approving borrow request");

        let mut tx = self.repository.pool.begin().await?;

        let request = self.repository.requests.lock_by_id(&mut tx, request_id).await?;
        if request.status() != RequestStatus::Pending {
            tracing::warn!(request_id, status = %request.status(), "request not pending");
            return Err(AppError::InvalidOperation(
                "Only pending requests can be approved".to_string(),
            ));
        }

        self.repository.users.get_by_id(approver_id).await?;

        let equipment = self
            .repository
            .equipment
            .lock_by_id(&mut tx, request.equipment_id)
            .await?;

        // Capacity may have been consumed since submission; re-check under
        // the row lock before committing anything.
        let still_available = self
            .availability
            .range_available(
                &mut *tx,
                &equipment,
                request.quantity,
                request.from_date,
                request.to_date,
            )
            .await?;
        if !still_available {
            tracing::warn!(request_id, "equipment no longer available");
            return Err(AppError::NotAvailable(
                "Equipment no longer available for the requested period".to_string(),
            ));
        }

        let approved = request.approve(approver_id, remarks)?;
        let approved = self
            .repository
            .requests
            .persist_transition(&mut tx, &approved)
            .await?;
        self.availability.commit_bookings(&mut tx, &approved).await?;

        tx.commit().await?;

        tracing::info!(
            request_id,
            equipment_id = approved.equipment_id,
            quantity = approved.quantity,
            "borrow request approved"
        );
        self.repository.requests.get_details(request_id).await
    }

    /// Reject a pending request. Nothing was ever committed, so there are
    /// no ledger or counter side effects.
    pub async fn reject(
        &self,
        request_id: i32,
        remarks: Option<String>,
    ) -> AppResult<BorrowRequestDetails> {
        tracing::info!(request_id, "rejecting borrow request");

        let mut tx = self.repository.pool.begin().await?;
        let request = self.repository.requests.lock_by_id(&mut tx, request_id).await?;
        let rejected = request.reject(remarks)?;
        self.repository
            .requests
            .persist_transition(&mut tx, &rejected)
            .await?;
        tx.commit().await?;

        tracing::info!(request_id, "borrow request rejected");
        self.repository.requests.get_details(request_id).await
    }

    /// Mark an approved request as returned. One atomic unit: status
    /// transition, ledger release and counter re-increment.
    pub async fn mark_returned(
        &self,
        request_id: i32,
        return_date: NaiveDate,
        condition_after_use: Option<String>,
    ) -> AppResult<BorrowRequestDetails> {
        tracing::info!(request_id, %return_date, "marking borrow request as returned");

        let mut tx = self.repository.pool.begin().await?;

        let request = self.repository.requests.lock_by_id(&mut tx, request_id).await?;
        // Lock the equipment row so the counter moves with the ledger even
        // against a concurrent approval.
        self.repository
            .equipment
            .lock_by_id(&mut tx, request.equipment_id)
            .await?;

        let returned = request.mark_returned(return_date, condition_after_use)?;
        let returned = self
            .repository
            .requests
            .persist_transition(&mut tx, &returned)
            .await?;
        self.availability.release_bookings(&mut tx, &returned).await?;

        tx.commit().await?;

        tracing::info!(
            request_id,
            equipment_id = returned.equipment_id,
            quantity = returned.quantity,
            "borrow request marked as returned"
        );
        self.repository.requests.get_details(request_id).await
    }

    /// Get request details by ID
    pub async fn get_by_id(&self, request_id: i32) -> AppResult<BorrowRequestDetails> {
        self.repository.requests.get_details(request_id).await
    }

    /// List requests submitted by one user
    pub async fn list_by_requester(&self, user_id: i32) -> AppResult<Vec<BorrowRequestDetails>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository
            .requests
            .list_with_filters(None, Some(user_id))
            .await
    }

    /// List requests in one status
    pub async fn list_by_status(
        &self,
        status: RequestStatus,
    ) -> AppResult<Vec<BorrowRequestDetails>> {
        self.repository
            .requests
            .list_with_filters(Some(status), None)
            .await
    }

    /// List requests with optional status/requester filters; an omitted
    /// filter matches everything
    pub async fn list_with_filters(
        &self,
        status: Option<RequestStatus>,
        user_id: Option<i32>,
    ) -> AppResult<Vec<BorrowRequestDetails>> {
        self.repository.requests.list_with_filters(status, user_id).await
    }

    /// Booking ledger rows for one request
    pub async fn list_bookings(&self, request_id: i32) -> AppResult<Vec<BookingEntry>> {
        self.repository.requests.get_by_id(request_id).await?;
        self.repository.bookings.list_for_request(request_id).await
    }
}
