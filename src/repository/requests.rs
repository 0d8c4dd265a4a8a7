//! Borrow requests repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Row, Transaction};

use crate::{
    error::{AppError, AppResult, EntityKind},
    models::{
        borrow::{BorrowRequest, BorrowRequestDetails, RequestSummary},
        enums::RequestStatus,
    },
};

#[derive(Clone)]
pub struct RequestsRepository {
    pool: Pool<Postgres>,
}

const DETAILS_QUERY: &str = r#"
    SELECT br.*, e.name AS equipment_name,
           u.full_name AS requester_name,
           a.full_name AS approver_name
    FROM borrow_requests br
    JOIN equipment e ON br.equipment_id = e.id
    JOIN users u ON br.requested_by = u.id
    LEFT JOIN users a ON br.approved_by = a.id
"#;

impl RequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a new PENDING request
    pub async fn insert(
        &self,
        equipment_id: i32,
        requested_by: i32,
        quantity: i32,
        from_date: NaiveDate,
        to_date: NaiveDate,
        reason: Option<&str>,
    ) -> AppResult<BorrowRequest> {
        let row = sqlx::query_as::<_, BorrowRequest>(
            r#"
            INSERT INTO borrow_requests
                (equipment_id, requested_by, quantity, from_date, to_date, reason, status)
            VALUES ($1, $2, $3, $4, $5, $6, 0)
            RETURNING *
            "#,
        )
        .bind(equipment_id)
        .bind(requested_by)
        .bind(quantity)
        .bind(from_date)
        .bind(to_date)
        .bind(reason)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>("SELECT * FROM borrow_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound(EntityKind::BorrowRequest, id))
    }

    /// Get request by ID inside a transaction, taking a row lock
    pub async fn lock_by_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>(
            "SELECT * FROM borrow_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(AppError::NotFound(EntityKind::BorrowRequest, id))
    }

    /// Persist the outcome of a state transition. Only the fields a
    /// transition may touch are written.
    pub async fn persist_transition(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: &BorrowRequest,
    ) -> AppResult<BorrowRequest> {
        let row = sqlx::query_as::<_, BorrowRequest>(
            r#"
            UPDATE borrow_requests
            SET status = $2,
                approved_by = $3,
                remarks = $4,
                return_date = $5,
                condition_after_use = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.status)
        .bind(request.approved_by)
        .bind(&request.remarks)
        .bind(request.return_date)
        .bind(&request.condition_after_use)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row)
    }

    /// Get request details (with display names) by ID
    pub async fn get_details(&self, id: i32) -> AppResult<BorrowRequestDetails> {
        let query = format!("{} WHERE br.id = $1", DETAILS_QUERY);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound(EntityKind::BorrowRequest, id))?;
        Ok(Self::map_details(&row))
    }

    /// List request details, optionally filtered by status and/or
    /// requester. An omitted filter matches everything.
    pub async fn list_with_filters(
        &self,
        status: Option<RequestStatus>,
        user_id: Option<i32>,
    ) -> AppResult<Vec<BorrowRequestDetails>> {
        let query = format!(
            r#"{}
            WHERE ($1::smallint IS NULL OR br.status = $1)
              AND ($2::int IS NULL OR br.requested_by = $2)
            ORDER BY br.created_at DESC
            "#,
            DETAILS_QUERY
        );
        let rows = sqlx::query(&query)
            .bind(status.map(i16::from))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(Self::map_details).collect())
    }

    /// Counts of requests per status
    pub async fn count_by_status(&self) -> AppResult<RequestSummary> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 0) AS pending,
                   COUNT(*) FILTER (WHERE status = 1) AS approved,
                   COUNT(*) FILTER (WHERE status = 2) AS rejected,
                   COUNT(*) FILTER (WHERE status = 3) AS returned
            FROM borrow_requests
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(RequestSummary {
            total: row.get("total"),
            pending: row.get("pending"),
            approved: row.get("approved"),
            rejected: row.get("rejected"),
            returned: row.get("returned"),
        })
    }

    fn map_details(row: &sqlx::postgres::PgRow) -> BorrowRequestDetails {
        BorrowRequestDetails {
            id: row.get("id"),
            equipment_id: row.get("equipment_id"),
            equipment_name: row.get("equipment_name"),
            requested_by: row.get("requested_by"),
            requester_name: row.get("requester_name"),
            quantity: row.get("quantity"),
            from_date: row.get("from_date"),
            to_date: row.get("to_date"),
            return_date: row.get("return_date"),
            reason: row.get("reason"),
            status: RequestStatus::from(row.get::<i16, _>("status")),
            remarks: row.get("remarks"),
            condition_after_use: row.get("condition_after_use"),
            approver_name: row.get("approver_name"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}
