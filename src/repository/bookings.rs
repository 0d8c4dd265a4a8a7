//! Booking ledger repository for database operations

use chrono::NaiveDate;
use sqlx::{PgConnection, Pool, Postgres, Transaction};

use crate::{error::AppResult, models::borrow::BookingEntry};

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Sum of ACTIVE booking quantities for an equipment item on one day.
    /// Takes an open connection so the availability re-check can run on the
    /// approving transaction as well as on a pooled connection.
    pub async fn booked_quantity_on(
        &self,
        conn: &mut PgConnection,
        equipment_id: i32,
        date: NaiveDate,
    ) -> AppResult<i64> {
        let booked: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(quantity), 0)::bigint
            FROM equipment_bookings
            WHERE equipment_id = $1 AND booking_date = $2 AND status = 0
            "#,
        )
        .bind(equipment_id)
        .bind(date)
        .fetch_one(conn)
        .await?;
        Ok(booked)
    }

    /// Insert one ACTIVE booking row per calendar day of [from, to]
    /// inclusive. Returns the number of rows created.
    pub async fn insert_range(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request_id: i32,
        equipment_id: i32,
        quantity: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO equipment_bookings (request_id, equipment_id, booking_date, quantity, status)
            SELECT $1, $2, d::date, $3, 0
            FROM generate_series($4::date, $5::date, '1 day'::interval) AS d
            "#,
        )
        .bind(request_id)
        .bind(equipment_id)
        .bind(quantity)
        .bind(from)
        .bind(to)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// Flip all ACTIVE rows of a request to RELEASED. Rows are kept; the
    /// ledger is append-only apart from this status flip.
    pub async fn release_for_request(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request_id: i32,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE equipment_bookings
            SET status = 1, updated_at = NOW()
            WHERE request_id = $1 AND status = 0
            "#,
        )
        .bind(request_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }

    /// All booking rows for a request, ordered by day
    pub async fn list_for_request(&self, request_id: i32) -> AppResult<Vec<BookingEntry>> {
        let rows = sqlx::query_as::<_, BookingEntry>(
            "SELECT * FROM equipment_bookings WHERE request_id = $1 ORDER BY booking_date",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
