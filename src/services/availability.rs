//! Availability ledger service
//!
//! Single owner of the day-level booking ledger and of every mutation of
//! `equipment.available_quantity`. The counter is a cache of the ledger;
//! keeping both behind one component lets them be reconciled in one place
//! instead of spreading counter math through the request state machine.

use chrono::NaiveDate;
use sqlx::{PgConnection, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{borrow::BorrowRequest, equipment::Equipment},
    repository::Repository,
};

/// Booked and free units for one calendar day
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub booked: i32,
    pub available: i32,
}

/// Per-day availability of one equipment item over a date range
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct AvailabilityCalendar {
    pub equipment_id: i32,
    pub equipment_name: String,
    pub total_quantity: i32,
    pub days: Vec<DayAvailability>,
}

#[derive(Clone)]
pub struct AvailabilityService {
    repository: Repository,
}

impl AvailabilityService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Can `quantity` units be reserved for every day of [from, to]?
    ///
    /// A missing equipment id is a hard NotFound, never "available".
    /// Read-only; correctness against concurrent approvals comes from the
    /// re-check that [`Self::range_available`] runs inside the approving
    /// transaction, under the equipment row lock.
    pub async fn is_available(
        &self,
        equipment_id: i32,
        quantity: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<bool> {
        let equipment = self.repository.equipment.get_by_id(equipment_id).await?;
        let mut conn = self.repository.pool.acquire().await?;
        self.range_available(&mut conn, &equipment, quantity, from, to)
            .await
    }

    /// Per-day check over an existing connection (pooled or transactional).
    /// Available only if every single day can cover the quantity;
    /// short-circuits on the first failing day.
    pub async fn range_available(
        &self,
        conn: &mut PgConnection,
        equipment: &Equipment,
        quantity: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<bool> {
        for date in days_inclusive(from, to) {
            let booked = self
                .repository
                .bookings
                .booked_quantity_on(conn, equipment.id, date)
                .await?;
            let available = equipment.total_quantity as i64 - booked;
            if available < quantity as i64 {
                tracing::debug!(
                    equipment_id = equipment.id,
                    %date,
                    booked,
                    requested = quantity,
                    "availability check failed"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Materialize the ledger side of an approval: one ACTIVE booking row
    /// per day of the request, and the matching counter decrement. Runs on
    /// the caller's transaction; the caller holds the equipment row lock.
    pub async fn commit_bookings(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: &BorrowRequest,
    ) -> AppResult<u64> {
        let created = self
            .repository
            .bookings
            .insert_range(
                tx,
                request.id,
                request.equipment_id,
                request.quantity,
                request.from_date,
                request.to_date,
            )
            .await?;
        self.repository
            .equipment
            .decrement_available(tx, request.equipment_id, request.quantity)
            .await?;
        tracing::info!(
            request_id = request.id,
            equipment_id = request.equipment_id,
            bookings = created,
            "booking entries committed"
        );
        Ok(created)
    }

    /// Release the ledger side of a return: flip the request's ACTIVE rows
    /// to RELEASED and re-increment the counter (clamped to capacity).
    pub async fn release_bookings(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: &BorrowRequest,
    ) -> AppResult<u64> {
        let released = self
            .repository
            .bookings
            .release_for_request(tx, request.id)
            .await?;
        self.repository
            .equipment
            .increment_available(tx, request.equipment_id, request.quantity)
            .await?;
        tracing::info!(
            request_id = request.id,
            equipment_id = request.equipment_id,
            bookings = released,
            "booking entries released"
        );
        Ok(released)
    }

    /// Per-day booked/available breakdown for one equipment item
    pub async fn availability_by_day(
        &self,
        equipment_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<AvailabilityCalendar> {
        if from > to {
            return Err(AppError::Validation(
                "From date cannot be after to date".to_string(),
            ));
        }
        let equipment = self.repository.equipment.get_by_id(equipment_id).await?;
        let mut conn = self.repository.pool.acquire().await?;

        let mut days = Vec::new();
        for date in days_inclusive(from, to) {
            let booked = self
                .repository
                .bookings
                .booked_quantity_on(&mut conn, equipment_id, date)
                .await? as i32;
            days.push(DayAvailability {
                date,
                booked,
                available: equipment.total_quantity - booked,
            });
        }

        Ok(AvailabilityCalendar {
            equipment_id,
            equipment_name: equipment.name,
            total_quantity: equipment.total_quantity,
            days,
        })
    }
}

/// Iterate calendar days of [from, to], both ends inclusive
fn days_inclusive(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |d| *d <= to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_inclusive_multi_day() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        let days: Vec<_> = days_inclusive(from, to).collect();
        assert_eq!(days.len(), 6);
        assert_eq!(days[0], from);
        assert_eq!(days[5], to);
    }

    #[test]
    fn test_days_inclusive_single_day() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let days: Vec<_> = days_inclusive(day, day).collect();
        assert_eq!(days, vec![day]);
    }

    #[test]
    fn test_days_inclusive_crosses_month() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 30).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
        let days: Vec<_> = days_inclusive(from, to).collect();
        assert_eq!(days.len(), 4);
    }

    #[test]
    fn test_days_inclusive_empty_when_inverted() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(days_inclusive(from, to).count(), 0);
    }
}
