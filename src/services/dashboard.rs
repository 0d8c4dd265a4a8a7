//! Dashboard read queries

use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::borrow::RequestSummary,
    repository::Repository,
};

use super::availability::{AvailabilityCalendar, AvailabilityService};

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
    availability: AvailabilityService,
}

impl DashboardService {
    pub fn new(repository: Repository, availability: AvailabilityService) -> Self {
        Self {
            repository,
            availability,
        }
    }

    /// Counts of borrow requests by status
    pub async fn request_summary(&self) -> AppResult<RequestSummary> {
        self.repository.requests.count_by_status().await
    }

    /// Per-day availability calendar for one equipment item
    pub async fn equipment_availability(
        &self,
        equipment_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<AvailabilityCalendar> {
        self.availability
            .availability_by_day(equipment_id, from, to)
            .await
    }
}
