//! Business logic services

pub mod auth;
pub mod availability;
pub mod borrow;
pub mod dashboard;
pub mod equipment;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub equipment: equipment::EquipmentService,
    pub availability: availability::AvailabilityService,
    pub borrow: borrow::BorrowService,
    pub dashboard: dashboard::DashboardService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        let availability = availability::AvailabilityService::new(repository.clone());
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            equipment: equipment::EquipmentService::new(repository.clone()),
            borrow: borrow::BorrowService::new(repository.clone(), availability.clone()),
            dashboard: dashboard::DashboardService::new(repository, availability.clone()),
            availability,
        }
    }
}
