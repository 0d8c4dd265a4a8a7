//! Equipment catalog model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Equipment record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: i32,
    /// Equipment name
    pub name: String,
    /// Category (e.g. "Microscope", "Laptop", "Projector")
    pub category: String,
    /// Physical condition ("Good", "Fair", ...)
    pub condition_status: Option<String>,
    /// Fixed capacity, number of units owned
    pub total_quantity: i32,
    /// Units not committed to any active loan. Derived cache of the booking
    /// ledger, mutated only through the availability ledger. May go negative
    /// when non-overlapping loans together exceed capacity; the per-day
    /// ledger is authoritative.
    pub available_quantity: i32,
    pub description: Option<String>,
    pub created_by: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create equipment request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEquipment {
    pub name: String,
    pub category: String,
    pub condition_status: Option<String>,
    pub total_quantity: i32,
    pub description: Option<String>,
}

/// Update equipment request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEquipment {
    pub name: Option<String>,
    pub category: Option<String>,
    pub condition_status: Option<String>,
    /// Changing the capacity shifts available_quantity by the same delta
    pub total_quantity: Option<i32>,
    pub description: Option<String>,
}

/// Equipment list query filters
#[derive(Debug, Default, Deserialize)]
pub struct EquipmentQuery {
    pub category: Option<String>,
    pub available_only: Option<bool>,
    pub search: Option<String>,
}
