//! Shared domain enums

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

/// Borrow request lifecycle status (stored in borrow_requests.status)
///
/// Transitions are forward-only: Pending -> Approved -> Returned, or
/// Pending -> Rejected. Rejected and Returned are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum RequestStatus {
    Pending = 0,
    Approved = 1,
    Rejected = 2,
    Returned = 3,
}

impl RequestStatus {
    /// Parse an API query value ("PENDING", "APPROVED", ...)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Some(RequestStatus::Pending),
            "APPROVED" => Some(RequestStatus::Approved),
            "REJECTED" => Some(RequestStatus::Rejected),
            "RETURNED" => Some(RequestStatus::Returned),
            _ => None,
        }
    }
}

impl From<i16> for RequestStatus {
    fn from(v: i16) -> Self {
        match v {
            1 => RequestStatus::Approved,
            2 => RequestStatus::Rejected,
            3 => RequestStatus::Returned,
            _ => RequestStatus::Pending,
        }
    }
}

impl From<RequestStatus> for i16 {
    fn from(s: RequestStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Returned => "RETURNED",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// BookingStatus
// ---------------------------------------------------------------------------

/// Day-level booking row status (stored in equipment_bookings.status)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum BookingStatus {
    Active = 0,
    Released = 1,
}

impl From<i16> for BookingStatus {
    fn from(v: i16) -> Self {
        match v {
            1 => BookingStatus::Released,
            _ => BookingStatus::Active,
        }
    }
}

impl From<BookingStatus> for i16 {
    fn from(s: BookingStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BookingStatus::Active => "ACTIVE",
            BookingStatus::Released => "RELEASED",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

/// Caller role codes (stored in users.role)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum UserRole {
    Student = 0,
    Teacher = 1,
    Admin = 2,
    LabAssistant = 3,
}

impl UserRole {
    /// Staff may manage the catalog and decide on borrow requests
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Teacher | UserRole::Admin | UserRole::LabAssistant)
    }
}

impl From<i16> for UserRole {
    fn from(v: i16) -> Self {
        match v {
            1 => UserRole::Teacher,
            2 => UserRole::Admin,
            3 => UserRole::LabAssistant,
            _ => UserRole::Student,
        }
    }
}

impl From<UserRole> for i16 {
    fn from(r: UserRole) -> Self {
        r as i16
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            UserRole::Student => "Student",
            UserRole::Teacher => "Teacher",
            UserRole::Admin => "Admin",
            UserRole::LabAssistant => "Lab Assistant",
        };
        write!(f, "{}", label)
    }
}
