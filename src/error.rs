//! Error types for the EquipLoan server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes exposed in API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchUser = 4,
    NoSuchEquipment = 5,
    NoSuchRequest = 6,
    NotAvailable = 7,
    Duplicate = 8,
    BadValue = 9,
    InvalidOperation = 10,
}

/// Entity kinds a lookup can miss. Carried in [`AppError::NotFound`] so
/// the API error code is tied to the entity, not to message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Equipment,
    BorrowRequest,
}

impl EntityKind {
    fn not_found_code(self) -> ErrorCode {
        match self {
            EntityKind::User => ErrorCode::NoSuchUser,
            EntityKind::Equipment => ErrorCode::NoSuchEquipment,
            EntityKind::BorrowRequest => ErrorCode::NoSuchRequest,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EntityKind::User => "User",
            EntityKind::Equipment => "Equipment",
            EntityKind::BorrowRequest => "Borrow request",
        })
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("{0} with id {1} not found")]
    NotFound(EntityKind, i32),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Requested quantity cannot be covered for the whole date range
    #[error("Not available: {0}")]
    NotAvailable(String),

    /// A status transition was attempted from a state that forbids it
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(entity, _) => {
                (StatusCode::NOT_FOUND, entity.not_found_code(), self.to_string())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone())
            }
            AppError::NotAvailable(msg) => {
                (StatusCode::CONFLICT, ErrorCode::NotAvailable, msg.clone())
            }
            AppError::InvalidOperation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::InvalidOperation, msg.clone())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_code_follows_entity() {
        assert_eq!(EntityKind::User.not_found_code(), ErrorCode::NoSuchUser);
        assert_eq!(EntityKind::Equipment.not_found_code(), ErrorCode::NoSuchEquipment);
        assert_eq!(EntityKind::BorrowRequest.not_found_code(), ErrorCode::NoSuchRequest);
    }

    #[test]
    fn test_not_found_is_404() {
        let response = AppError::NotFound(EntityKind::Equipment, 42).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_not_found_message_names_the_entity() {
        let err = AppError::NotFound(EntityKind::BorrowRequest, 7);
        assert_eq!(err.to_string(), "Borrow request with id 7 not found");
    }
}
