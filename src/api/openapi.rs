//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, borrow, dashboard, equipment, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "EquipLoan API",
        version = "1.0.0",
        description = "School Equipment Lending System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        // Borrow requests
        borrow::submit_request,
        borrow::get_request,
        borrow::list_my_requests,
        borrow::list_requests,
        borrow::approve_request,
        borrow::reject_request,
        borrow::return_request,
        borrow::list_request_bookings,
        // Dashboard
        dashboard::request_summary,
        dashboard::equipment_availability,
    ),
    components(
        schemas(
            // Health
            health::HealthResponse,
            // Auth
            crate::models::user::RegisterUser,
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            crate::models::user::UserResponse,
            crate::models::enums::UserRole,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            // Borrow requests
            crate::models::borrow::CreateBorrowRequest,
            crate::models::borrow::ApproveBorrowRequest,
            crate::models::borrow::RejectBorrowRequest,
            crate::models::borrow::ReturnBorrowRequest,
            crate::models::borrow::BorrowRequestDetails,
            crate::models::borrow::BookingEntry,
            crate::models::borrow::RequestSummary,
            crate::models::enums::RequestStatus,
            crate::models::enums::BookingStatus,
            borrow::SubmitResponse,
            // Dashboard
            crate::services::availability::AvailabilityCalendar,
            crate::services::availability::DayAvailability,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Authentication"),
        (name = "equipment", description = "Equipment catalog"),
        (name = "borrow", description = "Borrow requests and booking ledger"),
        (name = "dashboard", description = "Read-only dashboards")
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
