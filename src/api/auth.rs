//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::user::{LoginRequest, LoginResponse, RegisterUser, UserResponse},
};

use super::AuthenticatedUser;

/// Register a new user account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(data): Json<RegisterUser>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.services.auth.register(&data).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(data): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state
        .services
        .auth
        .authenticate(&data.username, &data.password)
        .await?;
    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        user: user.into(),
    }))
}

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.auth.get_user(claims.user_id).await?;
    Ok(Json(user.into()))
}
