//! Authentication service (identity provider plumbing)

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        enums::UserRole,
        user::{RegisterUser, User, UserClaims},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new user account
    pub async fn register(&self, data: &RegisterUser) -> AppResult<User> {
        if data.username.trim().is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }
        if data.password.len() < 6 {
            return Err(AppError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(data.password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?
            .to_string();

        let role = data.role.unwrap_or(UserRole::Student);
        let user = self
            .repository
            .users
            .create(
                &data.username,
                &hash,
                &data.full_name,
                data.email.as_deref(),
                role.into(),
            )
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Authenticate by username/password and return a JWT token
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("Invalid username or password".to_string())
            })?;

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| AppError::Internal(format!("Corrupt password hash: {}", e)))?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(user_id).await
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            role: user.role(),
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}
