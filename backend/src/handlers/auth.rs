//! HTTP handlers for authentication endpoints

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::auth::{AuthService, AuthTokens, RegisterResponse, RegisterStaffInput};
use crate::AppState;

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshInput {
    pub refresh_token: String,
}

/// Authenticate with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db, &state.config);
    let tokens = service.login(&input.email, &input.password).await?;
    Ok(Json(tokens))
}

/// Exchange a refresh token for a new token pair
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshInput>,
) -> AppResult<Json<AuthTokens>> {
    let service = AuthService::new(state.db, &state.config);
    let tokens = service.refresh_token(&input.refresh_token).await?;
    Ok(Json(tokens))
}

/// Register a staff account (admin only)
pub async fn register_staff(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RegisterStaffInput>,
) -> AppResult<Json<RegisterResponse>> {
    if !current_user.0.has_permission("users", "manage") {
        return Err(AppError::InsufficientPermissions);
    }
    let service = AuthService::new(state.db, &state.config);
    let response = service.register_staff(input).await?;
    Ok(Json(response))
}
