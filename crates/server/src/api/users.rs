//! Registration, login, logout and session details.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{Extensions, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use flickvault_core::{AccountError, UserError};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::middleware::{auth_request, AuthUser};
use super::response::{api_error, internal_error, ApiError, MessageResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct UserDetails {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailsResponse {
    pub success: bool,
    pub user_details: UserDetails,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/user/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    // Password hashing is CPU bound
    let worker = Arc::clone(&state);
    let result =
        tokio::task::spawn_blocking(move || worker.accounts().register(&body.email, &body.password))
            .await
            .map_err(|e| {
                error!("Registration task failed: {}", e);
                internal_error()
            })?;

    match result {
        Ok(user) => Ok((
            StatusCode::CREATED,
            Json(RegisterResponse {
                success: true,
                message: "User registered successfully".to_string(),
                email: user.email,
            }),
        )),
        Err(AccountError::InvalidEmail) => {
            Err(api_error(StatusCode::BAD_REQUEST, "Not a valid email"))
        }
        Err(AccountError::WeakPassword(reason)) => Err(api_error(StatusCode::BAD_REQUEST, reason)),
        Err(AccountError::Store(UserError::AlreadyExists(_))) => {
            Err(api_error(StatusCode::CONFLICT, "Email already registered"))
        }
        Err(e) => {
            error!("Failed to register user: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Can't register user please try again",
            ))
        }
    }
}

/// POST /api/v1/user/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let worker = Arc::clone(&state);
    let result =
        tokio::task::spawn_blocking(move || worker.accounts().login(&body.email, &body.password))
            .await
            .map_err(|e| {
                error!("Login task failed: {}", e);
                internal_error()
            })?;

    match result {
        Ok(issued) => Ok(Json(LoginResponse {
            success: true,
            access_token: issued.token,
        })),
        Err(AccountError::InvalidCredentials) => Err(api_error(
            StatusCode::UNAUTHORIZED,
            "Invalid email or password",
        )),
        Err(e) => {
            error!("Failed to log in: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Can't login please try again",
            ))
        }
    }
}

/// GET /api/v1/user/logout
///
/// Revokes the presented token. Answers 204 when there is no valid token.
pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let request = auth_request(&headers, &Extensions::new());
    let Some(token) = request.bearer_token() else {
        return StatusCode::NO_CONTENT.into_response();
    };

    match state.accounts().logout(token) {
        Ok(true) => Json(MessageResponse::new("User logged out successfully")).into_response(),
        Ok(false) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to log out: {}", e);
            internal_error().into_response()
        }
    }
}

/// GET /api/v1/user/details
pub async fn details(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserDetailsResponse>, ApiError> {
    match state.accounts().user(&user_id) {
        Ok(Some(user)) => Ok(Json(UserDetailsResponse {
            success: true,
            user_details: UserDetails { email: user.email },
        })),
        Ok(None) => Err(api_error(
            StatusCode::NOT_FOUND,
            "User not found please login again",
        )),
        Err(e) => {
            error!("Failed to load user {}: {}", user_id, e);
            Err(internal_error())
        }
    }
}
