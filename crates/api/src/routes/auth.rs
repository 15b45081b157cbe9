//! Customer authentication routes.
//!
//! Registration is open; login is passwordless over a phone OTP. A
//! successful verification stores `{id, role}` in the server-side session
//! and the cookie carries nothing but the session id.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use crate::error::{ApiError, Result};
use crate::middleware::auth::{clear_session, set_current_user};
use crate::middleware::RequireUser;
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct RequestOtpRequest {
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub phone: String,
    pub otp: String,
}

/// POST /api/auth/register - create a customer account.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    require_non_empty(&[
        ("first_name", &body.first_name),
        ("last_name", &body.last_name),
        ("email", &body.email),
        ("phone", &body.phone),
    ])?;

    let service = AuthService::new(state.pool(), state.otp());
    let user = service
        .register_user(
            body.first_name.trim(),
            body.last_name.trim(),
            body.email.trim(),
            body.phone.trim(),
        )
        .await?;

    tracing::info!(user_id = %user.id, "customer registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Registration successful", "user": user })),
    ))
}

/// POST /api/auth/request-otp - send a login OTP over SMS.
pub async fn request_otp(
    State(state): State<AppState>,
    Json(body): Json<RequestOtpRequest>,
) -> Result<impl IntoResponse> {
    let service = AuthService::new(state.pool(), state.otp());
    service.request_otp(body.phone.trim()).await?;

    Ok(Json(json!({ "message": "OTP sent successfully" })))
}

/// POST /api/auth/verify-otp - verify the OTP and establish the session.
pub async fn verify_otp(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<impl IntoResponse> {
    let service = AuthService::new(state.pool(), state.otp());
    let user = service.verify_otp(body.phone.trim(), body.otp.trim()).await?;

    set_current_user(
        &session,
        CurrentUser {
            id: user.id,
            role: user.role,
        },
    )
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, "customer logged in");

    Ok(Json(json!({ "message": "Login successful", "user": user })))
}

/// POST /api/auth/logout - drop the session.
pub async fn logout(session: Session) -> Result<impl IntoResponse> {
    clear_session(&session)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(json!({ "message": "Logged out successfully" })))
}

/// GET /api/auth/check-auth - whoami for the frontend.
pub async fn check_auth(
    State(state): State<AppState>,
    RequireUser(current): RequireUser,
) -> Result<impl IntoResponse> {
    let service = AuthService::new(state.pool(), state.otp());
    let user = service.get_user(current.id).await?;
    Ok(Json(json!({ "authenticated": true, "user": user })))
}

/// Reject blank required fields with a field-naming message.
pub(crate) fn require_non_empty(fields: &[(&str, &str)]) -> Result<()> {
    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(ApiError::Validation(format!("{name} is required")));
        }
    }
    Ok(())
}
