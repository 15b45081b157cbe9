//! Admin authentication routes.
//!
//! Admins live in the same `users` table as customers with `role = 'Admin'`
//! and an argon2 password hash. The role is resolved at login and stored in
//! the session, so admin-only handlers check it via [`RequireAdmin`] without
//! touching the database.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;

use crate::error::{ApiError, Result};
use crate::middleware::RequireAdmin;
use crate::middleware::auth::{clear_session, set_current_user};
use crate::models::CurrentUser;
use crate::routes::auth::require_non_empty;
use crate::services::auth::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdminRegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/admin/register - create an admin account.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<AdminRegisterRequest>,
) -> Result<impl IntoResponse> {
    require_non_empty(&[
        ("first_name", &body.first_name),
        ("last_name", &body.last_name),
        ("email", &body.email),
        ("phone", &body.phone),
        ("password", &body.password),
    ])?;

    let service = AuthService::new(state.pool(), state.otp());
    let user = service
        .register_admin(
            body.first_name.trim(),
            body.last_name.trim(),
            body.email.trim(),
            body.phone.trim(),
            &body.password,
            &body.confirm_password,
        )
        .await?;

    tracing::info!(user_id = %user.id, "admin registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Admin registered successfully", "user": user })),
    ))
}

/// POST /api/admin/login - email/password login.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AdminLoginRequest>,
) -> Result<impl IntoResponse> {
    let service = AuthService::new(state.pool(), state.otp());
    let user = service.login_admin(body.email.trim(), &body.password).await?;

    set_current_user(
        &session,
        CurrentUser {
            id: user.id,
            role: user.role,
        },
    )
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, "admin logged in");

    Ok(Json(json!({ "message": "Login successful", "user": user })))
}

/// POST /api/admin/logout - drop the session.
pub async fn logout(session: Session) -> Result<impl IntoResponse> {
    clear_session(&session)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(json!({ "message": "Logged out successfully" })))
}

/// GET /api/admin/check-auth - whoami, rejects non-admin sessions.
pub async fn check_auth(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
) -> Result<impl IntoResponse> {
    let service = AuthService::new(state.pool(), state.otp());
    let user = service.get_user(current.id).await?;
    Ok(Json(json!({ "authenticated": true, "user": user })))
}
