//! Session and credential endpoints.
//!
//! Public routes handle login and password reset; the protected routes cover
//! session introspection and logout. Sessions are stateless JWTs, so logout
//! is a client-side discard acknowledged with 200.

use axum::{response::Json, Extension};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::auth::{generate_jwt, generate_reset_token, hash_password, verify_password, Claims};
use crate::config;
use crate::database::manager::DatabaseManager;
use crate::database::models::profile::Profile;
use crate::error::ApiError;
use crate::handlers::ok;
use crate::middleware::auth::AuthUser;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /auth/login - Authenticate and receive a JWT
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<Json<Value>, ApiError> {
    let email = crate::handlers::require_text(&payload.email, "email")?.to_lowercase();
    let password = crate::handlers::require_text(&payload.password, "password")?;

    let pool = DatabaseManager::pool().await?;
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE email = $1")
        .bind(&email)
        .fetch_optional(&pool)
        .await?;

    // Same error for unknown email and bad password
    let profile = profile.ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;
    if !verify_password(&password, &profile.password_hash) {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }
    if !profile.is_active {
        return Err(ApiError::forbidden("This account has been deactivated"));
    }

    let claims = Claims::new(profile.id, profile.email.clone(), profile.role.clone());
    let token = generate_jwt(&claims)?;
    let expires_in = config::config().security.jwt_expiry_hours * 3600;

    Ok(ok(json!({
        "token": token,
        "expires_in": expires_in,
        "profile": profile.to_api_value(),
    })))
}

/// GET /api/auth/whoami - Current profile, role included
pub async fn whoami(Extension(auth_user): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(auth_user.profile_id)
        .fetch_optional(&pool)
        .await?;

    // Fall back to email when the id row was replaced
    let profile = match profile {
        Some(p) => p,
        None => sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE email = $1")
            .bind(&auth_user.email)
            .fetch_optional(&pool)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Profile no longer exists"))?,
    };

    Ok(ok(json!({
        "profile": profile.to_api_value(),
        "is_admin": profile.is_admin(),
    })))
}

/// DELETE /api/auth/session - Logout
pub async fn logout(Extension(auth_user): Extension<AuthUser>) -> Json<Value> {
    debug!("Logout for profile {}", auth_user.profile_id);
    ok(json!({ "message": "Logged out" }))
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: Option<String>,
}

/// POST /auth/password/reset - Issue a reset token for an email.
/// Always answers 200 so callers cannot probe which emails exist.
pub async fn password_reset_request(
    Json(payload): Json<PasswordResetRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = crate::handlers::require_text(&payload.email, "email")?.to_lowercase();

    let pool = DatabaseManager::pool().await?;
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE email = $1")
        .bind(&email)
        .fetch_optional(&pool)
        .await?;

    if let Some(profile) = profile {
        let token = generate_reset_token();
        let expiry_hours = config::config().security.password_reset_expiry_hours;
        let expires_at = Utc::now() + Duration::hours(expiry_hours as i64);

        sqlx::query(
            "INSERT INTO password_resets (token, profile_id, expires_at, used) VALUES ($1, $2, $3, false)",
        )
        .bind(&token)
        .bind(profile.id)
        .bind(expires_at)
        .execute(&pool)
        .await?;

        // Token delivery (email) happens outside this service
        debug!("Password reset token issued for profile {}", profile.id);
    }

    Ok(ok(json!({
        "message": "If the email exists, a reset link has been sent"
    })))
}

#[derive(Debug, Deserialize)]
pub struct PasswordUpdateRequest {
    pub token: Option<String>,
    pub password: Option<String>,
}

/// PUT /auth/password - Consume a reset token and set a new password
pub async fn password_update(
    Json(payload): Json<PasswordUpdateRequest>,
) -> Result<Json<Value>, ApiError> {
    let token = crate::handlers::require_text(&payload.token, "token")?;
    let password = crate::handlers::require_text(&payload.password, "password")?;
    if password.len() < 8 {
        return Err(ApiError::bad_request("Password must be at least 8 characters"));
    }

    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    let row: Option<(uuid::Uuid,)> = sqlx::query_as(
        "SELECT profile_id FROM password_resets
         WHERE token = $1 AND used = false AND expires_at > now()
         FOR UPDATE",
    )
    .bind(&token)
    .fetch_optional(&mut *tx)
    .await?;

    let (profile_id,) = row.ok_or_else(|| ApiError::bad_request("Invalid or expired reset token"))?;

    sqlx::query("UPDATE profiles SET password_hash = $1, updated_at = now() WHERE id = $2")
        .bind(hash_password(&password))
        .bind(profile_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE password_resets SET used = true WHERE token = $1")
        .bind(&token)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(ok(json!({ "message": "Password updated" })))
}
