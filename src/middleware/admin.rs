//! Single admin gate for every `/api/admin/*` route.
//!
//! The role is read from the database on each admin request rather than
//! trusted from the token, so a demoted or deactivated admin loses access as
//! soon as their profile row changes.

use axum::{extract::Request, middleware::Next, response::Response};

use crate::database::manager::DatabaseManager;
use crate::database::models::profile::Profile;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

pub async fn require_admin_middleware(
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let profile = load_profile(&auth_user).await?;
    match profile {
        Some(p) if p.is_admin() => Ok(next.run(request).await),
        _ => Err(ApiError::forbidden("Admin access required")),
    }
}

/// Look the caller up by id, falling back to email if the id row is gone
/// (profiles recreated by an admin keep their email but get a new id).
async fn load_profile(auth_user: &AuthUser) -> Result<Option<Profile>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let by_id = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(auth_user.profile_id)
        .fetch_optional(&pool)
        .await?;

    if by_id.is_some() {
        return Ok(by_id);
    }

    let by_email = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE email = $1")
        .bind(&auth_user.email)
        .fetch_optional(&pool)
        .await?;

    Ok(by_email)
}
