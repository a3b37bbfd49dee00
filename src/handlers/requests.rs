//! Service requests. Same ownership rules as support tickets, without a
//! message thread.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::request::ServiceRequest;
use crate::database::models::ticket::{is_valid_priority, is_valid_ticket_status};
use crate::error::ApiError;
use crate::handlers::{created, ok, require_text};
use crate::middleware::auth::AuthUser;

/// GET /api/service-requests
pub async fn list(Extension(auth_user): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let requests = if auth_user.role == "admin" {
        sqlx::query_as::<_, ServiceRequest>(
            "SELECT * FROM service_requests ORDER BY created_at DESC",
        )
        .fetch_all(&pool)
        .await?
    } else {
        sqlx::query_as::<_, ServiceRequest>(
            "SELECT * FROM service_requests WHERE requester_id = $1 ORDER BY created_at DESC",
        )
        .bind(auth_user.profile_id)
        .fetch_all(&pool)
        .await?
    };

    Ok(ok(json!(requests)))
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub title: Option<String>,
    pub details: Option<String>,
    pub request_type: Option<String>,
    pub priority: Option<String>,
}

/// POST /api/service-requests
pub async fn create(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let title = require_text(&payload.title, "title")?;
    let request_type = require_text(&payload.request_type, "request_type")?;

    let priority = payload.priority.unwrap_or_else(|| "medium".to_string());
    if !is_valid_priority(&priority) {
        return Err(ApiError::bad_request(format!("Invalid priority: {}", priority)));
    }

    let pool = DatabaseManager::pool().await?;
    let request = sqlx::query_as::<_, ServiceRequest>(
        "INSERT INTO service_requests (requester_id, title, details, request_type, status, priority)
         VALUES ($1, $2, $3, $4, 'open', $5) RETURNING *",
    )
    .bind(auth_user.profile_id)
    .bind(&title)
    .bind(&payload.details)
    .bind(&request_type)
    .bind(&priority)
    .fetch_one(&pool)
    .await?;

    Ok(created(json!(request)))
}

/// GET /api/service-requests/:id
pub async fn get(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let request = load_visible_request(&pool, &auth_user, id).await?;
    Ok(ok(json!(request)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    pub status: Option<String>,
    pub priority: Option<String>,
}

/// PATCH /api/service-requests/:id
pub async fn update(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRequest>,
) -> Result<Json<Value>, ApiError> {
    if let Some(status) = payload.status.as_deref() {
        if !is_valid_ticket_status(status) {
            return Err(ApiError::bad_request(format!("Invalid status: {}", status)));
        }
    }
    if let Some(priority) = payload.priority.as_deref() {
        if !is_valid_priority(priority) {
            return Err(ApiError::bad_request(format!("Invalid priority: {}", priority)));
        }
    }

    let pool = DatabaseManager::pool().await?;
    let existing = load_visible_request(&pool, &auth_user, id).await?;

    let status = payload.status.unwrap_or(existing.status);
    let priority = payload.priority.unwrap_or(existing.priority);

    let request = sqlx::query_as::<_, ServiceRequest>(
        "UPDATE service_requests SET status = $1, priority = $2, updated_at = now()
         WHERE id = $3 RETURNING *",
    )
    .bind(&status)
    .bind(&priority)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(ok(json!(request)))
}

async fn load_visible_request(
    pool: &sqlx::PgPool,
    auth_user: &AuthUser,
    id: Uuid,
) -> Result<ServiceRequest, ApiError> {
    let request = sqlx::query_as::<_, ServiceRequest>("SELECT * FROM service_requests WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Service request not found"))?;

    if auth_user.role != "admin" && request.requester_id != auth_user.profile_id {
        return Err(ApiError::not_found("Service request not found"));
    }

    Ok(request)
}
