//! Admin connection management. Connections record integration status; the
//! portal never performs the synchronization itself. Logos are uploaded to
//! the object-storage bucket and referenced by path.

use axum::extract::{Multipart, Path};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::connection::{is_valid_status, Connection};
use crate::error::ApiError;
use crate::handlers::{created, ok, require_text};
use crate::services::storage::StorageService;

/// GET /api/admin/connections
pub async fn list() -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let connections = sqlx::query_as::<_, Connection>("SELECT * FROM connections ORDER BY name")
        .fetch_all(&pool)
        .await?;

    Ok(ok(json!(connections)))
}

#[derive(Debug, Deserialize)]
pub struct CreateConnection {
    pub name: Option<String>,
    pub connection_type: Option<String>,
    pub status: Option<String>,
    pub config: Option<Value>,
}

/// POST /api/admin/connections
pub async fn create(
    Json(payload): Json<CreateConnection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let name = require_text(&payload.name, "name")?;
    let connection_type = require_text(&payload.connection_type, "connection_type")?;

    let status = payload.status.unwrap_or_else(|| "pending".to_string());
    if !is_valid_status(&status) {
        return Err(ApiError::bad_request(format!("Invalid status: {}", status)));
    }
    let config = payload.config.unwrap_or_else(|| json!({}));

    let pool = DatabaseManager::pool().await?;
    let connection = sqlx::query_as::<_, Connection>(
        "INSERT INTO connections (name, connection_type, status, config)
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(&name)
    .bind(&connection_type)
    .bind(&status)
    .bind(&config)
    .fetch_one(&pool)
    .await?;

    Ok(created(json!(connection)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateConnection {
    pub name: Option<String>,
    pub connection_type: Option<String>,
    pub status: Option<String>,
    pub config: Option<Value>,
}

/// PUT /api/admin/connections/:id
pub async fn update(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateConnection>,
) -> Result<Json<Value>, ApiError> {
    if let Some(status) = payload.status.as_deref() {
        if !is_valid_status(status) {
            return Err(ApiError::bad_request(format!("Invalid status: {}", status)));
        }
    }

    let pool = DatabaseManager::pool().await?;

    let existing = sqlx::query_as::<_, Connection>("SELECT * FROM connections WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Connection not found"))?;

    let name = payload
        .name
        .filter(|n| !n.trim().is_empty())
        .map(|n| n.trim().to_string())
        .unwrap_or(existing.name);
    let connection_type = payload
        .connection_type
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(existing.connection_type);
    let status = payload.status.unwrap_or(existing.status);
    let config = payload.config.unwrap_or(existing.config);

    let connection = sqlx::query_as::<_, Connection>(
        "UPDATE connections
         SET name = $1, connection_type = $2, status = $3, config = $4, updated_at = now()
         WHERE id = $5 RETURNING *",
    )
    .bind(&name)
    .bind(&connection_type)
    .bind(&status)
    .bind(&config)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(ok(json!(connection)))
}

/// DELETE /api/admin/connections/:id
pub async fn delete(Path(id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let result = sqlx::query("DELETE FROM connections WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Connection not found"));
    }

    Ok(ok(json!({ "id": id, "deleted": true })))
}

/// POST /api/admin/connections/:id/logo - Multipart upload to the logos bucket
pub async fn upload_logo(
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM connections WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;
    if exists.is_none() {
        return Err(ApiError::not_found("Connection not found"));
    }

    // First file field wins; anything else in the form is ignored
    let mut upload: Option<(String, String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.file_name().is_none() {
            continue;
        }
        let file_name = field.file_name().unwrap_or("logo").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
        upload = Some((file_name, content_type, bytes.to_vec()));
        break;
    }

    let (file_name, content_type, bytes) =
        upload.ok_or_else(|| ApiError::bad_request("No file found in multipart body"))?;
    if bytes.is_empty() {
        return Err(ApiError::bad_request("Uploaded file is empty"));
    }

    let object_path = format!("{}-{}", id, file_name);
    let logo_path = StorageService::upload_logo(&object_path, &content_type, bytes).await?;

    let connection = sqlx::query_as::<_, Connection>(
        "UPDATE connections SET logo_path = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(&logo_path)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(ok(json!(connection)))
}
