//! Dashboard catalog. End users see the dashboards reachable through their
//! company's workspaces; admins manage the catalog itself. The favorite flag
//! is per-user and lives in its own table.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::dashboard::Dashboard;
use crate::error::ApiError;
use crate::handlers::{created, ok, require_text};
use crate::middleware::auth::AuthUser;

/// GET /api/dashboards - Dashboards visible to the caller
pub async fn list(Extension(auth_user): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    // Admins browse the whole catalog; everyone else goes through
    // company -> workspace -> dashboard links
    let dashboards = if auth_user.role == "admin" {
        sqlx::query_as::<_, Dashboard>("SELECT * FROM dashboards ORDER BY title")
            .fetch_all(&pool)
            .await?
    } else {
        sqlx::query_as::<_, Dashboard>(
            "SELECT DISTINCT d.* FROM dashboards d
             JOIN workspace_dashboards wd ON wd.dashboard_id = d.id
             JOIN workspace_companies wc ON wc.workspace_id = wd.workspace_id
             JOIN profiles p ON p.company_id = wc.company_id
             WHERE p.id = $1
             ORDER BY d.title",
        )
        .bind(auth_user.profile_id)
        .fetch_all(&pool)
        .await?
    };

    let favorites: Vec<(Uuid,)> =
        sqlx::query_as("SELECT dashboard_id FROM dashboard_favorites WHERE profile_id = $1")
            .bind(auth_user.profile_id)
            .fetch_all(&pool)
            .await?;
    let favorites: HashSet<Uuid> = favorites.into_iter().map(|(id,)| id).collect();

    let data: Vec<Value> = dashboards
        .iter()
        .map(|d| d.to_api_value(favorites.contains(&d.id)))
        .collect();

    Ok(ok(json!(data)))
}

/// POST /api/dashboards/:id/favorite - Toggle; two calls restore the original state
pub async fn toggle_favorite(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    // Locking the dashboard row serializes concurrent toggles by the same user
    let exists: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM dashboards WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
    if exists.is_none() {
        return Err(ApiError::not_found("Dashboard not found"));
    }

    let removed = sqlx::query(
        "DELETE FROM dashboard_favorites WHERE profile_id = $1 AND dashboard_id = $2",
    )
    .bind(auth_user.profile_id)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let is_favorite = if removed.rows_affected() == 0 {
        sqlx::query("INSERT INTO dashboard_favorites (profile_id, dashboard_id) VALUES ($1, $2)")
            .bind(auth_user.profile_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        true
    } else {
        false
    };

    tx.commit().await?;

    Ok(ok(json!({ "dashboard_id": id, "is_favorite": is_favorite })))
}

/// GET /api/admin/dashboards
pub async fn list_all() -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let dashboards = sqlx::query_as::<_, Dashboard>("SELECT * FROM dashboards ORDER BY title")
        .fetch_all(&pool)
        .await?;

    let data: Vec<Value> = dashboards.iter().map(|d| d.to_api_value(false)).collect();
    Ok(ok(json!(data)))
}

#[derive(Debug, Deserialize)]
pub struct CreateDashboard {
    pub title: Option<String>,
    pub category: Option<String>,
    pub embed_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_new: Option<bool>,
}

/// POST /api/admin/dashboards
pub async fn create(
    Json(payload): Json<CreateDashboard>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let title = require_text(&payload.title, "title")?;
    let embed_url = require_text(&payload.embed_url, "embed_url")?;

    let pool = DatabaseManager::pool().await?;
    let dashboard = sqlx::query_as::<_, Dashboard>(
        "INSERT INTO dashboards (title, category, embed_url, thumbnail_url, is_new)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(&title)
    .bind(&payload.category)
    .bind(&embed_url)
    .bind(&payload.thumbnail_url)
    .bind(payload.is_new.unwrap_or(true))
    .fetch_one(&pool)
    .await?;

    Ok(created(dashboard.to_api_value(false)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateDashboard {
    pub title: Option<String>,
    pub category: Option<String>,
    pub embed_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_new: Option<bool>,
}

/// PUT /api/admin/dashboards/:id
pub async fn update(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDashboard>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let existing = sqlx::query_as::<_, Dashboard>("SELECT * FROM dashboards WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Dashboard not found"))?;

    let title = payload
        .title
        .filter(|t| !t.trim().is_empty())
        .map(|t| t.trim().to_string())
        .unwrap_or(existing.title);
    let embed_url = payload
        .embed_url
        .filter(|u| !u.trim().is_empty())
        .unwrap_or(existing.embed_url);
    let category = payload.category.or(existing.category);
    let thumbnail_url = payload.thumbnail_url.or(existing.thumbnail_url);
    let is_new = payload.is_new.unwrap_or(existing.is_new);

    let dashboard = sqlx::query_as::<_, Dashboard>(
        "UPDATE dashboards
         SET title = $1, category = $2, embed_url = $3, thumbnail_url = $4, is_new = $5,
             updated_at = now()
         WHERE id = $6 RETURNING *",
    )
    .bind(&title)
    .bind(&category)
    .bind(&embed_url)
    .bind(&thumbnail_url)
    .bind(is_new)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(ok(dashboard.to_api_value(false)))
}

/// DELETE /api/admin/dashboards/:id
pub async fn delete(Path(id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM dashboard_favorites WHERE dashboard_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM workspace_dashboards WHERE dashboard_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM dashboards WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Dashboard not found"));
    }

    tx.commit().await?;

    Ok(ok(json!({ "id": id, "deleted": true })))
}
