//! Admin workspace management, including the company/dashboard link
//! endpoints. Link updates fully replace the association rows inside a
//! transaction; the payload is never diffed against the current state.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::workspace::{ReplaceLinks, Workspace};
use crate::error::ApiError;
use crate::handlers::{created, ok, require_text};

/// GET /api/admin/workspaces
pub async fn list() -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let workspaces = sqlx::query_as::<_, Workspace>("SELECT * FROM workspaces ORDER BY name")
        .fetch_all(&pool)
        .await?;

    let company_links: Vec<(Uuid, Uuid)> =
        sqlx::query_as("SELECT workspace_id, company_id FROM workspace_companies")
            .fetch_all(&pool)
            .await?;
    let dashboard_links: Vec<(Uuid, Uuid)> =
        sqlx::query_as("SELECT workspace_id, dashboard_id FROM workspace_dashboards")
            .fetch_all(&pool)
            .await?;

    // Associations joined in application code
    let data: Vec<Value> = workspaces
        .iter()
        .map(|w| {
            let companies: Vec<Uuid> = company_links
                .iter()
                .filter(|(ws, _)| *ws == w.id)
                .map(|(_, c)| *c)
                .collect();
            let dashboards: Vec<Uuid> = dashboard_links
                .iter()
                .filter(|(ws, _)| *ws == w.id)
                .map(|(_, d)| *d)
                .collect();
            w.to_api_value(&companies, &dashboards)
        })
        .collect();

    Ok(ok(json!(data)))
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkspace {
    pub name: Option<String>,
    pub owner_id: Option<Uuid>,
    pub settings: Option<Value>,
}

/// POST /api/admin/workspaces
pub async fn create(
    Json(payload): Json<CreateWorkspace>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let name = require_text(&payload.name, "name")?;
    let settings = payload.settings.unwrap_or_else(|| json!({}));

    let pool = DatabaseManager::pool().await?;
    if let Some(owner_id) = payload.owner_id {
        ensure_profile_exists(&pool, owner_id).await?;
    }

    let workspace = sqlx::query_as::<_, Workspace>(
        "INSERT INTO workspaces (name, owner_id, settings) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(&name)
    .bind(payload.owner_id)
    .bind(&settings)
    .fetch_one(&pool)
    .await?;

    Ok(created(workspace.to_api_value(&[], &[])))
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkspace {
    pub name: Option<String>,
    pub owner_id: Option<Uuid>,
    pub settings: Option<Value>,
}

/// PUT /api/admin/workspaces/:id
pub async fn update(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWorkspace>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let existing = sqlx::query_as::<_, Workspace>("SELECT * FROM workspaces WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Workspace not found"))?;

    if let Some(owner_id) = payload.owner_id {
        ensure_profile_exists(&pool, owner_id).await?;
    }

    let name = payload
        .name
        .filter(|n| !n.trim().is_empty())
        .map(|n| n.trim().to_string())
        .unwrap_or(existing.name);
    let owner_id = payload.owner_id.or(existing.owner_id);
    let settings = payload.settings.unwrap_or(existing.settings);

    let workspace = sqlx::query_as::<_, Workspace>(
        "UPDATE workspaces SET name = $1, owner_id = $2, settings = $3, updated_at = now()
         WHERE id = $4 RETURNING *",
    )
    .bind(&name)
    .bind(owner_id)
    .bind(&settings)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    let (companies, dashboards) = load_links(&pool, id).await?;
    Ok(ok(workspace.to_api_value(&companies, &dashboards)))
}

/// DELETE /api/admin/workspaces/:id
pub async fn delete(Path(id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM workspace_companies WHERE workspace_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM workspace_dashboards WHERE workspace_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM workspaces WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Workspace not found"));
    }

    tx.commit().await?;

    Ok(ok(json!({ "id": id, "deleted": true })))
}

/// PUT /api/admin/workspaces/:id/companies - Replace company links
pub async fn replace_companies(
    Path(id): Path<Uuid>,
    Json(payload): Json<ReplaceLinks>,
) -> Result<Json<Value>, ApiError> {
    replace_links(id, payload, "workspace_companies", "company_id").await
}

/// PUT /api/admin/workspaces/:id/dashboards - Replace dashboard links
pub async fn replace_dashboards(
    Path(id): Path<Uuid>,
    Json(payload): Json<ReplaceLinks>,
) -> Result<Json<Value>, ApiError> {
    replace_links(id, payload, "workspace_dashboards", "dashboard_id").await
}

/// Delete-then-reinsert of one association table, atomically. An empty
/// payload therefore clears every link.
async fn replace_links(
    workspace_id: Uuid,
    payload: ReplaceLinks,
    table: &str,
    column: &str,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let ids = payload.deduplicated();

    let mut tx = pool.begin().await?;

    // Lock the workspace row so a concurrent delete cannot race the reinsert
    let exists: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM workspaces WHERE id = $1 FOR UPDATE")
            .bind(workspace_id)
            .fetch_optional(&mut *tx)
            .await?;
    if exists.is_none() {
        return Err(ApiError::not_found("Workspace not found"));
    }

    sqlx::query(&format!("DELETE FROM {} WHERE workspace_id = $1", table))
        .bind(workspace_id)
        .execute(&mut *tx)
        .await?;

    for linked_id in &ids {
        sqlx::query(&format!(
            "INSERT INTO {} (workspace_id, {}) VALUES ($1, $2)",
            table, column
        ))
        .bind(workspace_id)
        .bind(linked_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(ok(json!({ "workspace_id": workspace_id, "ids": ids })))
}

async fn ensure_profile_exists(pool: &sqlx::PgPool, profile_id: Uuid) -> Result<(), ApiError> {
    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM profiles WHERE id = $1")
        .bind(profile_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(ApiError::bad_request("Unknown owner_id"));
    }
    Ok(())
}

async fn load_links(
    pool: &sqlx::PgPool,
    workspace_id: Uuid,
) -> Result<(Vec<Uuid>, Vec<Uuid>), ApiError> {
    let companies: Vec<(Uuid,)> =
        sqlx::query_as("SELECT company_id FROM workspace_companies WHERE workspace_id = $1")
            .bind(workspace_id)
            .fetch_all(pool)
            .await?;
    let dashboards: Vec<(Uuid,)> =
        sqlx::query_as("SELECT dashboard_id FROM workspace_dashboards WHERE workspace_id = $1")
            .bind(workspace_id)
            .fetch_all(pool)
            .await?;

    Ok((
        companies.into_iter().map(|(id,)| id).collect(),
        dashboards.into_iter().map(|(id,)| id).collect(),
    ))
}
