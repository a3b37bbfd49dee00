//! Admin company management. `user_count` is derived by counting active
//! profiles per company in application code rather than with a view.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::company::Company;
use crate::error::ApiError;
use crate::handlers::{created, ok, require_text};

/// GET /api/admin/companies
pub async fn list() -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let companies = sqlx::query_as::<_, Company>("SELECT * FROM companies ORDER BY name")
        .fetch_all(&pool)
        .await?;

    let counts: Vec<(Uuid, i64)> = sqlx::query_as(
        "SELECT company_id, COUNT(*) FROM profiles
         WHERE company_id IS NOT NULL AND is_active = true
         GROUP BY company_id",
    )
    .fetch_all(&pool)
    .await?;
    let counts: HashMap<Uuid, i64> = counts.into_iter().collect();

    let data: Vec<Value> = companies
        .iter()
        .map(|c| c.to_api_value(counts.get(&c.id).copied().unwrap_or(0)))
        .collect();

    Ok(ok(json!(data)))
}

#[derive(Debug, Deserialize)]
pub struct CreateCompany {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

/// POST /api/admin/companies
pub async fn create(
    Json(payload): Json<CreateCompany>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let name = require_text(&payload.name, "name")?;

    let pool = DatabaseManager::pool().await?;
    let company = sqlx::query_as::<_, Company>(
        "INSERT INTO companies (name, description, logo_url) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(&name)
    .bind(&payload.description)
    .bind(&payload.logo_url)
    .fetch_one(&pool)
    .await?;

    Ok(created(company.to_api_value(0)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

/// PUT /api/admin/companies/:id
pub async fn update(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCompany>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let existing = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;

    let name = payload
        .name
        .filter(|n| !n.trim().is_empty())
        .map(|n| n.trim().to_string())
        .unwrap_or(existing.name);
    let description = payload.description.or(existing.description);
    let logo_url = payload.logo_url.or(existing.logo_url);

    let company = sqlx::query_as::<_, Company>(
        "UPDATE companies SET name = $1, description = $2, logo_url = $3, updated_at = now()
         WHERE id = $4 RETURNING *",
    )
    .bind(&name)
    .bind(&description)
    .bind(&logo_url)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    let (user_count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM profiles WHERE company_id = $1 AND is_active = true",
    )
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(ok(company.to_api_value(user_count)))
}

/// DELETE /api/admin/companies/:id - Blocked while active profiles reference it
pub async fn delete(Path(id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let (active_profiles,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM profiles WHERE company_id = $1 AND is_active = true",
    )
    .bind(id)
    .fetch_one(&pool)
    .await?;

    if active_profiles > 0 {
        return Err(ApiError::bad_request(format!(
            "Company has {} active user(s); reassign or deactivate them first",
            active_profiles
        )));
    }

    let mut tx = pool.begin().await?;

    // Inactive profiles do not block the delete, but their reference must go
    sqlx::query("UPDATE profiles SET company_id = NULL WHERE company_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM workspace_companies WHERE company_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM companies WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Company not found"));
    }

    tx.commit().await?;

    Ok(ok(json!({ "id": id, "deleted": true })))
}
