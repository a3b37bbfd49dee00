//! Admin user management. "Delete" deactivates the profile instead of
//! dropping the row so ticket history keeps its author.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::hash_password;
use crate::database::manager::DatabaseManager;
use crate::database::models::profile::{is_valid_role, Profile};
use crate::error::ApiError;
use crate::handlers::{created, ok, require_text};

/// GET /api/admin/users
pub async fn list() -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let profiles = sqlx::query_as::<_, Profile>("SELECT * FROM profiles ORDER BY created_at DESC")
        .fetch_all(&pool)
        .await?;

    let data: Vec<Value> = profiles.iter().map(Profile::to_api_value).collect();
    Ok(ok(json!(data)))
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub email: Option<String>,
    pub name: Option<String>,
    pub company_id: Option<Uuid>,
    pub role: Option<String>,
    pub password: Option<String>,
}

/// POST /api/admin/users
pub async fn create(Json(payload): Json<CreateUser>) -> Result<(StatusCode, Json<Value>), ApiError> {
    let email = require_text(&payload.email, "email")?.to_lowercase();
    let name = require_text(&payload.name, "name")?;

    let role = payload.role.unwrap_or_else(|| "user".to_string());
    if !is_valid_role(&role) {
        return Err(ApiError::bad_request(format!("Invalid role: {}", role)));
    }

    // Generate a starter password when the admin does not supply one
    let (password, generated) = match payload.password {
        Some(p) if !p.trim().is_empty() => (p, false),
        _ => (Uuid::new_v4().simple().to_string(), true),
    };

    let pool = DatabaseManager::pool().await?;

    if let Some(company_id) = payload.company_id {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM companies WHERE id = $1")
            .bind(company_id)
            .fetch_optional(&pool)
            .await?;
        if exists.is_none() {
            return Err(ApiError::bad_request("Unknown company_id"));
        }
    }

    let profile = sqlx::query_as::<_, Profile>(
        "INSERT INTO profiles (email, name, company_id, role, is_active, password_hash)
         VALUES ($1, $2, $3, $4, true, $5)
         RETURNING *",
    )
    .bind(&email)
    .bind(&name)
    .bind(payload.company_id)
    .bind(&role)
    .bind(hash_password(&password))
    .fetch_one(&pool)
    .await?;

    let mut data = profile.to_api_value();
    if generated {
        data["generated_password"] = json!(password);
    }

    Ok(created(data))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub name: Option<String>,
    /// Absent = keep current, explicit null = detach from company
    #[serde(default, deserialize_with = "crate::handlers::explicit_null")]
    pub company_id: Option<Option<Uuid>>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

/// PUT /api/admin/users/:id
pub async fn update(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUser>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let existing = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if let Some(role) = payload.role.as_deref() {
        if !is_valid_role(role) {
            return Err(ApiError::bad_request(format!("Invalid role: {}", role)));
        }
    }

    let company_id = match payload.company_id {
        Some(Some(company_id)) => {
            let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM companies WHERE id = $1")
                .bind(company_id)
                .fetch_optional(&pool)
                .await?;
            if exists.is_none() {
                return Err(ApiError::bad_request("Unknown company_id"));
            }
            Some(company_id)
        }
        Some(None) => None,
        None => existing.company_id,
    };

    let email = payload
        .email
        .filter(|e| !e.trim().is_empty())
        .map(|e| e.trim().to_lowercase())
        .unwrap_or(existing.email);
    let name = payload
        .name
        .filter(|n| !n.trim().is_empty())
        .map(|n| n.trim().to_string())
        .unwrap_or(existing.name);
    let role = payload.role.unwrap_or(existing.role);
    let is_active = payload.is_active.unwrap_or(existing.is_active);
    let password_hash = match payload.password {
        Some(p) if !p.trim().is_empty() => hash_password(&p),
        _ => existing.password_hash,
    };

    let profile = sqlx::query_as::<_, Profile>(
        "UPDATE profiles
         SET email = $1, name = $2, company_id = $3, role = $4, is_active = $5,
             password_hash = $6, updated_at = now()
         WHERE id = $7
         RETURNING *",
    )
    .bind(&email)
    .bind(&name)
    .bind(company_id)
    .bind(&role)
    .bind(is_active)
    .bind(&password_hash)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(ok(profile.to_api_value()))
}

/// DELETE /api/admin/users/:id - Deactivate
pub async fn delete(Path(id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let result = sqlx::query("UPDATE profiles SET is_active = false, updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(ok(json!({ "id": id, "is_active": false })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_payload_distinguishes_absent_and_null_company() {
        let absent: UpdateUser = serde_json::from_str(r#"{"name":"A"}"#).unwrap();
        assert!(absent.company_id.is_none());

        let detach: UpdateUser = serde_json::from_str(r#"{"company_id":null}"#).unwrap();
        assert_eq!(detach.company_id, Some(None));

        let assign: UpdateUser = serde_json::from_str(
            r#"{"company_id":"3fa85f64-5717-4562-b3fc-2c963f66afa6"}"#,
        )
        .unwrap();
        assert!(matches!(assign.company_id, Some(Some(_))));
    }
}
