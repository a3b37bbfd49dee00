//! Support tickets with a message thread. Non-admin callers only ever see
//! their own tickets; a foreign ticket id answers 404, not 403, so ids are
//! not probeable.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::ticket::{
    is_valid_priority, is_valid_ticket_status, SupportTicket, TicketMessage,
};
use crate::error::ApiError;
use crate::handlers::{created, ok, require_text};
use crate::middleware::auth::AuthUser;

/// GET /api/support-tickets - Own tickets, or all for admins
pub async fn list(Extension(auth_user): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let tickets = if auth_user.role == "admin" {
        sqlx::query_as::<_, SupportTicket>(
            "SELECT * FROM support_tickets ORDER BY created_at DESC",
        )
        .fetch_all(&pool)
        .await?
    } else {
        sqlx::query_as::<_, SupportTicket>(
            "SELECT * FROM support_tickets WHERE requester_id = $1 ORDER BY created_at DESC",
        )
        .bind(auth_user.profile_id)
        .fetch_all(&pool)
        .await?
    };

    let data: Vec<Value> = tickets.iter().map(SupportTicket::to_api_value).collect();
    Ok(ok(json!(data)))
}

#[derive(Debug, Deserialize)]
pub struct CreateTicket {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
}

/// POST /api/support-tickets
pub async fn create(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateTicket>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let subject = require_text(&payload.subject, "subject")?;

    let priority = payload.priority.unwrap_or_else(|| "medium".to_string());
    if !is_valid_priority(&priority) {
        return Err(ApiError::bad_request(format!("Invalid priority: {}", priority)));
    }

    let pool = DatabaseManager::pool().await?;
    let ticket = sqlx::query_as::<_, SupportTicket>(
        "INSERT INTO support_tickets (requester_id, subject, description, status, priority)
         VALUES ($1, $2, $3, 'open', $4) RETURNING *",
    )
    .bind(auth_user.profile_id)
    .bind(&subject)
    .bind(&payload.description)
    .bind(&priority)
    .fetch_one(&pool)
    .await?;

    Ok(created(ticket.to_api_value()))
}

/// GET /api/support-tickets/:id - Ticket with its message thread
pub async fn get(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let ticket = load_visible_ticket(&pool, &auth_user, id).await?;

    let messages = sqlx::query_as::<_, TicketMessage>(
        "SELECT * FROM ticket_messages WHERE ticket_id = $1 ORDER BY created_at",
    )
    .bind(id)
    .fetch_all(&pool)
    .await?;

    Ok(ok(ticket.to_api_value_with_messages(&messages)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateTicket {
    pub status: Option<String>,
    pub priority: Option<String>,
}

/// PATCH /api/support-tickets/:id - Status/priority transitions
pub async fn update(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTicket>,
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
    let existing = load_visible_ticket(&pool, &auth_user, id).await?;

    let status = payload.status.unwrap_or(existing.status);
    let priority = payload.priority.unwrap_or(existing.priority);

    let ticket = sqlx::query_as::<_, SupportTicket>(
        "UPDATE support_tickets SET status = $1, priority = $2, updated_at = now()
         WHERE id = $3 RETURNING *",
    )
    .bind(&status)
    .bind(&priority)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(ok(ticket.to_api_value()))
}

#[derive(Debug, Deserialize)]
pub struct CreateMessage {
    pub body: Option<String>,
}

/// POST /api/support-tickets/:id/messages
pub async fn add_message(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateMessage>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let body = require_text(&payload.body, "body")?;

    let pool = DatabaseManager::pool().await?;
    load_visible_ticket(&pool, &auth_user, id).await?;

    let message = sqlx::query_as::<_, TicketMessage>(
        "INSERT INTO ticket_messages (ticket_id, author_id, body) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(id)
    .bind(auth_user.profile_id)
    .bind(&body)
    .fetch_one(&pool)
    .await?;

    // Bumping the ticket timestamp is a secondary write; a failure here must
    // not fail the message that was already stored
    if let Err(e) = sqlx::query("UPDATE support_tickets SET updated_at = now() WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
    {
        warn!("Failed to bump updated_at for ticket {}: {}", id, e);
    }

    Ok(created(json!(message)))
}

/// Fetch a ticket the caller is allowed to see. Admins see everything;
/// everyone else only their own rows, and a miss is reported as 404.
async fn load_visible_ticket(
    pool: &sqlx::PgPool,
    auth_user: &AuthUser,
    id: Uuid,
) -> Result<SupportTicket, ApiError> {
    let ticket = sqlx::query_as::<_, SupportTicket>("SELECT * FROM support_tickets WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Ticket not found"))?;

    if auth_user.role != "admin" && ticket.requester_id != auth_user.profile_id {
        return Err(ApiError::not_found("Ticket not found"));
    }

    Ok(ticket)
}
