//! Chatbot endpoint. The match itself is pure; logging the exchange to the
//! messages table is fire-and-log, so a database outage never breaks the bot.

use axum::response::Json;
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::handlers::{ok, require_text};
use crate::middleware::auth::AuthUser;
use crate::services::chatbot;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

/// POST /api/chatbot
pub async fn reply(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<Value>, ApiError> {
    let message = require_text(&payload.message, "message")?;

    let answer = chatbot::reply(&message);

    if let Err(e) = log_exchange(&auth_user, &message, answer).await {
        warn!("Failed to log chatbot exchange: {}", e);
    }

    Ok(ok(json!({ "answer": answer })))
}

async fn log_exchange(
    auth_user: &AuthUser,
    question: &str,
    answer: &str,
) -> Result<(), crate::database::manager::DatabaseError> {
    let pool = DatabaseManager::pool().await?;
    sqlx::query("INSERT INTO chatbot_messages (profile_id, question, answer) VALUES ($1, $2, $3)")
        .bind(auth_user.profile_id)
        .bind(question)
        .bind(answer)
        .execute(&pool)
        .await?;
    Ok(())
}
