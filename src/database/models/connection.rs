use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Connection {
    pub id: Uuid,
    pub name: String,
    pub connection_type: String,
    pub status: String,
    pub config: Value,
    pub logo_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Status values tracked for integrations. Sync itself happens elsewhere.
pub fn is_valid_status(status: &str) -> bool {
    matches!(status, "active" | "pending" | "failed")
}
