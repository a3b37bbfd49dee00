use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Service requests share the ticket status/priority vocabulary but carry a
/// request type instead of a message thread.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceRequest {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub title: String,
    pub details: Option<String>,
    pub request_type: String,
    pub status: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
