use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Dashboard {
    pub id: Uuid,
    pub title: String,
    pub category: Option<String>,
    pub embed_url: String,
    pub thumbnail_url: Option<String>,
    pub is_new: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dashboard {
    /// Client-facing shape; `is_favorite` is per-caller, joined in application code
    pub fn to_api_value(&self, is_favorite: bool) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "category": self.category,
            "embed_url": self.embed_url,
            "thumbnail_url": self.thumbnail_url,
            "is_new": self.is_new,
            "is_favorite": is_favorite,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }
}
