use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub company_id: Option<Uuid>,
    pub role: String,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role == "admin" && self.is_active
    }

    /// Client-facing shape; never includes the password hash
    pub fn to_api_value(&self) -> Value {
        json!({
            "id": self.id,
            "email": self.email,
            "name": self.name,
            "company_id": self.company_id,
            "role": self.role,
            "is_active": self.is_active,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }
}

/// Roles accepted on create/update. Anything else is a validation error.
pub fn is_valid_role(role: &str) -> bool {
    matches!(role, "admin" | "user")
}
