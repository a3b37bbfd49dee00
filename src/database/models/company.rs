use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Client-facing shape with the derived active-profile count joined in
    pub fn to_api_value(&self, user_count: i64) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "description": self.description,
            "logo_url": self.logo_url,
            "user_count": user_count,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_value_carries_user_count() {
        let company = Company {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            description: None,
            logo_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let v = company.to_api_value(7);
        assert_eq!(v["user_count"], 7);
        assert_eq!(v["name"], "Acme");
    }
}
