use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Option<Uuid>,
    pub settings: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    /// Client-facing shape with association ids joined in application code
    pub fn to_api_value(&self, company_ids: &[Uuid], dashboard_ids: &[Uuid]) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "owner_id": self.owner_id,
            "settings": self.settings,
            "company_ids": company_ids,
            "dashboard_ids": dashboard_ids,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }
}

/// Link-replacement payload for `PUT .../companies` and `PUT .../dashboards`
#[derive(Debug, Deserialize)]
pub struct ReplaceLinks {
    pub ids: Vec<Uuid>,
}

impl ReplaceLinks {
    /// Duplicate ids in the payload would violate the association primary key
    pub fn deduplicated(&self) -> Vec<Uuid> {
        let mut seen = std::collections::HashSet::new();
        self.ids.iter().copied().filter(|id| seen.insert(*id)).collect()
    }
}
