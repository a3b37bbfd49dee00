use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SupportTicket {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub subject: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketMessage {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl SupportTicket {
    pub fn to_api_value(&self) -> Value {
        json!({
            "id": self.id,
            "requester_id": self.requester_id,
            "subject": self.subject,
            "description": self.description,
            "status": self.status,
            "priority": self.priority,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }

    pub fn to_api_value_with_messages(&self, messages: &[TicketMessage]) -> Value {
        let mut v = self.to_api_value();
        v["messages"] = json!(messages);
        v
    }
}

pub fn is_valid_ticket_status(status: &str) -> bool {
    matches!(status, "open" | "in_progress" | "resolved" | "closed")
}

pub fn is_valid_priority(priority: &str) -> bool {
    matches!(priority, "low" | "medium" | "high" | "urgent")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_priority_validation() {
        assert!(is_valid_ticket_status("open"));
        assert!(is_valid_ticket_status("closed"));
        assert!(!is_valid_ticket_status("reopened"));

        assert!(is_valid_priority("medium"));
        assert!(is_valid_priority("urgent"));
        assert!(!is_valid_priority("critical"));
    }

    #[test]
    fn detail_view_nests_messages() {
        let ticket = SupportTicket {
            id: Uuid::new_v4(),
            requester_id: Uuid::new_v4(),
            subject: "Cannot log in".to_string(),
            description: None,
            status: "open".to_string(),
            priority: "high".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let message = TicketMessage {
            id: Uuid::new_v4(),
            ticket_id: ticket.id,
            author_id: ticket.requester_id,
            body: "Any update?".to_string(),
            created_at: Utc::now(),
        };
        let v = ticket.to_api_value_with_messages(&[message]);
        assert_eq!(v["messages"].as_array().unwrap().len(), 1);
        assert_eq!(v["messages"][0]["body"], "Any update?");
    }
}
