use axum::http::StatusCode;
use axum::response::Json;
use serde_json::{json, Value};

pub mod auth;
pub mod chatbot;
pub mod companies;
pub mod connections;
pub mod dashboards;
pub mod requests;
pub mod tickets;
pub mod users;
pub mod workspaces;

/// Standard success envelope
pub fn ok(data: Value) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// Success envelope for resource creation
pub fn created(data: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, ok(data))
}

/// Deserialize a field so that "absent" and "explicit null" stay
/// distinguishable: absent stays `None`, `null` becomes `Some(None)`.
pub fn explicit_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Validate that an optional text field is present and non-blank
pub fn require_text(value: &Option<String>, field: &str) -> Result<String, crate::error::ApiError> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(crate::error::ApiError::missing_field(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text(&Some("  hello ".to_string()), "name").unwrap(), "hello");
        assert!(require_text(&Some("   ".to_string()), "name").is_err());
        assert!(require_text(&None, "name").is_err());
    }

    #[test]
    fn envelopes_have_expected_shape() {
        let Json(body) = ok(json!({"id": 1}));
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], 1);
    }
}
