//! Router-level tests driven through tower's oneshot, covering the routes
//! and failure paths that do not need a live database.

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use portal_api::auth::{generate_jwt, Claims};

async fn body_json(response: axum::response::Response) -> Result<Value> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

fn bearer_token(role: &str) -> String {
    let claims = Claims::new(
        uuid::Uuid::new_v4(),
        "tester@example.com".to_string(),
        role.to_string(),
    );
    generate_jwt(&claims).expect("dev config has a jwt secret")
}

#[tokio::test]
async fn root_banner_lists_endpoints() -> Result<()> {
    let app = portal_api::app();

    let res = app
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Portal API");
    assert!(body["data"]["endpoints"]["admin"].is_string());
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_token() -> Result<()> {
    for (method, uri) in [
        ("GET", "/api/dashboards"),
        ("GET", "/api/auth/whoami"),
        ("GET", "/api/support-tickets"),
        ("POST", "/api/chatbot"),
        ("GET", "/api/admin/users"),
        ("POST", "/api/admin/companies"),
        ("PUT", "/api/admin/workspaces/00000000-0000-0000-0000-000000000000/companies"),
    ] {
        let app = portal_api::app();
        let res = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))?,
            )
            .await?;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        let body = body_json(res).await?;
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
    Ok(())
}

#[tokio::test]
async fn garbage_bearer_token_is_rejected() -> Result<()> {
    let app = portal_api::app();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/api/dashboards")
                .header("authorization", "Bearer not.a.jwt")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn login_without_credentials_is_a_validation_error() -> Result<()> {
    let app = portal_api::app();

    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "email": "user@example.com" }).to_string()))?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = body_json(res).await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field_errors"]["password"], "This field is required");
    Ok(())
}

#[tokio::test]
async fn ticket_creation_validates_before_touching_storage() -> Result<()> {
    let token = bearer_token("user");

    // Missing subject
    let app = portal_api::app();
    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/support-tickets")
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(json!({ "description": "no subject" }).to_string()))?,
        )
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Invalid priority
    let app = portal_api::app();
    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/support-tickets")
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "subject": "Help", "priority": "catastrophic" }).to_string(),
                ))?,
        )
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn chatbot_answers_even_without_a_database() -> Result<()> {
    // Message logging is best-effort; with no database configured the bot
    // must still answer
    std::env::remove_var("DATABASE_URL");
    let token = bearer_token("user");

    let app = portal_api::app();
    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chatbot")
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(json!({ "message": "esqueci minha senha" }).to_string()))?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await?;
    assert_eq!(body["success"], true);
    assert!(body["data"]["answer"].as_str().unwrap().contains("senha"));
    Ok(())
}

#[tokio::test]
async fn chatbot_requires_a_message() -> Result<()> {
    let token = bearer_token("user");

    let app = portal_api::app();
    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chatbot")
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(json!({ "message": "   " }).to_string()))?,
        )
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
