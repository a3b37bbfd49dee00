use axum::{middleware as axum_middleware, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

/// Build the full portal router
pub fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Authenticated user API
        .merge(user_routes())
        // Admin console API
        .merge(admin_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use axum::routing::{post, put};
    use handlers::auth;

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/password/reset", post(auth::password_reset_request))
        .route("/auth/password", put(auth::password_update))
}

fn user_routes() -> Router {
    use axum::routing::{delete, post};
    use handlers::{auth, chatbot, dashboards, requests, tickets};

    Router::new()
        // Session
        .route("/api/auth/whoami", get(auth::whoami))
        .route("/api/auth/session", delete(auth::logout))
        // Dashboard catalog
        .route("/api/dashboards", get(dashboards::list))
        .route("/api/dashboards/:id/favorite", post(dashboards::toggle_favorite))
        // Support tickets
        .route("/api/support-tickets", get(tickets::list).post(tickets::create))
        .route(
            "/api/support-tickets/:id",
            get(tickets::get).patch(tickets::update),
        )
        .route("/api/support-tickets/:id/messages", post(tickets::add_message))
        // Service requests
        .route("/api/service-requests", get(requests::list).post(requests::create))
        .route(
            "/api/service-requests/:id",
            get(requests::get).patch(requests::update),
        )
        // Chatbot
        .route("/api/chatbot", post(chatbot::reply))
        .layer(axum_middleware::from_fn(middleware::auth::jwt_auth_middleware))
}

fn admin_routes() -> Router {
    use axum::routing::{post, put};
    use handlers::{companies, connections, dashboards, users, workspaces};

    Router::new()
        // Users
        .route("/api/admin/users", get(users::list).post(users::create))
        .route(
            "/api/admin/users/:id",
            put(users::update).delete(users::delete),
        )
        // Companies
        .route(
            "/api/admin/companies",
            get(companies::list).post(companies::create),
        )
        .route(
            "/api/admin/companies/:id",
            put(companies::update).delete(companies::delete),
        )
        // Workspaces and their association links
        .route(
            "/api/admin/workspaces",
            get(workspaces::list).post(workspaces::create),
        )
        .route(
            "/api/admin/workspaces/:id",
            put(workspaces::update).delete(workspaces::delete),
        )
        .route(
            "/api/admin/workspaces/:id/companies",
            put(workspaces::replace_companies),
        )
        .route(
            "/api/admin/workspaces/:id/dashboards",
            put(workspaces::replace_dashboards),
        )
        // Dashboard catalog management
        .route(
            "/api/admin/dashboards",
            get(dashboards::list_all).post(dashboards::create),
        )
        .route(
            "/api/admin/dashboards/:id",
            put(dashboards::update).delete(dashboards::delete),
        )
        // Connections
        .route(
            "/api/admin/connections",
            get(connections::list).post(connections::create),
        )
        .route(
            "/api/admin/connections/:id",
            put(connections::update).delete(connections::delete),
        )
        .route("/api/admin/connections/:id/logo", post(connections::upload_logo))
        // Admin gate runs after JWT validation
        .layer(axum_middleware::from_fn(middleware::admin::require_admin_middleware))
        .layer(axum_middleware::from_fn(middleware::auth::jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Portal API",
            "version": version,
            "description": "Customer portal backend - dashboards, support and admin console",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/login, /auth/password/* (public), /api/auth/* (protected)",
                "dashboards": "/api/dashboards[/:id/favorite] (protected)",
                "support": "/api/support-tickets[/:id[/messages]] (protected)",
                "requests": "/api/service-requests[/:id] (protected)",
                "chatbot": "/api/chatbot (protected)",
                "admin": "/api/admin/* (admin only)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
