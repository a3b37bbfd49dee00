//! Shared helpers for database-backed tests. Tests call `test_pool()` and
//! skip themselves when no database is reachable, so the suite still passes
//! on machines without Postgres.

use sqlx::PgPool;
use tokio::sync::OnceCell;
use uuid::Uuid;

use portal_api::auth::{generate_jwt, hash_password, Claims};

static POOL: OnceCell<Option<PgPool>> = OnceCell::const_new();

/// Connect to DATABASE_URL and make sure the portal schema exists.
/// None when the database is absent or unreachable.
pub async fn test_pool() -> Option<PgPool> {
    POOL.get_or_init(|| async {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = PgPool::connect(&url).await.ok()?;
        bootstrap(&pool).await.ok()?;
        Some(pool)
    })
    .await
    .clone()
}

async fn bootstrap(pool: &PgPool) -> Result<(), sqlx::Error> {
    // gen_random_uuid() is built in from Postgres 13; older servers need the
    // extension, and lacking the privilege is fine if it is already there
    let _ = sqlx::query("CREATE EXTENSION IF NOT EXISTS \"pgcrypto\"")
        .execute(pool)
        .await;

    for statement in SCHEMA.split(';') {
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

pub fn token_for(profile_id: Uuid, email: &str, role: &str) -> String {
    let claims = Claims::new(profile_id, email.to_string(), role.to_string());
    generate_jwt(&claims).expect("dev config has a jwt secret")
}

pub async fn seed_profile(
    pool: &PgPool,
    role: &str,
    is_active: bool,
    company_id: Option<Uuid>,
) -> (Uuid, String) {
    let email = format!("{}-{}@example.com", role, Uuid::new_v4().simple());
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO profiles (email, name, company_id, role, is_active, password_hash)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(&email)
    .bind("Test User")
    .bind(company_id)
    .bind(role)
    .bind(is_active)
    .bind(hash_password("password123"))
    .fetch_one(pool)
    .await
    .expect("seed profile");
    (id, email)
}

pub async fn seed_company(pool: &PgPool, name: &str) -> Uuid {
    let (id,): (Uuid,) = sqlx::query_as("INSERT INTO companies (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("seed company");
    id
}

pub async fn seed_dashboard(pool: &PgPool) -> Uuid {
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO dashboards (title, embed_url) VALUES ($1, $2) RETURNING id",
    )
    .bind(format!("Dashboard {}", Uuid::new_v4().simple()))
    .bind("https://bi.example.com/embed/test")
    .fetch_one(pool)
    .await
    .expect("seed dashboard");
    id
}

pub async fn seed_workspace(pool: &PgPool) -> Uuid {
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO workspaces (name, settings) VALUES ($1, '{}') RETURNING id",
    )
    .bind(format!("Workspace {}", Uuid::new_v4().simple()))
    .fetch_one(pool)
    .await
    .expect("seed workspace");
    id
}

// Mirrors sql/schema.sql with IF NOT EXISTS so tests bootstrap an empty
// database and are harmless against an already-migrated one.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS companies (
    id          uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    name        text NOT NULL,
    description text,
    logo_url    text,
    created_at  timestamptz NOT NULL DEFAULT now(),
    updated_at  timestamptz NOT NULL DEFAULT now()
);
CREATE TABLE IF NOT EXISTS profiles (
    id            uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    email         text NOT NULL UNIQUE,
    name          text NOT NULL,
    company_id    uuid REFERENCES companies(id),
    role          text NOT NULL DEFAULT 'user' CHECK (role IN ('admin', 'user')),
    is_active     boolean NOT NULL DEFAULT true,
    password_hash text NOT NULL,
    created_at    timestamptz NOT NULL DEFAULT now(),
    updated_at    timestamptz NOT NULL DEFAULT now()
);
CREATE TABLE IF NOT EXISTS workspaces (
    id         uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    name       text NOT NULL,
    owner_id   uuid REFERENCES profiles(id),
    settings   jsonb NOT NULL DEFAULT '{}',
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now()
);
CREATE TABLE IF NOT EXISTS dashboards (
    id            uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    title         text NOT NULL,
    category      text,
    embed_url     text NOT NULL,
    thumbnail_url text,
    is_new        boolean NOT NULL DEFAULT true,
    created_at    timestamptz NOT NULL DEFAULT now(),
    updated_at    timestamptz NOT NULL DEFAULT now()
);
CREATE TABLE IF NOT EXISTS workspace_companies (
    workspace_id uuid NOT NULL REFERENCES workspaces(id),
    company_id   uuid NOT NULL REFERENCES companies(id),
    PRIMARY KEY (workspace_id, company_id)
);
CREATE TABLE IF NOT EXISTS workspace_dashboards (
    workspace_id uuid NOT NULL REFERENCES workspaces(id),
    dashboard_id uuid NOT NULL REFERENCES dashboards(id),
    PRIMARY KEY (workspace_id, dashboard_id)
);
CREATE TABLE IF NOT EXISTS dashboard_favorites (
    profile_id   uuid NOT NULL REFERENCES profiles(id),
    dashboard_id uuid NOT NULL REFERENCES dashboards(id),
    PRIMARY KEY (profile_id, dashboard_id)
);
CREATE TABLE IF NOT EXISTS connections (
    id              uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    name            text NOT NULL,
    connection_type text NOT NULL,
    status          text NOT NULL DEFAULT 'pending' CHECK (status IN ('active', 'pending', 'failed')),
    config          jsonb NOT NULL DEFAULT '{}',
    logo_path       text,
    created_at      timestamptz NOT NULL DEFAULT now(),
    updated_at      timestamptz NOT NULL DEFAULT now()
);
CREATE TABLE IF NOT EXISTS support_tickets (
    id           uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    requester_id uuid NOT NULL REFERENCES profiles(id),
    subject      text NOT NULL,
    description  text,
    status       text NOT NULL DEFAULT 'open' CHECK (status IN ('open', 'in_progress', 'resolved', 'closed')),
    priority     text NOT NULL DEFAULT 'medium' CHECK (priority IN ('low', 'medium', 'high', 'urgent')),
    created_at   timestamptz NOT NULL DEFAULT now(),
    updated_at   timestamptz NOT NULL DEFAULT now()
);
CREATE TABLE IF NOT EXISTS ticket_messages (
    id         uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    ticket_id  uuid NOT NULL REFERENCES support_tickets(id),
    author_id  uuid NOT NULL REFERENCES profiles(id),
    body       text NOT NULL,
    created_at timestamptz NOT NULL DEFAULT now()
);
CREATE TABLE IF NOT EXISTS service_requests (
    id           uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    requester_id uuid NOT NULL REFERENCES profiles(id),
    title        text NOT NULL,
    details      text,
    request_type text NOT NULL,
    status       text NOT NULL DEFAULT 'open' CHECK (status IN ('open', 'in_progress', 'resolved', 'closed')),
    priority     text NOT NULL DEFAULT 'medium' CHECK (priority IN ('low', 'medium', 'high', 'urgent')),
    created_at   timestamptz NOT NULL DEFAULT now(),
    updated_at   timestamptz NOT NULL DEFAULT now()
);
CREATE TABLE IF NOT EXISTS chatbot_messages (
    id         uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    profile_id uuid REFERENCES profiles(id),
    question   text NOT NULL,
    answer     text NOT NULL,
    created_at timestamptz NOT NULL DEFAULT now()
);
CREATE TABLE IF NOT EXISTS password_resets (
    token      text PRIMARY KEY,
    profile_id uuid NOT NULL REFERENCES profiles(id),
    expires_at timestamptz NOT NULL,
    used       boolean NOT NULL DEFAULT false
)
"#;
