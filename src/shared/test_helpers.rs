//! Fixtures shared by the unit and router tests

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::Request, middleware::Next, response::Response, Router};
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::core::config::AuthConfig;
use crate::core::database::run_migrations;
use crate::features::auth::model::{AuthenticatedUser, Claims};
use crate::modules::storage::{LocalStorage, Storage};

pub const TEST_JWT_SECRET: &str = "test-secret-do-not-use-in-production";

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        issuer: None,
        audience: None,
        jwt_leeway: Duration::from_secs(60),
        login_url: "/admin/login/".to_string(),
    }
}

/// Signs a one-hour token for the test secret
pub fn issue_token(sub: &str, is_staff: bool, roles: &[&str]) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: chrono::Utc::now().timestamp() as u64 + 3600,
        iss: None,
        username: Some(format!("user-{}", sub)),
        is_staff,
        roles: roles.iter().map(|r| r.to_string()).collect(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

/// Fresh in-memory database with migrations applied.
///
/// The pool's connections share one database, so concurrent work really runs
/// on separate connections. One connection is always kept open, otherwise
/// the database would be dropped.
pub async fn test_pool() -> SqlitePool {
    // sqlx names each `:memory:` database uniquely and opens it in shared cache
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(4)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();

    run_migrations(&pool).await.unwrap();
    pool
}

/// Local storage rooted in a temporary directory; keep the `TempDir` alive
pub fn test_storage() -> (TempDir, Storage) {
    let dir = tempfile::tempdir().unwrap();
    let storage: Storage = Arc::new(LocalStorage::new(dir.path().to_path_buf(), "/media"));
    (dir, storage)
}

pub fn create_staff_user() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "staff-1".to_string(),
        username: Some("staff".to_string()),
        is_staff: true,
        roles: vec![],
    }
}

async fn inject_staff_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_staff_user());
    next.run(request).await
}

/// Wraps a router so every request is made by a staff member
pub fn with_staff_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_staff_middleware))
}
