#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;

use cart_api::config::{
    AppConfig, DatabaseConfig, PaginationConfig, SecurityConfig, ServerConfig,
};
use cart_api::{app, auth, database, AppState};

pub const JWT_SECRET: &str = "test-secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 5432,
            name: "cart_test".to_string(),
            username: "postgres".to_string(),
            password: "postgres".to_string(),
            max_connections: 5,
            connect_timeout_secs: 5,
        },
        security: SecurityConfig {
            jwt_secret: JWT_SECRET.to_string(),
            jwt_expiry_hours: 1,
        },
        pagination: PaginationConfig { page_size: 10 },
    }
}

/// Router over a lazily-connected pool: request paths that are rejected
/// before the repository layer (auth, validation) run without a database.
pub fn test_app() -> Router {
    let config = test_config();
    let pool = database::pool::connect_lazy(&config.database).expect("lazy pool");
    app(AppState::new(pool, config))
}

/// Router over a live database, for the end-to-end suites. `None` when
/// TEST_DATABASE_URL is not set, in which case the caller skips.
pub async fn db_app() -> Option<(Router, PgPool)> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .ok()?;
    database::pool::run_migrations(&pool)
        .await
        .expect("migrations");
    let router = app(AppState::new(pool.clone(), test_config()));
    Some((router, pool))
}

pub fn bearer(user_id: i32) -> String {
    let claims = auth::Claims::new(
        user_id,
        format!("user_{}", user_id),
        format!("user_{}@example.com", user_id),
        1,
    );
    auth::generate_token(&claims, JWT_SECRET).expect("token")
}

pub async fn request(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, value)
}

/// Monetary fields may arrive as JSON strings or numbers depending on the
/// serializer; normalize through Decimal.
pub fn decimal_field(value: &Value) -> rust_decimal::Decimal {
    match value {
        Value::String(s) => s.parse().expect("decimal string"),
        Value::Number(n) => n.to_string().parse().expect("decimal number"),
        other => panic!("not a decimal value: {:?}", other),
    }
}

/// Register a fresh user through the API; returns its bearer token and id.
pub async fn register(router: &Router) -> (String, i64) {
    let suffix = unique();
    let payload = serde_json::json!({
        "username": format!("user_{}", suffix),
        "firstName": "User",
        "lastName": "Doe",
        "email": format!("user_{}@example.com", suffix),
        "password": "Aw3s0m#01",
    });

    let (status, body) = request(router, "POST", "/user", None, Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);

    let token = body["token"].as_str().expect("token").to_string();
    let id = body["user"]["id"].as_i64().expect("user id");
    (token, id)
}

static COUNTER: std::sync::atomic::AtomicU32 = std::sync::atomic::AtomicU32::new(0);

/// Unique suffix for usernames/emails so suites can re-run against the
/// same database.
pub fn unique() -> String {
    let n = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .subsec_nanos();
    format!("{}_{}", nanos, n)
}
