pub mod categories;
pub mod clients;
pub mod item_orders;
pub mod orders;
pub mod products;
pub mod users;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::AppState;

/// Query parameters accepted by every list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// 1-based page number; the page size is fixed.
    pub page: Option<i64>,
    /// Case-insensitive substring filter.
    pub search: Option<String>,
}

/// GET / - service banner
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "cart-api",
        "version": version,
        "description": "Catalog and order management REST API",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "register": "POST /user (public)",
            "login": "POST /user/login (public)",
            "user": "/user[/:id] (protected)",
            "category": "/category[/:id] (protected)",
            "product": "/product[/:id] (protected)",
            "client": "/client[/:id] (protected)",
            "order": "/order[/:id] (protected)",
            "item_order": "/item-order/:order[/:id] (protected)",
        }
    }))
}

/// GET /health - liveness plus a database ping
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    match crate::database::pool::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "databaseError": e.to_string()
            })),
        ),
    }
}
