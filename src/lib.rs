pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;

/// Shared request state: the connection pool and the configuration, both
/// constructed in `main` and injected here.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Registration and login are the only unauthenticated operations
        .route("/user", post(users::create))
        .route("/user/login", post(users::login))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::{categories, clients, item_orders, orders, products, users};

    Router::new()
        .route("/user", get(users::list))
        .route(
            "/user/:id",
            get(users::read).put(users::update).delete(users::destroy),
        )
        .route("/category", get(categories::list).post(categories::create))
        .route(
            "/category/:id",
            get(categories::read)
                .put(categories::update)
                .delete(categories::destroy),
        )
        .route("/product", get(products::list).post(products::create))
        .route(
            "/product/:id",
            get(products::read)
                .put(products::update)
                .delete(products::destroy),
        )
        .route("/client", get(clients::list).post(clients::create))
        .route(
            "/client/:id",
            get(clients::read).put(clients::update).delete(clients::destroy),
        )
        .route("/order", get(orders::list).post(orders::create))
        .route(
            "/order/:id",
            get(orders::read).put(orders::update).delete(orders::destroy),
        )
        // Line items are nested under their parent order
        .route("/item-order", post(item_orders::create))
        .route("/item-order/:order", get(item_orders::list))
        .route(
            "/item-order/:order/:id",
            get(item_orders::read)
                .put(item_orders::update)
                .delete(item_orders::destroy),
        )
        .route_layer(from_fn_with_state(state, middleware::require_auth))
}
