pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;

use axum::routing::{delete, get, post, put};
use axum::Router;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(pizza_routes())
        .merge(ingredient_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/auth/token/", post(auth::token_obtain))
        .route("/auth/token/refresh/", post(auth::token_refresh))
        .route("/auth/token/verify/", post(auth::token_verify))
        .route("/auth/obtain-token/", post(auth::obtain_token))
}

fn pizza_routes() -> Router<AppState> {
    use handlers::pizzas;

    Router::new()
        .route("/pizzas/", get(pizzas::list))
        .route("/pizzas/create/", post(pizzas::create))
        .route("/pizzas/:id/", get(pizzas::detail))
        .route("/pizzas/:id/update/", put(pizzas::update))
        .route(
            "/pizzas/:id/add_ingredient/:ingredient_id/",
            post(pizzas::add_ingredient),
        )
        .route(
            "/pizzas/:id/remove_ingredient/:ingredient_id/",
            delete(pizzas::remove_ingredient),
        )
}

fn ingredient_routes() -> Router<AppState> {
    use handlers::ingredients;

    Router::new()
        .route(
            "/ingredients/",
            get(ingredients::list).post(ingredients::create),
        )
        .route(
            "/ingredients/:id/",
            get(ingredients::retrieve)
                .put(ingredients::update)
                .delete(ingredients::delete),
        )
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Pizzeria API",
        "version": version,
        "endpoints": {
            "auth": "/auth/token/, /auth/token/refresh/, /auth/token/verify/ (public)",
            "pizzas": "/pizzas/ (public list/detail, admin writes)",
            "ingredients": "/ingredients/ (admin)",
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
