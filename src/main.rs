use pizzeria_api::{app, config, database, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up PIZZERIA_DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::config();
    tracing::info!("starting Pizzeria API in {:?} mode", config.environment);

    let pool = database::pool::connect(&config.database.url, config.database.max_connections)
        .await
        .unwrap_or_else(|e| panic!("failed to open database {}: {}", config.database.url, e));

    database::pool::init_schema(&pool)
        .await
        .expect("schema initialization");

    database::seed::seed_users_from_env(&pool)
        .await
        .expect("user bootstrap");

    let state = AppState { pool };
    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("PIZZERIA_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🍕 Pizzeria API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
