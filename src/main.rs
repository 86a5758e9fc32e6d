use std::sync::Arc;

use paper_trader::api::routes::{app_router, AppState};
use paper_trader::config::AppConfig;
use paper_trader::engine::LedgerEngine;
use paper_trader::oracle::{PolygonOracle, PriceOracle};
use paper_trader::persistence::create_pool_and_migrate;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // A missing market-data credential (or database URL) is fatal here,
    // never a per-request error.
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    let pool = create_pool_and_migrate(&config.database_url)
        .await
        .expect("database connection failed");
    let oracle: Arc<dyn PriceOracle> = Arc::new(PolygonOracle::new(
        config.polygon_base_url.clone(),
        config.polygon_api_key.clone(),
    ));
    let engine = LedgerEngine::new(pool.clone(), Arc::clone(&oracle), config.delete_policy);

    let state = AppState {
        engine,
        pool,
        oracle,
        jwt_secret: config.jwt_secret.clone().into_bytes(),
    };

    let app = app_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("bind failed");
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await.expect("server error");
}
