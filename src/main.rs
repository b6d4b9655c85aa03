use std::sync::Arc;

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rental_pricing::cache::{CachedPricingRepository, RateCache};
use rental_pricing::config::Config;
use rental_pricing::pricing::{self, PgPricingRepository, PricingService};
use rental_pricing::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rental_pricing=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    info!("Connected to database");

    let cache = RateCache::new(config.rate_cache_capacity, config.rate_cache_ttl);
    let repo = CachedPricingRepository::new(PgPricingRepository::new(pool), cache.clone());
    let state = AppState {
        pricing: PricingService::new(Arc::new(repo)),
        cache,
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api/pricing", pricing::router())
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
