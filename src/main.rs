use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinefeels_api::{
    config::Config,
    db::{create_pool, create_redis_client, Cache},
    routes::{create_router, AppState},
    services::{
        catalogue::PostgresCatalogue,
        history::{PostgresHistoryStore, RedisHistoryStore, TieredHistoryStore},
        RecommendationEngine,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinefeels_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        max_result_cap = config.max_result_cap,
        candidate_pool_size = config.candidate_pool_size,
        history_retention = config.history_retention,
        "Configuration loaded"
    );

    let db_pool = create_pool(&config.database_url).await?;
    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_handle) = Cache::new(redis_client.clone());

    let catalogue = PostgresCatalogue::new(db_pool.clone(), cache, config.movie_cache_ttl_secs);
    let history = TieredHistoryStore::new(
        Arc::new(PostgresHistoryStore::new(db_pool, config.history_retention)),
        Arc::new(RedisHistoryStore::new(
            redis_client,
            config.history_retention,
            config.history_cache_ttl_secs,
        )),
    );
    let engine = RecommendationEngine::new(Arc::new(catalogue), config.engine());

    let app = create_router(AppState::new(engine, Arc::new(history)));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_handle.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
