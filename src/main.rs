use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use portfoliohub_api::{
    cache::{KeyValueStore, MemoryStore, RedisStore},
    config::Config,
    db,
    routes::{create_router, AppState},
    services::{
        providers::PgRecommendationStore, recommendations::RecommendationService,
        similarity_log::SimilarityLogger,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    // Database
    let pool = db::create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    let store = Arc::new(PgRecommendationStore::new(pool));

    // Similarity log sink: Redis when configured, process-local otherwise
    let kv: Arc<dyn KeyValueStore> = match &config.redis_url {
        Some(url) => {
            tracing::info!("Similarity log backed by Redis");
            Arc::new(RedisStore::connect(url)?)
        }
        None => {
            tracing::info!("Similarity log backed by in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let (logger, writer_handle) = SimilarityLogger::new(kv);

    let recommendations = Arc::new(RecommendationService::new(store, Some(logger)));
    let app = create_router(AppState { recommendations });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Flush pending similarity log writes before exiting
    writer_handle.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }

    tracing::info!("Shutdown signal received");
}
