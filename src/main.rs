use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reel_rec::{
    config::Config,
    routes::{create_router, AppState},
    services::{http::RetryingClient, providers::tmdb::TmdbProvider, RecommendationEngine},
    store::load_catalog,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reel_rec=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Both are fatal: never serve with a missing catalog or credential
    let store = Arc::new(load_catalog(&config.catalog_path, &config.similarity_path)?);
    let api_key = config.resolve_api_key()?;

    let http_client = RetryingClient::new(config.request_timeout(), config.retry_policy()?)?;
    let provider = TmdbProvider::new(
        http_client,
        Some(api_key),
        config.tmdb_api_url.clone(),
        config.tmdb_image_url.clone(),
    );

    let engine = RecommendationEngine::new(store, Arc::new(provider))
        .with_limit(config.recommendation_count);
    let app = create_router(Arc::new(AppState::new(engine)));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
