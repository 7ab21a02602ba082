use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use villa_moraira::cms::SanityClient;
use villa_moraira::config::Config;
use villa_moraira::server::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("villa_moraira=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting Villa Moraira URL service");

    let config = Config::from_env()?;
    info!(
        "Using Sanity project {} (dataset: {}, api: v{})",
        config.sanity_project_id, config.sanity_dataset, config.sanity_api_version
    );
    if config.revalidate_secret.is_none() {
        info!("SANITY_REVALIDATE_SECRET not set, revalidation webhooks will be refused");
    }

    let store = Arc::new(SanityClient::new(&config));
    let port = config.port;
    let state = Arc::new(AppState::new(config, store)?);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}
