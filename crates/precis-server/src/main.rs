use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use precis_client::{OpenAiSummarizer, ReqwestFetcher};
use precis_core::{IngestService, Limited};
use precis_db::{Database, DatabaseConfig};
use precis_server::config::ServerConfig;
use precis_server::routes;
use precis_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("precis=info".parse()?))
        .with_target(false)
        .init();

    // Fail fast on missing credentials or storage settings.
    let config = ServerConfig::parse();
    config.validate()?;
    let db_config = DatabaseConfig::from_env()?;

    let db = Database::connect(&db_config).await?;
    db.migrate().await?;

    let fetcher = ReqwestFetcher::with_timeout(config.fetch_timeout())?;
    let fetcher = if config.allow_private_urls {
        tracing::warn!("SSRF protection disabled: private URLs may be fetched");
        fetcher.allow_private_urls()
    } else {
        fetcher
    };
    let summarizer =
        OpenAiSummarizer::with_base_url(&config.api_key, &config.model, &config.base_url)?
            .with_timeout(config.llm_timeout())?;

    let service = IngestService::new(
        db.url_repo(),
        Limited::new(fetcher, config.max_concurrent_fetches),
        Limited::new(summarizer, config.max_concurrent_summaries),
    )
    .with_content_policy(config.content_policy());

    let state = Arc::new(AppState::new(service).with_request_timeout(config.request_timeout()));
    let app = routes::app(state);

    let addr = config.socket_addr();
    tracing::info!(model = %config.model, "Starting server on {addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
