use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use phonebook_api::config::AppConfig;
use phonebook_api::database::{self, MemoryStore, PgStore, Store};
use phonebook_api::{app, AppState};

#[derive(Parser)]
#[command(name = "phonebook-api")]
#[command(about = "Phonebook backend - accounts and per-user contact lists")]
#[command(version)]
struct Cli {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Address to bind (overrides HOST)")]
    host: Option<String>,

    #[arg(long, help = "Keep all data in process memory instead of PostgreSQL")]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("phonebook_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    config
        .validate(!cli.memory)
        .context("invalid configuration")?;

    tracing::info!("Starting Phonebook API in {:?} mode", config.environment);

    if cli.memory {
        tracing::warn!("Using in-memory store; data is lost on exit");
        serve(config, Arc::new(MemoryStore::new())).await
    } else {
        let pool = database::manager::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        let store = PgStore::new(pool);
        store
            .ensure_schema()
            .await
            .context("failed to prepare database schema")?;
        serve(config, Arc::new(store)).await
    }
}

async fn serve<S>(config: AppConfig, store: Arc<S>) -> anyhow::Result<()>
where
    S: Store + 'static,
{
    let bind_addr = config.bind_addr();
    let state = AppState::new(config, store.clone()).context("failed to initialize auth service")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Phonebook API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
