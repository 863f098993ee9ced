//! Lantern gateway binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use lantern_core::config::AppConfig;
use lantern_server::{create_router, spawn_sweeper, AppState};
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Lantern - Ghost Admin API compatibility gateway
#[derive(Parser, Debug)]
#[command(name = "lanternd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "LANTERN_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Lantern v{}", env!("CARGO_PKG_VERSION"));

    // Config file is optional; env vars can provide or override everything.
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    let has_config_file = config_path.exists();

    if has_config_file {
        tracing::info!(config_path = %args.config, "loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("no config file found at {}", args.config);
    }

    let has_env_config =
        std::env::vars().any(|(key, _)| key.starts_with("LANTERN_") && key != "LANTERN_CONFIG");

    if !has_config_file && !has_env_config {
        anyhow::bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: lanternd --config /path/to/config.toml\n  \
             2. Environment variables: LANTERN_SERVER__BIND=0.0.0.0:8080 \
             LANTERN_ADMIN__TOKEN_HASH=YOUR_TOKEN_SHA256 lanternd\n\n\
             Set LANTERN_CONFIG to specify a default config file path."
        );
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("LANTERN_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    let storage = lantern_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;
    storage
        .health_check()
        .await
        .context("storage health check failed")?;
    tracing::info!(backend = storage.backend_name(), "storage backend ready");

    let metadata = lantern_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;
    tracing::info!("metadata store ready");

    let state = AppState::new(config.clone(), storage, metadata);

    // Abandoned chunk sessions otherwise pin memory until restart.
    let _sweeper = spawn_sweeper(
        state.chunks.clone(),
        config.server.chunk_idle_timeout(),
        Duration::from_secs(config.server.chunk_sweep_interval_secs),
    );
    tracing::info!(
        idle_timeout_secs = config.server.chunk_idle_timeout_secs,
        "chunk session sweeper spawned"
    );

    let app = create_router(state);

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
