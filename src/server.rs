//! Process bootstrap: connect to the store, then serve.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::error::AppError;
use crate::routes::create_routes;
use crate::services::assets::AssetResolver;
use crate::services::upload::CloudinaryGateway;
use crate::services::videos::VideoStore;
use crate::state::AppState;

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidhub=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn connect(database_url: &str) -> Result<DatabaseConnection, AppError> {
    let mut opts = ConnectOptions::new(database_url.to_owned());
    opts.connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(opts)
        .await
        .map_err(|e| AppError::Connection(e.to_string()))
}

pub fn build_state(db: DatabaseConnection, config: &Config) -> AppState {
    let gateway = CloudinaryGateway::new(config.cloudinary.clone());
    let assets = AssetResolver::new(Arc::new(gateway), config.upload_timeout)
        .with_folder(config.cloudinary.folder.clone());

    AppState::new(VideoStore::new(db), assets, config.upload_dir.clone())
}

/// Connects, migrates, and serves until a shutdown signal arrives.
///
/// A store that cannot be reached is fatal: the listener is never bound.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let db = match connect(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!(error = %e, "Database connection failed");
            return Err(e.into());
        }
    };
    tracing::info!("Connected to database");

    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .context("failed to run migrations")?;
    }

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("failed to create {}", config.upload_dir.display()))?;

    let app = create_routes(build_state(db, &config));

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    tracing::info!("Server is running at {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for SIGTERM"),
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
