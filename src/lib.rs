pub mod api;
pub mod authorization; // RBAC: accounts, session, doctor links
pub mod chat; // LLM proxy
pub mod config;
pub mod dashboard;
pub mod db;
pub mod models;
pub mod patient_data;
pub mod simulation; // Risk calculator

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Startup failures.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("Storage error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error(transparent)]
    Chat(#[from] chat::ChatError),
    #[error(transparent)]
    Server(#[from] api::server::ServerError),
}

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the
/// default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Load settings, open storage, and serve until Ctrl-C.
pub async fn run() -> Result<(), AppError> {
    let settings = config::Settings::from_env()?;
    init_tracing();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let bucket = db::open_bucket(&settings)?;
    let repo = Arc::new(db::Repository::new(bucket));
    let chat = chat::build_provider(&settings)?;
    tracing::info!(
        storage = ?settings.storage,
        provider = chat.name(),
        "Services ready"
    );

    let static_dir = settings.static_dir.as_deref().filter(|dir| {
        let exists = dir.is_dir();
        if !exists {
            tracing::warn!(dir = %dir.display(), "Static directory not found; serving API only");
        }
        exists
    });

    let ctx = api::ApiContext::new(repo, chat);
    api::server::serve(ctx, settings.addr, static_dir).await?;
    Ok(())
}
