//! Application state wiring services to their infra implementations.
//!
//! AppState holds the concrete service instance used by both CLI commands
//! and REST handlers. The service is generic over the repository trait, but
//! AppState pins it to the SQLite implementation; the authenticator stays a
//! trait object so the credential scheme can be swapped without touching
//! callers.

use std::sync::Arc;

use despedida_core::auth::Authenticator;
use despedida_core::service::FarewellService;
use despedida_infra::auth::StaticTokenAuthenticator;
use despedida_infra::sqlite::farewell::SqliteFarewellRepository;
use despedida_infra::sqlite::pool::{DatabasePool, default_database_url, resolve_data_dir};

/// Concrete service type pinned to the SQLite repository.
pub type ConcreteFarewellService = FarewellService<SqliteFarewellRepository>;

/// Shared application state for CLI commands and REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub farewell_service: Arc<ConcreteFarewellService>,
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    /// Initialize from the environment: resolve the data directory, connect
    /// to the database, and read the admin secret.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let authenticator = Arc::new(StaticTokenAuthenticator::from_env()?);
        Self::init_with(&default_database_url(), authenticator).await
    }

    /// Wire services against an explicit database URL and authenticator.
    pub async fn init_with(
        database_url: &str,
        authenticator: Arc<dyn Authenticator>,
    ) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(database_url).await?;
        let farewell_service = FarewellService::new(SqliteFarewellRepository::new(db_pool));

        Ok(Self {
            farewell_service: Arc::new(farewell_service),
            authenticator,
        })
    }
}
