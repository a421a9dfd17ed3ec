pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub use error::{AppError, StoreError};
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::AuthService;
pub use db::{Gateway, Session, User, UserStore};

/// Application state shared by all request handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    /// Connects the Postgres gateway, applies migrations and wires the services.
    pub async fn new(config: Settings) -> Result<(Self, Gateway)> {
        let url = config.postgres.connection_url()?;
        let gateway = Gateway::connect(
            &url,
            config.postgres.max_connections,
            Duration::from_secs(config.postgres.acquire_timeout_secs),
        )
        .await?;
        info!("Connected to postgres at {}", config.postgres.host);

        gateway.migrate().await?;

        let state = Self::with_store(config, Arc::new(gateway.clone()));
        Ok((state, gateway))
    }

    /// Builds state over any store, e.g. an in-memory double in tests.
    pub fn with_store(config: Settings, store: Arc<dyn UserStore>) -> Self {
        Self {
            config: Arc::new(config),
            auth_service: Arc::new(AuthService::new(store)),
        }
    }
}
