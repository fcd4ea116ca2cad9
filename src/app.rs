use crate::config::Config;
use crate::service::{self, InvocationEvent, InvocationResponse};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Shared application state for imgconvert.
pub struct AppState {
    pub semaphore: Arc<Semaphore>,
    pub config: Config,
}

/// Library facade: hosts the converter handler without the bundled HTTP
/// server, for embedding in a function-as-a-service runtime.
#[derive(Clone)]
pub struct Imgconvert {
    state: Arc<AppState>,
}

#[derive(Debug, Error)]
pub enum InitError {
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Imgconvert {
    /// Create a new imgconvert instance from an explicit configuration.
    pub fn new(config: Config) -> Self {
        let state = Arc::new(AppState {
            semaphore: Arc::new(Semaphore::new(config.workers)),
            config,
        });
        Self { state }
    }

    /// Construct imgconvert using environment-derived configuration.
    pub fn from_env() -> Result<Self, InitError> {
        let config = Config::from_env().map_err(InitError::Configuration)?;
        Ok(Self::new(config))
    }

    /// Access the shared application state.
    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Access the effective configuration.
    pub fn config(&self) -> &Config {
        &self.state.config
    }

    /// Handle one invocation envelope.
    pub async fn handle(&self, event: InvocationEvent) -> InvocationResponse {
        service::handle(self.state.clone(), event).await
    }
}
