// ABOUTME: Main application orchestration for the geoflow service
// ABOUTME: Wires the store, registry, dispatcher, and HTTP listener together

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use super::{Args, Config};
use crate::api::{router, ApiState};
use crate::engine::{Dispatcher, TaskRunner, WorkflowFactory};
use crate::jobs::JobRegistry;
use crate::parser::DefinitionLibrary;
use crate::store::{MemoryStore, Store};

pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Create application from command line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = Config::load(args.config.clone())?;
        config.apply_overrides(args);
        Ok(Self::new(config))
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self, verbose: bool) -> Result<()> {
        let log_level = if verbose {
            "debug"
        } else {
            &self.config.logging.level
        };

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        match self.config.logging.format.as_str() {
            "compact" => {
                tracing_subscriber::fmt()
                    .compact()
                    .with_env_filter(env_filter)
                    .with_target(false)
                    .init();
            }
            _ => {
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_target(false)
                    .init();
            }
        }

        debug!("Logging initialized with level: {}", log_level);
        Ok(())
    }

    /// Run the service: background dispatcher plus HTTP listener.
    pub async fn run(&self, args: &Args) -> Result<()> {
        self.init_logging(args.verbose)?;

        info!("Starting geoflow v{}", env!("CARGO_PKG_VERSION"));

        let library = Arc::new(DefinitionLibrary::load_dir(&self.config.workflows_dir)?);
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let registry = Arc::new(JobRegistry::new());
        let factory = Arc::new(WorkflowFactory::new(store.clone(), registry.clone()));
        let runner = Arc::new(TaskRunner::new(store.clone(), registry));

        let dispatcher = Dispatcher::new(store.clone(), runner, self.config.poll_interval);
        tokio::spawn(async move { dispatcher.run().await });

        let state = ApiState::new(store, factory, library);
        let app = router(state);

        let listener = tokio::net::TcpListener::bind(self.config.listen).await?;
        info!("Listening on {}", listener.local_addr()?);
        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_creation_with_defaults() {
        let app = App::new(Config::default());
        assert_eq!(app.config.listen.port(), 3000);
    }
}
