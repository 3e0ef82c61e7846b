//! CLI runner for common setup and operations.
//!
//! Encapsulates configuration loading, logging initialization and
//! coordinator wiring to reduce duplication across command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use gatewatch::cache::CacheCoordinator;
use gatewatch::config::ConfigFile;
use gatewatch::layout::FileLayoutStore;
use gatewatch::logging::{init_logging, LoggingGuard};
use gatewatch::opensky::{ReqwestTransport, TelemetryClient};
use gatewatch::store::StoreBackend;
use gatewatch::time::{Clock, SystemClock};
use tracing::{info, warn};

use crate::error::CliError;

/// Coordinator type used by every command.
pub type Coordinator = CacheCoordinator<TelemetryClient<ReqwestTransport>, StoreBackend>;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// `config_path` overrides the default `~/.gatewatch/config.ini`.
    /// Console logging is enabled only for `serve` and only when stdout
    /// is a terminal, so piped JSON output stays clean.
    pub fn new(config_path: Option<&Path>, debug_mode: bool, console: bool) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        }
        .with_env_overrides();

        let stdout_enabled = console && std::io::stdout().is_terminal();

        let logging_guard = init_logging(&config.logging.file, stdout_enabled, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Mutable access for command-line overrides.
    pub fn config_mut(&mut self) -> &mut ConfigFile {
        &mut self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("gatewatch v{}", gatewatch::VERSION);
        info!(command, bases = self.config.bases.len(), "gatewatch CLI");
    }

    /// Build the cache coordinator from the loaded configuration.
    pub async fn create_coordinator(&self) -> Result<Arc<Coordinator>, CliError> {
        let opensky = self.config.opensky_config();
        if opensky.credentials.is_none() {
            warn!("No OpenSky credentials configured; live fetches will report upstream_auth_error");
        }

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let client = TelemetryClient::new(ReqwestTransport::new()?, opensky, Arc::clone(&clock));
        let store = StoreBackend::open(self.config.cache.directory.as_deref()).await?;
        info!(store = %store.describe(), "Durable store ready");

        Ok(Arc::new(CacheCoordinator::new(
            client,
            Arc::new(store),
            self.config.airport_registry(),
            self.config.cache_policy(),
            clock,
        )))
    }

    /// Layout store reading from the configured directory.
    pub fn layout_store(&self) -> FileLayoutStore {
        FileLayoutStore::new(self.config.layout.directory.clone())
    }
}
