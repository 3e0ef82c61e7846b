//! Application configuration.
//!
//! Settings are read from `~/.gatewatch/config.ini`. Missing keys fall back
//! to built-in defaults and OpenSky credentials may be supplied through the
//! environment instead of the file.
//!
//! # Example
//!
//! ```ignore
//! use gatewatch::config::ConfigFile;
//!
//! let config = ConfigFile::load()?.with_env_overrides();
//! let policy = config.cache_policy();
//! let bases = config.airport_registry();
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::{
    DEFAULT_LOG_FILE_NAME, DEFAULT_SERVER_BIND, ENV_CLIENT_ID, ENV_CLIENT_SECRET,
};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    CacheSettings, ConfigFile, FleetSettings, LayoutSettings, LoggingSettings, OpenSkySettings,
    ServerSettings, TrackingSettings,
};
