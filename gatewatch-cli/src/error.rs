//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use gatewatch::config::ConfigFileError;
use gatewatch::layout::LayoutError;
use gatewatch::opensky::TransportError;
use gatewatch::store::StoreError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to read or write the configuration file
    ConfigFile(ConfigFileError),
    /// Failed to open the durable store
    Store(StoreError),
    /// Failed to create the HTTP client
    Transport(TransportError),
    /// Base code not in the configured list
    UnknownBase(String),
    /// Failed to load an airport layout
    Layout(LayoutError),
    /// Failed to bind the HTTP listener
    Bind { addr: String, error: std::io::Error },
    /// HTTP server error
    Serve(std::io::Error),
    /// Failed to render output
    Output(serde_json::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::UnknownBase(_) => {
                eprintln!();
                eprintln!("Run 'gatewatch bases' to list configured bases.");
            }
            CliError::Layout(LayoutError::NotFound(base)) => {
                eprintln!();
                eprintln!(
                    "Place a layout file named {}.json in the [layout] directory.",
                    base
                );
            }
            CliError::Bind { .. } => {
                eprintln!();
                eprintln!("Common issues:");
                eprintln!("  1. Another process is already listening on that port");
                eprintln!("  2. Ports below 1024 need elevated privileges");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Store(e) => write!(f, "Failed to open store: {}", e),
            CliError::Transport(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::UnknownBase(base) => write!(f, "Unknown base '{}'", base),
            CliError::Layout(e) => write!(f, "{}", e),
            CliError::Bind { addr, error } => write!(f, "Failed to bind {}: {}", addr, error),
            CliError::Serve(e) => write!(f, "HTTP server error: {}", e),
            CliError::Output(e) => write!(f, "Failed to render output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Store(e) => Some(e),
            CliError::Transport(e) => Some(e),
            CliError::Layout(e) => Some(e),
            CliError::Bind { error, .. } => Some(error),
            CliError::Serve(e) => Some(e),
            CliError::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<TransportError> for CliError {
    fn from(e: TransportError) -> Self {
        CliError::Transport(e)
    }
}

impl From<LayoutError> for CliError {
    fn from(e: LayoutError) -> Self {
        CliError::Layout(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e)
    }
}

impl From<gatewatch::cache::CoordinatorError> for CliError {
    fn from(e: gatewatch::cache::CoordinatorError) -> Self {
        match e {
            gatewatch::cache::CoordinatorError::UnknownBase(base) => CliError::UnknownBase(base),
        }
    }
}
