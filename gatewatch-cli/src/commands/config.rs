//! Configuration management CLI commands.
//!
//! Provides `config init`, `config path` and `config show` for creating and
//! inspecting the configuration file.

use std::path::PathBuf;

use clap::Subcommand;
use gatewatch::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the configuration file path
    Path,

    /// Show the effective configuration
    ///
    /// Values come from the file, then OPENSKY_CLIENT_ID and
    /// OPENSKY_CLIENT_SECRET from the environment. The secret is masked.
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config_path: Option<PathBuf>) -> Result<(), CliError> {
    let path = config_path.unwrap_or_else(config_file_path);
    match command {
        ConfigCommands::Init { force } => run_init(&path, force),
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigCommands::Show => run_show(&path),
    }
}

fn run_init(path: &std::path::Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        println!("Configuration already exists at {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    ConfigFile::default().save_to(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn run_show(path: &std::path::Path) -> Result<(), CliError> {
    let config = ConfigFile::load_from(path)?.with_env_overrides();

    println!("Configuration Settings");
    println!("======================");
    println!();
    for (section, entries) in summary(&config) {
        println!("[{}]", section);
        for (key, value) in entries {
            if value.is_empty() {
                println!("  {} = (not set)", key);
            } else {
                println!("  {} = {}", key, value);
            }
        }
        println!();
    }

    Ok(())
}

type Section = (&'static str, Vec<(String, String)>);

fn summary(config: &ConfigFile) -> Vec<Section> {
    let entry = |k: &str, v: String| (k.to_string(), v);
    let path = |p: Option<&std::path::Path>| p.map(|p| p.display().to_string()).unwrap_or_default();

    vec![
        (
            "opensky",
            vec![
                entry("api_url", config.opensky.api_url.clone()),
                entry("token_url", config.opensky.token_url.clone()),
                entry("client_id", config.opensky.client_id.clone().unwrap_or_default()),
                entry(
                    "client_secret",
                    config
                        .opensky
                        .client_secret
                        .as_ref()
                        .map(|_| "********".to_string())
                        .unwrap_or_default(),
                ),
                entry("timeout_secs", config.opensky.timeout_secs.to_string()),
            ],
        ),
        (
            "cache",
            vec![
                entry("ephemeral_ttl_ms", config.cache.ephemeral_ttl_ms.to_string()),
                entry("fresh_ttl_ms", config.cache.fresh_ttl_ms.to_string()),
                entry("cooldown_secs", config.cache.cooldown_secs.to_string()),
                entry("max_cooldown_secs", config.cache.max_cooldown_secs.to_string()),
                entry("store_timeout_secs", config.cache.store_timeout_secs.to_string()),
                entry("directory", path(config.cache.directory.as_deref())),
            ],
        ),
        (
            "fleet",
            vec![entry("prefixes", config.fleet.prefixes.join(","))],
        ),
        (
            "tracking",
            vec![
                entry("offline_after_secs", config.tracking.offline_after_secs.to_string()),
                entry("landed_max_kts", config.tracking.landed_max_kts.to_string()),
                entry("poll_interval_secs", config.tracking.poll_interval_secs.to_string()),
                entry("default_radius_nm", config.tracking.default_radius_nm.to_string()),
                entry("record_history", config.tracking.record_history.to_string()),
            ],
        ),
        (
            "layout",
            vec![entry("directory", path(Some(config.layout.directory.as_path())))],
        ),
        ("server", vec![entry("bind", config.server.bind.clone())]),
        (
            "bases",
            config
                .bases
                .iter()
                .map(|b| (b.code.clone(), b.to_entry()))
                .collect(),
        ),
        (
            "logging",
            vec![entry("file", path(Some(config.logging.file.as_path())))],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_masks_secret() {
        let mut config = ConfigFile::default();
        config.opensky.client_secret = Some("hunter2".to_string());

        let sections = summary(&config);
        let (_, opensky) = &sections[0];
        let secret = opensky.iter().find(|(k, _)| k == "client_secret").unwrap();
        assert_eq!(secret.1, "********");

        let (name, bases) = sections.iter().find(|(name, _)| *name == "bases").unwrap();
        assert_eq!(*name, "bases");
        assert_eq!(bases.len(), 5);
    }

    #[test]
    fn test_init_does_not_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[fleet]\nprefixes = EDV\n").unwrap();

        run_init(&path, false).unwrap();
        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded.fleet.prefixes, vec!["EDV"]);

        run_init(&path, true).unwrap();
        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded.fleet.prefixes, vec!["JIA"]);
    }
}
