//! gatewatch CLI - Command-line interface
//!
//! This binary provides a command-line interface to the gatewatch library.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::fetch::FetchArgs;
use commands::gates::GatesArgs;
use commands::serve::ServeArgs;

#[derive(Parser)]
#[command(name = "gatewatch")]
#[command(version = gatewatch::VERSION)]
#[command(about = "Ramp tracking for airline fleet aircraft at airport bases", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.gatewatch/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug-level logging for gatewatch targets
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API with a background poller per base
    Serve {
        /// Listen address, overrides [server] bind
        #[arg(long)]
        bind: Option<String>,

        /// Do not poll in the background; fetch only on client requests
        #[arg(long)]
        no_poll: bool,

        /// Record latest state and track points for every live result
        #[arg(long)]
        record_history: bool,
    },

    /// Look up fleet aircraft near a base once
    Fetch {
        /// Base code (e.g. SAV)
        base: String,

        /// Search radius in nautical miles
        #[arg(long)]
        radius: Option<f64>,

        /// Skip cache reads and cooldown
        #[arg(long)]
        force: bool,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show gate occupancy at a base
    Gates {
        /// Base code (e.g. SAV)
        base: String,

        /// Search radius in nautical miles
        #[arg(long)]
        radius: Option<f64>,
    },

    /// List configured bases
    Bases,

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            bind,
            no_poll,
            record_history,
        } => {
            commands::serve::run(ServeArgs {
                config: cli.config,
                debug: cli.debug,
                bind,
                no_poll,
                record_history,
            })
            .await
        }
        Commands::Fetch {
            base,
            radius,
            force,
            json,
        } => {
            commands::fetch::run(FetchArgs {
                config: cli.config,
                debug: cli.debug,
                base,
                radius_nm: radius,
                force,
                json,
            })
            .await
        }
        Commands::Gates { base, radius } => {
            commands::gates::run(GatesArgs {
                config: cli.config,
                debug: cli.debug,
                base,
                radius_nm: radius,
            })
            .await
        }
        Commands::Bases => commands::bases::run(cli.config),
        Commands::Config(command) => commands::config::run(command, cli.config),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::try_parse_from([
            "gatewatch", "--debug", "fetch", "SAV", "--radius", "500", "--force",
        ])
        .unwrap();

        assert!(cli.debug);
        match cli.command {
            Commands::Fetch {
                base,
                radius,
                force,
                json,
            } => {
                assert_eq!(base, "SAV");
                assert_eq!(radius, Some(500.0));
                assert!(force);
                assert!(!json);
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from([
            "gatewatch",
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--no-poll",
            "--config",
            "/tmp/gw.ini",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/gw.ini")));
        assert!(matches!(
            cli.command,
            Commands::Serve { no_poll: true, record_history: false, .. }
        ));
    }
}
