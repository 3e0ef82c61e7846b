//! Bases command - list configured airport bases.

use std::path::PathBuf;

use gatewatch::config::ConfigFile;

use crate::error::CliError;

/// Run the bases command.
pub fn run(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let config = match config_path {
        Some(path) => ConfigFile::load_from(&path)?,
        None => ConfigFile::load()?,
    };

    println!("{:<5} {:<5} {:>10} {:>11}", "CODE", "ICAO", "LAT", "LON");
    for base in config.airport_registry().iter() {
        println!(
            "{:<5} {:<5} {:>10.4} {:>11.4}",
            base.code, base.icao_code, base.lat, base.lon
        );
    }

    Ok(())
}
