//! Fetch command - one aircraft lookup through the cache.

use std::path::PathBuf;

use gatewatch::aircraft::AircraftSnapshot;
use gatewatch::cache::AircraftResponse;

use super::resolve_radius;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the fetch command.
pub struct FetchArgs {
    pub config: Option<PathBuf>,
    pub debug: bool,
    pub base: String,
    pub radius_nm: Option<f64>,
    pub force: bool,
    pub json: bool,
}

/// Run the fetch command.
pub async fn run(args: FetchArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.config.as_deref(), args.debug, false)?;
    runner.log_startup("fetch");

    let radius = resolve_radius(args.radius_nm, runner.config().tracking.default_radius_nm)?;

    let coordinator = runner.create_coordinator().await?;
    let response = coordinator
        .get_aircraft(&args.base, radius, args.force)
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
    }

    Ok(())
}

fn print_response(response: &AircraftResponse) {
    println!(
        "{} within {} nm - {} ({}{})",
        response.airport,
        response.radius_nm,
        response.updated_at.format("%Y-%m-%d %H:%M:%SZ"),
        response.source,
        if response.stale { ", stale" } else { "" }
    );
    println!();

    if response.aircraft.is_empty() {
        println!("No fleet aircraft.");
        return;
    }

    println!(
        "{:<8} {:<9} {:>10} {:>11} {:>7} {:>5}  {}",
        "ICAO24", "CALLSIGN", "LAT", "LON", "GS KT", "TRK", "STATUS"
    );
    for aircraft in &response.aircraft {
        println!("{}", format_row(aircraft));
    }
}

fn format_row(aircraft: &AircraftSnapshot) -> String {
    format!(
        "{:<8} {:<9} {:>10.4} {:>11.4} {:>7} {:>5}  {}",
        aircraft.icao24,
        aircraft.callsign.as_deref().unwrap_or("-"),
        aircraft.lat,
        aircraft.lon,
        aircraft
            .ground_speed_kt
            .map(|v| format!("{:.0}", v))
            .unwrap_or_else(|| "-".to_string()),
        aircraft
            .track
            .map(|v| format!("{:.0}", v))
            .unwrap_or_else(|| "-".to_string()),
        aircraft.status,
    )
}
