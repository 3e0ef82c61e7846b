//! Gates command - gate occupancy at one base.

use std::path::PathBuf;

use gatewatch::layout::{build_gate_board, GateBoard, LayoutStore};

use super::resolve_radius;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the gates command.
pub struct GatesArgs {
    pub config: Option<PathBuf>,
    pub debug: bool,
    pub base: String,
    pub radius_nm: Option<f64>,
}

/// Run the gates command.
pub async fn run(args: GatesArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.config.as_deref(), args.debug, false)?;
    runner.log_startup("gates");

    let radius = resolve_radius(args.radius_nm, runner.config().tracking.default_radius_nm)?;

    let coordinator = runner.create_coordinator().await?;
    let response = coordinator.get_aircraft(&args.base, radius, false).await?;
    let layout = runner.layout_store().load(&response.airport).await?;

    let board = build_gate_board(&response.aircraft, &layout);

    println!(
        "{} gates - {} ({}{})",
        response.airport,
        response.updated_at.format("%Y-%m-%d %H:%M:%SZ"),
        response.source,
        if response.stale { ", stale" } else { "" }
    );
    println!();
    for line in board_lines(&board) {
        println!("{}", line);
    }

    Ok(())
}

fn board_lines(board: &GateBoard) -> Vec<String> {
    let mut lines: Vec<String> = board
        .gates
        .iter()
        .map(|gate| match &gate.aircraft {
            Some(aircraft) => format!(
                "  {:<6} {} ({})",
                gate.gate_id,
                aircraft.callsign.as_deref().unwrap_or("-"),
                aircraft.icao24
            ),
            None => format!("  {:<6} free", gate.gate_id),
        })
        .collect();

    if !board.taxi.is_empty() {
        lines.push(String::new());
        lines.push("Taxiing:".to_string());
        lines.extend(board.taxi.iter().map(|t| {
            format!(
                "  {} near {} ({:.0} m)",
                t.callsign.as_deref().unwrap_or(&t.icao24),
                t.node_id,
                t.distance_m
            )
        }));
    }

    lines
}
