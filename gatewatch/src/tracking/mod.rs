//! Per-base tracking driven by the poll stream.
//!
//! - [`TrailTracker`] - bounded position trails for moving aircraft
//! - [`BasePoller`] - background poll loop feeding trails and history

mod poller;
mod trail;

pub use poller::{BasePoller, PollerConfig, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_RADIUS_NM};
pub use trail::{
    TrailPoint, TrailTracker, MAX_TRAIL_AGE, MAX_TRAIL_POINTS, MIN_MOVE_METERS, TRAIL_MIN_KTS,
};
