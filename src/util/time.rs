//! Time utilities for the frame-driven simulation

use std::time::Instant;

/// Tick rate configuration
pub const SIMULATION_TPS: u32 = 60; // one tick per rendered frame
pub const SNAPSHOT_TPS: u32 = 20; // 20 snapshots per second
pub const TICK_DURATION_MICROS: u64 = 1_000_000 / SIMULATION_TPS as u64;

/// Calculate delta time for one simulation tick (in seconds)
pub fn tick_delta() -> f32 {
    1.0 / SIMULATION_TPS as f32
}

/// Wall-clock length of one tick once the runner's time scale is applied.
///
/// Scales at or below zero fall back to real time.
pub fn scaled_tick_micros(time_scale: f32) -> u64 {
    if time_scale <= 0.0 {
        return TICK_DURATION_MICROS;
    }
    ((TICK_DURATION_MICROS as f64 / time_scale as f64) as u64).max(1)
}

/// A simple timer for measuring durations
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
