//! Ring Fighter - simulation core for a two-fighter boxing ring game
//!
//! - `game`: fighter state machine, ring bounds, contact resolution,
//!   opponent AI and the round/match state machine with its tick loop
//! - `protocol`: commands in and events/snapshots out
//! - `config`: environment configuration for the headless runner
//! - `bot`: scripted player input for headless runs

pub mod bot;
pub mod config;
pub mod game;
pub mod protocol;
pub mod util;
