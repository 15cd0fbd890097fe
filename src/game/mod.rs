//! Game simulation modules

pub mod ai;
pub mod animation;
pub mod combat;
pub mod fighter;
pub mod r#match;
pub mod physics;
pub mod roster;
pub mod snapshot;

pub use animation::{AnimationLibrary, SpriteSheetTimings};
pub use fighter::{Fighter, FighterState};
pub use r#match::{GameMatch, GameState, MatchHandle, MatchState, MatchSummary, RoundState};
pub use roster::{FighterChoice, Roster, RosterError};
