//! Snapshot building for renderers and HUDs

use crate::protocol::{FighterSnapshot, MatchSnapshot, RoundSnapshot, Side};

use super::fighter::Fighter;
use super::r#match::MatchState;

/// Builds render snapshots at a fixed tick cadence
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (used for phase changes)
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }

    /// Build a snapshot of the whole match
    pub fn build(&self, state: &MatchState) -> MatchSnapshot {
        MatchSnapshot {
            tick: state.tick,
            game_state: state.game_state,
            difficulty: state.difficulty,
            round: RoundSnapshot {
                current_round: state.current_round,
                state: state.round_state,
                state_time: state.round_state_time,
                timer: state.round_timer,
                critical: state.is_round_time_critical(),
                rounds_won: state.rounds_won,
                rounds_lost: state.rounds_lost,
                banner: state.banner(),
            },
            player: fighter_snapshot(Side::Player, &state.player),
            opponent: fighter_snapshot(Side::Opponent, &state.opponent),
        }
    }
}

/// Fighter as the renderer should draw it: the last live frame, not the
/// live state, so a paused match keeps showing what was on screen.
fn fighter_snapshot(side: Side, fighter: &Fighter) -> FighterSnapshot {
    let render = fighter.render_frame();
    let position = fighter.position();
    FighterSnapshot {
        side,
        name: fighter.name().to_string(),
        x: position.x,
        y: position.y,
        facing: fighter.facing(),
        life: fighter.life(),
        render_state: render.state,
        render_state_time: render.state_time,
        key_frame: fighter
            .animations()
            .key_frame(render.state, render.state_time),
    }
}
