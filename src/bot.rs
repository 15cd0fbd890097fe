//! Scripted player input for headless runs
//!
//! Walks toward the opponent and alternates punches and kicks once in
//! reach. It only sees snapshots and answers with the same commands a
//! keyboard would produce, one per input edge.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::game::physics::{PhysicsSystem, Vec2, FIGHTER_CONTACT_DISTANCE_X, FIGHTER_CONTACT_DISTANCE_Y};
use crate::game::{FighterState, GameState, MatchHandle, RoundState};
use crate::protocol::{ClientMsg, Command, MatchSnapshot, ServerMsg};

/// Input edges the bot is currently holding
#[derive(Debug, Default)]
pub struct ScriptedBot {
    held_x: Option<Command>,
    held_y: Option<Command>,
    swings: u64,
}

impl ScriptedBot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands to send in reaction to a snapshot
    pub fn react(&mut self, snapshot: &MatchSnapshot) -> Vec<Command> {
        let mut commands = Vec::new();

        if snapshot.game_state != GameState::Running || snapshot.round.state != RoundState::InProgress {
            self.release_all(&mut commands);
            return commands;
        }

        let me = Vec2::new(snapshot.player.x, snapshot.player.y);
        let them = Vec2::new(snapshot.opponent.x, snapshot.opponent.y);

        if PhysicsSystem::within_contact_distance(me, them) {
            self.release_all(&mut commands);
            if matches!(
                snapshot.player.render_state,
                FighterState::Idle | FighterState::Walk
            ) {
                self.swings += 1;
                commands.push(if self.swings % 2 == 0 {
                    Command::Kick
                } else {
                    Command::Punch
                });
            }
            return commands;
        }

        let want_x = if them.x > me.x + FIGHTER_CONTACT_DISTANCE_X {
            Some(Command::MoveRight)
        } else if them.x < me.x - FIGHTER_CONTACT_DISTANCE_X {
            Some(Command::MoveLeft)
        } else {
            None
        };
        let want_y = if them.y > me.y + FIGHTER_CONTACT_DISTANCE_Y {
            Some(Command::MoveUp)
        } else if them.y < me.y - FIGHTER_CONTACT_DISTANCE_Y {
            Some(Command::MoveDown)
        } else {
            None
        };

        hold(&mut self.held_x, want_x, &mut commands);
        hold(&mut self.held_y, want_y, &mut commands);
        commands
    }

    fn release_all(&mut self, commands: &mut Vec<Command>) {
        hold(&mut self.held_x, None, commands);
        hold(&mut self.held_y, None, commands);
    }

    /// Feed snapshots from a running match until it stops accepting input
    pub async fn run(mut self, handle: MatchHandle, mut rx: broadcast::Receiver<ServerMsg>) {
        loop {
            let snapshot = match rx.recv().await {
                Ok(ServerMsg::Snapshot(snapshot)) => snapshot,
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Bot lagging behind snapshots");
                    continue;
                }
                Err(RecvError::Closed) => return,
            };

            for command in self.react(&snapshot) {
                if handle.send(ClientMsg::Fighter { command }).await.is_err() {
                    return;
                }
            }
        }
    }
}

/// Move the held edge on one axis to `want`, releasing the old one first
fn hold(held: &mut Option<Command>, want: Option<Command>, commands: &mut Vec<Command>) {
    if *held == want {
        return;
    }
    if let Some(previous) = held.take() {
        commands.push(release(previous));
    }
    if let Some(next) = want {
        commands.push(next);
        *held = Some(next);
    }
}

fn release(command: Command) -> Command {
    match command {
        Command::MoveLeft => Command::StopMovingLeft,
        Command::MoveRight => Command::StopMovingRight,
        Command::MoveUp => Command::StopMovingUp,
        Command::MoveDown => Command::StopMovingDown,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::animation::SpriteSheetTimings;
    use crate::game::fighter::Tint;
    use crate::game::snapshot::SnapshotBuilder;
    use crate::game::{Fighter, MatchState};
    use crate::protocol::Difficulty;
    use uuid::Uuid;

    fn fighting() -> MatchState {
        let timings = SpriteSheetTimings::shared();
        let mut state = MatchState::new(
            Uuid::new_v4(),
            3,
            Difficulty::Easy,
            Fighter::new("P", Tint::WHITE, timings.clone()),
            Fighter::new("O", Tint::WHITE, timings),
        );
        state.skip_delay();
        state.tick(1.0 / 60.0);
        state
    }

    fn snapshot(state: &MatchState) -> MatchSnapshot {
        SnapshotBuilder::new(1).build(state)
    }

    #[test]
    fn idle_during_intro() {
        let timings = SpriteSheetTimings::shared();
        let state = MatchState::new(
            Uuid::new_v4(),
            3,
            Difficulty::Easy,
            Fighter::new("P", Tint::WHITE, timings.clone()),
            Fighter::new("O", Tint::WHITE, timings),
        );
        assert!(ScriptedBot::new().react(&snapshot(&state)).is_empty());
    }

    #[test]
    fn walks_toward_opponent_once() {
        let mut state = fighting();
        state.opponent.set_position(Vec2::new(50.0, 15.0));
        let mut bot = ScriptedBot::new();

        assert_eq!(bot.react(&snapshot(&state)), vec![Command::MoveRight]);
        // Already holding right: nothing new to press
        assert!(bot.react(&snapshot(&state)).is_empty());
    }

    #[test]
    fn releases_and_attacks_in_reach() {
        let mut state = fighting();
        state.opponent.set_position(Vec2::new(50.0, 15.0));
        let mut bot = ScriptedBot::new();
        bot.react(&snapshot(&state));

        state.opponent.set_position(Vec2::new(20.0, 15.0));
        let commands = bot.react(&snapshot(&state));
        assert_eq!(commands, vec![Command::StopMovingRight, Command::Punch]);

        let commands = bot.react(&snapshot(&state));
        assert_eq!(commands, vec![Command::Kick]);
    }
}
