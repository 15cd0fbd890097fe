//! Match state and authoritative tick loop

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tracing::{debug, info};
use uuid::Uuid;

use crate::protocol::{ClientMsg, Command, Difficulty, FighterInfo, GameEvent, RoundBanner, ServerMsg, Side};
use crate::util::time::{scaled_tick_micros, tick_delta, Timer, SIMULATION_TPS, SNAPSHOT_TPS};

use super::ai::OpponentAi;
use super::combat::CombatSystem;
use super::fighter::Fighter;
use super::physics::{PhysicsSystem, RingBounds};
use super::snapshot::SnapshotBuilder;

/// Round intro length (seconds); the banner switches to "FIGHT!" halfway
pub const START_ROUND_DELAY: f32 = 2.0;

/// Pause after a round is decided (seconds)
pub const END_ROUND_DELAY: f32 = 2.0;

/// Best of three
pub const MAX_ROUNDS: u32 = 3;

/// Round clock (seconds)
pub const MAX_ROUND_TIME: f32 = 99.99;

/// Round clock turns critical below this (seconds)
pub const CRITICAL_ROUND_TIME: f32 = 10.0;

pub const PLAYER_START_POSITION_X: f32 = 16.0;
pub const OPPONENT_START_POSITION_X: f32 = 51.0;
pub const FIGHTER_START_POSITION_Y: f32 = 15.0;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Running,
    Paused,
    GameOver,
}

/// Round phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    /// Intro banner, fighters frozen in place
    Starting,
    /// Fighting, clock running
    InProgress,
    /// Round decided, outcome pause
    Ending,
}

/// Match state (owned by match task)
pub struct MatchState {
    pub id: Uuid,
    pub seed: u64,
    pub tick: u64,

    pub game_state: GameState,
    pub round_state: RoundState,
    pub round_state_time: f32,
    pub round_timer: f32,
    pub current_round: u32,
    pub rounds_won: u32,
    pub rounds_lost: u32,

    pub difficulty: Difficulty,
    pub player: Fighter,
    pub opponent: Fighter,
    pub ai: OpponentAi,
    pub ring: RingBounds,

    events: Vec<GameEvent>,
}

impl MatchState {
    /// Set up a match and start its first round
    pub fn new(id: Uuid, seed: u64, difficulty: Difficulty, player: Fighter, opponent: Fighter) -> Self {
        let mut state = Self {
            id,
            seed,
            tick: 0,
            game_state: GameState::Running,
            round_state: RoundState::Starting,
            round_state_time: 0.0,
            round_timer: MAX_ROUND_TIME,
            current_round: 1,
            rounds_won: 0,
            rounds_lost: 0,
            difficulty,
            player,
            opponent,
            ai: OpponentAi::seeded(seed, difficulty),
            ring: RingBounds::STANDARD,
            events: Vec::new(),
        };
        state.start_game();
        state
    }

    /// Reset scores and start again from round one
    pub fn start_game(&mut self) {
        self.game_state = GameState::Running;
        self.rounds_won = 0;
        self.rounds_lost = 0;
        self.current_round = 1;
        self.start_round();
    }

    /// Start over from any state
    pub fn restart(&mut self) {
        info!(match_id = %self.id, "Match restarted");
        self.start_game();
    }

    pub fn pause(&mut self) {
        if self.game_state == GameState::Running {
            self.game_state = GameState::Paused;
            self.events.push(GameEvent::Paused);
            info!(match_id = %self.id, tick = self.tick, "Match paused");
        }
    }

    pub fn resume(&mut self) {
        if self.game_state == GameState::Paused {
            self.game_state = GameState::Running;
            self.events.push(GameEvent::Resumed);
            info!(match_id = %self.id, tick = self.tick, "Match resumed");
        }
    }

    /// Cut the current round intro or outro short
    pub fn skip_delay(&mut self) {
        if self.game_state != GameState::Running {
            return;
        }
        match self.round_state {
            RoundState::Starting => self.round_state_time = START_ROUND_DELAY,
            RoundState::Ending => self.round_state_time = END_ROUND_DELAY,
            RoundState::InProgress => {}
        }
    }

    /// Easy -> Medium -> Hard -> Easy, effective immediately
    pub fn cycle_difficulty(&mut self) {
        self.set_difficulty(self.difficulty.next());
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.ai.set_difficulty(difficulty);
        self.events.push(GameEvent::DifficultyChanged { difficulty });
        info!(match_id = %self.id, %difficulty, "Difficulty changed");
    }

    /// Put both fighters on their marks and run the intro
    pub fn start_round(&mut self) {
        self.player
            .get_ready(PLAYER_START_POSITION_X, FIGHTER_START_POSITION_Y);
        self.opponent
            .get_ready(OPPONENT_START_POSITION_X, FIGHTER_START_POSITION_Y);
        self.ai.reset();

        self.round_state = RoundState::Starting;
        self.round_state_time = 0.0;
        self.round_timer = MAX_ROUND_TIME;

        self.events.push(GameEvent::RoundStarting {
            round: self.current_round,
        });
        info!(match_id = %self.id, round = self.current_round, "Round starting");
    }

    pub fn end_round(&mut self) {
        self.round_state = RoundState::Ending;
        self.round_state_time = 0.0;
    }

    /// Player takes the current round
    pub fn win_round(&mut self, timed_out: bool) {
        self.player.win();
        self.opponent.lose();
        self.rounds_won += 1;
        self.events.push(GameEvent::RoundWon {
            round: self.current_round,
            timed_out,
        });
        info!(
            match_id = %self.id,
            round = self.current_round,
            timed_out,
            rounds_won = self.rounds_won,
            rounds_lost = self.rounds_lost,
            "Round won by player"
        );
        self.end_round();
    }

    /// Opponent takes the current round
    pub fn lose_round(&mut self, timed_out: bool) {
        self.player.lose();
        self.opponent.win();
        self.rounds_lost += 1;
        self.events.push(GameEvent::RoundLost {
            round: self.current_round,
            timed_out,
        });
        info!(
            match_id = %self.id,
            round = self.current_round,
            timed_out,
            rounds_won = self.rounds_won,
            rounds_lost = self.rounds_lost,
            "Round lost by player"
        );
        self.end_round();
    }

    /// Advance the whole simulation by one tick and return what happened
    pub fn tick(&mut self, delta: f32) -> Vec<GameEvent> {
        self.tick += 1;
        let running = self.game_state == GameState::Running;
        let delta = if running { delta } else { 0.0 };

        if self.game_state != GameState::GameOver {
            self.update_round_state(delta);
        }

        self.player.update(delta);
        self.opponent.update(delta);

        PhysicsSystem::face_each_other(&mut self.player, &mut self.opponent);
        PhysicsSystem::keep_within_ring(&mut self.player, &self.ring);
        PhysicsSystem::keep_within_ring(&mut self.opponent, &self.ring);

        if running && self.round_state == RoundState::InProgress {
            self.round_timer = (self.round_timer - delta).max(0.0);

            if self.round_timer <= 0.0 {
                // Not less life wins; a tie goes to the player
                if self.player.life() >= self.opponent.life() {
                    self.win_round(true);
                } else {
                    self.lose_round(true);
                }
            } else {
                self.perform_opponent_ai(delta);
                self.resolve_contact();
            }
        }

        self.drain_events()
    }

    fn update_round_state(&mut self, delta: f32) {
        match self.round_state {
            RoundState::Starting if self.round_state_time >= START_ROUND_DELAY => {
                self.round_state = RoundState::InProgress;
                self.round_state_time = 0.0;
                self.events.push(GameEvent::Fight {
                    round: self.current_round,
                });
                debug!(match_id = %self.id, round = self.current_round, "Fight");
            }
            RoundState::Ending if self.round_state_time >= END_ROUND_DELAY => {
                if self.rounds_won > MAX_ROUNDS / 2 || self.rounds_lost > MAX_ROUNDS / 2 {
                    self.game_over();
                } else {
                    self.current_round += 1;
                    self.start_round();
                }
            }
            _ => self.round_state_time += delta,
        }
    }

    fn game_over(&mut self) {
        self.game_state = GameState::GameOver;
        let winner = self.leader();
        self.events.push(GameEvent::GameOver {
            winner,
            rounds_won: self.rounds_won,
            rounds_lost: self.rounds_lost,
        });
        info!(
            match_id = %self.id,
            %winner,
            rounds_won = self.rounds_won,
            rounds_lost = self.rounds_lost,
            "Game over"
        );
    }

    fn perform_opponent_ai(&mut self, delta: f32) {
        let commands = self.ai.perform(delta, &self.player, &self.opponent);
        for command in commands {
            self.opponent.apply(command);
        }
    }

    /// Land at most one active attack, ending the round on a knockout
    pub fn resolve_contact(&mut self) {
        let Some(hit) = CombatSystem::resolve_contact(&mut self.player, &mut self.opponent) else {
            return;
        };

        self.events.extend(hit.events());

        if hit.defender_knocked_out {
            info!(
                match_id = %self.id,
                round = self.current_round,
                winner = %hit.attacker,
                "Knockout"
            );
            match hit.attacker {
                Side::Player => self.win_round(false),
                Side::Opponent => self.lose_round(false),
            }
        }
    }

    /// Forward a command from the input source to the player.
    ///
    /// Starting to move is only allowed while the round is in progress;
    /// every other command is left to the fighter's own guards.
    pub fn handle_player_command(&mut self, command: Command) {
        if command.starts_movement() && self.round_state != RoundState::InProgress {
            debug!(match_id = %self.id, ?command, "Movement ignored outside of a round");
            return;
        }
        self.player.apply(command);
    }

    /// Events raised since the last tick
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Text to show over the ring, if any
    pub fn banner(&self) -> Option<RoundBanner> {
        if self.round_state != RoundState::Starting {
            return None;
        }
        if self.round_state_time < START_ROUND_DELAY * 0.5 {
            Some(RoundBanner::Round {
                number: self.current_round,
            })
        } else {
            Some(RoundBanner::Fight)
        }
    }

    pub fn is_round_time_critical(&self) -> bool {
        self.round_timer < CRITICAL_ROUND_TIME
    }

    /// Winner of a finished match
    pub fn winner(&self) -> Option<Side> {
        (self.game_state == GameState::GameOver).then(|| self.leader())
    }

    fn leader(&self) -> Side {
        if self.rounds_won > self.rounds_lost {
            Side::Player
        } else {
            Side::Opponent
        }
    }

    pub fn fighter_info(&self, side: Side) -> FighterInfo {
        let fighter = match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        };
        FighterInfo {
            name: fighter.name().to_string(),
            tint: fighter.tint(),
        }
    }
}

/// Handle to a running match
#[derive(Clone)]
pub struct MatchHandle {
    pub id: Uuid,
    pub input_tx: mpsc::Sender<ClientMsg>,
    pub output_tx: broadcast::Sender<ServerMsg>,
}

impl MatchHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMsg> {
        self.output_tx.subscribe()
    }

    pub async fn send(&self, msg: ClientMsg) -> Result<(), mpsc::error::SendError<ClientMsg>> {
        self.input_tx.send(msg).await
    }
}

/// How a match run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSummary {
    pub match_id: Uuid,
    pub winner: Option<Side>,
    pub rounds_won: u32,
    pub rounds_lost: u32,
    pub ticks: u64,
}

/// The authoritative game match
pub struct GameMatch {
    state: MatchState,
    input_rx: mpsc::Receiver<ClientMsg>,
    output_tx: broadcast::Sender<ServerMsg>,
    snapshot_builder: SnapshotBuilder,
    tick_period: Duration,
    end_announced: bool,
}

impl GameMatch {
    /// Wrap a match state in a runner ticking at `time_scale` times real time
    pub fn new(state: MatchState, time_scale: f32) -> (Self, MatchHandle) {
        let (input_tx, input_rx) = mpsc::channel(256);
        let (output_tx, _) = broadcast::channel(256);

        let handle = MatchHandle {
            id: state.id,
            input_tx,
            output_tx: output_tx.clone(),
        };

        let snapshot_interval = SIMULATION_TPS / SNAPSHOT_TPS;
        let game_match = Self {
            state,
            input_rx,
            output_tx,
            snapshot_builder: SnapshotBuilder::new(snapshot_interval),
            tick_period: Duration::from_micros(scaled_tick_micros(time_scale)),
            end_announced: false,
        };

        (game_match, handle)
    }

    /// Run the tick loop until every input sender is gone
    pub async fn run(mut self) -> MatchSummary {
        info!(
            match_id = %self.state.id,
            seed = self.state.seed,
            difficulty = %self.state.difficulty,
            player = self.state.player.name(),
            opponent = self.state.opponent.name(),
            "Match started"
        );

        let _ = self.output_tx.send(ServerMsg::MatchStarted {
            match_id: self.state.id,
            seed: self.state.seed,
            difficulty: self.state.difficulty,
            player: self.state.fighter_info(Side::Player),
            opponent: self.state.fighter_info(Side::Opponent),
        });

        let timer = Timer::new();
        let mut tick_interval = interval(self.tick_period);
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            // Drain input queue
            if !self.process_inputs() {
                info!(match_id = %self.state.id, "Input source disconnected, stopping match");
                break;
            }

            let events = self.state.tick(tick_delta());
            self.broadcast_events(events);

            if self.snapshot_builder.should_send() {
                let snapshot = self.snapshot_builder.build(&self.state);
                let _ = self.output_tx.send(ServerMsg::Snapshot(snapshot));
            }

            if self.state.game_state == GameState::GameOver && !self.end_announced {
                self.announce_end(timer.elapsed_ms());
            } else if self.state.game_state != GameState::GameOver {
                self.end_announced = false;
            }
        }

        MatchSummary {
            match_id: self.state.id,
            winner: self.state.winner(),
            rounds_won: self.state.rounds_won,
            rounds_lost: self.state.rounds_lost,
            ticks: self.state.tick,
        }
    }

    /// Apply every pending message; false once the input side has hung up
    fn process_inputs(&mut self) -> bool {
        loop {
            match self.input_rx.try_recv() {
                Ok(msg) => self.handle_msg(msg),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn handle_msg(&mut self, msg: ClientMsg) {
        match msg {
            ClientMsg::Fighter { command } => self.state.handle_player_command(command),
            ClientMsg::Pause => self.state.pause(),
            ClientMsg::Resume => self.state.resume(),
            ClientMsg::SkipDelay => self.state.skip_delay(),
            ClientMsg::Restart => self.state.restart(),
            ClientMsg::CycleDifficulty => self.state.cycle_difficulty(),
        }
    }

    fn broadcast_events(&mut self, events: Vec<GameEvent>) {
        for event in events {
            if !matches!(
                event,
                GameEvent::AttackContact { .. }
                    | GameEvent::HitLanded { .. }
                    | GameEvent::Blocked { .. }
            ) {
                // Phase changes should be visible right away
                self.snapshot_builder.force_next();
            }
            let _ = self.output_tx.send(ServerMsg::Event {
                tick: self.state.tick,
                event,
            });
        }
    }

    fn announce_end(&mut self, duration_ms: u64) {
        self.end_announced = true;
        let Some(winner) = self.state.winner() else {
            return;
        };

        info!(
            match_id = %self.state.id,
            %winner,
            duration_ms,
            ticks = self.state.tick,
            "Match ended"
        );

        let _ = self.output_tx.send(ServerMsg::MatchEnd {
            winner,
            rounds_won: self.state.rounds_won,
            rounds_lost: self.state.rounds_lost,
            duration_ms,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::animation::SpriteSheetTimings;
    use crate::game::fighter::{FighterState, Tint, MAX_LIFE};
    use crate::game::physics::Vec2;
    use tokio::sync::broadcast::error::RecvError;
    use tokio_test::assert_ok;

    const DT: f32 = 1.0 / 60.0;

    fn new_match() -> MatchState {
        let timings = SpriteSheetTimings::shared();
        MatchState::new(
            Uuid::new_v4(),
            42,
            Difficulty::Easy,
            Fighter::new("Player", Tint::WHITE, timings.clone()),
            Fighter::new("Opponent", Tint::WHITE, timings),
        )
    }

    fn in_progress() -> MatchState {
        let mut state = new_match();
        state.drain_events();
        state.skip_delay();
        let events = state.tick(DT);
        assert!(events.contains(&GameEvent::Fight { round: 1 }));
        assert_eq!(state.round_state, RoundState::InProgress);
        state
    }

    fn run_until_game_state(state: &mut MatchState, target: GameState, max_ticks: usize) -> Vec<GameEvent> {
        let mut seen = Vec::new();
        for _ in 0..max_ticks {
            seen.extend(state.tick(DT));
            if state.game_state == target {
                return seen;
            }
        }
        panic!("never reached {:?}", target);
    }

    #[test]
    fn new_match_starts_round_one() {
        let mut state = new_match();
        assert_eq!(state.game_state, GameState::Running);
        assert_eq!(state.round_state, RoundState::Starting);
        assert_eq!(state.current_round, 1);
        assert_eq!(state.round_timer, MAX_ROUND_TIME);
        assert_eq!(state.player.position(), Vec2::new(16.0, 15.0));
        assert_eq!(state.opponent.position(), Vec2::new(51.0, 15.0));
        assert_eq!(state.drain_events(), vec![GameEvent::RoundStarting { round: 1 }]);
    }

    #[test]
    fn intro_banner_then_fight() {
        let mut state = new_match();
        assert_eq!(state.banner(), Some(RoundBanner::Round { number: 1 }));

        for _ in 0..61 {
            state.tick(DT);
        }
        assert_eq!(state.banner(), Some(RoundBanner::Fight));

        let events = run_until_round_state(&mut state, RoundState::InProgress);
        assert!(events.contains(&GameEvent::Fight { round: 1 }));
        assert_eq!(state.banner(), None);
    }

    fn run_until_round_state(state: &mut MatchState, target: RoundState) -> Vec<GameEvent> {
        let mut seen = Vec::new();
        for _ in 0..300 {
            seen.extend(state.tick(DT));
            if state.round_state == target {
                return seen;
            }
        }
        panic!("never reached {:?}", target);
    }

    #[test]
    fn movement_gated_until_round_in_progress() {
        let mut state = new_match();
        state.handle_player_command(Command::MoveRight);
        assert_eq!(state.player.state(), FighterState::Idle);

        // Blocking is not a movement start and goes straight through
        state.handle_player_command(Command::Block);
        assert_eq!(state.player.state(), FighterState::Block);
        state.handle_player_command(Command::StopBlocking);

        let mut state = in_progress();
        state.handle_player_command(Command::MoveRight);
        assert_eq!(state.player.state(), FighterState::Walk);
        state.handle_player_command(Command::StopMovingRight);
        assert_eq!(state.player.state(), FighterState::Idle);
    }

    #[test]
    fn twenty_hits_win_the_round() {
        let mut state = in_progress();
        state.opponent.set_position(Vec2::new(21.0, 15.0));

        let mut won = false;
        for _ in 0..20 {
            state.player.punch();
            state.player.update(0.15);
            state.resolve_contact();
            won = state
                .drain_events()
                .contains(&GameEvent::RoundWon { round: 1, timed_out: false });
            state.player.update(0.2);
            state.opponent.update(0.2);
        }

        assert!(won);
        assert_eq!(state.opponent.life(), 0.0);
        assert!(state.opponent.has_lost());
        assert!(state.player.has_won());
        assert_eq!(state.rounds_won, 1);
        assert_eq!(state.round_state, RoundState::Ending);
    }

    #[test]
    fn opponent_knockout_loses_the_round() {
        let mut state = in_progress();
        state.set_difficulty(Difficulty::Hard);
        state.drain_events();

        let mut lost = false;
        for _ in 0..5000 {
            // Keep both fighters inside contact distance; the player never defends
            state.player.set_position(Vec2::new(30.0, 15.0));
            state.opponent.set_position(Vec2::new(33.0, 15.0));
            let events = state.tick(DT);
            if events.contains(&GameEvent::RoundLost { round: 1, timed_out: false }) {
                lost = true;
                break;
            }
        }

        assert!(lost);
        assert_eq!(state.rounds_lost, 1);
        assert_eq!(state.rounds_won, 0);
        assert_eq!(state.player.life(), 0.0);
        assert!(state.player.has_lost());
        assert!(state.opponent.has_won());
        assert_eq!(state.round_state, RoundState::Ending);
    }

    #[test]
    fn timeout_tie_goes_to_player() {
        let mut state = in_progress();
        state.round_timer = DT / 2.0;
        let events = state.tick(DT);
        assert!(events.contains(&GameEvent::RoundWon { round: 1, timed_out: true }));
        assert_eq!(state.round_timer, 0.0);
        assert_eq!(state.rounds_won, 1);
        assert_eq!(state.round_state, RoundState::Ending);
    }

    #[test]
    fn timeout_with_less_life_loses() {
        let mut state = in_progress();
        state.player.get_hit(5.0);
        assert!(state.player.life() < MAX_LIFE);
        state.round_timer = DT;
        let events = state.tick(DT);
        assert!(events.contains(&GameEvent::RoundLost { round: 1, timed_out: true }));
        assert_eq!(state.rounds_lost, 1);
        assert!(state.player.has_lost());
        assert!(state.opponent.has_won());
    }

    #[test]
    fn next_round_after_ending_delay() {
        let mut state = in_progress();
        state.lose_round(false);
        state.drain_events();

        let events = run_until_round_state(&mut state, RoundState::Starting);
        assert!(events.contains(&GameEvent::RoundStarting { round: 2 }));
        assert_eq!(state.current_round, 2);
        assert_eq!(state.game_state, GameState::Running);
        assert_eq!(state.player.life(), MAX_LIFE);
        assert_eq!(state.round_timer, MAX_ROUND_TIME);
    }

    #[test]
    fn second_round_win_ends_the_match() {
        let mut state = in_progress();
        state.win_round(false);
        run_until_round_state(&mut state, RoundState::Starting);
        state.skip_delay();
        run_until_round_state(&mut state, RoundState::InProgress);
        state.win_round(true);
        assert_eq!(state.rounds_won, 2);

        let events = run_until_game_state(&mut state, GameState::GameOver, 200);
        let game_overs = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
        assert_eq!(state.winner(), Some(Side::Player));
        assert_eq!(state.current_round, 2);

        // Frozen from here on
        for _ in 0..200 {
            assert!(state.tick(DT).is_empty());
        }
        assert_eq!(state.game_state, GameState::GameOver);
    }

    #[test]
    fn pause_freezes_everything() {
        let mut state = in_progress();
        state.handle_player_command(Command::MoveUp);
        state.tick(DT);

        state.pause();
        assert_eq!(state.drain_events(), vec![GameEvent::Paused]);
        let position = state.player.position();
        let timer = state.round_timer;
        let render = state.player.render_frame();

        for _ in 0..120 {
            assert!(state.tick(DT).is_empty());
        }
        assert_eq!(state.player.position(), position);
        assert_eq!(state.round_timer, timer);
        assert_eq!(state.player.render_frame(), render);

        // Skipping only works while running
        state.skip_delay();
        state.resume();
        assert_eq!(state.drain_events(), vec![GameEvent::Resumed]);
        state.tick(DT);
        assert!(state.round_timer < timer);
    }

    #[test]
    fn skip_delay_jumps_to_the_fight() {
        let mut state = new_match();
        state.tick(DT);
        state.skip_delay();
        assert_eq!(state.round_state_time, START_ROUND_DELAY);
        state.tick(DT);
        assert_eq!(state.round_state, RoundState::InProgress);
    }

    #[test]
    fn restart_after_game_over() {
        let mut state = in_progress();
        state.rounds_won = 1;
        state.win_round(false);
        state.skip_delay();
        run_until_game_state(&mut state, GameState::GameOver, 10);

        state.restart();
        assert_eq!(state.game_state, GameState::Running);
        assert_eq!(state.rounds_won, 0);
        assert_eq!(state.rounds_lost, 0);
        assert_eq!(state.current_round, 1);
        assert_eq!(state.round_state, RoundState::Starting);
        assert!(state
            .drain_events()
            .contains(&GameEvent::RoundStarting { round: 1 }));
    }

    #[test]
    fn difficulty_cycle_reaches_the_ai() {
        let mut state = new_match();
        state.drain_events();
        state.cycle_difficulty();
        assert_eq!(state.difficulty, Difficulty::Medium);
        assert_eq!(state.ai.difficulty(), Difficulty::Medium);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::DifficultyChanged {
                difficulty: Difficulty::Medium
            }]
        );
    }

    #[test]
    fn fighters_stay_in_ring_and_face_each_other() {
        let mut state = in_progress();
        state.player.set_position(Vec2::new(-40.0, 90.0));
        state.tick(DT);
        assert!(state.ring.contains(state.player.position()));
        assert_eq!(state.player.facing(), crate::game::fighter::Facing::Right);
        assert_eq!(state.opponent.facing(), crate::game::fighter::Facing::Left);
    }

    #[test]
    fn critical_time_below_ten_seconds() {
        let mut state = in_progress();
        assert!(!state.is_round_time_critical());
        state.round_timer = 9.5;
        assert!(state.is_round_time_critical());
    }

    #[tokio::test]
    async fn runner_announces_start_snapshots_and_end() {
        let mut state = new_match();
        state.rounds_won = 1;
        state.win_round(false);

        let (game_match, handle) = GameMatch::new(state, 50.0);
        let mut rx = handle.subscribe();
        let task = tokio::spawn(game_match.run());

        let mut started = false;
        let mut snapshots = 0;
        let mut winner = None;
        let outcome = tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                match rx.recv().await {
                    Ok(ServerMsg::MatchStarted { .. }) => started = true,
                    Ok(ServerMsg::Snapshot(_)) => snapshots += 1,
                    Ok(ServerMsg::MatchEnd { winner: w, .. }) => {
                        winner = Some(w);
                        break;
                    }
                    Ok(ServerMsg::Event { .. }) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }
            }
        })
        .await;
        assert_ok!(outcome);
        assert!(started);
        assert!(snapshots > 0);
        assert_eq!(winner, Some(Side::Player));

        drop(handle);
        let summary = assert_ok!(tokio::time::timeout(Duration::from_secs(5), task).await);
        let summary = assert_ok!(summary);
        assert_eq!(summary.winner, Some(Side::Player));
        assert_eq!(summary.rounds_won, 2);
    }

    #[tokio::test]
    async fn runner_applies_client_messages() {
        let (game_match, handle) = GameMatch::new(new_match(), 50.0);
        let mut rx = handle.subscribe();
        let task = tokio::spawn(game_match.run());

        assert_ok!(handle.send(ClientMsg::CycleDifficulty).await);
        assert_ok!(handle.send(ClientMsg::Pause).await);

        let mut seen = Vec::new();
        let outcome = tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                match rx.recv().await {
                    Ok(ServerMsg::Event { event, .. }) => {
                        seen.push(event);
                        if seen.contains(&GameEvent::Paused) {
                            break;
                        }
                    }
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                }
            }
        })
        .await;
        assert_ok!(outcome);
        assert!(seen.contains(&GameEvent::DifficultyChanged {
            difficulty: Difficulty::Medium
        }));

        drop(handle);
        let summary = assert_ok!(tokio::time::timeout(Duration::from_secs(5), task).await);
        let summary = assert_ok!(summary);
        assert_eq!(summary.winner, None);
    }
}
