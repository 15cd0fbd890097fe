//! Opponent AI
//!
//! The AI watches both fighters and answers with the same discrete commands
//! a human input source would send. It never touches fighter internals.
//!
//! Two modes alternate:
//! - away from the player it re-plans every half second, either chasing the
//!   player or wandering in a random direction;
//! - within contact distance it makes contact decisions (block, attack or
//!   back off), re-deciding after a difficulty-scaled reaction delay.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::fighter::Fighter;
use super::physics::{PhysicsSystem, FIGHTER_CONTACT_DISTANCE_X, FIGHTER_CONTACT_DISTANCE_Y};
use crate::protocol::{Command, Difficulty};

/// Chance of blocking an incoming attack that has not landed yet
pub const OPPONENT_AI_BLOCK_CHANCE: f32 = 0.4;

/// Chance of attacking when the player is not attacking
pub const OPPONENT_AI_ATTACK_CHANCE: f32 = 0.8;

/// Seconds a non-contact movement plan is held
pub const OPPONENT_AI_NON_CONTACT_DECISION_DELAY: f32 = 0.5;

/// Per-difficulty tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    /// Chance of chasing the player on each non-contact re-plan
    pub pursue_chance: f32,
    /// Reaction delay between contact decisions (seconds)
    pub contact_decision_delay: f32,
}

impl DifficultyProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                pursue_chance: 0.2,
                contact_decision_delay: 0.1,
            },
            Difficulty::Medium => Self {
                pursue_chance: 0.5,
                contact_decision_delay: 0.07,
            },
            Difficulty::Hard => Self {
                pursue_chance: 1.0,
                contact_decision_delay: 0.01,
            },
        }
    }
}

/// What the AI chose on a tick where it chose anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Head toward the player (re-issued every tick while pursuing)
    PursuePlayer,
    /// Pick a random direction per axis
    MoveRandomly,
    /// Back away from the player
    MoveAway,
    Block,
    StopBlocking,
    Punch,
    Kick,
    /// Player's swing already landed; nothing to react to
    Hold,
    /// Left contact distance without acting
    Disengage,
}

/// AI driving the opponent fighter
#[derive(Debug, Clone)]
pub struct OpponentAi<R = ChaCha8Rng> {
    rng: R,
    difficulty: Difficulty,
    timer: f32,
    making_contact_decision: bool,
    pursuing_player: bool,
    last_decision: Option<Decision>,
}

impl OpponentAi<ChaCha8Rng> {
    /// AI backed by a seeded ChaCha8 stream
    pub fn seeded(seed: u64, difficulty: Difficulty) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed), difficulty)
    }
}

impl<R: Rng> OpponentAi<R> {
    pub fn with_rng(rng: R, difficulty: Difficulty) -> Self {
        Self {
            rng,
            difficulty,
            timer: 0.0,
            making_contact_decision: false,
            pursuing_player: false,
            last_decision: None,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub fn profile(&self) -> DifficultyProfile {
        DifficultyProfile::for_difficulty(self.difficulty)
    }

    pub fn is_making_contact_decision(&self) -> bool {
        self.making_contact_decision
    }

    pub fn is_pursuing_player(&self) -> bool {
        self.pursuing_player
    }

    /// Decision taken on the most recent [`perform`](Self::perform) call, if any
    pub fn last_decision(&self) -> Option<Decision> {
        self.last_decision
    }

    /// Forget all transient state (new round)
    pub fn reset(&mut self) {
        self.timer = 0.0;
        self.making_contact_decision = false;
        self.pursuing_player = false;
        self.last_decision = None;
    }

    /// Run one AI step and return the commands for the opponent fighter
    pub fn perform(&mut self, delta: f32, player: &Fighter, opponent: &Fighter) -> Vec<Command> {
        let mut commands = Vec::new();
        self.last_decision = None;
        let in_contact =
            PhysicsSystem::within_contact_distance(player.position(), opponent.position());

        if self.making_contact_decision {
            if opponent.is_blocking() {
                if !in_contact || !player.is_attacking() || player.has_made_contact() {
                    commands.push(Command::StopBlocking);
                    self.making_contact_decision = false;
                    self.decided(Decision::StopBlocking);
                }
            } else if !opponent.is_attacking() {
                if in_contact {
                    if self.timer <= 0.0 {
                        self.make_contact_decision(player, opponent, &mut commands);
                    } else {
                        self.timer -= delta;
                    }
                } else {
                    self.making_contact_decision = false;
                    self.decided(Decision::Disengage);
                }
            }
        } else if in_contact {
            self.make_contact_decision(player, opponent, &mut commands);
        } else if self.timer <= 0.0 {
            if self.rng.gen::<f32>() <= self.profile().pursue_chance {
                self.pursuing_player = true;
                move_toward(player, opponent, &mut commands);
                self.decided(Decision::PursuePlayer);
            } else {
                self.pursuing_player = false;
                self.move_randomly(&mut commands);
                self.decided(Decision::MoveRandomly);
            }
            self.timer = OPPONENT_AI_NON_CONTACT_DECISION_DELAY;
        } else {
            if self.pursuing_player {
                move_toward(player, opponent, &mut commands);
                self.last_decision = Some(Decision::PursuePlayer);
            }
            self.timer -= delta;
        }

        commands
    }

    fn make_contact_decision(
        &mut self,
        player: &Fighter,
        opponent: &Fighter,
        commands: &mut Vec<Command>,
    ) {
        self.making_contact_decision = true;

        let decision = if player.is_attacking() {
            if player.has_made_contact() {
                Decision::Hold
            } else if self.rng.gen::<f32>() <= OPPONENT_AI_BLOCK_CHANCE {
                commands.push(Command::Block);
                Decision::Block
            } else {
                move_away(player, opponent, commands);
                Decision::MoveAway
            }
        } else if self.rng.gen::<f32>() <= OPPONENT_AI_ATTACK_CHANCE {
            if self.rng.gen_bool(0.5) {
                commands.push(Command::Punch);
                Decision::Punch
            } else {
                commands.push(Command::Kick);
                Decision::Kick
            }
        } else {
            move_away(player, opponent, commands);
            Decision::MoveAway
        };

        self.decided(decision);
        self.timer = self.profile().contact_decision_delay;
    }

    fn move_randomly(&mut self, commands: &mut Vec<Command>) {
        match self.rng.gen_range(0..3) {
            0 => commands.push(Command::MoveLeft),
            1 => commands.push(Command::MoveRight),
            _ => commands.extend([Command::StopMovingLeft, Command::StopMovingRight]),
        }

        match self.rng.gen_range(0..3) {
            0 => commands.push(Command::MoveUp),
            1 => commands.push(Command::MoveDown),
            _ => commands.extend([Command::StopMovingUp, Command::StopMovingDown]),
        }
    }

    fn decided(&mut self, decision: Decision) {
        debug!(difficulty = %self.difficulty, ?decision, "Opponent AI decision");
        self.last_decision = Some(decision);
    }
}

/// Close in on the player until within contact reach on each axis
fn move_toward(player: &Fighter, opponent: &Fighter, commands: &mut Vec<Command>) {
    let target = player.position();
    let me = opponent.position();

    if me.x > target.x + FIGHTER_CONTACT_DISTANCE_X {
        commands.push(Command::MoveLeft);
    } else if me.x < target.x - FIGHTER_CONTACT_DISTANCE_X {
        commands.push(Command::MoveRight);
    } else {
        commands.extend([Command::StopMovingLeft, Command::StopMovingRight]);
    }

    if me.y < target.y - FIGHTER_CONTACT_DISTANCE_Y {
        commands.push(Command::MoveUp);
    } else if me.y > target.y + FIGHTER_CONTACT_DISTANCE_Y {
        commands.push(Command::MoveDown);
    } else {
        commands.extend([Command::StopMovingUp, Command::StopMovingDown]);
    }
}

/// Step away from the player on both axes
fn move_away(player: &Fighter, opponent: &Fighter, commands: &mut Vec<Command>) {
    let threat = player.position();
    let me = opponent.position();

    commands.push(if me.x > threat.x {
        Command::MoveRight
    } else {
        Command::MoveLeft
    });

    commands.push(if me.y > threat.y {
        Command::MoveUp
    } else {
        Command::MoveDown
    });
}
