//! Command and event message definitions
//! These are the types that cross the boundary between the simulation core
//! and its collaborators (input source, audio layer, renderer)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::fighter::{Facing, FighterState, Tint};
use crate::game::r#match::{GameState, RoundState};

/// Opponent AI difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Rarely pursues, slow to react
    #[default]
    Easy,
    /// Pursues half the time
    Medium,
    /// Always pursues, reacts almost instantly
    Hard,
}

impl Difficulty {
    /// Next setting in the Easy -> Medium -> Hard -> Easy cycle
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(other.to_string()),
        }
    }
}

/// Which corner of the ring a fighter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Human-controlled fighter
    Player,
    /// AI-controlled fighter
    Opponent,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => write!(f, "player"),
            Side::Opponent => write!(f, "opponent"),
        }
    }
}

/// Discrete fighter commands, one per input edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    StopMovingLeft,
    StopMovingRight,
    StopMovingUp,
    StopMovingDown,
    Block,
    StopBlocking,
    Punch,
    Kick,
}

impl Command {
    /// Commands that start movement; only accepted from the input source
    /// while a round is in progress
    pub fn starts_movement(self) -> bool {
        matches!(
            self,
            Command::MoveLeft | Command::MoveRight | Command::MoveUp | Command::MoveDown
        )
    }
}

/// Messages sent from the input source to a running match
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Fighter command for the player side
    Fighter { command: Command },

    /// Freeze the simulation
    Pause,

    /// Unfreeze the simulation
    Resume,

    /// Skip the current round intro or outro delay
    SkipDelay,

    /// Start a fresh match
    Restart,

    /// Switch to the next difficulty setting
    CycleDifficulty,
}

/// Messages broadcast by a running match
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Sent once when the runner starts
    MatchStarted {
        match_id: Uuid,
        /// Seed of the AI random source
        seed: u64,
        difficulty: Difficulty,
        player: FighterInfo,
        opponent: FighterInfo,
    },

    /// A single gameplay event, sent on the tick it happened
    Event { tick: u64, event: GameEvent },

    /// Render/HUD state (sent at regular intervals)
    Snapshot(MatchSnapshot),

    /// Match has been decided
    MatchEnd {
        winner: Side,
        rounds_won: u32,
        rounds_lost: u32,
        duration_ms: u64,
    },
}

/// Fighter identity for the match lobby
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FighterInfo {
    pub name: String,
    pub tint: Tint,
}

/// Gameplay events an audio or effects layer may react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Round intro began
    RoundStarting { round: u32 },

    /// Round intro finished, fighting is live
    Fight { round: u32 },

    /// An active attack reached the defender
    AttackContact { attacker: Side },

    /// Unblocked hit
    HitLanded {
        attacker: Side,
        defender: Side,
        damage: f32,
        x: f32,
        y: f32,
    },

    /// Hit absorbed by a block
    Blocked {
        attacker: Side,
        defender: Side,
        damage: f32,
        x: f32,
        y: f32,
    },

    /// Player took the round
    RoundWon { round: u32, timed_out: bool },

    /// Player dropped the round
    RoundLost { round: u32, timed_out: bool },

    /// Match decided
    GameOver {
        winner: Side,
        rounds_won: u32,
        rounds_lost: u32,
    },

    Paused,

    Resumed,

    DifficultyChanged { difficulty: Difficulty },
}

/// Text shown over the ring while a round is starting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundBanner {
    Round { number: u32 },
    Fight,
}

impl fmt::Display for RoundBanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundBanner::Round { number } => write!(f, "ROUND {}", number),
            RoundBanner::Fight => write!(f, "FIGHT!"),
        }
    }
}

/// Fighter state in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FighterSnapshot {
    pub side: Side,
    pub name: String,
    /// Position X
    pub x: f32,
    /// Position Y
    pub y: f32,
    pub facing: Facing,
    /// Life (0-100)
    pub life: f32,
    /// State the renderer should draw (last state with a live tick)
    pub render_state: FighterState,
    /// Elapsed time into `render_state`
    pub render_state_time: f32,
    /// Sprite-sheet frame for `render_state` at `render_state_time`
    pub key_frame: usize,
}

/// Round and match bookkeeping in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub current_round: u32,
    pub state: RoundState,
    pub state_time: f32,
    /// Seconds left on the round clock
    pub timer: f32,
    /// Round clock is in its final seconds
    pub critical: bool,
    pub rounds_won: u32,
    pub rounds_lost: u32,
    pub banner: Option<RoundBanner>,
}

/// Full render/HUD snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Simulation tick number
    pub tick: u64,
    pub game_state: GameState,
    pub difficulty: Difficulty,
    pub round: RoundSnapshot,
    pub player: FighterSnapshot,
    pub opponent: FighterSnapshot,
}
