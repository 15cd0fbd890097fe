//! Configuration module - environment variable parsing

use std::env;
use std::path::PathBuf;

use crate::protocol::Difficulty;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Opponent AI difficulty
    pub difficulty: Difficulty,
    /// Seed for the AI random source; random when unset
    pub match_seed: Option<u64>,
    /// Multiplier on the runner's tick rate
    pub time_scale: f32,

    /// Optional JSON roster file, built-in roster otherwise
    pub roster_path: Option<PathBuf>,
    /// Roster name for the player side
    pub player_fighter: Option<String>,
    /// Roster name for the opponent side
    pub opponent_fighter: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let difficulty = match var("DIFFICULTY") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidDifficulty(value))?,
            None => Difficulty::default(),
        };

        let match_seed = match var("MATCH_SEED") {
            Some(value) => Some(value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                var: "MATCH_SEED",
                value,
            })?),
            None => None,
        };

        let time_scale = match var("TIME_SCALE") {
            Some(value) => {
                let scale: f32 = value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                    var: "TIME_SCALE",
                    value: value.clone(),
                })?;
                if !scale.is_finite() || scale <= 0.0 {
                    return Err(ConfigError::InvalidTimeScale(scale));
                }
                scale
            }
            None => 1.0,
        };

        Ok(Self {
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            difficulty,
            match_seed,
            time_scale,
            roster_path: var("ROSTER_PATH").map(PathBuf::from),
            player_fighter: var("PLAYER_FIGHTER"),
            opponent_fighter: var("OPPONENT_FIGHTER"),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid DIFFICULTY {0:?} (expected easy, medium or hard)")]
    InvalidDifficulty(String),

    #[error("Invalid number in {var}: {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("TIME_SCALE must be a positive number, got {0}")]
    InvalidTimeScale(f32),
}
