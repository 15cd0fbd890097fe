//! Fighter roster - the named fighters a match can be set up with

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::animation::AnimationLibrary;
use super::fighter::{Fighter, Tint};

/// One selectable fighter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterChoice {
    pub name: String,
    /// RGB tint, each channel 0.0-1.0
    pub color_values: [f32; 3],
}

impl FighterChoice {
    pub fn tint(&self) -> Tint {
        Tint::from_rgb(self.color_values)
    }

    /// Build a fighter for this choice
    pub fn build(&self, animations: Arc<dyn AnimationLibrary>) -> Fighter {
        Fighter::new(self.name.clone(), self.tint(), animations)
    }
}

/// Roster errors
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("Failed to read roster file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid roster JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Roster needs at least two fighters, found {0}")]
    TooSmall(usize),

    #[error("Unknown fighter: {0}")]
    UnknownFighter(String),
}

/// Ordered list of fighter choices
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    choices: Vec<FighterChoice>,
}

impl Roster {
    /// Parse a JSON array of `{"name", "color_values"}` objects
    pub fn from_json(json: &str) -> Result<Self, RosterError> {
        let choices: Vec<FighterChoice> = serde_json::from_str(json)?;
        Self::from_choices(choices)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| RosterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let roster = Self::from_json(&json)?;
        info!(path = %path.display(), fighters = roster.len(), "Roster loaded");
        Ok(roster)
    }

    fn from_choices(choices: Vec<FighterChoice>) -> Result<Self, RosterError> {
        if choices.len() < 2 {
            return Err(RosterError::TooSmall(choices.len()));
        }
        Ok(Self { choices })
    }

    pub fn choices(&self) -> &[FighterChoice] {
        &self.choices
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Case-insensitive lookup by name
    pub fn find(&self, name: &str) -> Result<&FighterChoice, RosterError> {
        let wanted = name.trim();
        self.choices
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RosterError::UnknownFighter(wanted.to_string()))
    }

    /// Pick a fighter by name, or the entry at `fallback` when no name is given
    pub fn select(&self, name: Option<&str>, fallback: usize) -> Result<&FighterChoice, RosterError> {
        match name {
            Some(name) => self.find(name),
            None => Ok(&self.choices[fallback % self.choices.len()]),
        }
    }
}

impl Default for Roster {
    fn default() -> Self {
        let choice = |name: &str, color_values: [f32; 3]| FighterChoice {
            name: name.to_string(),
            color_values,
        };

        Self {
            choices: vec![
                choice("Slugger", [1.0, 1.0, 1.0]),
                choice("Brawler", [0.85, 0.3, 0.3]),
                choice("Boxer", [0.35, 0.55, 0.95]),
                choice("Bruiser", [0.4, 0.8, 0.4]),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::animation::SpriteSheetTimings;

    #[test]
    fn default_roster_has_distinct_fighters() {
        let roster = Roster::default();
        assert!(roster.len() >= 2);
        assert_ne!(roster.choices()[0].name, roster.choices()[1].name);
    }

    #[test]
    fn parses_json_roster() {
        let roster = Roster::from_json(
            r#"[{"name":"Ace","color_values":[1.0,0.5,0.0]},
                {"name":"Duke","color_values":[0.0,0.0,1.0]}]"#,
        )
        .expect("valid roster");

        let ace = roster.find("ace").expect("case-insensitive match");
        assert_eq!(ace.tint(), Tint::from_rgb([1.0, 0.5, 0.0]));

        let fighter = ace.build(SpriteSheetTimings::shared());
        assert_eq!(fighter.name(), "Ace");
        assert_eq!(fighter.tint().g, 0.5);
    }

    #[test]
    fn rejects_bad_rosters() {
        assert!(matches!(
            Roster::from_json("not json"),
            Err(RosterError::Parse(_))
        ));
        assert!(matches!(
            Roster::from_json(r#"[{"name":"Solo","color_values":[1,1,1]}]"#),
            Err(RosterError::TooSmall(1))
        ));
        assert!(matches!(
            Roster::from_json(r#"[{"name":"NoColor"},{"name":"Other"}]"#),
            Err(RosterError::Parse(_))
        ));
    }

    #[test]
    fn unknown_fighter_is_an_error() {
        let err = Roster::default().find("Nobody").unwrap_err();
        assert_eq!(err.to_string(), "Unknown fighter: Nobody");
    }

    #[test]
    fn select_falls_back_to_position() {
        let roster = Roster::default();
        assert_eq!(roster.select(None, 1).expect("fallback").name, "Brawler");
        assert_eq!(roster.select(Some("boxer"), 0).expect("named").name, "Boxer");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Roster::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, RosterError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
