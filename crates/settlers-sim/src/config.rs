//! Simulator settings from the environment.

use std::str::FromStr;
use thiserror::Error;

const DEFAULT_GAMES: u32 = 10;
const DEFAULT_PLAYERS: usize = 4;
const DEFAULT_MAX_TURNS: u32 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("SIM_PLAYERS must be between 2 and 4, got {0}")]
    PlayerCount(usize),

    #[error("{0} must be at least 1")]
    Zero(&'static str),
}

/// How many games to run and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Number of games (`SIM_GAMES`)
    pub games: u32,
    /// Seats per game (`SIM_PLAYERS`)
    pub players: usize,
    /// Seed of the first game (`SIM_SEED`); entropy when unset
    pub seed: Option<u64>,
    /// Turn cap per game (`SIM_MAX_TURNS`)
    pub max_turns: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            games: DEFAULT_GAMES,
            players: DEFAULT_PLAYERS,
            seed: None,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

impl SimConfig {
    /// Read settings from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let games = parse(&lookup, "SIM_GAMES")?.unwrap_or(defaults.games);
        let players = parse(&lookup, "SIM_PLAYERS")?.unwrap_or(defaults.players);
        let seed = parse(&lookup, "SIM_SEED")?;
        let max_turns = parse(&lookup, "SIM_MAX_TURNS")?.unwrap_or(defaults.max_turns);

        if games == 0 {
            return Err(ConfigError::Zero("SIM_GAMES"));
        }
        if max_turns == 0 {
            return Err(ConfigError::Zero("SIM_MAX_TURNS"));
        }
        if !(2..=4).contains(&players) {
            return Err(ConfigError::PlayerCount(players));
        }

        Ok(Self {
            games,
            players,
            seed,
            max_turns,
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}
