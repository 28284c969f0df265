//! House-rule configuration.
//!
//! The defaults follow the standard rules. Everything the engine treats as a
//! tunable number lives here so the presentation layer or a simulator can
//! switch policies without touching game logic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rule parameters for a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Cards a city receives per production (a settlement always receives 1)
    pub city_yield: u32,
    /// Players holding at least this many cards discard half when a 7 is rolled
    pub discard_threshold: u32,
    /// Victory points that end the game
    pub victory_points_to_win: u32,
    /// Minimum road length before Longest Road is awarded
    pub min_longest_road: u32,
    /// Victory points carried by the Longest Road bonus
    pub longest_road_bonus: u32,
    /// Initial size of each resource pool in the bank
    pub bank_size: u32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            city_yield: 2,
            discard_threshold: 7,
            victory_points_to_win: 10,
            min_longest_road: 5,
            longest_road_bonus: 2,
            bank_size: 19,
        }
    }
}

/// Rejected rule configurations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("city yield must be at least 1")]
    ZeroCityYield,

    #[error("discard threshold must be at least 2")]
    DiscardThresholdTooLow,

    #[error("victory point target must be at least 1")]
    ZeroVictoryTarget,

    #[error("bank must start with at least one card of each resource")]
    EmptyBank,
}

impl RuleConfig {
    /// House rule where cities yield the same as settlements
    pub fn single_yield() -> Self {
        Self {
            city_yield: 1,
            ..Self::default()
        }
    }

    /// Reject values that would make the game degenerate
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.city_yield == 0 {
            return Err(ConfigError::ZeroCityYield);
        }
        if self.discard_threshold < 2 {
            return Err(ConfigError::DiscardThresholdTooLow);
        }
        if self.victory_points_to_win == 0 {
            return Err(ConfigError::ZeroVictoryTarget);
        }
        if self.bank_size == 0 {
            return Err(ConfigError::EmptyBank);
        }
        Ok(())
    }
}
