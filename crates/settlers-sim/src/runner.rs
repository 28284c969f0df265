//! Drives complete all-AI games through the engine's public API.

use serde::Serialize;
use settlers_core::{GameEngine, PlayerId, RuleError, SetupError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::SimConfig;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("could not start game: {0}")]
    Setup(#[from] SetupError),

    #[error("seat {player} could not play its turn: {source}")]
    Rule { player: PlayerId, source: RuleError },

    #[error("resource cards not conserved after turn {turn} of game seeded {seed}")]
    BankNotConserved { seed: u64, turn: u32 },
}

/// Outcome of one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameReport {
    pub seed: u64,
    pub winner: Option<PlayerId>,
    pub turns: u32,
    pub actions: usize,
    pub victory_points: Vec<u32>,
    pub longest_roads: Vec<u32>,
}

/// Totals over a batch of games
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub games: usize,
    pub finished: usize,
    pub wins_by_seat: Vec<u32>,
    pub average_turns: f64,
}

/// Play one seeded game with random AI in every seat
pub fn run_game(seed: u64, players: usize, max_turns: u32) -> Result<GameReport, SimError> {
    let names = (1..=players).map(|i| format!("Bot {i}")).collect();
    let mut game = GameEngine::seeded(names, seed)?;
    let mut actions = 0;

    while !game.is_finished() && game.get_game_state().turn_number <= max_turns {
        let player = game.current_player();
        let taken = game
            .run_auto_turn(player)
            .map_err(|source| SimError::Rule { player, source })?;
        actions += taken.len();

        // Nothing reads the log here; keep it from growing
        game.drain_events();

        if !game.is_bank_conserved() {
            return Err(SimError::BankNotConserved {
                seed,
                turn: game.get_game_state().turn_number,
            });
        }
    }

    let snapshot = game.snapshot();
    let report = GameReport {
        seed,
        winner: game.winner(),
        turns: game.get_game_state().turn_number,
        actions,
        victory_points: snapshot.victory_points.clone(),
        longest_roads: snapshot.longest_roads.clone(),
    };

    match report.winner {
        Some(winner) => info!(
            seed,
            winner,
            turns = report.turns,
            longest_roads = ?report.longest_roads,
            "game won"
        ),
        None => warn!(seed, turns = report.turns, "turn limit reached without a winner"),
    }
    debug!(victory_points = ?report.victory_points, "final scores");

    Ok(report)
}

/// Play `config.games` games with consecutive seeds
pub fn run_all(config: &SimConfig) -> Result<Vec<GameReport>, SimError> {
    let base_seed = config.seed.unwrap_or_else(rand::random);
    info!(games = config.games, players = config.players, base_seed, "starting simulation");

    (0..config.games)
        .map(|i| run_game(base_seed.wrapping_add(u64::from(i)), config.players, config.max_turns))
        .collect()
}

pub fn summarize(reports: &[GameReport], players: usize) -> Summary {
    let mut wins_by_seat = vec![0; players];
    let mut finished = 0;
    for winner in reports.iter().filter_map(|r| r.winner) {
        finished += 1;
        if let Some(wins) = wins_by_seat.get_mut(winner as usize) {
            *wins += 1;
        }
    }

    let average_turns = if reports.is_empty() {
        0.0
    } else {
        reports.iter().map(|r| f64::from(r.turns)).sum::<f64>() / reports.len() as f64
    };

    Summary {
        games: reports.len(),
        finished,
        wins_by_seat,
        average_turns,
    }
}
