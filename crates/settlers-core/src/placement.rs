//! Placement legality for settlements, cities and roads.
//!
//! The checks here only look at the board and one player's state. Turn order
//! and phase gating live in [`crate::game`], which picks the [`PlacementMode`]
//! and then asks this module whether a spot is legal.

use crate::board::{Board, VertexBuilding};
use crate::game::RuleError;
use crate::player::Player;
use crate::topology::{self, Edge, VertexId, VERTEX_COUNT};
use serde::{Deserialize, Serialize};

/// Which rule set applies to a placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementMode {
    /// Free setup placement. `anchor` is the settlement placed this turn, which
    /// the setup road has to touch.
    Setup { anchor: Option<VertexId> },
    /// Normal play: pieces must connect to the player's network and be paid for
    Main,
}

impl PlacementMode {
    fn is_setup(&self) -> bool {
        matches!(self, PlacementMode::Setup { .. })
    }
}

/// Why a settlement cannot go on `v`, if it cannot
pub fn check_settlement(
    board: &Board,
    player: &Player,
    v: VertexId,
    mode: PlacementMode,
) -> Result<(), RuleError> {
    if board.vertex(v).is_built() || !board.satisfies_distance_rule(v) {
        return Err(RuleError::InvalidLocation);
    }
    if !mode.is_setup() && !board.has_road_touching(player.id, v) {
        return Err(RuleError::InvalidLocation);
    }
    if player.settlements_remaining == 0 {
        return Err(RuleError::NoPiecesRemaining);
    }
    if !mode.is_setup() && !player.can_afford_settlement() {
        return Err(RuleError::CannotAfford);
    }
    Ok(())
}

/// Why a city cannot go on `v`, if it cannot
pub fn check_city(
    board: &Board,
    player: &Player,
    v: VertexId,
    mode: PlacementMode,
) -> Result<(), RuleError> {
    if board.vertex(v) != VertexBuilding::Settlement(player.id) {
        return Err(RuleError::InvalidLocation);
    }
    if player.cities_remaining == 0 {
        return Err(RuleError::NoPiecesRemaining);
    }
    if !mode.is_setup() && !player.can_afford_city() {
        return Err(RuleError::CannotAfford);
    }
    Ok(())
}

/// Why a road cannot go between `v1` and `v2`, if it cannot
pub fn check_road(
    board: &Board,
    player: &Player,
    v1: VertexId,
    v2: VertexId,
    mode: PlacementMode,
) -> Result<(), RuleError> {
    if v1 == v2 || !topology::are_adjacent(v1, v2) {
        return Err(RuleError::InvalidLocation);
    }
    if board.road_at(v1, v2).is_some() {
        return Err(RuleError::InvalidLocation);
    }

    let connected = match mode {
        PlacementMode::Setup { anchor } => anchor.is_some_and(|a| a == v1 || a == v2),
        PlacementMode::Main => {
            is_connected_at(board, player, v1, v2) || is_connected_at(board, player, v2, v1)
        }
    };
    if !connected {
        return Err(RuleError::InvalidLocation);
    }

    if player.roads_remaining == 0 {
        return Err(RuleError::NoPiecesRemaining);
    }
    if !mode.is_setup() && !player.can_afford_road() {
        return Err(RuleError::CannotAfford);
    }
    Ok(())
}

/// Whether the new road `endpoint`-`other` hooks into the player's network at
/// `endpoint`: either through their own building there, or through another of
/// their roads. An opponent's building on the junction does not cut the
/// connection; it only ends a path when the longest road is measured.
fn is_connected_at(board: &Board, player: &Player, endpoint: VertexId, other: VertexId) -> bool {
    if board.vertex(endpoint).owner() == Some(player.id) {
        return true;
    }
    board
        .roads_of(player.id)
        .any(|r| r.edge.touches(endpoint) && r.edge != Edge::new(endpoint, other))
}

/// Whether a settlement can go on `v`
pub fn is_valid_settlement_spot(board: &Board, player: &Player, v: VertexId, mode: PlacementMode) -> bool {
    check_settlement(board, player, v, mode).is_ok()
}

/// Whether `v` can be upgraded to a city
pub fn is_valid_city_spot(board: &Board, player: &Player, v: VertexId, mode: PlacementMode) -> bool {
    check_city(board, player, v, mode).is_ok()
}

/// Whether a road can go between `v1` and `v2`
pub fn is_valid_road_spot(
    board: &Board,
    player: &Player,
    v1: VertexId,
    v2: VertexId,
    mode: PlacementMode,
) -> bool {
    check_road(board, player, v1, v2, mode).is_ok()
}

/// Every vertex where a settlement is legal
pub fn valid_settlement_spots(board: &Board, player: &Player, mode: PlacementMode) -> Vec<VertexId> {
    (0..VERTEX_COUNT)
        .filter(|&v| is_valid_settlement_spot(board, player, v, mode))
        .collect()
}

/// Every settlement of the player that can become a city
pub fn valid_city_spots(board: &Board, player: &Player, mode: PlacementMode) -> Vec<VertexId> {
    board
        .buildings_of(player.id)
        .map(|(v, _)| v)
        .filter(|&v| is_valid_city_spot(board, player, v, mode))
        .collect()
}

/// Every legal road, optionally only those with one end at `from`
pub fn valid_road_spots(
    board: &Board,
    player: &Player,
    from: Option<VertexId>,
    mode: PlacementMode,
) -> Vec<Edge> {
    match from {
        Some(v) => topology::edges_at(v)
            .filter(|e| is_valid_road_spot(board, player, e.a, e.b, mode))
            .collect(),
        None => topology::edges()
            .into_iter()
            .filter(|e| is_valid_road_spot(board, player, e.a, e.b, mode))
            .collect(),
    }
}
