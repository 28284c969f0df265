//! Hex coordinate system using axial coordinates (q, r).
//!
//! Tiles are addressed by `HexCoord`. Vertices and edges are not geometric
//! here: they are index-addressed through the fixed tables in
//! [`crate::topology`], so this module only has to answer questions about
//! tiles themselves (neighbors, distance, whether a coordinate is on the board).
//!
//! Axial coordinates make neighbor calculations trivial and avoid the wasted
//! space of offset coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Radius of the standard board: the center tile plus two rings (19 tiles).
pub const BOARD_RADIUS: i32 = 2;

/// Direction from a hex to one of its six neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HexDirection {
    West,
    NorthWest,
    NorthEast,
    East,
    SouthEast,
    SouthWest,
}

impl HexDirection {
    /// All directions, clockwise starting from West
    pub const ALL: [HexDirection; 6] = [
        HexDirection::West,
        HexDirection::NorthWest,
        HexDirection::NorthEast,
        HexDirection::East,
        HexDirection::SouthEast,
        HexDirection::SouthWest,
    ];

    /// Axial offset (dq, dr) for this direction
    pub const fn offset(self) -> (i32, i32) {
        match self {
            HexDirection::West => (-1, 0),
            HexDirection::NorthWest => (0, -1),
            HexDirection::NorthEast => (1, -1),
            HexDirection::East => (1, 0),
            HexDirection::SouthEast => (0, 1),
            HexDirection::SouthWest => (-1, 1),
        }
    }
}

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east (right)
/// - `r` increases going down the rows
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    /// Column (increases going east)
    pub q: i32,
    /// Row (increases going down)
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Get the neighbor in a specific direction
    pub fn neighbor(&self, direction: HexDirection) -> HexCoord {
        let (dq, dr) = direction.offset();
        HexCoord::new(self.q + dq, self.r + dr)
    }

    /// The six neighboring hexes, clockwise starting from West
    pub fn neighbors(&self) -> [HexCoord; 6] {
        HexDirection::ALL.map(|dir| self.neighbor(dir))
    }

    /// Neighbors that lie on the standard board
    pub fn board_neighbors(&self) -> Vec<HexCoord> {
        self.neighbors()
            .into_iter()
            .filter(HexCoord::is_on_board)
            .collect()
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Whether this coordinate lies within the radius-2 board
    pub fn is_on_board(&self) -> bool {
        self.distance_to(&HexCoord::new(0, 0)) <= BOARD_RADIUS as u32
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}
