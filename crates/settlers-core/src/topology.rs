//! Fixed topology of the standard 19-tile board.
//!
//! Vertices are numbered 0..54 left to right, top to bottom:
//!
//! ```text
//!         0 1 2
//!        3 4 5 6
//!        7 8 9 10
//!     11 12 13 14 15
//!     16 17 18 19 20
//!   21 22 23 24 25 26
//!   27 28 29 30 31 32
//!     33 34 35 36 37
//!     38 39 40 41 42
//!       43 44 45 46
//!       47 48 49 50
//!        51 52 53
//! ```
//!
//! Tiles are numbered 0..19 row by row from the top, matching [`TILE_COORDS`].
//! The tables are constants; [`validate`] checks their internal consistency
//! once when an engine is created.

use crate::hex::HexCoord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Index of a vertex (intersection) on the board, 0..54
pub type VertexId = usize;

/// Index of a tile on the board, 0..19
pub type TileId = usize;

pub const VERTEX_COUNT: usize = 54;
pub const TILE_COUNT: usize = 19;
pub const EDGE_COUNT: usize = 72;

/// Axial coordinates of every tile, row by row from the top
pub const TILE_COORDS: [HexCoord; TILE_COUNT] = [
    HexCoord::new(0, -2),
    HexCoord::new(1, -2),
    HexCoord::new(2, -2),
    HexCoord::new(-1, -1),
    HexCoord::new(0, -1),
    HexCoord::new(1, -1),
    HexCoord::new(2, -1),
    HexCoord::new(-2, 0),
    HexCoord::new(-1, 0),
    HexCoord::new(0, 0),
    HexCoord::new(1, 0),
    HexCoord::new(2, 0),
    HexCoord::new(-2, 1),
    HexCoord::new(-1, 1),
    HexCoord::new(0, 1),
    HexCoord::new(1, 1),
    HexCoord::new(-2, 2),
    HexCoord::new(-1, 2),
    HexCoord::new(0, 2),
];

/// Neighbors of every vertex. Edge vertices have 2, interior vertices 3.
pub const VERTEX_ADJACENCY: [&[VertexId]; VERTEX_COUNT] = [
    &[3, 4],
    &[4, 5],
    &[5, 6],
    &[0, 7],
    &[0, 1, 8],
    &[1, 2, 9],
    &[2, 10],
    &[3, 11, 12],
    &[4, 12, 13],
    &[5, 13, 14],
    &[6, 14, 15],
    &[7, 16],
    &[7, 8, 17],
    &[8, 9, 18],
    &[9, 10, 19],
    &[10, 20],
    &[11, 21, 22],
    &[12, 22, 23],
    &[13, 23, 24],
    &[14, 24, 25],
    &[15, 25, 26],
    &[16, 27],
    &[16, 17, 28],
    &[17, 18, 29],
    &[18, 19, 30],
    &[19, 20, 31],
    &[20, 32],
    &[21, 33],
    &[22, 33, 34],
    &[23, 34, 35],
    &[24, 35, 36],
    &[25, 36, 37],
    &[26, 37],
    &[27, 28, 38],
    &[28, 29, 39],
    &[29, 30, 40],
    &[30, 31, 41],
    &[31, 32, 42],
    &[33, 43],
    &[34, 43, 44],
    &[35, 44, 45],
    &[36, 45, 46],
    &[37, 46],
    &[38, 39, 47],
    &[39, 40, 48],
    &[40, 41, 49],
    &[41, 42, 50],
    &[43, 51],
    &[44, 51, 52],
    &[45, 52, 53],
    &[46, 53],
    &[47, 48],
    &[48, 49],
    &[49, 50],
];

/// The six vertices around every tile, clockwise from the top vertex
pub const TILE_VERTICES: [[VertexId; 6]; TILE_COUNT] = [
    [0, 4, 8, 12, 7, 3],
    [1, 5, 9, 13, 8, 4],
    [2, 6, 10, 14, 9, 5],
    [7, 12, 17, 22, 16, 11],
    [8, 13, 18, 23, 17, 12],
    [9, 14, 19, 24, 18, 13],
    [10, 15, 20, 25, 19, 14],
    [16, 22, 28, 33, 27, 21],
    [17, 23, 29, 34, 28, 22],
    [18, 24, 30, 35, 29, 23],
    [19, 25, 31, 36, 30, 24],
    [20, 26, 32, 37, 31, 25],
    [28, 34, 39, 43, 38, 33],
    [29, 35, 40, 44, 39, 34],
    [30, 36, 41, 45, 40, 35],
    [31, 37, 42, 46, 41, 36],
    [39, 44, 48, 51, 47, 43],
    [40, 45, 49, 52, 48, 44],
    [41, 46, 50, 53, 49, 45],
];

/// An unordered pair of adjacent vertices. Always stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub a: VertexId,
    pub b: VertexId,
}

impl Edge {
    /// Normalize a vertex pair. Does not check adjacency.
    pub fn new(v1: VertexId, v2: VertexId) -> Self {
        if v1 <= v2 {
            Self { a: v1, b: v2 }
        } else {
            Self { a: v2, b: v1 }
        }
    }

    /// Whether `v` is one of the endpoints
    pub fn touches(&self, v: VertexId) -> bool {
        self.a == v || self.b == v
    }

    /// The endpoint opposite `v`, if `v` is an endpoint
    pub fn other(&self, v: VertexId) -> Option<VertexId> {
        if self.a == v {
            Some(self.b)
        } else if self.b == v {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Inconsistencies in the topology tables
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("vertex {0} lists {1} as a neighbor but not the other way round")]
    Asymmetric(VertexId, VertexId),

    #[error("vertex {0} refers to out-of-range vertex {1}")]
    OutOfRange(VertexId, VertexId),

    #[error("vertex {0} lists itself as a neighbor")]
    SelfLoop(VertexId),

    #[error("vertex {vertex} has {degree} neighbors, expected 2 or 3")]
    BadDegree { vertex: VertexId, degree: usize },

    #[error("expected 72 edges, found {0}")]
    EdgeCount(usize),

    #[error("tile {tile} ring vertices {a} and {b} are not adjacent")]
    BrokenRing { tile: TileId, a: VertexId, b: VertexId },

    #[error("vertex {0} does not belong to any tile")]
    Orphan(VertexId),

    #[error("tile {0} shares sides with tiles that are not its hex neighbors")]
    MisplacedTile(TileId),
}

/// Panic unless `v` is a valid vertex index
fn check_vertex(v: VertexId) {
    assert!(v < VERTEX_COUNT, "vertex index {v} out of range 0..{VERTEX_COUNT}");
}

/// Directly adjacent vertices of `v`
pub fn neighbors(v: VertexId) -> &'static [VertexId] {
    check_vertex(v);
    VERTEX_ADJACENCY[v]
}

/// Whether two vertices share an edge
pub fn are_adjacent(v1: VertexId, v2: VertexId) -> bool {
    check_vertex(v2);
    neighbors(v1).contains(&v2)
}

/// The six vertices of a tile, clockwise from the top
pub fn tile_vertices(tile: TileId) -> [VertexId; 6] {
    assert!(tile < TILE_COUNT, "tile index {tile} out of range 0..{TILE_COUNT}");
    TILE_VERTICES[tile]
}

/// Tiles that have `v` as one of their corners (1 to 3 tiles)
pub fn tiles_touching(v: VertexId) -> Vec<TileId> {
    check_vertex(v);
    TILE_VERTICES
        .iter()
        .enumerate()
        .filter(|(_, ring)| ring.contains(&v))
        .map(|(tile, _)| tile)
        .collect()
}

/// Tile index for an axial coordinate, if it is on the board
pub fn tile_at(coord: HexCoord) -> Option<TileId> {
    TILE_COORDS.iter().position(|c| *c == coord)
}

/// All 72 edges in ascending order
pub fn edges() -> Vec<Edge> {
    let mut edges: Vec<Edge> = VERTEX_ADJACENCY
        .iter()
        .enumerate()
        .flat_map(|(v, adj)| adj.iter().filter(move |&&n| v < n).map(move |&n| Edge::new(v, n)))
        .collect();
    edges.sort();
    edges
}

/// Edges that have `v` as an endpoint
pub fn edges_at(v: VertexId) -> impl Iterator<Item = Edge> {
    neighbors(v).iter().map(move |&n| Edge::new(v, n))
}

/// Check the tables for internal consistency.
pub fn validate() -> Result<(), TopologyError> {
    let mut pairs = HashSet::new();

    for (v, adj) in VERTEX_ADJACENCY.iter().enumerate() {
        if !(2..=3).contains(&adj.len()) {
            return Err(TopologyError::BadDegree {
                vertex: v,
                degree: adj.len(),
            });
        }
        for &n in adj.iter() {
            if n >= VERTEX_COUNT {
                return Err(TopologyError::OutOfRange(v, n));
            }
            if n == v {
                return Err(TopologyError::SelfLoop(v));
            }
            if !VERTEX_ADJACENCY[n].contains(&v) {
                return Err(TopologyError::Asymmetric(v, n));
            }
            pairs.insert(Edge::new(v, n));
        }
    }

    if pairs.len() != EDGE_COUNT {
        return Err(TopologyError::EdgeCount(pairs.len()));
    }

    for (tile, ring) in TILE_VERTICES.iter().enumerate() {
        for i in 0..6 {
            let (a, b) = (ring[i], ring[(i + 1) % 6]);
            if a >= VERTEX_COUNT {
                return Err(TopologyError::OutOfRange(a, a));
            }
            if !VERTEX_ADJACENCY[a].contains(&b) {
                return Err(TopologyError::BrokenRing { tile, a, b });
            }
        }
    }

    for v in 0..VERTEX_COUNT {
        if !TILE_VERTICES.iter().any(|ring| ring.contains(&v)) {
            return Err(TopologyError::Orphan(v));
        }
    }

    // Tiles sharing a side must sit next to each other in axial coordinates
    for (tile, ring) in TILE_VERTICES.iter().enumerate() {
        let by_coord: HashSet<TileId> = TILE_COORDS[tile]
            .board_neighbors()
            .into_iter()
            .filter_map(tile_at)
            .collect();
        let by_side: HashSet<TileId> = (0..TILE_COUNT)
            .filter(|&other| {
                other != tile && TILE_VERTICES[other].iter().filter(|v| ring.contains(v)).count() == 2
            })
            .collect();
        if by_coord != by_side {
            return Err(TopologyError::MisplacedTile(tile));
        }
    }

    Ok(())
}
