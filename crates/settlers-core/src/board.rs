//! Game board representation: tiles, buildings on vertices, and roads.
//!
//! This module contains:
//! - Resource and tile types
//! - Building types (settlements, cities, roads)
//! - The beginner board layout
//! - Board query and (unchecked) mutation methods
//!
//! Legality of placements is decided in [`crate::placement`]; the mutation
//! methods here assume validation already happened.

use crate::hex::HexCoord;
use crate::topology::{self, Edge, TileId, VertexId, TILE_COORDS, TILE_COUNT, VERTEX_COUNT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Player identifier (0-3 for a 4-player game)
pub type PlayerId = u8;

/// The five commodities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Brick,
    Lumber,
    Ore,
    Grain,
    Wool,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Brick,
        Resource::Lumber,
        Resource::Ore,
        Resource::Grain,
        Resource::Wool,
    ];
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Brick => "brick",
            Resource::Lumber => "lumber",
            Resource::Ore => "ore",
            Resource::Grain => "grain",
            Resource::Wool => "wool",
        };
        f.write_str(name)
    }
}

/// Type of hex tile on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    /// Produces a resource when its number is rolled
    Resource(Resource),
    /// Desert - no production
    Desert,
}

/// A single hex tile on the board. Immutable once the board is set up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Position on the hex grid
    pub coord: HexCoord,
    /// What the tile produces
    pub kind: TileKind,
    /// Dice number that triggers production (2-12 except 7, None for desert)
    pub number: Option<u8>,
}

impl Tile {
    /// Create a new resource tile
    pub fn new_resource(coord: HexCoord, resource: Resource, number: u8) -> Self {
        assert!(coord.is_on_board(), "tile coordinate {coord} is off the board");
        assert!(
            (2..=12).contains(&number) && number != 7,
            "production number {number} must be 2-12 and not 7"
        );
        Self {
            coord,
            kind: TileKind::Resource(resource),
            number: Some(number),
        }
    }

    /// Create a desert tile
    pub fn desert(coord: HexCoord) -> Self {
        assert!(coord.is_on_board(), "tile coordinate {coord} is off the board");
        Self {
            coord,
            kind: TileKind::Desert,
            number: None,
        }
    }

    /// Get the resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self.kind {
            TileKind::Resource(r) => Some(r),
            TileKind::Desert => None,
        }
    }

    /// Whether this is the desert
    pub fn is_desert(&self) -> bool {
        matches!(self.kind, TileKind::Desert)
    }
}

/// What's built on a vertex (corner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VertexBuilding {
    /// Nothing built
    #[default]
    Empty,
    /// Settlement (1 VP, 1 resource per adjacent tile)
    Settlement(PlayerId),
    /// City (2 VP, `city_yield` resources per adjacent tile)
    City(PlayerId),
}

impl VertexBuilding {
    /// Get the owner of this building, if any
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            VertexBuilding::Empty => None,
            VertexBuilding::Settlement(p) | VertexBuilding::City(p) => Some(*p),
        }
    }

    /// Whether anything is built here
    pub fn is_built(&self) -> bool {
        !matches!(self, VertexBuilding::Empty)
    }

    /// Victory points provided by this building
    pub fn victory_points(&self) -> u32 {
        match self {
            VertexBuilding::Empty => 0,
            VertexBuilding::Settlement(_) => 1,
            VertexBuilding::City(_) => 2,
        }
    }

    /// Cards produced per roll, given the configured city yield
    pub fn resource_multiplier(&self, city_yield: u32) -> u32 {
        match self {
            VertexBuilding::Empty => 0,
            VertexBuilding::Settlement(_) => 1,
            VertexBuilding::City(_) => city_yield,
        }
    }
}

/// A road between two adjacent vertices. Never moved or removed once placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Road {
    pub edge: Edge,
    pub owner: PlayerId,
}

/// One player's entitlement from a roll, before the bank caps it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub player: PlayerId,
    pub resource: Resource,
    pub amount: u32,
}

/// The complete game board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    /// Tiles indexed by `TileId`
    tiles: Vec<Tile>,
    /// Buildings indexed by `VertexId`
    vertices: Vec<VertexBuilding>,
    /// Roads in placement order
    roads: Vec<Road>,
    /// Tile currently holding the robber
    robber: TileId,
}

impl Board {
    /// The fixed beginner layout
    pub fn beginner() -> Self {
        use Resource::*;

        // (resource, number) row by row, None for the desert
        let layout: [Option<(Resource, u8)>; TILE_COUNT] = [
            Some((Ore, 10)),
            Some((Wool, 2)),
            Some((Lumber, 9)),
            Some((Grain, 12)),
            Some((Brick, 6)),
            Some((Wool, 4)),
            Some((Brick, 10)),
            Some((Grain, 9)),
            Some((Lumber, 11)),
            None,
            Some((Lumber, 3)),
            Some((Ore, 8)),
            Some((Lumber, 8)),
            Some((Ore, 3)),
            Some((Grain, 4)),
            Some((Wool, 5)),
            Some((Brick, 5)),
            Some((Grain, 6)),
            Some((Wool, 11)),
        ];

        let tiles = TILE_COORDS
            .iter()
            .zip(layout)
            .map(|(&coord, entry)| match entry {
                Some((resource, number)) => Tile::new_resource(coord, resource, number),
                None => Tile::desert(coord),
            })
            .collect();

        Self::from_tiles(tiles)
    }

    /// Build a board from 19 tiles given in `TileId` order. The robber starts on
    /// the first desert, or on tile 0 if there is none.
    pub fn from_tiles(tiles: Vec<Tile>) -> Self {
        assert_eq!(tiles.len(), TILE_COUNT, "a board has exactly {TILE_COUNT} tiles");
        for (id, tile) in tiles.iter().enumerate() {
            assert_eq!(
                tile.coord, TILE_COORDS[id],
                "tile {id} must sit at {}",
                TILE_COORDS[id]
            );
        }
        let robber = tiles.iter().position(Tile::is_desert).unwrap_or(0);
        Self {
            tiles,
            vertices: vec![VertexBuilding::Empty; VERTEX_COUNT],
            roads: Vec::new(),
            robber,
        }
    }

    // ==================== Query Methods ====================

    /// All tiles in `TileId` order
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Get a tile by index
    pub fn tile(&self, id: TileId) -> &Tile {
        assert!(id < TILE_COUNT, "tile index {id} out of range 0..{TILE_COUNT}");
        &self.tiles[id]
    }

    /// Get a tile by axial coordinate
    pub fn tile_at(&self, coord: HexCoord) -> Option<&Tile> {
        topology::tile_at(coord).map(|id| &self.tiles[id])
    }

    /// Get building at a vertex
    pub fn vertex(&self, v: VertexId) -> VertexBuilding {
        assert!(v < VERTEX_COUNT, "vertex index {v} out of range 0..{VERTEX_COUNT}");
        self.vertices[v]
    }

    /// Buildings on every vertex
    pub fn vertices(&self) -> &[VertexBuilding] {
        &self.vertices
    }

    /// All roads in placement order
    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    /// The road on an edge, either orientation
    pub fn road_at(&self, v1: VertexId, v2: VertexId) -> Option<&Road> {
        let edge = Edge::new(v1, v2);
        self.roads.iter().find(|r| r.edge == edge)
    }

    /// Roads owned by a player
    pub fn roads_of(&self, player: PlayerId) -> impl Iterator<Item = &Road> {
        self.roads.iter().filter(move |r| r.owner == player)
    }

    /// Whether the player owns a road ending at `v`
    pub fn has_road_touching(&self, player: PlayerId, v: VertexId) -> bool {
        self.roads_of(player).any(|r| r.edge.touches(v))
    }

    /// Vertices holding a building of this player
    pub fn buildings_of(&self, player: PlayerId) -> impl Iterator<Item = (VertexId, VertexBuilding)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(move |(_, b)| b.owner() == Some(player))
            .map(|(v, b)| (v, *b))
    }

    /// Tile currently holding the robber
    pub fn robber(&self) -> TileId {
        self.robber
    }

    /// Resource tiles around a vertex
    pub fn tiles_at_vertex(&self, v: VertexId) -> Vec<&Tile> {
        topology::tiles_touching(v)
            .into_iter()
            .map(|id| &self.tiles[id])
            .collect()
    }

    /// Check if a vertex satisfies the distance rule (no adjacent buildings)
    pub fn satisfies_distance_rule(&self, v: VertexId) -> bool {
        topology::neighbors(v)
            .iter()
            .all(|&n| !self.vertices[n].is_built())
    }

    // ==================== Mutation Methods ====================

    /// Place a settlement (assumes validation already done)
    pub fn place_settlement(&mut self, v: VertexId, player: PlayerId) {
        self.vertices[v] = VertexBuilding::Settlement(player);
    }

    /// Upgrade a settlement to a city
    pub fn upgrade_to_city(&mut self, v: VertexId, player: PlayerId) {
        self.vertices[v] = VertexBuilding::City(player);
    }

    /// Place a road
    pub fn place_road(&mut self, edge: Edge, player: PlayerId) {
        self.roads.push(Road {
            edge,
            owner: player,
        });
    }

    /// Move the robber to a new tile
    pub fn move_robber(&mut self, tile: TileId) {
        assert!(tile < TILE_COUNT, "tile index {tile} out of range 0..{TILE_COUNT}");
        self.robber = tile;
    }

    // ==================== Resource Distribution ====================

    /// What each building is entitled to for a dice roll, in tile order then
    /// ring order. The robber's tile and the desert produce nothing.
    pub fn production_for_roll(&self, roll: u8, city_yield: u32) -> Vec<Production> {
        let mut production = Vec::new();

        for (id, tile) in self.tiles.iter().enumerate() {
            if tile.number != Some(roll) || id == self.robber {
                continue;
            }
            let resource = match tile.resource() {
                Some(r) => r,
                None => continue,
            };

            for v in topology::tile_vertices(id) {
                let building = self.vertices[v];
                if let Some(owner) = building.owner() {
                    production.push(Production {
                        player: owner,
                        resource,
                        amount: building.resource_multiplier(city_yield),
                    });
                }
            }
        }

        production
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::beginner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beginner_board_has_19_tiles() {
        let board = Board::beginner();
        assert_eq!(board.tiles().len(), 19);
    }

    #[test]
    fn test_beginner_board_has_one_desert_in_center() {
        let board = Board::beginner();
        let deserts: Vec<_> = board.tiles().iter().filter(|t| t.is_desert()).collect();
        assert_eq!(deserts.len(), 1);
        assert_eq!(deserts[0].coord, HexCoord::new(0, 0));
        assert_eq!(deserts[0].number, None);
    }

    #[test]
    fn test_robber_starts_on_desert() {
        let board = Board::beginner();
        assert!(board.tile(board.robber()).is_desert());
    }

    #[test]
    fn test_beginner_resource_counts() {
        let board = Board::beginner();
        let count = |r: Resource| board.tiles().iter().filter(|t| t.resource() == Some(r)).count();
        assert_eq!(count(Resource::Brick), 3);
        assert_eq!(count(Resource::Ore), 3);
        assert_eq!(count(Resource::Lumber), 4);
        assert_eq!(count(Resource::Grain), 4);
        assert_eq!(count(Resource::Wool), 4);
    }

    #[test]
    fn test_tile_at() {
        let board = Board::beginner();
        let tile = board.tile_at(HexCoord::new(2, 0)).unwrap();
        assert_eq!(tile.resource(), Some(Resource::Ore));
        assert_eq!(tile.number, Some(8));
        assert!(board.tile_at(HexCoord::new(-3, 0)).is_none());
    }

    #[test]
    #[should_panic(expected = "off the board")]
    fn test_off_board_tile_panics() {
        Tile::desert(HexCoord::new(3, -1));
    }

    #[test]
    #[should_panic(expected = "not 7")]
    fn test_seven_is_not_a_production_number() {
        Tile::new_resource(HexCoord::new(0, 0), Resource::Ore, 7);
    }

    #[test]
    fn test_distance_rule() {
        let mut board = Board::beginner();

        // Initially should satisfy distance rule
        assert!(board.satisfies_distance_rule(8));

        // Place a settlement
        board.place_settlement(8, 0);

        // Adjacent vertices should now fail distance rule
        for &adj in topology::neighbors(8) {
            assert!(
                !board.satisfies_distance_rule(adj),
                "Adjacent vertex should fail distance rule"
            );
        }
    }

    #[test]
    fn test_production_settlement_and_city() {
        let mut board = Board::beginner();

        // Tile 11 is the ore 8 at (2, 0); ring [20, 26, 32, 37, 31, 25]
        board.place_settlement(20, 0);
        board.place_settlement(37, 1);
        board.upgrade_to_city(37, 1);

        let production = board.production_for_roll(8, 2);
        assert!(production.contains(&Production {
            player: 0,
            resource: Resource::Ore,
            amount: 1
        }));
        assert!(production.contains(&Production {
            player: 1,
            resource: Resource::Ore,
            amount: 2
        }));
    }

    #[test]
    fn test_robber_blocks_production() {
        let mut board = Board::beginner();
        board.place_settlement(20, 0);

        assert!(!board.production_for_roll(8, 2).is_empty());

        board.move_robber(11);
        assert!(board.production_for_roll(8, 2).is_empty());
    }

    #[test]
    fn test_road_lookup_either_direction() {
        let mut board = Board::beginner();
        board.place_road(Edge::new(4, 8), 2);

        assert_eq!(board.road_at(8, 4).map(|r| r.owner), Some(2));
        assert!(board.has_road_touching(2, 4));
        assert!(!board.has_road_touching(1, 4));
        assert!(board.road_at(4, 0).is_none());
    }
}
