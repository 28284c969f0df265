//! Settlers - a rules engine for the classic hex-board settlement game
//!
//! This crate provides the core game logic, including:
//! - Fixed index topology for the 19-tile board (vertices, tiles, edges)
//! - Board, player and bank state with conserved resource cards
//! - Placement validation for settlements, cities and roads
//! - A turn state machine with snake-order setup
//! - Longest road calculation
//! - A random legal-move AI
//!
//! # Architecture
//!
//! The engine is single-threaded and synchronous. All randomness goes through
//! [`random::RandomSource`] so games can be replayed from a seed or a script.
//! It can be compiled to:
//! - Native Rust for simulation and tests
//! - WebAssembly for a browser presentation layer (`wasm` feature)
//!
//! # Modules
//!
//! - [`topology`]: Vertex adjacency and tile-vertex tables
//! - [`hex`]: Axial coordinates for tiles
//! - [`board`]: Tiles, buildings, roads and the robber
//! - [`player`]: Player state, hands and development cards
//! - [`bank`]: Finite resource pools and distribution
//! - [`placement`]: Where pieces may go
//! - [`game`]: The engine and its turn state machine
//! - [`longest_road`]: Longest road search
//! - [`bot`]: Random AI
//! - [`intent`]: Build intent for point-and-click UIs

pub mod actions;
pub mod bank;
pub mod board;
pub mod bot;
pub mod config;
pub mod game;
pub mod hex;
pub mod intent;
pub mod longest_road;
pub mod placement;
pub mod player;
pub mod random;
pub mod topology;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent};
pub use bank::{Grant, ResourceBank};
pub use board::{Board, PlayerId, Resource, Road, Tile, TileKind, VertexBuilding};
pub use config::{ConfigError, RuleConfig};
pub use game::{GameEngine, GameSnapshot, GameState, RuleError, SetupError, SetupPlacing, TurnPhase};
pub use hex::HexCoord;
pub use intent::{BuildKind, ClickOutcome, PendingAction};
pub use player::{DevelopmentCard, Player, PlayerColor, ResourceHand};
pub use random::{RandomSource, ScriptedRandom};
pub use topology::{Edge, TileId, VertexId};
