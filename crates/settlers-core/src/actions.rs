//! Game actions that players can take.
//!
//! This module defines every command the engine accepts as a value, so that
//! the AI and the presentation layer can enumerate and replay them, and the
//! events the engine records as those commands succeed.

use crate::bank::Grant;
use crate::board::PlayerId;
use crate::game::TurnPhase;
use crate::player::{DevelopmentCard, ResourceHand};
use crate::topology::{Edge, TileId, VertexId};
use serde::{Deserialize, Serialize};

/// All possible actions a player can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Place a settlement (free during setup)
    PlaceSettlement(VertexId),
    /// Upgrade a settlement to a city
    PlaceCity(VertexId),
    /// Place a road between two adjacent vertices
    PlaceRoad(VertexId, VertexId),
    /// Roll the dice (must be done at start of turn)
    RollDice,
    /// Buy a development card from the deck
    BuyDevelopmentCard,
    /// Play a development card (bookkeeping only)
    PlayDevelopmentCard(DevelopmentCard),
    /// Move the robber after a 7
    MoveRobber(TileId),
    /// End your turn
    EndTurn,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Dice were rolled
    DiceRolled {
        player: PlayerId,
        roll: (u8, u8),
        total: u8,
    },
    /// Resources were paid out for a roll
    ResourcesDistributed { grants: Vec<Grant> },
    /// A player lost half their hand to a 7
    CardsDiscarded {
        player: PlayerId,
        cards: ResourceHand,
    },
    /// Resources around a second setup settlement were granted
    SetupResourcesGranted {
        player: PlayerId,
        cards: ResourceHand,
    },
    SettlementBuilt {
        player: PlayerId,
        vertex: VertexId,
    },
    CityBuilt {
        player: PlayerId,
        vertex: VertexId,
    },
    RoadBuilt {
        player: PlayerId,
        edge: Edge,
    },
    DevelopmentCardPurchased { player: PlayerId },
    DevelopmentCardPlayed {
        player: PlayerId,
        card: DevelopmentCard,
    },
    RobberMoved {
        player: PlayerId,
        from: TileId,
        to: TileId,
    },
    /// The turn state machine moved
    PhaseChanged { from: TurnPhase, to: TurnPhase },
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },
    /// Longest Road bonus changed hands
    LongestRoadChanged {
        previous: Option<PlayerId>,
        current: Option<PlayerId>,
        length: u32,
    },
    GameWon {
        player: PlayerId,
        victory_points: u32,
    },
}
