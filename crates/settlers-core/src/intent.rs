//! Build intent for point-and-click presentation layers.
//!
//! A UI first selects what to build, then clicks vertices. The selection is a
//! single [`PendingAction`] held next to the turn state. It never moves the
//! phase machine by itself, it only routes clicks to the placement commands.

use crate::actions::GameAction;
use crate::game::{GameEngine, RuleError, SetupPlacing, TurnPhase};
use crate::random::RandomSource;
use crate::topology::VertexId;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What the next vertex click should build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PendingAction {
    #[default]
    None,
    Settlement,
    City,
    /// `from` is the first endpoint once it has been clicked
    Road { from: Option<VertexId> },
}

impl PendingAction {
    /// The build kind this intent is for
    pub fn kind(&self) -> Option<BuildKind> {
        match self {
            PendingAction::None => None,
            PendingAction::Settlement => Some(BuildKind::Settlement),
            PendingAction::City => Some(BuildKind::City),
            PendingAction::Road { .. } => Some(BuildKind::Road),
        }
    }
}

/// Kind of piece being built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildKind {
    Settlement,
    City,
    Road,
}

impl From<BuildKind> for PendingAction {
    fn from(kind: BuildKind) -> Self {
        match kind {
            BuildKind::Settlement => PendingAction::Settlement,
            BuildKind::City => PendingAction::City,
            BuildKind::Road => PendingAction::Road { from: None },
        }
    }
}

/// Result of a vertex click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickOutcome {
    /// Nothing was selected
    Ignored,
    /// First road endpoint stored; waiting for the second
    RoadStarted(VertexId),
    /// A piece was placed
    Placed(GameAction),
}

impl<R: RandomSource> GameEngine<R> {
    /// Current build intent
    pub fn pending_action(&self) -> PendingAction {
        self.state.pending
    }

    /// Toggle a build intent for the current player.
    ///
    /// Selecting the active kind again clears it. Another active intent has
    /// to be cleared first. Setup only allows the piece the snake order is
    /// waiting for. Returns whether the intent changed.
    pub fn select_action(&mut self, kind: BuildKind) -> bool {
        let allowed = match self.state.phase {
            TurnPhase::Setup { placing, .. } => matches!(
                (placing, kind),
                (SetupPlacing::Settlement, BuildKind::Settlement) | (SetupPlacing::Road, BuildKind::Road)
            ),
            TurnPhase::Building => true,
            _ => false,
        };
        if !allowed {
            return false;
        }

        let next = match self.state.pending.kind() {
            None => PendingAction::from(kind),
            Some(active) if active == kind => PendingAction::None,
            Some(_) => return false,
        };
        debug!(from = ?self.state.pending, to = ?next, "build intent changed");
        self.state.pending = next;
        true
    }

    /// Drop any build intent
    pub fn cancel_action(&mut self) {
        self.state.pending = PendingAction::None;
    }

    /// Route a vertex click to the selected placement. A failed placement
    /// clears the intent and reports why.
    pub fn click_vertex(&mut self, v: VertexId) -> Result<ClickOutcome, RuleError> {
        let player = self.state.current_player;
        match self.state.pending {
            PendingAction::None => Ok(ClickOutcome::Ignored),
            PendingAction::Settlement => {
                self.state.pending = PendingAction::None;
                self.place_settlement(player, v)?;
                Ok(ClickOutcome::Placed(GameAction::PlaceSettlement(v)))
            }
            PendingAction::City => {
                self.state.pending = PendingAction::None;
                self.place_city(player, v)?;
                Ok(ClickOutcome::Placed(GameAction::PlaceCity(v)))
            }
            PendingAction::Road { from: None } => {
                self.state.pending = PendingAction::Road { from: Some(v) };
                Ok(ClickOutcome::RoadStarted(v))
            }
            PendingAction::Road { from: Some(from) } => {
                self.state.pending = PendingAction::None;
                self.place_road(player, from, v)?;
                Ok(ClickOutcome::Placed(GameAction::PlaceRoad(from, v)))
            }
        }
    }
}
