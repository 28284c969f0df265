//! Core game engine and turn state machine.
//!
//! `GameEngine` owns the board, players, bank, development deck and turn
//! state, and is the only thing that mutates them. Every command is a total
//! function: rule violations come back as [`RuleError`] and leave the state
//! untouched. Out-of-range vertex or tile indices are contract violations and
//! panic.

use crate::actions::{GameAction, GameEvent};
use crate::bank::{Grant, ResourceBank};
use crate::board::{Board, PlayerId, Tile, VertexBuilding};
use crate::config::{ConfigError, RuleConfig};
use crate::hex::HexCoord;
use crate::intent::{BuildKind, PendingAction};
use crate::longest_road::longest_road;
use crate::placement::{self, PlacementMode};
use crate::player::{costs, DevelopmentCard, Player, ResourceHand, SETTLEMENT_PIECES};
use crate::random::RandomSource;
use crate::topology::{self, Edge, TileId, TopologyError, VertexId, TILE_COUNT};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// Turn phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Initial placement, snake order
    Setup {
        /// Which lap of setup (1 or 2)
        round: u8,
        /// What we're currently placing
        placing: SetupPlacing,
    },

    /// Before rolling dice at start of turn
    PreRoll,

    /// Dice rolled, production and discards being applied
    PostRoll,

    /// Can build, buy and play cards, end turn
    Building,

    /// Game is over
    Finished { winner: PlayerId },
}

/// What we're placing during setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupPlacing {
    Settlement,
    Road,
}

/// Ordinary rule violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RuleError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("Invalid placement location")]
    InvalidLocation,

    #[error("Cannot afford this")]
    CannotAfford,

    #[error("No pieces remaining")]
    NoPiecesRemaining,

    #[error("No development cards left in deck")]
    EmptyDeck,

    #[error("Don't have that card")]
    NoSuchCard,

    #[error("Card was bought this turn")]
    CardNotYetPlayable,

    #[error("A development card was already played this turn")]
    DevelopmentCardAlreadyPlayed,

    #[error("The robber can only be moved after a 7")]
    RobberNotPending,

    #[error("Game is over")]
    GameOver,
}

/// Errors creating a game
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("a game needs 2 to 4 players, got {0}")]
    PlayerCount(usize),

    #[error("invalid rules: {0}")]
    Config(#[from] ConfigError),

    #[error("inconsistent board topology: {0}")]
    Topology(#[from] TopologyError),
}

/// Turn bookkeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Current player index
    pub current_player: PlayerId,
    /// Current turn phase
    pub phase: TurnPhase,
    /// Build intent selected by the presentation layer
    pub pending: PendingAction,
    /// Turn number (0 during setup, starts at 1)
    pub turn_number: u32,
    /// Last dice roll this turn
    pub dice_roll: Option<(u8, u8)>,
    /// Whether a dev card has been played this turn
    pub dev_card_played_this_turn: bool,
    /// A 7 was rolled and the robber has not been moved yet
    pub robber_pending: bool,
    /// Settlement placed this setup turn, which the setup road must touch
    pub setup_settlement: Option<VertexId>,
}

impl GameState {
    fn new() -> Self {
        Self {
            current_player: 0,
            phase: TurnPhase::Setup {
                round: 1,
                placing: SetupPlacing::Settlement,
            },
            pending: PendingAction::None,
            turn_number: 0,
            dice_roll: None,
            dev_card_played_this_turn: false,
            robber_pending: false,
            setup_settlement: None,
        }
    }

    /// Whether the game is still in the setup phase
    pub fn is_setup(&self) -> bool {
        matches!(self.phase, TurnPhase::Setup { .. })
    }
}

/// Read-only view of the whole game for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot<'a> {
    pub board: &'a Board,
    pub players: &'a [Player],
    pub bank: ResourceHand,
    pub state: &'a GameState,
    pub longest_roads: Vec<u32>,
    pub victory_points: Vec<u32>,
    pub dev_cards_left: usize,
}

/// The rules engine
#[derive(Debug, Clone)]
pub struct GameEngine<R = StdRng> {
    pub(crate) board: Board,
    pub(crate) players: Vec<Player>,
    pub(crate) bank: ResourceBank,
    pub(crate) dev_card_deck: Vec<DevelopmentCard>,
    pub(crate) config: RuleConfig,
    pub(crate) state: GameState,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) random: R,
}

impl GameEngine<StdRng> {
    /// A game with standard rules and an entropy-seeded random source
    pub fn new(player_names: Vec<String>) -> Result<Self, SetupError> {
        Self::with_random(player_names, RuleConfig::default(), StdRng::from_entropy())
    }

    /// A reproducible game with standard rules
    pub fn seeded(player_names: Vec<String>, seed: u64) -> Result<Self, SetupError> {
        Self::with_random(player_names, RuleConfig::default(), StdRng::seed_from_u64(seed))
    }
}

impl<R: RandomSource> GameEngine<R> {
    /// Create a game on the beginner board with the given rules and random source
    pub fn with_random(
        player_names: Vec<String>,
        config: RuleConfig,
        mut random: R,
    ) -> Result<Self, SetupError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_names.len()) {
            return Err(SetupError::PlayerCount(player_names.len()));
        }
        config.validate()?;
        topology::validate()?;

        let players: Vec<Player> = player_names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Player::new(i as PlayerId, name))
            .collect();

        let dev_card_deck = DevelopmentCard::shuffled_deck(&mut random);

        info!(players = players.len(), "new game");

        Ok(Self {
            board: Board::beginner(),
            players,
            bank: ResourceBank::new(config.bank_size),
            dev_card_deck,
            config,
            state: GameState::new(),
            events: Vec::new(),
            random,
        })
    }

    // ==================== Queries ====================

    /// Get the number of players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by ID
    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    /// All players in seat order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// The board
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Rules in force
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Turn bookkeeping
    pub fn get_game_state(&self) -> &GameState {
        &self.state
    }

    /// Current turn phase
    pub fn phase(&self) -> TurnPhase {
        self.state.phase
    }

    /// Whose turn it is
    pub fn current_player(&self) -> PlayerId {
        self.state.current_player
    }

    /// Tile at an axial coordinate, if it is on the board
    pub fn get_tile_at(&self, coord: HexCoord) -> Option<&Tile> {
        self.board.tile_at(coord)
    }

    /// Building on a vertex
    pub fn get_vertex(&self, v: VertexId) -> VertexBuilding {
        self.board.vertex(v)
    }

    /// Cards of each kind left in the bank
    pub fn get_bank_counts(&self) -> ResourceHand {
        self.bank.counts()
    }

    /// Development cards left to draw
    pub fn dev_cards_left(&self) -> usize {
        self.dev_card_deck.len()
    }

    /// Length of a player's longest road
    pub fn get_player_longest_road(&self, player: PlayerId) -> u32 {
        longest_road(&self.board, player)
    }

    /// Total victory points for a player
    pub fn victory_points(&self, player: PlayerId) -> u32 {
        self.get_player(player)
            .map(|p| p.victory_points(self.config.longest_road_bonus))
            .unwrap_or(0)
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        matches!(self.state.phase, TurnPhase::Finished { .. })
    }

    /// Get the winner if the game is finished
    pub fn winner(&self) -> Option<PlayerId> {
        match self.state.phase {
            TurnPhase::Finished { winner } => Some(winner),
            _ => None,
        }
    }

    /// Whether every resource card is accounted for
    pub fn is_bank_conserved(&self) -> bool {
        self.bank.is_conserved(self.players.iter().map(|p| &p.resources))
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whole-game view for the presentation layer
    pub fn snapshot(&self) -> GameSnapshot<'_> {
        GameSnapshot {
            board: &self.board,
            players: &self.players,
            bank: self.bank.counts(),
            state: &self.state,
            longest_roads: self
                .players
                .iter()
                .map(|p| longest_road(&self.board, p.id))
                .collect(),
            victory_points: self.players.iter().map(|p| self.victory_points(p.id)).collect(),
            dev_cards_left: self.dev_card_deck.len(),
        }
    }

    /// Whether the player may place a settlement on `v` right now
    pub fn is_valid_settlement_spot(&self, player: PlayerId, v: VertexId) -> bool {
        match self.placement_mode(player, BuildKind::Settlement) {
            Ok(mode) => placement::is_valid_settlement_spot(&self.board, &self.players[player as usize], v, mode),
            Err(_) => false,
        }
    }

    /// Whether the player may upgrade `v` to a city right now
    pub fn is_valid_city_spot(&self, player: PlayerId, v: VertexId) -> bool {
        match self.placement_mode(player, BuildKind::City) {
            Ok(mode) => placement::is_valid_city_spot(&self.board, &self.players[player as usize], v, mode),
            Err(_) => false,
        }
    }

    /// Whether the player may place a road between `v1` and `v2` right now
    pub fn is_valid_road_spot(&self, player: PlayerId, v1: VertexId, v2: VertexId) -> bool {
        match self.placement_mode(player, BuildKind::Road) {
            Ok(mode) => {
                placement::is_valid_road_spot(&self.board, &self.players[player as usize], v1, v2, mode)
            }
            Err(_) => false,
        }
    }

    /// Every vertex where the player may place a settlement right now
    pub fn get_valid_settlement_spots(&self, player: PlayerId) -> Vec<VertexId> {
        match self.placement_mode(player, BuildKind::Settlement) {
            Ok(mode) => placement::valid_settlement_spots(&self.board, &self.players[player as usize], mode),
            Err(_) => Vec::new(),
        }
    }

    /// Every settlement the player may upgrade right now
    pub fn get_valid_city_spots(&self, player: PlayerId) -> Vec<VertexId> {
        match self.placement_mode(player, BuildKind::City) {
            Ok(mode) => placement::valid_city_spots(&self.board, &self.players[player as usize], mode),
            Err(_) => Vec::new(),
        }
    }

    /// Every road the player may place right now, optionally from one vertex
    pub fn get_valid_road_spots(&self, player: PlayerId, from: Option<VertexId>) -> Vec<Edge> {
        match self.placement_mode(player, BuildKind::Road) {
            Ok(mode) => placement::valid_road_spots(&self.board, &self.players[player as usize], from, mode),
            Err(_) => Vec::new(),
        }
    }

    // ==================== Commands ====================

    /// Roll for the current player, pay out production (or apply the 7), and
    /// move on to building.
    pub fn roll_dice(&mut self) -> Result<(u8, u8), RuleError> {
        if self.is_finished() {
            return Err(RuleError::GameOver);
        }
        if self.state.phase != TurnPhase::PreRoll {
            return Err(RuleError::InvalidPhase);
        }

        let player = self.state.current_player;
        let die1 = self.random.roll_die();
        let die2 = self.random.roll_die();
        let total = die1 + die2;

        self.state.dice_roll = Some((die1, die2));
        self.set_phase(TurnPhase::PostRoll);
        debug!(player, die1, die2, total, "dice rolled");
        self.events.push(GameEvent::DiceRolled {
            player,
            roll: (die1, die2),
            total,
        });

        if total == 7 {
            self.discard_on_seven();
            self.state.robber_pending = true;
        } else {
            self.distribute(total);
        }

        self.set_phase(TurnPhase::Building);
        Ok((die1, die2))
    }

    /// Pay every building on a tile numbered `roll`, capped by the bank
    pub fn distribute(&mut self, roll: u8) -> Vec<Grant> {
        let production = self.board.production_for_roll(roll, self.config.city_yield);
        let grants = self.bank.distribute(&production, &mut self.players);
        if !grants.is_empty() {
            debug!(roll, grants = grants.len(), "resources distributed");
            self.events.push(GameEvent::ResourcesDistributed {
                grants: grants.clone(),
            });
        }
        grants
    }

    /// Every player at or above the discard threshold loses half their hand
    pub fn discard_on_seven(&mut self) -> Vec<(PlayerId, ResourceHand)> {
        let threshold = self.config.discard_threshold;
        let mut discards = Vec::new();

        for player in self.players.iter_mut() {
            if player.resources.total() < threshold {
                continue;
            }
            let cards = self.bank.discard_half(&mut player.resources, &mut self.random);
            debug!(player = player.id, count = cards.total(), "discarded on 7");
            discards.push((player.id, cards));
        }

        for (player, cards) in &discards {
            self.events.push(GameEvent::CardsDiscarded {
                player: *player,
                cards: *cards,
            });
        }
        discards
    }

    /// Take a full cost from the player into the bank, or nothing
    pub fn pay(&mut self, player: PlayerId, cost: &ResourceHand) -> bool {
        match self.players.get_mut(player as usize) {
            Some(p) => self.bank.pay(&mut p.resources, cost),
            None => false,
        }
    }

    /// Place a settlement; free during setup
    pub fn place_settlement(&mut self, player: PlayerId, v: VertexId) -> Result<(), RuleError> {
        let mode = self.placement_mode(player, BuildKind::Settlement)?;
        placement::check_settlement(&self.board, &self.players[player as usize], v, mode)?;
        self.charge(player, &costs::settlement(), mode)?;

        self.players[player as usize].use_settlement();
        self.board.place_settlement(v, player);
        debug!(player, vertex = v, "settlement built");
        self.events.push(GameEvent::SettlementBuilt { player, vertex: v });

        if let TurnPhase::Setup { round, .. } = self.state.phase {
            self.state.setup_settlement = Some(v);
            self.set_phase(TurnPhase::Setup {
                round,
                placing: SetupPlacing::Road,
            });
        } else {
            // Building can break an opponent's longest road
            self.check_longest_road();
            self.check_win_condition();
        }
        Ok(())
    }

    /// Upgrade one of the player's settlements to a city
    pub fn place_city(&mut self, player: PlayerId, v: VertexId) -> Result<(), RuleError> {
        let mode = self.placement_mode(player, BuildKind::City)?;
        placement::check_city(&self.board, &self.players[player as usize], v, mode)?;
        self.charge(player, &costs::city(), mode)?;

        self.players[player as usize].use_city();
        self.board.upgrade_to_city(v, player);
        debug!(player, vertex = v, "city built");
        self.events.push(GameEvent::CityBuilt { player, vertex: v });

        self.check_win_condition();
        Ok(())
    }

    /// Place a road; during setup it must touch this turn's settlement
    pub fn place_road(&mut self, player: PlayerId, v1: VertexId, v2: VertexId) -> Result<(), RuleError> {
        let mode = self.placement_mode(player, BuildKind::Road)?;
        placement::check_road(&self.board, &self.players[player as usize], v1, v2, mode)?;
        self.charge(player, &costs::road(), mode)?;

        let edge = Edge::new(v1, v2);
        self.players[player as usize].use_road();
        self.board.place_road(edge, player);
        debug!(player, a = edge.a, b = edge.b, "road built");
        self.events.push(GameEvent::RoadBuilt { player, edge });

        if self.state.is_setup() {
            self.finish_setup_turn(player);
        } else {
            self.check_longest_road();
            self.check_win_condition();
        }
        Ok(())
    }

    /// Buy a development card; it becomes playable next turn
    pub fn buy_development_card(&mut self, player: PlayerId) -> Result<DevelopmentCard, RuleError> {
        self.ensure_turn(player)?;
        if self.state.phase != TurnPhase::Building {
            return Err(RuleError::InvalidPhase);
        }
        if self.dev_card_deck.is_empty() {
            return Err(RuleError::EmptyDeck);
        }
        let p = &mut self.players[player as usize];
        if !self.bank.pay(&mut p.resources, &costs::development_card()) {
            return Err(RuleError::CannotAfford);
        }
        let card = self.dev_card_deck.pop().ok_or(RuleError::EmptyDeck)?;
        p.dev_cards_bought_this_turn.push(card);

        debug!(player, ?card, "development card bought");
        self.events.push(GameEvent::DevelopmentCardPurchased { player });

        self.check_win_condition();
        Ok(card)
    }

    /// Play a development card. Only the bookkeeping is applied: the card
    /// leaves the hand, knights are counted, and one card per turn.
    pub fn play_development_card(&mut self, player: PlayerId, card: DevelopmentCard) -> Result<(), RuleError> {
        self.ensure_turn(player)?;
        match self.state.phase {
            TurnPhase::Building => {}
            TurnPhase::PreRoll if card == DevelopmentCard::Knight => {}
            _ => return Err(RuleError::InvalidPhase),
        }
        if self.state.dev_card_played_this_turn {
            return Err(RuleError::DevelopmentCardAlreadyPlayed);
        }
        if !card.is_playable() {
            return Err(RuleError::NoSuchCard);
        }

        let p = &mut self.players[player as usize];
        if !p.play_dev_card(card) {
            if p.dev_cards_bought_this_turn.contains(&card) {
                return Err(RuleError::CardNotYetPlayable);
            }
            return Err(RuleError::NoSuchCard);
        }

        self.state.dev_card_played_this_turn = true;
        debug!(player, ?card, "development card played");
        self.events.push(GameEvent::DevelopmentCardPlayed { player, card });
        Ok(())
    }

    /// Move the robber once after a 7 was rolled this turn
    pub fn move_robber(&mut self, player: PlayerId, tile: TileId) -> Result<(), RuleError> {
        assert!(tile < TILE_COUNT, "tile index {tile} out of range 0..{TILE_COUNT}");
        self.ensure_turn(player)?;
        if self.state.phase != TurnPhase::Building {
            return Err(RuleError::InvalidPhase);
        }
        if !self.state.robber_pending {
            return Err(RuleError::RobberNotPending);
        }
        let from = self.board.robber();
        if tile == from {
            return Err(RuleError::InvalidLocation);
        }

        self.board.move_robber(tile);
        self.state.robber_pending = false;
        debug!(player, from, to = tile, "robber moved");
        self.events.push(GameEvent::RobberMoved {
            player,
            from,
            to: tile,
        });
        Ok(())
    }

    /// End the current player's turn and pass to the next player
    pub fn end_turn(&mut self) -> Result<PlayerId, RuleError> {
        if self.is_finished() {
            return Err(RuleError::GameOver);
        }
        if self.state.phase != TurnPhase::Building {
            return Err(RuleError::InvalidPhase);
        }

        let player = self.state.current_player;
        self.players[player as usize].end_turn();

        let next_player = (player + 1) % self.player_count() as PlayerId;
        self.state.current_player = next_player;
        self.state.turn_number += 1;
        self.state.dice_roll = None;
        self.state.dev_card_played_this_turn = false;
        self.state.robber_pending = false;
        self.state.pending = PendingAction::None;
        self.set_phase(TurnPhase::PreRoll);

        debug!(player, next_player, "turn ended");
        self.events.push(GameEvent::TurnEnded { player, next_player });
        Ok(next_player)
    }

    // ==================== Action interface ====================

    /// Every legal action for the current player
    pub fn legal_actions(&self) -> Vec<GameAction> {
        let mut actions = Vec::new();
        let player = self.state.current_player;
        let p = &self.players[player as usize];

        match self.state.phase {
            TurnPhase::Finished { .. } | TurnPhase::PostRoll => {}

            TurnPhase::Setup { placing, .. } => match placing {
                SetupPlacing::Settlement => {
                    for v in self.get_valid_settlement_spots(player) {
                        actions.push(GameAction::PlaceSettlement(v));
                    }
                }
                SetupPlacing::Road => {
                    for edge in self.get_valid_road_spots(player, None) {
                        actions.push(GameAction::PlaceRoad(edge.a, edge.b));
                    }
                }
            },

            TurnPhase::PreRoll => {
                actions.push(GameAction::RollDice);

                // Can play knight before rolling
                if !self.state.dev_card_played_this_turn
                    && p.has_playable_dev_card(DevelopmentCard::Knight)
                {
                    actions.push(GameAction::PlayDevelopmentCard(DevelopmentCard::Knight));
                }
            }

            TurnPhase::Building => {
                // Can always end turn
                actions.push(GameAction::EndTurn);

                for edge in self.get_valid_road_spots(player, None) {
                    actions.push(GameAction::PlaceRoad(edge.a, edge.b));
                }
                for v in self.get_valid_settlement_spots(player) {
                    actions.push(GameAction::PlaceSettlement(v));
                }
                for v in self.get_valid_city_spots(player) {
                    actions.push(GameAction::PlaceCity(v));
                }

                if p.can_afford_dev_card() && !self.dev_card_deck.is_empty() {
                    actions.push(GameAction::BuyDevelopmentCard);
                }

                if !self.state.dev_card_played_this_turn {
                    let mut seen = Vec::new();
                    for card in &p.dev_cards {
                        if card.is_playable() && !seen.contains(card) {
                            seen.push(*card);
                            actions.push(GameAction::PlayDevelopmentCard(*card));
                        }
                    }
                }

                if self.state.robber_pending {
                    for tile in 0..TILE_COUNT {
                        if tile != self.board.robber() {
                            actions.push(GameAction::MoveRobber(tile));
                        }
                    }
                }
            }
        }

        actions
    }

    /// Apply an action for the current player
    pub fn apply(&mut self, action: GameAction) -> Result<(), RuleError> {
        let player = self.state.current_player;
        match action {
            GameAction::PlaceSettlement(v) => self.place_settlement(player, v),
            GameAction::PlaceCity(v) => self.place_city(player, v),
            GameAction::PlaceRoad(v1, v2) => self.place_road(player, v1, v2),
            GameAction::RollDice => self.roll_dice().map(|_| ()),
            GameAction::BuyDevelopmentCard => self.buy_development_card(player).map(|_| ()),
            GameAction::PlayDevelopmentCard(card) => self.play_development_card(player, card),
            GameAction::MoveRobber(tile) => self.move_robber(player, tile),
            GameAction::EndTurn => self.end_turn().map(|_| ()),
        }
    }

    // ==================== Helper Methods ====================

    pub(crate) fn ensure_turn(&self, player: PlayerId) -> Result<(), RuleError> {
        if self.is_finished() {
            return Err(RuleError::GameOver);
        }
        if player != self.state.current_player {
            return Err(RuleError::NotYourTurn);
        }
        Ok(())
    }

    /// Which placement rules apply to this player right now, if any
    fn placement_mode(&self, player: PlayerId, kind: BuildKind) -> Result<PlacementMode, RuleError> {
        self.ensure_turn(player)?;
        match (self.state.phase, kind) {
            (
                TurnPhase::Setup {
                    placing: SetupPlacing::Settlement,
                    ..
                },
                BuildKind::Settlement,
            ) => Ok(PlacementMode::Setup { anchor: None }),
            (
                TurnPhase::Setup {
                    placing: SetupPlacing::Road,
                    ..
                },
                BuildKind::Road,
            ) => Ok(PlacementMode::Setup {
                anchor: self.state.setup_settlement,
            }),
            (TurnPhase::Building, _) => Ok(PlacementMode::Main),
            _ => Err(RuleError::InvalidPhase),
        }
    }

    /// Deduct a cost into the bank. Setup placements cost nothing and leave
    /// both the hand and the bank untouched.
    fn charge(&mut self, player: PlayerId, cost: &ResourceHand, mode: PlacementMode) -> Result<(), RuleError> {
        if let PlacementMode::Setup { .. } = mode {
            return Ok(());
        }
        if self.bank.pay(&mut self.players[player as usize].resources, cost) {
            Ok(())
        } else {
            Err(RuleError::CannotAfford)
        }
    }

    fn set_phase(&mut self, to: TurnPhase) {
        let from = self.state.phase;
        if from == to {
            return;
        }
        self.state.phase = to;
        debug!(?from, ?to, "phase changed");
        self.events.push(GameEvent::PhaseChanged { from, to });
    }

    /// After a setup road: pay the second settlement's surroundings and move
    /// to the next seat in snake order.
    fn finish_setup_turn(&mut self, player: PlayerId) {
        let TurnPhase::Setup { round, .. } = self.state.phase else {
            return;
        };

        if let (2, Some(v)) = (round, self.state.setup_settlement) {
            let wanted: ResourceHand = self
                .board
                .tiles_at_vertex(v)
                .iter()
                .filter_map(|tile| tile.resource())
                .collect();
            let cards = self
                .bank
                .grant_hand(&mut self.players[player as usize].resources, &wanted);
            if !cards.is_empty() {
                self.events.push(GameEvent::SetupResourcesGranted { player, cards });
            }
        }

        self.state.setup_settlement = None;
        self.advance_setup_phase(round);
    }

    fn advance_setup_phase(&mut self, round: u8) {
        let player_count = self.player_count() as PlayerId;

        // Snake draft order: 0,1,2,3,3,2,1,0
        let placements_done = self.count_setup_placements();

        if placements_done >= player_count as u32 * 2 {
            // Setup complete; the last seat of the snake is the first player
            self.state.turn_number = 1;
            self.set_phase(TurnPhase::PreRoll);
            info!(first_player = self.state.current_player, "setup complete");
        } else if round == 1 && placements_done >= player_count as u32 {
            // End of round 1, stay on same player for round 2
            self.set_phase(TurnPhase::Setup {
                round: 2,
                placing: SetupPlacing::Settlement,
            });
        } else if round == 1 {
            self.state.current_player = (self.state.current_player + 1) % player_count;
            self.set_phase(TurnPhase::Setup {
                round: 1,
                placing: SetupPlacing::Settlement,
            });
        } else {
            self.state.current_player = (self.state.current_player + player_count - 1) % player_count;
            self.set_phase(TurnPhase::Setup {
                round: 2,
                placing: SetupPlacing::Settlement,
            });
        }
    }

    fn count_setup_placements(&self) -> u32 {
        self.players
            .iter()
            .map(|p| SETTLEMENT_PIECES - p.settlements_remaining)
            .sum()
    }

    fn check_longest_road(&mut self) {
        let mut longest_length = 0;
        let mut longest_players: Vec<PlayerId> = Vec::new();

        for player in &self.players {
            let length = longest_road(&self.board, player.id);
            if length >= self.config.min_longest_road {
                if length > longest_length {
                    longest_length = length;
                    longest_players = vec![player.id];
                } else if length == longest_length {
                    longest_players.push(player.id);
                }
            }
        }

        let current_holder = self.players.iter().find(|p| p.has_longest_road).map(|p| p.id);

        // Ties keep the current holder; a tie without one awards nobody
        let new_holder = match longest_players.as_slice() {
            [only] => Some(*only),
            tied if current_holder.is_some_and(|h| tied.contains(&h)) => current_holder,
            _ => None,
        };

        if new_holder != current_holder {
            for player in &mut self.players {
                player.has_longest_road = Some(player.id) == new_holder;
            }
            info!(previous = ?current_holder, current = ?new_holder, length = longest_length, "longest road changed");
            self.events.push(GameEvent::LongestRoadChanged {
                previous: current_holder,
                current: new_holder,
                length: longest_length,
            });
        }
    }

    /// Only the player whose turn it is can win
    fn check_win_condition(&mut self) {
        let player = self.state.current_player;
        let vp = self.victory_points(player);
        if vp >= self.config.victory_points_to_win {
            self.set_phase(TurnPhase::Finished { winner: player });
            self.state.pending = PendingAction::None;
            info!(winner = player, victory_points = vp, "game won");
            self.events.push(GameEvent::GameWon {
                player,
                victory_points: vp,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Resource;
    use crate::random::ScriptedRandom;
    use pretty_assertions::assert_eq;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("P{i}")).collect()
    }

    fn scripted(n: usize, random: ScriptedRandom) -> GameEngine<ScriptedRandom> {
        GameEngine::with_random(names(n), RuleConfig::default(), random).unwrap()
    }

    /// Setup placements for two players: settlements 0, 8 (lap 1) then 20, 37
    /// (lap 2), each with a road away from the settlement.
    fn two_player_setup(game: &mut GameEngine<ScriptedRandom>) {
        let laps: [(PlayerId, VertexId, VertexId); 4] = [(0, 0, 3), (1, 13, 9), (1, 20, 15), (0, 37, 31)];
        for (player, settlement, road_to) in laps {
            game.place_settlement(player, settlement).unwrap();
            game.place_road(player, settlement, road_to).unwrap();
        }
    }

    #[test]
    fn test_new_game_starts_in_setup() {
        let game = GameEngine::seeded(names(4), 1).unwrap();
        assert_eq!(
            game.phase(),
            TurnPhase::Setup {
                round: 1,
                placing: SetupPlacing::Settlement
            }
        );
        assert_eq!(game.current_player(), 0);
        assert_eq!(game.dev_cards_left(), 25);
        assert_eq!(game.get_bank_counts(), ResourceHand::uniform(19));
    }

    #[test]
    fn test_player_count_bounds() {
        assert_eq!(GameEngine::new(names(1)).unwrap_err(), SetupError::PlayerCount(1));
        assert_eq!(GameEngine::new(names(5)).unwrap_err(), SetupError::PlayerCount(5));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RuleConfig {
            city_yield: 0,
            ..RuleConfig::default()
        };
        let err = GameEngine::with_random(names(2), config, ScriptedRandom::default()).unwrap_err();
        assert_eq!(err, SetupError::Config(ConfigError::ZeroCityYield));
    }

    #[test]
    fn test_setup_actions_are_settlements() {
        let game = GameEngine::seeded(names(3), 7).unwrap();
        let actions = game.legal_actions();
        assert_eq!(actions.len(), 54);
        assert!(actions
            .iter()
            .all(|a| matches!(a, GameAction::PlaceSettlement(_))));
    }

    #[test]
    fn test_setup_road_before_settlement_rejected() {
        let mut game = scripted(2, ScriptedRandom::default());
        assert_eq!(game.place_road(0, 0, 3), Err(RuleError::InvalidPhase));
        assert_eq!(game.place_city(0, 0), Err(RuleError::InvalidPhase));
        assert_eq!(game.place_settlement(1, 0), Err(RuleError::NotYourTurn));
    }

    #[test]
    fn test_setup_placements_are_free() {
        let mut game = scripted(2, ScriptedRandom::default());
        game.place_settlement(0, 0).unwrap();
        assert_eq!(game.players()[0].resources, ResourceHand::new());
        assert_eq!(game.get_bank_counts(), ResourceHand::uniform(19));
        assert_eq!(game.players()[0].settlements_remaining, 4);

        // Road must touch the settlement just placed
        assert_eq!(game.place_road(0, 4, 8), Err(RuleError::InvalidLocation));
        game.place_road(0, 0, 4).unwrap();
        assert_eq!(game.players()[0].roads_remaining, 14);
        assert!(game.is_bank_conserved());
    }

    #[test]
    fn test_snake_order_and_second_lap_grant() {
        let mut game = scripted(2, ScriptedRandom::default());
        two_player_setup(&mut game);

        assert_eq!(game.phase(), TurnPhase::PreRoll);
        assert_eq!(game.current_player(), 0);
        assert_eq!(game.get_game_state().turn_number, 1);

        // Player 1's second settlement at 20 touches brick 10 (tile 6) and ore 8 (tile 11)
        assert_eq!(
            game.players()[1].resources,
            ResourceHand::with_amounts(1, 0, 1, 0, 0)
        );
        // Player 0's second settlement at 37 touches ore 8 (tile 11) and wool 5 (tile 15)
        assert_eq!(
            game.players()[0].resources,
            ResourceHand::with_amounts(0, 0, 1, 0, 1)
        );
        assert!(game.is_bank_conserved());
    }

    #[test]
    fn test_roll_outside_pre_roll_rejected() {
        let mut game = scripted(2, ScriptedRandom::default());
        assert_eq!(game.roll_dice(), Err(RuleError::InvalidPhase));
        assert_eq!(game.end_turn(), Err(RuleError::InvalidPhase));
    }

    #[test]
    fn test_roll_moves_to_building_and_distributes() {
        let mut random = ScriptedRandom::default();
        random.push_roll(5, 3);
        let mut game = scripted(2, random);
        two_player_setup(&mut game);
        game.drain_events();

        let before = game.players()[1].resources.ore;
        assert_eq!(game.roll_dice(), Ok((5, 3)));
        assert_eq!(game.phase(), TurnPhase::Building);

        // Settlement 20 (player 1) and 37 (player 0) are both on ore 8
        assert_eq!(game.players()[1].resources.ore, before + 1);
        assert!(game.is_bank_conserved());

        let events = game.drain_events();
        assert!(events.contains(&GameEvent::PhaseChanged {
            from: TurnPhase::PreRoll,
            to: TurnPhase::PostRoll
        }));
        assert!(events.contains(&GameEvent::PhaseChanged {
            from: TurnPhase::PostRoll,
            to: TurnPhase::Building
        }));

        // Second roll in the same turn is rejected
        assert_eq!(game.roll_dice(), Err(RuleError::InvalidPhase));
    }

    #[test]
    fn test_end_turn_cycles_players() {
        let mut random = ScriptedRandom::default();
        random.push_roll(1, 1);
        random.push_roll(1, 1);
        let mut game = scripted(2, random);
        two_player_setup(&mut game);

        game.roll_dice().unwrap();
        assert_eq!(game.end_turn(), Ok(1));
        assert_eq!(game.phase(), TurnPhase::PreRoll);
        assert_eq!(game.current_player(), 1);

        game.roll_dice().unwrap();
        assert_eq!(game.end_turn(), Ok(0));
        assert_eq!(game.get_game_state().turn_number, 3);
    }

    #[test]
    fn test_building_requires_building_phase() {
        let mut game = scripted(2, ScriptedRandom::default());
        two_player_setup(&mut game);
        game.players[0].resources = ResourceHand::uniform(5);

        // Pre-roll: no building
        assert_eq!(game.place_road(0, 3, 7), Err(RuleError::InvalidPhase));
        assert!(!game.is_valid_road_spot(0, 3, 7));
        assert!(game.get_valid_road_spots(0, None).is_empty());
    }

    #[test]
    fn test_main_phase_builds_pay_the_bank() {
        let mut random = ScriptedRandom::default();
        random.push_roll(1, 1);
        let mut game = scripted(2, random);
        two_player_setup(&mut game);
        game.roll_dice().unwrap();

        let grant = ResourceHand::with_amounts(3, 3, 3, 3, 3);
        game.bank.grant_hand(&mut game.players[0].resources, &grant);

        // Road from 3 to 7 extends the setup road 0-3
        game.place_road(0, 3, 7).unwrap();
        // Settlement at 7 is two steps from 0
        game.place_settlement(0, 7).unwrap();
        game.place_city(0, 7).unwrap();

        let p = &game.players()[0];
        assert_eq!(p.roads_remaining, 12);
        assert_eq!(p.settlements_remaining, 3);
        assert_eq!(p.cities_remaining, 3);
        assert_eq!(game.get_vertex(7), VertexBuilding::City(0));
        assert_eq!(game.victory_points(0), 4);
        assert!(game.is_bank_conserved());
    }

    #[test]
    fn test_failed_placement_has_no_side_effects() {
        let mut random = ScriptedRandom::default();
        random.push_roll(1, 1);
        let mut game = scripted(2, random);
        two_player_setup(&mut game);
        game.roll_dice().unwrap();

        // Setup left player 0 with one ore and one wool
        let hand_before = game.players()[0].resources;
        let bank_before = game.get_bank_counts();

        // No road reaches 7
        assert_eq!(game.place_settlement(0, 7), Err(RuleError::InvalidLocation));
        assert_eq!(game.place_road(0, 3, 7), Err(RuleError::CannotAfford));

        assert_eq!(game.players()[0].resources, hand_before);
        assert_eq!(game.get_bank_counts(), bank_before);
        assert_eq!(game.players()[0].settlements_remaining, 3);
        assert_eq!(game.players()[0].roads_remaining, 13);
        assert!(game.get_vertex(7) == VertexBuilding::Empty);
    }

    #[test]
    fn test_seven_discards_and_enables_robber() {
        let mut random = ScriptedRandom::default();
        random.push_roll(3, 4);
        let mut game = scripted(2, random);
        two_player_setup(&mut game);

        let grant = ResourceHand::with_amounts(2, 2, 2, 2, 1);
        game.bank.grant_hand(&mut game.players[1].resources, &grant);
        let before = game.players()[1].resources.total();
        let bank_before = game.get_bank_counts().total();

        game.roll_dice().unwrap();

        let after = game.players()[1].resources.total();
        assert_eq!(before - after, before / 2);
        assert_eq!(game.get_bank_counts().total(), bank_before + before / 2);
        assert!(game.get_game_state().robber_pending);
        assert!(game.is_bank_conserved());

        // Robber: cannot stay put, can move once
        let robber = game.board().robber();
        assert_eq!(game.move_robber(0, robber), Err(RuleError::InvalidLocation));
        game.move_robber(0, 11).unwrap();
        assert_eq!(game.board().robber(), 11);
        assert_eq!(game.move_robber(0, 4), Err(RuleError::RobberNotPending));
    }

    #[test]
    fn test_robber_not_movable_without_seven() {
        let mut random = ScriptedRandom::default();
        random.push_roll(2, 2);
        let mut game = scripted(2, random);
        two_player_setup(&mut game);
        game.roll_dice().unwrap();
        assert_eq!(game.move_robber(0, 4), Err(RuleError::RobberNotPending));
    }

    #[test]
    fn test_development_card_bookkeeping() {
        let mut random = ScriptedRandom::default();
        random.push_roll(1, 1);
        random.push_roll(1, 1);
        random.push_roll(1, 1);
        let mut game = scripted(2, random);
        two_player_setup(&mut game);
        game.roll_dice().unwrap();

        // Stack the deck
        game.dev_card_deck.push(DevelopmentCard::Knight);
        game.bank
            .grant_hand(&mut game.players[0].resources, &costs::development_card());

        let card = game.buy_development_card(0).unwrap();
        assert_eq!(card, DevelopmentCard::Knight);
        assert_eq!(
            game.play_development_card(0, DevelopmentCard::Knight),
            Err(RuleError::CardNotYetPlayable)
        );
        assert_eq!(game.buy_development_card(0), Err(RuleError::CannotAfford));

        game.end_turn().unwrap();
        game.roll_dice().unwrap();
        game.end_turn().unwrap();

        // Knight may be played before rolling
        game.play_development_card(0, DevelopmentCard::Knight).unwrap();
        assert_eq!(game.players()[0].played_knights, 1);
        game.roll_dice().unwrap();
        assert_eq!(
            game.play_development_card(0, DevelopmentCard::Monopoly),
            Err(RuleError::DevelopmentCardAlreadyPlayed)
        );
        assert!(game.is_bank_conserved());
    }

    #[test]
    fn test_longest_road_bonus_awarded() {
        let mut random = ScriptedRandom::default();
        random.push_roll(1, 1);
        let mut game = scripted(2, random);
        two_player_setup(&mut game);
        game.roll_dice().unwrap();
        game.bank
            .grant_hand(&mut game.players[0].resources, &ResourceHand::with_amounts(5, 5, 0, 0, 0));

        // 0-3 exists; extend 3-7-11-16-21
        for (a, b) in [(3, 7), (7, 11), (11, 16)] {
            game.place_road(0, a, b).unwrap();
        }
        assert!(!game.players()[0].has_longest_road);
        game.place_road(0, 16, 21).unwrap();

        assert_eq!(game.get_player_longest_road(0), 5);
        assert!(game.players()[0].has_longest_road);
        assert_eq!(game.victory_points(0), 4);
        assert!(game
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::LongestRoadChanged { current: Some(0), length: 5, .. })));
    }

    #[test]
    fn test_reaching_target_finishes_game() {
        let config = RuleConfig {
            victory_points_to_win: 3,
            ..RuleConfig::default()
        };
        let mut random = ScriptedRandom::default();
        random.push_roll(1, 1);
        let mut game = GameEngine::with_random(names(2), config, random).unwrap();
        two_player_setup(&mut game);
        game.roll_dice().unwrap();
        game.bank
            .grant_hand(&mut game.players[0].resources, &costs::city());

        game.place_city(0, 0).unwrap();
        assert_eq!(game.winner(), Some(0));
        assert_eq!(game.end_turn(), Err(RuleError::GameOver));
        assert!(game.legal_actions().is_empty());
    }

    #[test]
    fn test_snapshot_serializes() {
        let game = GameEngine::seeded(names(2), 3).unwrap();
        let json = serde_json::to_value(game.snapshot()).unwrap();
        assert_eq!(json["bank"]["ore"], 19);
        assert_eq!(json["players"].as_array().unwrap().len(), 2);
        assert_eq!(json["dev_cards_left"], 25);
        let seat = json["players"][0].as_object().unwrap();
        assert!(seat.contains_key("resources"));
        assert!(!seat.contains_key("is_human"));
    }

    #[test]
    fn test_setup_completes_with_tiny_bank() {
        let config = RuleConfig {
            bank_size: 1,
            ..RuleConfig::default()
        };
        let mut game = GameEngine::with_random(names(2), config, ScriptedRandom::default()).unwrap();

        game.place_settlement(0, 0).unwrap();
        game.place_road(0, 0, 3).unwrap();
        // Free placements never touch the bank
        assert_eq!(game.get_bank_counts(), ResourceHand::uniform(1));
        assert_eq!(game.players()[0].resources, ResourceHand::new());

        game.place_settlement(1, 13).unwrap();
        game.place_road(1, 13, 9).unwrap();
        game.place_settlement(1, 20).unwrap();
        game.place_road(1, 20, 15).unwrap();
        game.place_settlement(0, 37).unwrap();
        game.place_road(0, 37, 31).unwrap();

        assert_eq!(game.phase(), TurnPhase::PreRoll);
        assert_eq!(game.current_player(), 0);
        assert!(game.is_bank_conserved());
    }

    #[test]
    fn test_unaffordable_dev_card_stays_in_deck() {
        let mut random = ScriptedRandom::default();
        random.push_roll(1, 1);
        let mut game = scripted(2, random);
        two_player_setup(&mut game);
        game.roll_dice().unwrap();

        let deck_before = game.dev_cards_left();
        let hand_before = game.players()[0].resources;
        assert_eq!(game.buy_development_card(0), Err(RuleError::CannotAfford));
        assert_eq!(game.dev_cards_left(), deck_before);
        assert_eq!(game.players()[0].resources, hand_before);
        assert!(game.players()[0].dev_cards_bought_this_turn.is_empty());
    }

    #[test]
    fn test_pay_is_atomic() {
        let mut game = scripted(2, ScriptedRandom::default());
        game.bank
            .grant_hand(&mut game.players[0].resources, &ResourceHand::single(Resource::Brick, 1));
        assert!(!game.pay(0, &costs::road()));
        assert_eq!(game.players()[0].resources.brick, 1);
        assert!(game.pay(0, &ResourceHand::single(Resource::Brick, 1)));
        assert_eq!(game.get_bank_counts(), ResourceHand::uniform(19));
    }
}
