//! Player state and resource management.
//!
//! This module contains:
//! - Player struct with resources, development cards, and piece pools
//! - ResourceHand for managing resource counts
//! - Development card types and deck construction
//! - Building costs

use crate::board::{PlayerId, Resource};
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};

/// Pieces each player starts with
pub const ROAD_PIECES: u32 = 15;
pub const SETTLEMENT_PIECES: u32 = 5;
pub const CITY_PIECES: u32 = 4;

/// Player color for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    Green,
    Blue,
    White,
}

impl PlayerColor {
    /// Get color for a player index
    pub fn for_player(id: PlayerId) -> Self {
        match id % 4 {
            0 => PlayerColor::Red,
            1 => PlayerColor::Green,
            2 => PlayerColor::Blue,
            _ => PlayerColor::White,
        }
    }
}

/// Development card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DevelopmentCard {
    /// Counts toward Largest Army when played
    Knight,
    /// Worth 1 VP while held; never played
    VictoryPoint,
    RoadBuilding,
    YearOfPlenty,
    Monopoly,
}

impl DevelopmentCard {
    /// Copies of each card in a standard deck
    pub const DECK_COMPOSITION: [(DevelopmentCard, usize); 5] = [
        (DevelopmentCard::Knight, 14),
        (DevelopmentCard::VictoryPoint, 5),
        (DevelopmentCard::RoadBuilding, 2),
        (DevelopmentCard::YearOfPlenty, 2),
        (DevelopmentCard::Monopoly, 2),
    ];

    /// The 25-card deck, unshuffled
    pub fn standard_deck() -> Vec<DevelopmentCard> {
        Self::DECK_COMPOSITION
            .iter()
            .flat_map(|&(card, copies)| std::iter::repeat(card).take(copies))
            .collect()
    }

    /// A standard deck shuffled with the given source
    pub fn shuffled_deck<R: RandomSource>(random: &mut R) -> Vec<DevelopmentCard> {
        let mut deck = Self::standard_deck();
        random.shuffle(&mut deck);
        deck
    }

    /// Victory point cards score from the hand and are never played
    pub fn is_playable(&self) -> bool {
        *self != DevelopmentCard::VictoryPoint
    }
}

/// A hand of resources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub brick: u32,
    pub lumber: u32,
    pub ore: u32,
    pub grain: u32,
    pub wool: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand with the given count of each resource, in `Resource::ALL` order
    pub const fn with_amounts(brick: u32, lumber: u32, ore: u32, grain: u32, wool: u32) -> Self {
        Self {
            brick,
            lumber,
            ore,
            grain,
            wool,
        }
    }

    /// `amount` cards of one resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// The same amount of every resource
    pub fn uniform(amount: u32) -> Self {
        Self::with_amounts(amount, amount, amount, amount, amount)
    }

    /// Number of cards in the hand
    pub fn total(&self) -> u32 {
        Resource::ALL.iter().map(|&r| self.get(r)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Cards of one resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Brick => self.brick,
            Resource::Lumber => self.lumber,
            Resource::Ore => self.ore,
            Resource::Grain => self.grain,
            Resource::Wool => self.wool,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Brick => &mut self.brick,
            Resource::Lumber => &mut self.lumber,
            Resource::Ore => &mut self.ore,
            Resource::Grain => &mut self.grain,
            Resource::Wool => &mut self.wool,
        }
    }

    pub fn add(&mut self, resource: Resource, amount: u32) {
        *self.slot(resource) += amount;
    }

    /// Merge another hand into this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        for resource in Resource::ALL {
            self.add(resource, other.get(resource));
        }
    }

    /// Whether every resource of `cost` is covered
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL.iter().all(|&r| self.get(r) >= cost.get(r))
    }

    /// Remove one card of a resource, returning false if there is none
    pub fn remove_one(&mut self, resource: Resource) -> bool {
        let slot = self.slot(resource);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Subtract a whole cost, or nothing at all if any resource is short
    pub fn try_subtract(&mut self, cost: &ResourceHand) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for resource in Resource::ALL {
            *self.slot(resource) -= cost.get(resource);
        }
        true
    }

    /// Every card as a flat list, grouped by resource in `Resource::ALL` order
    pub fn cards(&self) -> Vec<Resource> {
        Resource::ALL
            .iter()
            .flat_map(|&r| std::iter::repeat(r).take(self.get(r) as usize))
            .collect()
    }

    /// Non-zero counts in `Resource::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL
            .into_iter()
            .map(move |r| (r, self.get(r)))
            .filter(|(_, n)| *n > 0)
    }
}

impl FromIterator<Resource> for ResourceHand {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        let mut hand = ResourceHand::new();
        for resource in iter {
            hand.add(resource, 1);
        }
        hand
    }
}

/// Prices paid to the bank
pub mod costs {
    use super::ResourceHand;

    const ROAD: ResourceHand = ResourceHand::with_amounts(1, 1, 0, 0, 0);
    const SETTLEMENT: ResourceHand = ResourceHand::with_amounts(1, 1, 0, 1, 1);
    const CITY: ResourceHand = ResourceHand::with_amounts(0, 0, 3, 2, 0);
    const DEVELOPMENT_CARD: ResourceHand = ResourceHand::with_amounts(0, 0, 1, 1, 1);

    /// Brick and lumber
    pub fn road() -> ResourceHand {
        ROAD
    }

    /// Brick, lumber, grain and wool
    pub fn settlement() -> ResourceHand {
        SETTLEMENT
    }

    /// Three ore and two grain
    pub fn city() -> ResourceHand {
        CITY
    }

    /// Ore, grain and wool
    pub fn development_card() -> ResourceHand {
        DEVELOPMENT_CARD
    }
}

/// A single player's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Player ID (0-3)
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Player color
    pub color: PlayerColor,
    /// Current resources
    pub resources: ResourceHand,
    /// Development cards in hand (unplayed)
    pub dev_cards: Vec<DevelopmentCard>,
    /// Development cards bought this turn (can't be played same turn)
    pub dev_cards_bought_this_turn: Vec<DevelopmentCard>,
    /// Number of knights played
    pub played_knights: u32,
    /// Points from settlements and cities on the board
    pub building_points: u32,
    /// Whether this player holds the Longest Road bonus
    pub has_longest_road: bool,
    /// Number of settlements remaining to build
    pub settlements_remaining: u32,
    /// Number of cities remaining to build
    pub cities_remaining: u32,
    /// Number of roads remaining to build
    pub roads_remaining: u32,
}

impl Player {
    /// Create a new player
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            color: PlayerColor::for_player(id),
            resources: ResourceHand::new(),
            dev_cards: Vec::new(),
            dev_cards_bought_this_turn: Vec::new(),
            played_knights: 0,
            building_points: 0,
            has_longest_road: false,
            settlements_remaining: SETTLEMENT_PIECES,
            cities_remaining: CITY_PIECES,
            roads_remaining: ROAD_PIECES,
        }
    }

    /// Victory point cards held, including ones bought this turn
    pub fn hidden_vp(&self) -> u32 {
        self.dev_cards
            .iter()
            .chain(&self.dev_cards_bought_this_turn)
            .filter(|c| matches!(c, DevelopmentCard::VictoryPoint))
            .count() as u32
    }

    /// Total victory points given the Longest Road bonus size
    pub fn victory_points(&self, longest_road_bonus: u32) -> u32 {
        let mut vp = self.building_points + self.hidden_vp();
        if self.has_longest_road {
            vp += longest_road_bonus;
        }
        vp
    }

    fn has_piece_and_cards(&self, pieces_left: u32, cost: ResourceHand) -> bool {
        pieces_left > 0 && self.resources.can_afford(&cost)
    }

    /// Holds a road piece and its price
    pub fn can_afford_road(&self) -> bool {
        self.has_piece_and_cards(self.roads_remaining, costs::road())
    }

    /// Holds a settlement piece and its price
    pub fn can_afford_settlement(&self) -> bool {
        self.has_piece_and_cards(self.settlements_remaining, costs::settlement())
    }

    /// Holds a city piece and the upgrade price
    pub fn can_afford_city(&self) -> bool {
        self.has_piece_and_cards(self.cities_remaining, costs::city())
    }

    pub fn can_afford_dev_card(&self) -> bool {
        self.resources.can_afford(&costs::development_card())
    }

    /// Take a road piece from the pool
    pub fn use_road(&mut self) {
        self.roads_remaining -= 1;
    }

    /// Take a settlement piece from the pool
    pub fn use_settlement(&mut self) {
        self.settlements_remaining -= 1;
        self.building_points += 1;
    }

    /// Take a city piece; the replaced settlement returns to the pool
    pub fn use_city(&mut self) {
        self.cities_remaining -= 1;
        self.settlements_remaining += 1;
        self.building_points += 1;
    }

    /// Cards bought this turn become playable
    pub fn end_turn(&mut self) {
        self.dev_cards.append(&mut self.dev_cards_bought_this_turn);
    }

    /// Whether a card of this kind can be played from the hand now
    pub fn has_playable_dev_card(&self, card: DevelopmentCard) -> bool {
        card.is_playable() && self.dev_cards.contains(&card)
    }

    /// Remove a playable card from the hand, counting knights
    pub fn play_dev_card(&mut self, card: DevelopmentCard) -> bool {
        if !self.has_playable_dev_card(card) {
            return false;
        }
        let Some(pos) = self.dev_cards.iter().position(|&c| c == card) else {
            return false;
        };
        self.dev_cards.remove(pos);
        if card == DevelopmentCard::Knight {
            self.played_knights += 1;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;

    #[test]
    fn test_resource_hand_total() {
        let hand = ResourceHand::with_amounts(1, 2, 3, 4, 5);
        assert_eq!(hand.total(), 15);
    }

    #[test]
    fn test_resource_hand_can_afford() {
        let hand = ResourceHand::uniform(2);
        let cost = ResourceHand::uniform(1);
        assert!(hand.can_afford(&cost));

        let expensive = ResourceHand::with_amounts(3, 0, 0, 0, 0);
        assert!(!hand.can_afford(&expensive));
    }

    #[test]
    fn test_try_subtract_is_all_or_nothing() {
        let mut hand = ResourceHand::with_amounts(1, 1, 0, 1, 0);
        assert!(!hand.try_subtract(&costs::settlement()));
        assert_eq!(hand, ResourceHand::with_amounts(1, 1, 0, 1, 0));

        assert!(hand.try_subtract(&costs::road()));
        assert_eq!(hand, ResourceHand::with_amounts(0, 0, 0, 1, 0));
    }

    #[test]
    fn test_cards_and_collect() {
        let hand = ResourceHand::with_amounts(2, 0, 1, 0, 0);
        let cards = hand.cards();
        assert_eq!(cards, vec![Resource::Brick, Resource::Brick, Resource::Ore]);
        let back: ResourceHand = cards.into_iter().collect();
        assert_eq!(back, hand);
    }

    #[test]
    fn test_building_costs() {
        assert_eq!(costs::road().total(), 2);
        assert_eq!(costs::settlement().total(), 4);
        assert_eq!(costs::city().total(), 5);
        assert_eq!(costs::development_card().total(), 3);
    }

    #[test]
    fn test_dev_card_deck_size() {
        let deck = DevelopmentCard::standard_deck();
        assert_eq!(deck.len(), 25);

        let knights = deck
            .iter()
            .filter(|c| matches!(c, DevelopmentCard::Knight))
            .count();
        assert_eq!(knights, 14);
    }

    #[test]
    fn test_shuffled_deck_keeps_cards() {
        let mut random = ScriptedRandom::default();
        let deck = DevelopmentCard::shuffled_deck(&mut random);
        assert_eq!(deck.len(), 25);
        let vp = deck
            .iter()
            .filter(|c| matches!(c, DevelopmentCard::VictoryPoint))
            .count();
        assert_eq!(vp, 5);
    }

    #[test]
    fn test_player_victory_points() {
        let mut player = Player::new(0, "Test".to_string());
        assert_eq!(player.victory_points(2), 0);

        player.use_settlement();
        player.use_settlement();
        assert_eq!(player.victory_points(2), 2);

        player.use_city();
        assert_eq!(player.victory_points(2), 3);

        player.has_longest_road = true;
        assert_eq!(player.victory_points(2), 5);

        player.dev_cards.push(DevelopmentCard::VictoryPoint);
        assert_eq!(player.victory_points(2), 6);
    }

    #[test]
    fn test_city_returns_settlement_piece() {
        let mut player = Player::new(0, "Test".to_string());
        player.use_settlement();
        player.use_settlement();
        assert_eq!(player.settlements_remaining, 3);

        player.use_city();
        assert_eq!(player.cities_remaining, 3);
        assert_eq!(player.settlements_remaining, 4);
    }

    #[test]
    fn test_dev_card_bought_this_turn() {
        let mut player = Player::new(0, "Test".to_string());
        player.dev_cards_bought_this_turn.push(DevelopmentCard::Knight);

        // Card is in bought_this_turn, not playable yet
        assert!(!player.has_playable_dev_card(DevelopmentCard::Knight));

        // End turn
        player.end_turn();

        // Now it's playable
        assert!(player.has_playable_dev_card(DevelopmentCard::Knight));
        assert!(player.dev_cards_bought_this_turn.is_empty());

        assert!(player.play_dev_card(DevelopmentCard::Knight));
        assert_eq!(player.played_knights, 1);
        assert!(!player.play_dev_card(DevelopmentCard::Knight));
    }

    #[test]
    fn test_victory_point_card_cannot_be_played() {
        let mut player = Player::new(0, "Test".to_string());
        player.dev_cards.push(DevelopmentCard::VictoryPoint);
        assert!(!player.has_playable_dev_card(DevelopmentCard::VictoryPoint));
        assert!(!player.play_dev_card(DevelopmentCard::VictoryPoint));
        assert_eq!(player.dev_cards.len(), 1);
    }
}
