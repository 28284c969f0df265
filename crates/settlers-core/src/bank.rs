//! The shared resource bank.
//!
//! Every card of a kind is either in the bank or in exactly one player's hand,
//! so for each resource `bank + sum(hands) == bank_size` at all times. All
//! transfers in the engine go through the methods here to keep that true.

use crate::board::{PlayerId, Production, Resource};
use crate::player::{Player, ResourceHand};
use crate::random::RandomSource;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Finite per-resource card pools
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBank {
    pool: ResourceHand,
    size: u32,
}

/// Cards a player actually received from the bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub player: PlayerId,
    pub resource: Resource,
    pub amount: u32,
}

impl ResourceBank {
    /// A bank holding `size` cards of every resource
    pub fn new(size: u32) -> Self {
        Self {
            pool: ResourceHand::uniform(size),
            size,
        }
    }

    /// Cards of each kind left in the bank
    pub fn counts(&self) -> ResourceHand {
        self.pool
    }

    /// Cards of one kind left in the bank
    pub fn available(&self, resource: Resource) -> u32 {
        self.pool.get(resource)
    }

    /// Move up to `amount` cards into `hand`. An exhausted pool caps the grant
    /// silently; the number actually moved is returned.
    pub fn grant(&mut self, hand: &mut ResourceHand, resource: Resource, amount: u32) -> u32 {
        let given = amount.min(self.pool.get(resource));
        if given > 0 {
            self.pool.try_subtract(&ResourceHand::single(resource, given));
            hand.add(resource, given);
        }
        given
    }

    /// Grant every card of `wanted`, each kind capped independently
    pub fn grant_hand(&mut self, hand: &mut ResourceHand, wanted: &ResourceHand) -> ResourceHand {
        let mut granted = ResourceHand::new();
        for (resource, amount) in wanted.iter() {
            let given = self.grant(hand, resource, amount);
            granted.add(resource, given);
        }
        granted
    }

    /// Take a full cost from `hand` into the bank, or take nothing and return false
    pub fn pay(&mut self, hand: &mut ResourceHand, cost: &ResourceHand) -> bool {
        if !hand.try_subtract(cost) {
            return false;
        }
        self.pool.add_hand(cost);
        true
    }

    /// Return cards to the bank
    pub fn receive(&mut self, cards: &ResourceHand) {
        self.pool.add_hand(cards);
    }

    /// Pay out a roll's production in order, capping at what the bank holds
    pub fn distribute(&mut self, production: &[Production], players: &mut [Player]) -> Vec<Grant> {
        let mut grants = Vec::new();
        for entry in production {
            let Some(player) = players.get_mut(entry.player as usize) else {
                continue;
            };
            let given = self.grant(&mut player.resources, entry.resource, entry.amount);
            if given < entry.amount {
                debug!(
                    player = entry.player,
                    resource = %entry.resource,
                    wanted = entry.amount,
                    given,
                    "bank exhausted"
                );
            }
            if given > 0 {
                grants.push(Grant {
                    player: entry.player,
                    resource: entry.resource,
                    amount: given,
                });
            }
        }
        grants
    }

    /// Discard half of `hand` (rounded down), each card chosen uniformly
    /// without replacement, returning the discarded cards to the bank.
    pub fn discard_half<R: RandomSource>(
        &mut self,
        hand: &mut ResourceHand,
        random: &mut R,
    ) -> ResourceHand {
        let to_discard = hand.total() / 2;
        let mut discarded = ResourceHand::new();

        for _ in 0..to_discard {
            let cards = hand.cards();
            let resource = cards[random.pick_index(cards.len())];
            hand.remove_one(resource);
            discarded.add(resource, 1);
        }

        self.receive(&discarded);
        discarded
    }

    /// Check `bank + sum(hands) == size` for every resource
    pub fn is_conserved<'a>(&self, hands: impl IntoIterator<Item = &'a ResourceHand>) -> bool {
        let mut total = self.pool;
        for hand in hands {
            total.add_hand(hand);
        }
        total == ResourceHand::uniform(self.size)
    }
}

impl Default for ResourceBank {
    fn default() -> Self {
        Self::new(19)
    }
}
