//! Injectable randomness.
//!
//! Dice, discard selection, deck shuffling and AI move choice all go through
//! [`RandomSource`] so tests can script exact sequences.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Source of the engine's random decisions
pub trait RandomSource {
    /// A single six-sided die, 1..=6
    fn roll_die(&mut self) -> u8;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize;

    /// Fisher-Yates shuffle driven by `pick_index`
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..items.len()).rev() {
            let j = self.pick_index(i + 1);
            items.swap(i, j);
        }
    }
}

fn rng_die<R: Rng>(rng: &mut R) -> u8 {
    rng.gen_range(1..=6)
}

fn rng_index<R: Rng>(rng: &mut R, len: usize) -> usize {
    assert!(len > 0, "cannot pick from an empty range");
    rng.gen_range(0..len)
}

impl RandomSource for StdRng {
    fn roll_die(&mut self) -> u8 {
        rng_die(self)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        rng_index(self, len)
    }
}

/// Replays queued dice and picks, then falls back to a seeded generator.
///
/// Queued picks are reduced modulo the requested range.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    dice: VecDeque<u8>,
    picks: VecDeque<usize>,
    fallback: StdRng,
}

impl ScriptedRandom {
    /// Queue die faces (each 1..=6) to be returned in order
    pub fn with_dice(dice: impl IntoIterator<Item = u8>) -> Self {
        let dice: VecDeque<u8> = dice.into_iter().collect();
        assert!(
            dice.iter().all(|d| (1..=6).contains(d)),
            "scripted die faces must be 1..=6"
        );
        Self {
            dice,
            picks: VecDeque::new(),
            fallback: StdRng::seed_from_u64(0),
        }
    }

    /// Queue indices returned by `pick_index`
    pub fn and_picks(mut self, picks: impl IntoIterator<Item = usize>) -> Self {
        self.picks.extend(picks);
        self
    }

    /// Queue a roll that totals `a + b`
    pub fn push_roll(&mut self, a: u8, b: u8) {
        assert!((1..=6).contains(&a) && (1..=6).contains(&b), "die faces must be 1..=6");
        self.dice.push_back(a);
        self.dice.push_back(b);
    }
}

impl Default for ScriptedRandom {
    fn default() -> Self {
        Self::with_dice([])
    }
}

impl RandomSource for ScriptedRandom {
    fn roll_die(&mut self) -> u8 {
        match self.dice.pop_front() {
            Some(d) => d,
            None => rng_die(&mut self.fallback),
        }
    }

    fn pick_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot pick from an empty range");
        match self.picks.pop_front() {
            Some(i) => i % len,
            None => rng_index(&mut self.fallback, len),
        }
    }
}
