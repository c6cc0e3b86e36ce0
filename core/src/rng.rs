//! Deterministic random number generation.
//!
//! RULE: nothing in the crate may call a platform RNG.
//! All randomness flows through StreamRng instances derived from a single
//! master seed (the dataset seed in DatasetConfig).
//!
//! Each consumer gets its own stream, seeded from
//! (master_seed XOR slot_index * golden ratio). Adding a new slot never
//! changes an existing slot's stream.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG stream.
pub struct StreamRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StreamRng {
    /// Create a stream from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Uniform integer in [low, high], both inclusive.
    pub fn uniform_int(&mut self, low: u32, high: u32) -> u32 {
        assert!(high >= low, "empty range {low}..={high}");
        low + self.next_u64_below(u64::from(high - low) + 1) as u32
    }

    /// Uniform float in [low, high).
    pub fn uniform_f64(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_f64() * (high - low)
    }

    /// Pick one choice by cumulative weight. One roll per call.
    /// Falls back to the last choice when the weights sum below the roll.
    pub fn pick_weighted<T: Copy>(&mut self, choices: &[(T, f64)]) -> T {
        assert!(!choices.is_empty(), "no choices to pick from");
        let roll = self.next_f64();
        let mut cumulative = 0.0;
        for (choice, weight) in choices {
            cumulative += weight;
            if roll < cumulative {
                return *choice;
            }
        }
        choices[choices.len() - 1].0
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_u64_below(i as u64 + 1) as usize;
            items.swap(i, j);
        }
    }
}

/// All RNG streams for one master seed, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_slot(&self, slot: StreamSlot) -> StreamRng {
        StreamRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries. Append only.
/// Reordering changes every stream's seed, and with it every synthetic dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    SyntheticDataset = 0,
    /// Row permutations for order-invariance checks on the aggregates.
    Shuffle = 1,
    // Add new slots here. Append only.
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SyntheticDataset => "synthetic_dataset",
            Self::Shuffle => "shuffle",
        }
    }
}
