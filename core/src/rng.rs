//! Deterministic random number generation for synthetic cohorts.
//!
//! RULE: Nothing in the league code may call any platform RNG.
//! All randomness flows through CohortRng instances derived from
//! (player id hash XOR caller seed), mixed with the season id.
//!
//! This means:
//!   - The same player, seed and season always see the same peers.
//!   - Two players with the same seed see different cohorts.
//!   - A new season reshuffles the cohort.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// 64-bit FNV-1a over the UTF-8 bytes of `input`.
pub fn fnv1a64(input: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    for byte in input.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// A deterministic RNG for one player's cohort in one season.
pub struct CohortRng {
    inner: Pcg64Mcg,
}

impl CohortRng {
    /// Seed from the player id, the caller's synthetic seed and the season.
    pub fn new(player_id: &str, seed: u64, season_id: &str) -> Self {
        let derived_seed =
            (fnv1a64(player_id) ^ seed) ^ fnv1a64(season_id).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self::from_seed(derived_seed)
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n). Returns 0 when n is 0.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.inner.next_u64() % n
    }

    /// Pick one element of a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let index = self.next_u64_below(items.len() as u64) as usize;
        items.get(index)
    }
}
