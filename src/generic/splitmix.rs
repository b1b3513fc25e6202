//! A simple pseudorandom number generator.
//!
//! Specifically, an implementation of Steele, Lea, and Flood's SplitMix64
//! finaliser as a sequential generator, implemented to satisfy the
//! [RngCore](rand_core::RngCore) trait.
//!
//! SplitMix64 was chosen as the default source of (pseudo)random numbers as
//! it is a handful of arithmetic operations per draw and trivially seeded
//! from a single `u64`.
//!
//! An engine uses randomness in one place only: to break ties between
//! equally scored branching literals by reservoir sampling.
//! So, statistical quality far beyond 'not obviously patterned' is wasted,
//! and reproducibility from a fixed seed is the property of interest.

use rand::SeedableRng;
use rand_core::{impls, Error, RngCore};

/// The state of the generator, advanced by a Weyl sequence.
#[derive(Default)]
pub struct SplitMix64 {
    state: u64,
}

impl RngCore for SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);

        let mut mixed = self.state;
        mixed = (mixed ^ (mixed >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        mixed = (mixed ^ (mixed >> 27)).wrapping_mul(0x94D049BB133111EB);
        mixed ^ (mixed >> 31)
    }

    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for SplitMix64 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self {
            state: u64::from_le_bytes(seed),
        }
    }
}

#[cfg(test)]
mod splitmix_tests {
    use super::*;

    #[test]
    fn reproducible() {
        let mut a = SplitMix64::from_seed(7_u64.to_le_bytes());
        let mut b = SplitMix64::from_seed(7_u64.to_le_bytes());

        for _ in 0..32 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn seed_sensitive() {
        let mut a = SplitMix64::from_seed(7_u64.to_le_bytes());
        let mut b = SplitMix64::from_seed(8_u64.to_le_bytes());

        let draws_a = (0..8).map(|_| a.next_u64()).collect::<Vec<_>>();
        let draws_b = (0..8).map(|_| b.next_u64()).collect::<Vec<_>>();

        assert_ne!(draws_a, draws_b);
    }

    #[test]
    fn upper_word() {
        let mut a = SplitMix64::from_seed(7_u64.to_le_bytes());
        let mut b = SplitMix64::from_seed(7_u64.to_le_bytes());

        assert_eq!(a.next_u32() as u64, b.next_u64() >> 32);
    }
}
