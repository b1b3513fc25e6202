use crate::{config::Config, generic::splitmix::SplitMix64};

use rand::SeedableRng;

use super::GenericEngine;

/// An engine which uses [SplitMix64] as a source of randomness.
pub type Engine = GenericEngine<SplitMix64>;

impl Engine {
    /// Creates an engine from some given configuration.
    ///
    /// The rng is seeded with a fixed value, so two engines given the same
    /// formula and configuration behave identically.
    pub fn from_config(config: Config) -> Self {
        GenericEngine::with_rng(config, SplitMix64::from_seed(0_u64.to_le_bytes()))
    }
}
