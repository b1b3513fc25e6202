/*!
Configuration of an engine.

All configuration for an engine is contained within [Config].
Each knob is wrapped in a [ConfigOption] recording its name and the range of
permitted values, so external interfaces may enumerate and bound-check
settings without special cases.

The defaults are those of the lookahead literature rather than tuned for any
particular benchmark.
*/

mod config_option;
pub use config_option::ConfigOption;

use std::time::Duration;

/// The primary configuration structure.
#[derive(Clone)]
pub struct Config {
    /// The target number of pre-selected candidates at depth one, scaled
    /// down with depth and up with the free variable count.
    pub level_cand: ConfigOption<u32>,

    /// The minimum number of pre-selected candidates at any depth.
    pub min_cutoff: ConfigOption<u32>,

    /// The highest iteration index of the lookahead scoring fixpoint.
    pub max_hlevel: ConfigOption<u32>,

    /// The weight of binary relative to non-binary occurrences in the
    /// lookahead scoring fixpoint.
    pub alpha: ConfigOption<f64>,

    /// The clamp applied to each literal score during the scoring fixpoint.
    pub max_score: ConfigOption<f64>,

    /// The number of binary clauses the transitive closure step may
    /// synthesise over a whole search.
    pub tc1_limit: ConfigOption<u64>,

    /// The target success rate of double lookahead.
    pub dl_success: ConfigOption<f64>,

    /// The iteration bound on the double lookahead fixpoint.
    pub dl_max_iterations: ConfigOption<u32>,

    /// The decay applied to the double lookahead trigger whenever a probe
    /// fails to reach it.
    pub delta_rho: ConfigOption<f64>,

    /// Transcribe a DRAT proof of each clause committed during search.
    /// Requires a sink, see
    /// [transcribe_to](crate::context::GenericEngine::transcribe_to).
    pub drat: ConfigOption<bool>,

    /// The time limit for any single public operation.
    /// Zero is read as no limit.
    pub time_limit: ConfigOption<Duration>,

    /// A ceiling, in bytes, on the clause arena and binary implication
    /// graph taken together.
    /// Zero is read as no ceiling.
    pub memory_limit: ConfigOption<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            level_cand: ConfigOption {
                name: "level_cand",
                min: 1,
                max: u32::MAX,
                value: 600,
            },

            min_cutoff: ConfigOption {
                name: "min_cutoff",
                min: 1,
                max: u32::MAX,
                value: 30,
            },

            max_hlevel: ConfigOption {
                name: "max_hlevel",
                min: 2,
                max: u32::MAX,
                value: 50,
            },

            alpha: ConfigOption {
                name: "alpha",
                min: 0.0,
                max: f64::MAX,
                value: 3.5,
            },

            max_score: ConfigOption {
                name: "max_score",
                min: 0.0,
                max: f64::MAX,
                value: 20.0,
            },

            tc1_limit: ConfigOption {
                name: "tc1_limit",
                min: 0,
                max: u64::MAX,
                value: 10_000_000,
            },

            dl_success: ConfigOption {
                name: "dl_success",
                min: 0.0,
                max: 1.0,
                value: 0.8,
            },

            dl_max_iterations: ConfigOption {
                name: "dl_max_iterations",
                min: 1,
                max: u32::MAX,
                value: 32,
            },

            delta_rho: ConfigOption {
                name: "delta_rho",
                min: 0.0,
                max: 1.0,
                value: 0.7,
            },

            drat: ConfigOption {
                name: "drat",
                min: false,
                max: true,
                value: false,
            },

            time_limit: ConfigOption {
                name: "time_limit",
                min: Duration::from_secs(0),
                max: Duration::MAX,
                value: Duration::from_secs(0),
            },

            memory_limit: ConfigOption {
                name: "memory_limit",
                min: 0,
                max: usize::MAX,
                value: 0,
            },
        }
    }
}
