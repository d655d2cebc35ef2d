use serde::{Deserialize, Serialize};

use std::num::NonZeroUsize;

/// How agent mutations are dispatched within a generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Concurrency {
    /// Agents mutate one after another, in shuffled order,
    /// on the calling thread. Seeded runs are fully reproducible.
    Sequential,
    /// One task per agent on a dedicated worker pool.
    /// Agents may observe a mix of stale and fresh peer
    /// states within a generation.
    Parallel {
        /// Number of worker threads. If `None`, the
        /// pool picks one per available core.
        workers: Option<NonZeroUsize>,
    },
}

/// Configuration data for population generation
/// and generation stepping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of agents in the population.
    pub size: NonZeroUsize,
    /// Dispatch strategy for agent mutations.
    pub concurrency: Concurrency,
    /// Seed for the population's random source.
    /// If `None`, it is seeded from system entropy.
    pub seed: Option<u64>,
}

impl PopulationConfig {
    /// Returns a "zero-valued" default configuration:
    /// a single sequential agent with an entropy seed.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to abbreviate configuration
    /// instantiation, or to fill in unused values.
    ///
    /// # Examples
    /// ```
    /// use oxiswarm::{Concurrency, PopulationConfig};
    ///
    /// let cfg1 = PopulationConfig::zero();
    /// assert_eq!(cfg1.concurrency, Concurrency::Sequential);
    ///
    /// let cfg2 = PopulationConfig {
    ///     // Specify some values here...
    ///     seed: Some(42),
    ///     // Default the rest...
    ///     ..PopulationConfig::zero()
    /// };
    /// ```
    pub const fn zero() -> PopulationConfig {
        PopulationConfig {
            size: NonZeroUsize::MIN,
            concurrency: Concurrency::Sequential,
            seed: None,
        }
    }
}

impl Default for PopulationConfig {
    /// Sixteen agents on a worker pool sized to the machine.
    fn default() -> PopulationConfig {
        PopulationConfig {
            size: NonZeroUsize::new(16).unwrap(),
            concurrency: Concurrency::Parallel { workers: None },
            seed: None,
        }
    }
}
