//! A population of agents, each chasing its own private
//! target chromosome, that learn from one another through
//! a shared state repository.
//!
//! Every generation each agent reads the states its peers
//! have posted, picks the one closest to its own target,
//! crosses its current state over with it, mutates both
//! children and keeps the one nearer the target. Agents
//! can run one after another or concurrently on a worker
//! pool; the repository is the only state they share.
//!
//! # Example usage
//! ```
//! use oxiswarm::{Concurrency, Population, PopulationConfig};
//! use oxiswarm::genomics::GeneticConfig;
//! use std::num::{NonZeroU8, NonZeroUsize};
//!
//! let genetic_config = GeneticConfig {
//!     chromosome_length: NonZeroUsize::new(128).unwrap(),
//!     alphabet_size: NonZeroU8::new(2).unwrap(),
//!     crossover_weight: 0.5,
//!     mutation_count: 10,
//! };
//! let population_config = PopulationConfig {
//!     size: NonZeroUsize::new(16).unwrap(),
//!     concurrency: Concurrency::Parallel { workers: None },
//!     seed: None,
//! };
//!
//! let mut population = Population::new(population_config, genetic_config).unwrap();
//! let mut averages = vec![];
//! for _ in 0..65 {
//!     averages.push(population.average_distance());
//!     population.step_generation();
//! }
//! assert!(averages.iter().all(|d| (0.0..=128.0).contains(d)));
//! ```

mod agents;
pub mod genomics;
mod populations;
mod repository;
mod rng;

pub use agents::{Agent, AgentID, MutationReport};
pub use populations::*;
pub use repository::{Posting, StateRepository};
