use crate::AgentID;

use std::error::Error;
use std::fmt;

/// An error type indicating a population
/// could not be built from the given configuration.
#[derive(Debug)]
pub enum PopulationError {
    /// The crossover weight lies outside [0.0, 1.0].
    InvalidCrossoverWeight(f32),
    /// The number of seed agents differs from the
    /// configured population size.
    SeedCountMismatch { expected: usize, found: usize },
    /// A seed agent's states do not fit the genetic config.
    NonconformingAgent(AgentID),
    /// Two seed agents share an identifier.
    DuplicateAgent(AgentID),
    /// The worker pool could not be started.
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl fmt::Display for PopulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCrossoverWeight(w) => {
                write!(f, "crossover weight {} outside of [0, 1]", w)
            }
            Self::SeedCountMismatch { expected, found } => write!(
                f,
                "population of size {} seeded with {} agents",
                expected, found
            ),
            Self::NonconformingAgent(id) => write!(
                f,
                "agent {} has states that do not conform to the genetic config",
                id
            ),
            Self::DuplicateAgent(id) => write!(f, "duplicate agent id {}", id),
            Self::ThreadPool(e) => write!(f, "failed to build worker pool: {}", e),
        }
    }
}

impl Error for PopulationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ThreadPool(e) => Some(e),
            _ => None,
        }
    }
}
