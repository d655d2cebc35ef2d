use super::Population;
use crate::Agent;

use serde::{Deserialize, Serialize};

use std::fmt;

/// Defines different possible reporting levels for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportingLevel {
    /// Clones every agent.
    AllAgents,
    /// Clones only the observable agent.
    ObservableAgent,
    /// Clones no agents.
    NoAgents,
}

/// A snapshot of a population.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Log {
    pub generation_number: usize,
    pub generation_sample: GenerationMemberRecord,
    pub distance: Stats,
}

impl fmt::Display for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Log {{\n\
            \tgeneration_number: {:?}\n\
            \tdistance: {:?}\n\
            }}",
            &self.generation_number, &self.distance,
        )
    }
}

/// A struct for reporting basic statistical data.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub maximum: f64,
    pub minimum: f64,
    pub mean: f64,
    pub median: f64,
}

impl Stats {
    /// Returns statistics about numbers in a sequence.
    /// The median of an even count is the mean of the
    /// two middle values.
    ///
    /// # Panics
    /// Panics if `data` is empty or contains NaN.
    ///
    /// # Examples
    /// ```
    /// use oxiswarm::logging::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied());
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    ///
    /// let stats = Stats::from([4.0, 1.0, 3.0, 2.0].iter().copied());
    /// assert_eq!(stats.median, 2.5);
    /// ```
    pub fn from(data: impl Iterator<Item = f64>) -> Stats {
        let mut data: Vec<f64> = data.collect();
        assert!(!data.is_empty(), "statistics of an empty sequence");
        data.sort_unstable_by(|a, b| {
            a.partial_cmp(b)
                .unwrap_or_else(|| panic!("invalid value in statistics (NaN)"))
        });
        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        Stats {
            maximum: data[data.len() - 1],
            minimum: data[0],
            mean: data.iter().sum::<f64>() / data.len() as f64,
            median,
        }
    }
}

/// A reporting-level dependant store
/// of agents from a population.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum GenerationMemberRecord {
    /// Every agent.
    Agents(Vec<Agent>),
    /// Only the observable agent.
    ObservableAgent(Agent),
    /// Empty.
    None,
}

/// A log of the evolution of a population over time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvolutionLogger {
    reporting_level: ReportingLevel,
    logs: Vec<Log>,
}

impl EvolutionLogger {
    /// Returns a logger with the appropiate reporting level.
    ///
    /// # Examples
    /// ```
    /// use oxiswarm::logging::{EvolutionLogger, ReportingLevel};
    ///
    /// let logger = EvolutionLogger::new(ReportingLevel::NoAgents);
    /// assert_eq!(logger.iter().count(), 0);
    /// ```
    pub fn new(reporting_level: ReportingLevel) -> EvolutionLogger {
        EvolutionLogger {
            reporting_level,
            logs: vec![],
        }
    }

    /// Store a snapshot of a population.
    ///
    /// # Examples
    /// ```
    /// use oxiswarm::{Population, PopulationConfig};
    /// use oxiswarm::genomics::GeneticConfig;
    /// use oxiswarm::logging::{EvolutionLogger, ReportingLevel};
    ///
    /// let mut logger = EvolutionLogger::new(ReportingLevel::ObservableAgent);
    /// let mut population =
    ///     Population::new(PopulationConfig::zero(), GeneticConfig::zero()).unwrap();
    ///
    /// logger.log(&population);
    /// population.step_generation();
    /// logger.log(&population);
    /// assert_eq!(logger.means().len(), 2);
    /// ```
    pub fn log(&mut self, population: &Population) {
        self.logs.push(Log {
            generation_number: population.generation(),
            generation_sample: match self.reporting_level {
                ReportingLevel::AllAgents => {
                    GenerationMemberRecord::Agents(population.agents().cloned().collect())
                }
                ReportingLevel::ObservableAgent => {
                    GenerationMemberRecord::ObservableAgent(population.observable_agent().clone())
                }
                ReportingLevel::NoAgents => GenerationMemberRecord::None,
            },
            distance: population.stats(),
        })
    }

    /// Iterate over all logged snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &Log> {
        self.logs.iter()
    }

    /// Mean distance to target of every logged snapshot, in order.
    pub fn means(&self) -> Vec<f64> {
        self.logs.iter().map(|l| l.distance.mean).collect()
    }

    /// Median distance to target of every logged snapshot, in order.
    pub fn medians(&self) -> Vec<f64> {
        self.logs.iter().map(|l| l.distance.median).collect()
    }
}
