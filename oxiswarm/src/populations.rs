//! A Population is a fixed set of agents sharing
//! one state repository. Each generation every agent
//! breeds a new state from its own and its nearest
//! peer's, and the population waits for all of them
//! before the next generation starts.
mod config;
mod errors;
pub mod logging;

pub use config::{Concurrency, PopulationConfig};
pub use errors::PopulationError;
use logging::Stats;

use crate::genomics::GeneticConfig;
use crate::rng::{master_rng, task_rngs};
use crate::{Agent, AgentID, StateRepository};

use ahash::RandomState;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use tracing::{debug, info};

use std::collections::HashSet;

/// Where agent mutations run.
enum Dispatcher {
    Sequential,
    Parallel(rayon::ThreadPool),
}

impl Dispatcher {
    fn new(concurrency: Concurrency) -> Result<Dispatcher, PopulationError> {
        match concurrency {
            Concurrency::Sequential => Ok(Dispatcher::Sequential),
            Concurrency::Parallel { workers } => rayon::ThreadPoolBuilder::new()
                .num_threads(workers.map_or(0, |w| w.get()))
                .thread_name(|i| format!("oxiswarm-worker-{}", i))
                .build()
                .map(Dispatcher::Parallel)
                .map_err(PopulationError::ThreadPool),
        }
    }
}

/// A population of agents.
pub struct Population {
    agents: Vec<Agent>,
    repository: StateRepository,
    observable: AgentID,
    generation: usize,
    rng: StdRng,
    dispatcher: Dispatcher,
    population_config: PopulationConfig,
    genetic_config: GeneticConfig,
}

impl Population {
    /// Creates a new population of agents with random
    /// current and target states, and posts every agent's
    /// states so the first generation sees all of them.
    /// The first agent created becomes the observable agent.
    ///
    /// # Errors
    /// Returns an error if the crossover weight lies outside
    /// [0.0, 1.0], or the worker pool cannot be started.
    ///
    /// # Examples
    /// ```
    /// use oxiswarm::{Concurrency, Population, PopulationConfig};
    /// use oxiswarm::genomics::GeneticConfig;
    /// use std::num::NonZeroUsize;
    ///
    /// let pop_config = PopulationConfig {
    ///     size: NonZeroUsize::new(16).unwrap(),
    ///     concurrency: Concurrency::Sequential,
    ///     seed: Some(1),
    /// };
    /// let population = Population::new(pop_config, GeneticConfig::default()).unwrap();
    ///
    /// assert_eq!(population.repository().len(), 16);
    /// assert_eq!(population.generation(), 0);
    /// ```
    pub fn new(
        population_config: PopulationConfig,
        genetic_config: GeneticConfig,
    ) -> Result<Population, PopulationError> {
        validate(&genetic_config)?;
        let mut rng = master_rng(population_config.seed);
        let agents = (0..population_config.size.get())
            .map(|_| Agent::random(&genetic_config, &mut rng))
            .collect();
        Population::assemble(agents, rng, population_config, genetic_config)
    }

    /// Creates a new population from the given agents, in
    /// order; the first becomes the observable agent.
    ///
    /// # Errors
    /// Returns an error if the agent count differs from the
    /// configured size, an agent's states do not conform to
    /// `genetic_config`, two agents share an identifier, the
    /// crossover weight lies outside [0.0, 1.0], or the worker
    /// pool cannot be started.
    ///
    /// # Examples
    /// ```
    /// use oxiswarm::{Agent, AgentID, Population, PopulationConfig};
    /// use oxiswarm::genomics::{GeneticConfig, State};
    /// use std::num::{NonZeroU8, NonZeroUsize};
    ///
    /// let genetic_config = GeneticConfig {
    ///     chromosome_length: NonZeroUsize::new(4).unwrap(),
    ///     alphabet_size: NonZeroU8::new(2).unwrap(),
    ///     crossover_weight: 0.5,
    ///     mutation_count: 0,
    /// };
    /// let state = |v: Vec<u8>| State::new(v, &genetic_config);
    /// let agents = vec![
    ///     Agent::new(AgentID::new(), state(vec![1, 1, 1, 1]), state(vec![0, 0, 0, 0])),
    ///     Agent::new(AgentID::new(), state(vec![0, 0, 0, 1]), state(vec![0, 0, 0, 0])),
    /// ];
    /// let pop_config = PopulationConfig {
    ///     size: NonZeroUsize::new(2).unwrap(),
    ///     ..PopulationConfig::zero()
    /// };
    ///
    /// let population = Population::from_agents(agents, pop_config, genetic_config).unwrap();
    /// assert_eq!(population.average_distance(), 2.5);
    /// ```
    pub fn from_agents(
        agents: Vec<Agent>,
        population_config: PopulationConfig,
        genetic_config: GeneticConfig,
    ) -> Result<Population, PopulationError> {
        validate(&genetic_config)?;
        if agents.len() != population_config.size.get() {
            return Err(PopulationError::SeedCountMismatch {
                expected: population_config.size.get(),
                found: agents.len(),
            });
        }
        let mut seen = HashSet::with_capacity_and_hasher(agents.len(), RandomState::new());
        for agent in &agents {
            if !agent.current().conforms_to(&genetic_config)
                || !agent.target().conforms_to(&genetic_config)
            {
                return Err(PopulationError::NonconformingAgent(agent.id()));
            }
            if !seen.insert(agent.id()) {
                return Err(PopulationError::DuplicateAgent(agent.id()));
            }
        }
        let rng = master_rng(population_config.seed);
        Population::assemble(agents, rng, population_config, genetic_config)
    }

    fn assemble(
        agents: Vec<Agent>,
        rng: StdRng,
        population_config: PopulationConfig,
        genetic_config: GeneticConfig,
    ) -> Result<Population, PopulationError> {
        let dispatcher = Dispatcher::new(population_config.concurrency)?;
        let repository = StateRepository::new();
        for agent in &agents {
            agent.post(&repository);
        }
        // Sizes are non-zero, so there is always a first agent.
        let observable = agents[0].id();
        info!(
            size = agents.len(),
            concurrency = ?population_config.concurrency,
            chromosome_length = genetic_config.chromosome_length.get(),
            "population initialized"
        );
        Ok(Population {
            agents,
            repository,
            observable,
            generation: 0,
            rng,
            dispatcher,
            population_config,
            genetic_config,
        })
    }

    /// Advances every agent by one generation.
    ///
    /// Agents are visited in a fresh random order each call.
    /// Returns only once every agent has mutated and posted,
    /// so no read of the next generation can happen early.
    /// Under [`Concurrency::Parallel`] agents run concurrently,
    /// and may see some peers' states from this generation
    /// and others' from the previous one.
    ///
    /// # Examples
    /// ```
    /// use oxiswarm::{Population, PopulationConfig};
    /// use oxiswarm::genomics::GeneticConfig;
    ///
    /// let mut population =
    ///     Population::new(PopulationConfig::default(), GeneticConfig::default()).unwrap();
    /// for _ in 0..10 {
    ///     population.step_generation();
    /// }
    /// assert_eq!(population.generation(), 10);
    /// ```
    pub fn step_generation(&mut self) {
        self.agents.shuffle(&mut self.rng);
        let mut rngs = task_rngs(&mut self.rng, self.agents.len());
        let (repository, genetic_config) = (&self.repository, &self.genetic_config);
        let mutate = |(agent, rng): (&mut Agent, &mut StdRng)| {
            agent.mutate(repository, genetic_config, rng);
        };

        match &self.dispatcher {
            Dispatcher::Sequential => self.agents.iter_mut().zip(rngs.iter_mut()).for_each(mutate),
            Dispatcher::Parallel(pool) => pool.install(|| {
                self.agents
                    .par_iter_mut()
                    .zip(rngs.par_iter_mut())
                    .for_each(mutate)
            }),
        }

        self.generation += 1;
        debug!(
            generation = self.generation,
            average_distance = self.average_distance(),
            "generation complete"
        );
    }

    /// Returns each agent's distance to its target,
    /// in the last generation's visiting order.
    pub fn distances(&self) -> Vec<usize> {
        self.agents.iter().map(Agent::distance_to_target).collect()
    }

    /// Returns statistics on the agents' distances to their targets.
    pub fn stats(&self) -> Stats {
        Stats::from(self.distances().into_iter().map(|d| d as f64))
    }

    /// Returns the mean distance between agents'
    /// current and target states.
    pub fn average_distance(&self) -> f64 {
        let total: usize = self.distances().iter().sum();
        total as f64 / self.agents.len() as f64
    }

    /// Returns the median distance between agents'
    /// current and target states.
    pub fn median_distance(&self) -> f64 {
        self.stats().median
    }

    /// Returns the current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns an iterator over all agents,
    /// in the last generation's visiting order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// Returns the agent with the given identifier.
    pub fn agent(&self, id: AgentID) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    /// Returns the number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Always `false`; populations have at least one agent.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Returns the population's shared state repository.
    pub fn repository(&self) -> &StateRepository {
        &self.repository
    }

    /// Returns the agent singled out for inspection.
    pub fn observable_agent(&self) -> &Agent {
        self.agent(self.observable)
            .unwrap_or_else(|| panic!("observable agent {} missing", self.observable))
    }

    /// Returns the observable agent's current state
    /// projected onto `[0, 1)`.
    pub fn observable_agent_latent_vector(&self) -> Vec<f32> {
        self.observable_agent()
            .current()
            .latent_vector(&self.genetic_config)
    }

    /// Returns the given agent's current state
    /// projected onto `[0, 1)`.
    pub fn latent_vector_of(&self, id: AgentID) -> Option<Vec<f32>> {
        self.agent(id)
            .map(|a| a.current().latent_vector(&self.genetic_config))
    }

    /// Returns the population configuration.
    pub fn population_config(&self) -> &PopulationConfig {
        &self.population_config
    }

    /// Returns the genetic configuration.
    pub fn genetic_config(&self) -> &GeneticConfig {
        &self.genetic_config
    }
}

fn validate(genetic_config: &GeneticConfig) -> Result<(), PopulationError> {
    if (0.0..=1.0).contains(&genetic_config.crossover_weight) {
        Ok(())
    } else {
        Err(PopulationError::InvalidCrossoverWeight(
            genetic_config.crossover_weight,
        ))
    }
}
