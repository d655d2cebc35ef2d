//! Agents each chase a private target state.
//! Every generation an agent looks at what its peers
//! have posted, crosses its own state over with the peer
//! closest to its target, mutates the offspring, and keeps
//! whichever child lands nearer the target.
use crate::genomics::{mutate_alleles, GeneticConfig, State};
use crate::StateRepository;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use uuid::Uuid;

use std::fmt;

/// Agent identifier, unique within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentID(Uuid);

#[allow(clippy::new_without_default)]
impl AgentID {
    /// Returns a fresh random identifier.
    pub fn new() -> AgentID {
        AgentID(Uuid::new_v4())
    }

    /// Returns an identifier built from bytes drawn
    /// from `rng`, so seeded populations get the same
    /// identifiers on every run.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> AgentID {
        AgentID(uuid::Builder::from_random_bytes(rng.gen()).into_uuid())
    }
}

impl fmt::Display for AgentID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a single [`Agent::mutate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationReport {
    /// Distance from the agent's target to the nearest
    /// peer state, or `None` if no peer had posted yet.
    pub nearest_distance: Option<usize>,
    /// Distance from the agent's target to its new state.
    pub distance: usize,
}

/// An agent holding a fixed target and a current
/// state that is replaced wholesale each generation.
///
/// Deserialization rejects agents whose current and
/// target states differ in length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AgentParts")]
pub struct Agent {
    id: AgentID,
    target: State,
    current: State,
}

#[derive(Deserialize)]
struct AgentParts {
    id: AgentID,
    target: State,
    current: State,
}

impl TryFrom<AgentParts> for Agent {
    type Error = String;

    fn try_from(parts: AgentParts) -> Result<Agent, String> {
        if parts.current.len() != parts.target.len() {
            return Err(format!(
                "agent {} has a current state of length {} and a target of length {}",
                parts.id,
                parts.current.len(),
                parts.target.len()
            ));
        }
        Ok(Agent {
            id: parts.id,
            target: parts.target,
            current: parts.current,
        })
    }
}

impl Agent {
    /// Creates an agent from its parts.
    ///
    /// # Panics
    /// Panics if `current` and `target` differ in length.
    ///
    /// # Examples
    /// ```
    /// use oxiswarm::{Agent, AgentID};
    /// use oxiswarm::genomics::{GeneticConfig, State};
    /// use std::num::{NonZeroU8, NonZeroUsize};
    ///
    /// let config = GeneticConfig {
    ///     chromosome_length: NonZeroUsize::new(4).unwrap(),
    ///     alphabet_size: NonZeroU8::new(2).unwrap(),
    ///     ..GeneticConfig::zero()
    /// };
    /// let agent = Agent::new(
    ///     AgentID::new(),
    ///     State::new(vec![1, 1, 1, 1], &config),
    ///     State::new(vec![0, 0, 0, 0], &config),
    /// );
    /// assert_eq!(agent.distance_to_target(), 4);
    /// ```
    pub fn new(id: AgentID, current: State, target: State) -> Agent {
        assert_eq!(
            current.len(),
            target.len(),
            "agent current and target states differ in length"
        );
        Agent {
            id,
            target,
            current,
        }
    }

    /// Creates an agent with random current and target
    /// states, and an identifier drawn from `rng`.
    pub fn random<R: Rng + ?Sized>(config: &GeneticConfig, rng: &mut R) -> Agent {
        let id = AgentID::from_rng(rng);
        let current = State::random(config, rng);
        let target = State::random(config, rng);
        Agent {
            id,
            target,
            current,
        }
    }

    /// Returns the agent's identifier.
    pub fn id(&self) -> AgentID {
        self.id
    }

    /// Returns the agent's target state.
    pub fn target(&self) -> &State {
        &self.target
    }

    /// Returns the agent's current state.
    pub fn current(&self) -> &State {
        &self.current
    }

    /// Returns the distance between the agent's
    /// current and target states.
    pub fn distance_to_target(&self) -> usize {
        State::distance(&self.target, &self.current)
    }

    /// Publishes the agent's current and target states.
    pub fn post(&self, repository: &StateRepository) {
        repository.post(self.id, self.current.clone(), self.target.clone());
    }

    /// Replaces the current state with the better of two
    /// children bred from it and the nearest peer state,
    /// then posts the result.
    ///
    /// The nearest peer is the posted state (other than the
    /// agent's own) closest to the agent's target, with the
    /// first one seen winning ties. Between the two children,
    /// the first only wins if strictly closer to the target.
    ///
    /// If no other agent has posted yet, the agent's own
    /// state stands in for the peer, so both children start
    /// as copies of it and only differ by mutation.
    ///
    /// The repository is only locked while reading the
    /// snapshot and while posting; breeding happens
    /// without holding it.
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        repository: &StateRepository,
        config: &GeneticConfig,
        rng: &mut R,
    ) -> MutationReport {
        let peers = repository.snapshot_excluding(self.id);
        let (first, second, nearest_distance) = {
            let (nearest, nearest_distance) = match nearest_peer(&self.target, &peers) {
                Some((nearest, distance)) => (nearest, Some(distance)),
                None => {
                    debug!(agent = %self.id, "no peer states posted, mutating alone");
                    (&self.current, None)
                }
            };
            let (mut first, mut second) =
                State::crossover(&self.current, nearest, config.crossover_point());
            mutate_alleles(&mut first, config.mutation_count, config, rng);
            mutate_alleles(&mut second, config.mutation_count, config, rng);
            (
                State::new(first, config),
                State::new(second, config),
                nearest_distance,
            )
        };

        let first_distance = State::distance(&self.target, &first);
        let second_distance = State::distance(&self.target, &second);
        let (next, distance) = if first_distance < second_distance {
            (first, first_distance)
        } else {
            (second, second_distance)
        };
        self.current = next;
        self.post(repository);

        trace!(
            agent = %self.id,
            peers = peers.len(),
            ?nearest_distance,
            distance,
            "agent mutated"
        );
        MutationReport {
            nearest_distance,
            distance,
        }
    }
}

/// Returns the state in `peers` closest to `target`
/// along with its distance. Earlier peers win ties.
fn nearest_peer<'a>(target: &State, peers: &'a [State]) -> Option<(&'a State, usize)> {
    peers
        .iter()
        .map(|peer| (peer, State::distance(target, peer)))
        .min_by_key(|(_, distance)| *distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::num::{NonZeroU8, NonZeroUsize};

    fn config(mutation_count: usize) -> GeneticConfig {
        GeneticConfig {
            chromosome_length: NonZeroUsize::new(4).unwrap(),
            alphabet_size: NonZeroU8::new(2).unwrap(),
            crossover_weight: 0.5,
            mutation_count,
        }
    }

    fn agent(current: Vec<u8>, target: Vec<u8>, config: &GeneticConfig) -> Agent {
        Agent::new(
            AgentID::new(),
            State::new(current, config),
            State::new(target, config),
        )
    }

    #[test]
    fn nearest_peer_first_seen_wins_ties() {
        let config = config(0);
        let target = State::new(vec![0, 0, 0, 0], &config);
        let peers = vec![
            State::new(vec![1, 1, 0, 0], &config),
            State::new(vec![0, 1, 0, 0], &config),
            State::new(vec![0, 0, 1, 0], &config),
        ];
        let (nearest, distance) = nearest_peer(&target, &peers).unwrap();
        assert_eq!(distance, 1);
        assert!(std::ptr::eq(nearest, &peers[1]));
        assert!(nearest_peer(&target, &[]).is_none());
    }

    #[test]
    fn mutate_takes_closer_child() {
        let config = config(0);
        let repository = StateRepository::new();
        let mut first = agent(vec![1, 1, 1, 1], vec![0, 0, 0, 0], &config);
        let second = agent(vec![0, 0, 0, 1], vec![0, 0, 0, 0], &config);
        first.post(&repository);
        second.post(&repository);

        let report = first.mutate(&repository, &config, &mut StdRng::seed_from_u64(0));
        assert_eq!(first.current().values(), &[1, 0, 0, 1]);
        assert_eq!(
            report,
            MutationReport {
                nearest_distance: Some(1),
                distance: 2
            }
        );
        let posting = repository.posting(first.id()).unwrap();
        assert_eq!(posting.current(), first.current());
        assert_eq!(posting.target(), first.target());
    }

    #[test]
    fn mutate_in_both_orders() {
        let config = config(0);

        // First agent moves first: the second sees [1, 0, 0, 1].
        let repository = StateRepository::new();
        let mut first = agent(vec![1, 1, 1, 1], vec![0, 0, 0, 0], &config);
        let mut second = agent(vec![0, 0, 0, 1], vec![0, 0, 0, 0], &config);
        first.post(&repository);
        second.post(&repository);
        let mut rng = StdRng::seed_from_u64(0);
        first.mutate(&repository, &config, &mut rng);
        second.mutate(&repository, &config, &mut rng);
        assert_eq!(first.current().values(), &[1, 0, 0, 1]);
        assert_eq!(second.current().values(), &[0, 0, 0, 1]);

        // Second agent moves first: it sees [1, 1, 1, 1] and
        // adopts [1, 0, 0, 1] itself.
        let repository = StateRepository::new();
        let mut first = agent(vec![1, 1, 1, 1], vec![0, 0, 0, 0], &config);
        let mut second = agent(vec![0, 0, 0, 1], vec![0, 0, 0, 0], &config);
        first.post(&repository);
        second.post(&repository);
        second.mutate(&repository, &config, &mut rng);
        first.mutate(&repository, &config, &mut rng);
        assert_eq!(second.current().values(), &[1, 0, 0, 1]);
        assert_eq!(first.current().values(), &[1, 0, 0, 1]);
    }

    #[test]
    fn ties_favour_second_child() {
        let config = config(0);
        let repository = StateRepository::new();
        // Children are [1, 0, 1, 1] and [0, 1, 1, 1]: both at distance 3.
        let mut first = agent(vec![1, 1, 1, 1], vec![0, 0, 0, 0], &config);
        let second = agent(vec![0, 0, 1, 1], vec![1, 1, 1, 1], &config);
        first.post(&repository);
        second.post(&repository);
        first.mutate(&repository, &config, &mut StdRng::seed_from_u64(0));
        assert_eq!(first.current().values(), &[0, 1, 1, 1]);
    }

    #[test]
    fn mutate_without_peers() {
        let config = config(0);
        let repository = StateRepository::new();
        let mut lonely = agent(vec![1, 0, 1, 0], vec![0, 0, 0, 0], &config);

        let report = lonely.mutate(&repository, &config, &mut StdRng::seed_from_u64(0));
        assert_eq!(report.nearest_distance, None);
        assert_eq!(lonely.current().values(), &[1, 0, 1, 0]);
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn mutate_without_peers_still_mutates() {
        let config = GeneticConfig {
            chromosome_length: NonZeroUsize::new(64).unwrap(),
            ..config(10)
        };
        let repository = StateRepository::new();
        let mut rng = StdRng::seed_from_u64(5);
        let mut lonely = Agent::random(&config, &mut rng);
        lonely.post(&repository);

        let report = lonely.mutate(&repository, &config, &mut rng);
        assert_eq!(report.distance, lonely.distance_to_target());
        assert!(lonely.current().conforms_to(&config));
    }

    #[test]
    fn target_never_changes() {
        let config = GeneticConfig {
            chromosome_length: NonZeroUsize::new(32).unwrap(),
            ..config(4)
        };
        let repository = StateRepository::new();
        let mut rng = StdRng::seed_from_u64(9);
        let mut agents: Vec<Agent> = (0..4).map(|_| Agent::random(&config, &mut rng)).collect();
        let targets: Vec<State> = agents.iter().map(|a| a.target().clone()).collect();
        agents.iter().for_each(|a| a.post(&repository));
        for _ in 0..10 {
            for agent in &mut agents {
                agent.mutate(&repository, &config, &mut rng);
            }
        }
        for (agent, target) in agents.iter().zip(&targets) {
            assert_eq!(agent.target(), target);
        }
    }

    #[test]
    fn seeded_ids_repeat() {
        let a = AgentID::from_rng(&mut StdRng::seed_from_u64(1));
        let b = AgentID::from_rng(&mut StdRng::seed_from_u64(1));
        let c = AgentID::from_rng(&mut StdRng::seed_from_u64(2));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn deserialized_agents_keep_equal_lengths() {
        let config = config(0);
        let agent = agent(vec![1, 0, 1, 0], vec![0, 0, 1, 1], &config);
        let json = serde_json::to_string(&agent).unwrap();
        assert_eq!(serde_json::from_str::<Agent>(&json).unwrap(), agent);

        let lopsided = serde_json::json!({
            "id": agent.id(),
            "target": [0, 0, 1, 1],
            "current": [1, 0, 1],
        });
        assert!(serde_json::from_value::<Agent>(lopsided).is_err());
    }

    #[test]
    fn fresh_ids_differ() {
        let ids: Vec<AgentID> = (0..16).map(|_| AgentID::new()).collect();
        for (i, id) in ids.iter().enumerate() {
            assert!(!ids[i + 1..].contains(id));
        }
    }
}
