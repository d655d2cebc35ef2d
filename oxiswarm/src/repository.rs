//! The shared board on which agents post their states.
//!
//! All reads and writes funnel through one mutex. It is
//! only held while state handles are copied in or out,
//! never while an agent breeds its next state.
use crate::genomics::State;
use crate::AgentID;

use ahash::RandomState;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

// Fixed hasher keys make iteration order a function of the
// key set and insertion history only, so seeded runs break
// nearest-peer ties the same way every time.
const HASHER_SEEDS: (u64, u64, u64, u64) = (
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
);

/// The latest states published by an agent.
#[derive(Clone, Debug, PartialEq)]
pub struct Posting {
    current: State,
    target: State,
    posted_at: SystemTime,
}

impl Posting {
    /// The agent's current state at posting time.
    pub fn current(&self) -> &State {
        &self.current
    }

    /// The agent's target state.
    pub fn target(&self) -> &State {
        &self.target
    }

    /// Wall-clock time of the post.
    pub fn posted_at(&self) -> SystemTime {
        self.posted_at
    }
}

/// A thread-safe map from agent to its latest [`Posting`].
///
/// Many threads may post and read concurrently; each
/// operation sees the whole map at a single point in time,
/// and a posting is always replaced as a unit, so no read
/// can pair one post's current state with another's target.
pub struct StateRepository {
    postings: Mutex<HashMap<AgentID, Posting, RandomState>>,
}

impl StateRepository {
    /// Creates an empty repository.
    ///
    /// # Examples
    /// ```
    /// use oxiswarm::StateRepository;
    ///
    /// let repository = StateRepository::new();
    /// assert!(repository.is_empty());
    /// ```
    pub fn new() -> StateRepository {
        let (k0, k1, k2, k3) = HASHER_SEEDS;
        StateRepository {
            postings: Mutex::new(HashMap::with_hasher(RandomState::with_seeds(k0, k1, k2, k3))),
        }
    }

    /// Inserts or replaces `id`'s posting, stamped
    /// with the current time.
    pub fn post(&self, id: AgentID, current: State, target: State) {
        let posting = Posting {
            current,
            target,
            posted_at: SystemTime::now(),
        };
        self.lock().insert(id, posting);
    }

    /// Returns the current state of every agent except `id`.
    ///
    /// Empty if no other agent has posted yet.
    ///
    /// # Examples
    /// ```
    /// use oxiswarm::{AgentID, StateRepository};
    /// use oxiswarm::genomics::{GeneticConfig, State};
    ///
    /// let config = GeneticConfig::zero();
    /// let repository = StateRepository::new();
    /// let (me, you) = (AgentID::new(), AgentID::new());
    /// repository.post(me, State::new(vec![0], &config), State::new(vec![0], &config));
    /// assert!(repository.snapshot_excluding(me).is_empty());
    ///
    /// repository.post(you, State::new(vec![0], &config), State::new(vec![0], &config));
    /// assert_eq!(repository.snapshot_excluding(me).len(), 1);
    /// ```
    pub fn snapshot_excluding(&self, id: AgentID) -> Vec<State> {
        self.lock()
            .iter()
            .filter(|(other, _)| **other != id)
            .map(|(_, posting)| posting.current.clone())
            .collect()
    }

    /// Returns every posted current state.
    pub fn all_current(&self) -> Vec<State> {
        self.lock().values().map(|p| p.current.clone()).collect()
    }

    /// Returns every posted target state.
    pub fn all_target(&self) -> Vec<State> {
        self.lock().values().map(|p| p.target.clone()).collect()
    }

    /// Returns `id`'s latest posting, if any.
    pub fn posting(&self, id: AgentID) -> Option<Posting> {
        self.lock().get(&id).cloned()
    }

    /// Returns whether `id` has posted.
    pub fn contains(&self, id: AgentID) -> bool {
        self.lock().contains_key(&id)
    }

    /// Removes `id`'s posting, returning it if present.
    pub fn unregister(&self, id: AgentID) -> Option<Posting> {
        self.lock().remove(&id)
    }

    /// Returns the number of agents that have posted.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no agent has posted.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<AgentID, Posting, RandomState>> {
        // Postings are inserted and removed whole, so the
        // map is consistent even if a holder panicked.
        self.postings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for StateRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateRepository")
            .field("postings", &self.len())
            .finish()
    }
}

impl Default for StateRepository {
    fn default() -> StateRepository {
        StateRepository::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::GeneticConfig;
    use std::num::{NonZeroU8, NonZeroUsize};
    use std::sync::Arc;
    use std::thread;

    fn config() -> GeneticConfig {
        GeneticConfig {
            chromosome_length: NonZeroUsize::new(8).unwrap(),
            alphabet_size: NonZeroU8::new(4).unwrap(),
            ..GeneticConfig::zero()
        }
    }

    fn uniform(value: u8) -> State {
        State::new(vec![value; 8], &config())
    }

    #[test]
    fn repost_replaces() {
        let repository = StateRepository::new();
        let id = AgentID::new();
        repository.post(id, uniform(0), uniform(1));
        let first = repository.posting(id).unwrap();
        repository.post(id, uniform(2), uniform(1));
        let second = repository.posting(id).unwrap();

        assert_eq!(repository.len(), 1);
        assert_eq!(second.current(), &uniform(2));
        assert_eq!(second.target(), &uniform(1));
        assert!(second.posted_at() >= first.posted_at());
    }

    #[test]
    fn snapshot_excludes_only_caller() {
        let repository = StateRepository::new();
        let ids: Vec<AgentID> = (0..5).map(|_| AgentID::new()).collect();
        for (i, id) in ids.iter().enumerate() {
            repository.post(*id, uniform(i as u8 % 4), uniform(0));
        }
        for id in &ids {
            assert_eq!(repository.snapshot_excluding(*id).len(), 4);
        }
        assert_eq!(repository.snapshot_excluding(AgentID::new()).len(), 5);
        assert_eq!(repository.all_current().len(), 5);
        assert_eq!(repository.all_target(), vec![uniform(0); 5]);
    }

    #[test]
    fn unregister_removes() {
        let repository = StateRepository::new();
        let id = AgentID::new();
        assert!(repository.unregister(id).is_none());
        repository.post(id, uniform(3), uniform(2));
        assert!(repository.contains(id));
        assert_eq!(repository.unregister(id).unwrap().current(), &uniform(3));
        assert!(!repository.contains(id));
        assert!(repository.is_empty());
    }

    #[test]
    fn same_key_set_same_order() {
        let ids: Vec<AgentID> = (0..32).map(|_| AgentID::new()).collect();
        let fill = || {
            let repository = StateRepository::new();
            for (i, id) in ids.iter().enumerate() {
                repository.post(*id, uniform(i as u8 % 4), uniform(0));
            }
            repository.all_current()
        };
        assert_eq!(fill(), fill());
    }

    #[test]
    fn concurrent_posts_are_never_torn() {
        let repository = Arc::new(StateRepository::new());
        let ids: Vec<AgentID> = (0..8).map(|_| AgentID::new()).collect();
        for id in &ids {
            repository.post(*id, uniform(0), uniform(0));
        }
        let writers: Vec<_> = ids
            .iter()
            .map(|id| {
                let repository = Arc::clone(&repository);
                let id = *id;
                thread::spawn(move || {
                    for round in 0..200u32 {
                        // Current and target always carry the same value.
                        let value = (round % 4) as u8;
                        repository.post(id, uniform(value), uniform(value));
                    }
                })
            })
            .collect();
        let reader = {
            let repository = Arc::clone(&repository);
            let ids = ids.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    for id in &ids {
                        let posting = repository.posting(*id).unwrap();
                        assert_eq!(posting.current(), posting.target());
                        assert_eq!(repository.snapshot_excluding(*id).len(), 7);
                    }
                    assert_eq!(repository.all_current().len(), repository.len());
                    assert_eq!(repository.all_target().len(), 8);
                }
            })
        };
        for writer in writers {
            writer.join().unwrap();
        }
        reader.join().unwrap();
        assert_eq!(repository.len(), 8);
    }
}
