use crate::genomics::GeneticConfig;

use rand::Rng;
use serde::{Deserialize, Serialize};

use std::sync::Arc;

/// A single position's value in a state.
pub type Allele = u8;

/// An immutable, fixed-length chromosome.
///
/// States are never edited in place: crossover and
/// mutation work on plain allele vectors, which are
/// then wrapped into a new `State`. Cloning is cheap,
/// as the alleles are shared.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State {
    vals: Arc<[Allele]>,
}

impl State {
    /// Wraps the given alleles into a state.
    ///
    /// # Panics
    /// Panics if `vals.len()` differs from the configured
    /// chromosome length.
    ///
    /// # Examples
    /// ```
    /// use oxiswarm::genomics::{GeneticConfig, State};
    /// use std::num::{NonZeroU8, NonZeroUsize};
    ///
    /// let config = GeneticConfig {
    ///     chromosome_length: NonZeroUsize::new(4).unwrap(),
    ///     alphabet_size: NonZeroU8::new(2).unwrap(),
    ///     ..GeneticConfig::zero()
    /// };
    /// let state = State::new(vec![0, 1, 1, 0], &config);
    /// assert_eq!(state.values(), &[0, 1, 1, 0]);
    /// ```
    pub fn new(vals: Vec<Allele>, config: &GeneticConfig) -> State {
        assert_eq!(
            vals.len(),
            config.chromosome_length.get(),
            "state length does not match the configured chromosome length"
        );
        debug_assert!(
            vals.iter().all(|v| *v < config.alphabet_size.get()),
            "allele outside of the configured alphabet"
        );
        State { vals: vals.into() }
    }

    /// Returns a state with every allele drawn
    /// uniformly from the configured alphabet.
    pub fn random<R: Rng + ?Sized>(config: &GeneticConfig, rng: &mut R) -> State {
        let alphabet = config.alphabet_size.get();
        State {
            vals: (0..config.chromosome_length.get())
                .map(|_| rng.gen_range(0..alphabet))
                .collect(),
        }
    }

    /// Returns the state's alleles.
    pub fn values(&self) -> &[Allele] {
        &self.vals
    }

    /// Returns the number of alleles in the state.
    pub fn len(&self) -> usize {
        self.vals.len()
    }

    /// Returns `true` if the state has no alleles.
    /// Never the case for states built from a config.
    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }

    /// Returns whether the state has the configured
    /// length and all its alleles lie in the alphabet.
    pub fn conforms_to(&self, config: &GeneticConfig) -> bool {
        self.len() == config.chromosome_length.get()
            && self.vals.iter().all(|v| *v < config.alphabet_size.get())
    }

    /// Projects every allele onto `[0, 1)` by dividing
    /// it by the alphabet size.
    ///
    /// # Examples
    /// ```
    /// use oxiswarm::genomics::{GeneticConfig, State};
    /// use std::num::{NonZeroU8, NonZeroUsize};
    ///
    /// let config = GeneticConfig {
    ///     chromosome_length: NonZeroUsize::new(3).unwrap(),
    ///     alphabet_size: NonZeroU8::new(4).unwrap(),
    ///     ..GeneticConfig::zero()
    /// };
    /// let state = State::new(vec![0, 2, 3], &config);
    /// assert_eq!(state.latent_vector(&config), vec![0.0, 0.5, 0.75]);
    /// ```
    pub fn latent_vector(&self, config: &GeneticConfig) -> Vec<f32> {
        let alphabet = config.alphabet_size.get() as f32;
        self.vals.iter().map(|v| *v as f32 / alphabet).collect()
    }

    /// Returns the Hamming distance between two states,
    /// i.e. the number of positions at which they differ.
    ///
    /// # Panics
    /// Panics if the states have different lengths.
    ///
    /// # Examples
    /// ```
    /// use oxiswarm::genomics::{GeneticConfig, State};
    /// use std::num::{NonZeroU8, NonZeroUsize};
    ///
    /// let config = GeneticConfig {
    ///     chromosome_length: NonZeroUsize::new(4).unwrap(),
    ///     alphabet_size: NonZeroU8::new(2).unwrap(),
    ///     ..GeneticConfig::zero()
    /// };
    /// let a = State::new(vec![0, 0, 0, 0], &config);
    /// let b = State::new(vec![1, 0, 0, 1], &config);
    /// assert_eq!(State::distance(&a, &b), 2);
    /// ```
    pub fn distance(first: &State, second: &State) -> usize {
        assert_eq!(
            first.len(),
            second.len(),
            "distance between states of different lengths"
        );
        first
            .vals
            .iter()
            .zip(second.vals.iter())
            .filter(|(a, b)| a != b)
            .count()
    }

    /// Single-point crossover. The first child takes
    /// `first`'s alleles before `point` and `second`'s
    /// from `point` onwards; the second child is its
    /// complement.
    ///
    /// # Panics
    /// Panics if the states have different lengths.
    pub fn crossover(first: &State, second: &State, point: usize) -> (Vec<Allele>, Vec<Allele>) {
        assert_eq!(
            first.len(),
            second.len(),
            "crossover between states of different lengths"
        );
        first
            .vals
            .iter()
            .zip(second.vals.iter())
            .enumerate()
            .map(|(i, (a, b))| if i < point { (*a, *b) } else { (*b, *a) })
            .unzip()
    }
}

/// Overwrites `count` uniformly chosen positions with
/// uniformly chosen alleles. The same position may be
/// picked more than once.
pub fn mutate_alleles<R: Rng + ?Sized>(
    alleles: &mut [Allele],
    count: usize,
    config: &GeneticConfig,
    rng: &mut R,
) {
    if alleles.is_empty() {
        return;
    }
    let alphabet = config.alphabet_size.get();
    for _ in 0..count {
        let position = rng.gen_range(0..alleles.len());
        alleles[position] = rng.gen_range(0..alphabet);
    }
}
