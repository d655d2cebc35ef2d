use serde::{Deserialize, Serialize};

use std::num::{NonZeroU8, NonZeroUsize};

/// Configuration data for state generation
/// and the crossover/mutation operators.
///
/// # Note
/// [`crossover_weight`] should be in the range
/// [0.0, 1.0]. Populations refuse configurations
/// outside of it.
///
/// [`crossover_weight`]: GeneticConfig::crossover_weight
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Number of alleles in every state.
    pub chromosome_length: NonZeroUsize,
    /// Exclusive upper bound of any single allele.
    pub alphabet_size: NonZeroU8,
    /// Fraction of the chromosome (scaled over `length - 1`)
    /// taken from the agent's own state before the crossover
    /// point.
    pub crossover_weight: f32,
    /// Number of random point mutations applied to each
    /// child after crossover.
    pub mutation_count: usize,
}

impl GeneticConfig {
    /// Returns a "zero-valued" configuration.
    /// All values are 0, or in the case of
    /// non-zero integers, 1.
    ///
    /// # Note
    /// This value is not suitable for use in most experiments.
    /// It is meant as a way to abbreviate configuration
    /// instantiation, or to fill in unused values.
    ///
    /// # Examples
    /// ```
    /// use oxiswarm::genomics::GeneticConfig;
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     chromosome_length: NonZeroUsize::new(64).unwrap(),
    ///     ..GeneticConfig::zero()
    /// };
    /// assert_eq!(config.mutation_count, 0);
    /// ```
    pub const fn zero() -> GeneticConfig {
        GeneticConfig {
            chromosome_length: NonZeroUsize::MIN,
            alphabet_size: NonZeroU8::MIN,
            crossover_weight: 0.0,
            mutation_count: 0,
        }
    }

    /// Index at which crossover switches parents:
    /// `floor((length - 1) * crossover_weight)`.
    ///
    /// # Examples
    /// ```
    /// use oxiswarm::genomics::GeneticConfig;
    /// use std::num::NonZeroUsize;
    ///
    /// let config = GeneticConfig {
    ///     chromosome_length: NonZeroUsize::new(4).unwrap(),
    ///     crossover_weight: 0.5,
    ///     ..GeneticConfig::zero()
    /// };
    /// assert_eq!(config.crossover_point(), 1);
    /// ```
    pub fn crossover_point(&self) -> usize {
        ((self.chromosome_length.get() - 1) as f32 * self.crossover_weight).floor() as usize
    }
}

impl Default for GeneticConfig {
    /// 128 binary alleles, an even split at crossover
    /// and ten point mutations per child.
    fn default() -> GeneticConfig {
        GeneticConfig {
            chromosome_length: NonZeroUsize::new(128).unwrap(),
            alphabet_size: NonZeroU8::new(2).unwrap(),
            crossover_weight: 0.5,
            mutation_count: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossover_point_bounds() {
        let mut config = GeneticConfig {
            chromosome_length: NonZeroUsize::new(128).unwrap(),
            ..GeneticConfig::zero()
        };
        assert_eq!(config.crossover_point(), 0);
        config.crossover_weight = 1.0;
        assert_eq!(config.crossover_point(), 127);
        config.crossover_weight = 0.5;
        assert_eq!(config.crossover_point(), 63);
    }

    #[test]
    fn single_allele_chromosome() {
        let config = GeneticConfig {
            crossover_weight: 1.0,
            ..GeneticConfig::zero()
        };
        assert_eq!(config.crossover_point(), 0);
    }

    #[test]
    fn default_matches_reference_run() {
        let config = GeneticConfig::default();
        assert_eq!(config.chromosome_length.get(), 128);
        assert_eq!(config.alphabet_size.get(), 2);
        assert_eq!(config.mutation_count, 10);
    }
}
