//! States are the focus of evolution here.
//! Each is a fixed-length chromosome over a small
//! integer alphabet; agents compare them by Hamming
//! distance and recombine them by single-point crossover
//! followed by random point mutations.

mod config;
mod state;

pub use config::GeneticConfig;
pub use state::{mutate_alleles, Allele, State};
