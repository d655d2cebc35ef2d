use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Returns the population's master random source,
/// seeded from `seed` if given or from system entropy.
pub(crate) fn master_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Splits `count` independent random sources off `master`,
/// one per task. Tasks can then run on any thread while
/// drawing the same numbers they would sequentially.
pub(crate) fn task_rngs<R: Rng + ?Sized>(master: &mut R, count: usize) -> Vec<StdRng> {
    (0..count)
        .map(|_| StdRng::seed_from_u64(master.gen()))
        .collect()
}
