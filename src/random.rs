use rand::prelude::*;

/// Source of the fair coin flips used to break ties between equidistant centroids.
pub(crate) trait CoinFlip {
    fn flip(&mut self) -> bool;
}

/// Sequential runs draw their flips straight from the configured generator.
impl CoinFlip for dyn RngCore + '_ {
    #[inline(always)]
    fn flip(&mut self) -> bool { self.gen() }
}

/// Coin for one point, within one pass of a parallel run.
///
/// The stream is derived from the pass' salt, the worker id and the point index, so the outcome
/// is reproducible for a fixed seed and worker count, while no generator is ever shared between
/// workers. Seeding is deferred to the first flip, as ties are rare.
pub(crate) struct TieBreaker {
    seed: u64,
    rnd: Option<StdRng>,
}
impl TieBreaker {
    pub fn new(salt: u64, worker_id: usize, point_idx: usize) -> Self {
        let seed = salt
            .wrapping_add((worker_id as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
            .wrapping_add(point_idx as u64);
        Self { seed, rnd: None }
    }
}
impl CoinFlip for TieBreaker {
    #[inline(always)]
    fn flip(&mut self) -> bool {
        let seed = self.seed;
        self.rnd.get_or_insert_with(|| StdRng::seed_from_u64(seed)).gen()
    }
}
