use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Gamma, Normal};
use serde::{Deserialize, Serialize};

use crate::core::factor_graph::{FGError, FGResult};

/// A source of random draws used by samplers
pub trait RandomSource {
    /// Draws from `Gamma(shape, scale)`
    fn next_gamma(&mut self, shape: f64, scale: f64) -> FGResult<f64>;

    /// Draws from `Normal(mean, std_dev)`
    fn next_normal(&mut self, mean: f64, std_dev: f64) -> FGResult<f64>;

    /// Draws an integer uniformly from `[0, bound)`, returns 0 if `bound` is 0
    fn next_int(&mut self, bound: usize) -> usize;

    /// Draws a real uniformly from `[0, 1)`
    fn next_uniform(&mut self) -> f64;
}

impl<R: Rng> RandomSource for R {
    #[inline]
    fn next_gamma(&mut self, shape: f64, scale: f64) -> FGResult<f64> {
        let distr = Gamma::new(shape, scale).map_err(|err| {
            FGError::InvalidDistribution(format!("Gamma(shape = {shape}, scale = {scale}): {err}"))
        })?;
        Ok(distr.sample(self))
    }

    #[inline]
    fn next_normal(&mut self, mean: f64, std_dev: f64) -> FGResult<f64> {
        let distr = Normal::new(mean, std_dev).map_err(|err| {
            FGError::InvalidDistribution(format!("Normal(mean = {mean}, std_dev = {std_dev}): {err}"))
        })?;
        Ok(distr.sample(self))
    }

    #[inline]
    fn next_int(&mut self, bound: usize) -> usize {
        if bound == 0 {
            0
        } else {
            self.gen_range(0..bound)
        }
    }

    #[inline]
    fn next_uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

// ------------------------------------------------------------------------------------------

/// Parameters of sampling runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Base seed, every worker derives its own seed from it.
    /// Without a seed generators are seeded from entropy
    pub seed: Option<u64>,

    /// Number of workers (replica chains)
    pub workers: usize,

    /// Number of sweeps kept per worker
    pub sweeps: usize,

    /// Number of sweeps discarded before keeping samples
    pub burn_in: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            seed: None,
            workers: 1,
            sweeps: 100,
            burn_in: 10,
        }
    }
}

const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// A per-worker context passed explicitly to sampling entry points
#[derive(Debug, Clone)]
pub struct SolverContext {
    rng: StdRng,
    worker: usize,
}

impl SolverContext {
    #[inline]
    pub fn seeded(seed: u64) -> Self {
        SolverContext {
            rng: StdRng::seed_from_u64(seed),
            worker: 0,
        }
    }

    #[inline]
    pub fn from_entropy() -> Self {
        SolverContext {
            rng: StdRng::from_entropy(),
            worker: 0,
        }
    }

    /// Creates a context of a worker, runs with the same seed and worker
    /// index draw the same numbers
    pub fn for_worker(config: &SolverConfig, worker: usize) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add((worker as u64).wrapping_mul(SEED_STRIDE))),
            None => StdRng::from_entropy(),
        };
        SolverContext { rng, worker }
    }

    #[inline]
    pub fn worker(&self) -> usize {
        self.worker
    }

    #[inline]
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl RandomSource for SolverContext {
    #[inline]
    fn next_gamma(&mut self, shape: f64, scale: f64) -> FGResult<f64> {
        self.rng.next_gamma(shape, scale)
    }

    #[inline]
    fn next_normal(&mut self, mean: f64, std_dev: f64) -> FGResult<f64> {
        self.rng.next_normal(mean, std_dev)
    }

    #[inline]
    fn next_int(&mut self, bound: usize) -> usize {
        self.rng.next_int(bound)
    }

    #[inline]
    fn next_uniform(&mut self) -> f64 {
        self.rng.next_uniform()
    }
}
