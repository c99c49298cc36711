use rayon::prelude::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{FGResult, FactorGraph, SolverConfig, SolverContext, Value};
use crate::gibbs::solver_graph::GibbsGraph;

/// Samples collected by one replica chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingInfo {
    /// Index of the worker that ran the chain
    pub worker: usize,

    /// Number of discarded sweeps
    pub burn_in: usize,

    /// samples[i][j] is the value of the j-th requested variable after the i-th kept sweep
    pub samples: Vec<Vec<Value>>,
}

impl SamplingInfo {
    /// Mean of a scalar variable over kept sweeps, `None` if the variable is not
    /// scalar or no sweep was kept
    pub fn mean(&self, position: usize) -> Option<f64> {
        let values = self
            .samples
            .iter()
            .map(|sweep| sweep.get(position).and_then(Value::as_real))
            .collect::<Option<Vec<_>>>()?;
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Runs independent Gibbs chains over one factor graph in parallel.
///
/// # Arguments
///
/// * `graph` - A factor graph shared by all chains
/// * `variables` - Variables whose samples are recorded
/// * `config` - Number of workers, sweeps, burn-in and the base seed
///
/// # Notes
///
/// Every worker owns its solver graph and its generator, the generator of a
/// worker is seeded from the base seed and the worker index, so runs with a
/// base seed are reproducible
pub fn run_replicas(graph: &FactorGraph, variables: &[usize], config: &SolverConfig) -> FGResult<Vec<SamplingInfo>> {
    (0..config.workers)
        .into_par_iter()
        .map(|worker| {
            let mut context = SolverContext::for_worker(config, worker);
            let mut gibbs = GibbsGraph::new(graph)?;
            for _ in 0..config.burn_in {
                gibbs.sweep(&mut context)?;
            }
            let mut samples = Vec::with_capacity(config.sweeps);
            for _ in 0..config.sweeps {
                gibbs.sweep(&mut context)?;
                samples.push(
                    variables
                        .iter()
                        .map(|v| gibbs.sample_value(*v))
                        .collect::<FGResult<Vec<_>>>()?,
                );
            }
            debug!(worker, sweeps = config.sweeps, "replica finished");
            Ok(SamplingInfo {
                worker,
                burn_in: config.burn_in,
                samples,
            })
        })
        .collect()
}
