use serde::{Deserialize, Serialize};

use crate::core::{FGResult, RandomSource, RealDomain};

/// A random walk Metropolis-Hastings update of a scalar variable, used when
/// no conjugate sampler fits the variable.
///
/// Proposals are `Normal(current, scale)`, proposals outside the domain are
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RandomWalk {
    scale: f64,
}

impl Default for RandomWalk {
    fn default() -> Self {
        RandomWalk { scale: 1f64 }
    }
}

impl RandomWalk {
    #[inline]
    pub fn new(scale: f64) -> Self {
        RandomWalk { scale }
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the next state of a chain
    ///
    /// # Arguments
    ///
    /// * `current` - The current state
    /// * `domain` - The support of a variable
    /// * `log_density` - An unnormalized log-density of a target
    /// * `rng` - A random source
    pub fn step<R, D>(&self, current: f64, domain: &RealDomain, mut log_density: D, rng: &mut R) -> FGResult<f64>
    where
        R: RandomSource + ?Sized,
        D: FnMut(f64) -> FGResult<f64>,
    {
        let proposal = rng.next_normal(current, self.scale)?;
        if !domain.in_domain(proposal) {
            return Ok(current);
        }
        let proposed = log_density(proposal)?;
        if proposed.is_nan() || proposed == f64::NEG_INFINITY {
            return Ok(current);
        }
        let present = log_density(current)?;
        // any admissible proposal leaves a state of zero density
        if present.is_nan() || present == f64::NEG_INFINITY {
            return Ok(proposal);
        }
        if rng.next_uniform().ln() < proposed - present {
            Ok(proposal)
        } else {
            Ok(current)
        }
    }
}
