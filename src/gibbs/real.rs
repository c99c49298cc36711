use tracing::{debug, warn};

use crate::core::{Datum, Domain, FGError, FGResult, FactorGraph, RandomSource, RealDomain, RealGuess, Value};
use crate::gibbs::metropolis::RandomWalk;
use crate::gibbs::samplers::{ConjugateSampler, GammaSampler, SamplerFamily};
use crate::messages::ParameterMessage;

/// A Gibbs solver of a scalar real variable
#[derive(Debug, Clone)]
pub struct GibbsReal {
    index: usize,
    domain: RealDomain,
    sample: f64,
    fixed: Option<f64>,
    input: Option<Datum>,
    pub(crate) guess: RealGuess,
    sampler: Option<GammaSampler>,
    walk: RandomWalk,
}

/// Unnormalized log-density of a scalar prior, `None` if a prior has no
/// scalar density
fn prior_log_density(prior: &Datum, x: f64) -> Option<f64> {
    match prior {
        Datum::Gamma(parameters) => Some(if x > 0f64 {
            parameters.alpha_minus_one() * x.ln() - parameters.beta() * x
        } else if x == 0f64 && parameters.alpha_minus_one() == 0f64 {
            0f64
        } else {
            f64::NEG_INFINITY
        }),
        Datum::Normal { mean, precision } => Some(-0.5 * precision * (x - mean).powi(2)),
        _ => None,
    }
}

impl GibbsReal {
    pub fn new(index: usize, domain: RealDomain) -> Self {
        GibbsReal {
            index,
            domain,
            sample: domain.clip(1f64),
            fixed: None,
            input: None,
            guess: RealGuess::default(),
            sampler: None,
            walk: RandomWalk::default(),
        }
    }

    #[inline]
    pub fn domain(&self) -> &RealDomain {
        &self.domain
    }

    #[inline]
    pub fn current_sample(&self) -> f64 {
        self.fixed.unwrap_or(self.sample)
    }

    #[inline]
    pub fn set_current_sample(&mut self, sample: f64) {
        self.sample = sample;
    }

    #[inline]
    pub fn fixed_value(&self) -> Option<f64> {
        self.fixed
    }

    #[inline]
    pub fn sampler(&self) -> Option<&GammaSampler> {
        self.sampler.as_ref()
    }

    /// The prior in use, unsupported priors are dropped on `initialize`
    #[inline]
    pub fn input(&self) -> Option<&Datum> {
        self.input.as_ref()
    }

    #[inline]
    pub fn random_walk(&self) -> &RandomWalk {
        &self.walk
    }

    #[inline]
    pub fn set_random_walk(&mut self, walk: RandomWalk) {
        self.walk = walk;
    }

    /// Checks whether updates go through the random walk
    #[inline]
    pub fn needs_random_walk(&self) -> bool {
        self.fixed.is_none() && self.sampler.is_none()
    }

    #[inline]
    pub fn guess(&self) -> &RealGuess {
        &self.guess
    }

    /// The guess if set, otherwise the current sample
    #[inline]
    pub fn guess_or_value(&self) -> f64 {
        self.guess.value().unwrap_or_else(|| self.current_sample())
    }

    /// Clears the guess, re-reads known data and selects a sampler among
    /// the families offered by adjoint factors. A prior neither the conjugate
    /// sampler nor the random walk can use is logged and ignored
    pub fn initialize(&mut self, graph: &FactorGraph, offered: &[SamplerFamily]) -> FGResult<()> {
        self.guess.clear();
        let known = graph.prior_and_condition(self.index);
        self.fixed = known.value().and_then(Value::as_real);
        if let Some(fixed) = self.fixed {
            self.sample = fixed;
        }
        let family = SamplerFamily::Gamma;
        let available = offered.contains(&family) && family.is_compatible_with_domain(&Domain::Real(self.domain));
        self.input = match known.prior() {
            None | Some(Datum::Value(_)) => None,
            Some(prior) if available && family.is_compatible_with_input(Some(prior)) => Some(prior.clone()),
            Some(prior) if prior_log_density(prior, self.sample).is_some() => Some(prior.clone()),
            Some(other) => {
                warn!(variable = self.index, prior = other.type_name(), "unsupported prior type for a real variable, ignored");
                None
            }
        };
        // a prior only the random walk can use rules the conjugate sampler out
        let conjugate = available && family.is_compatible_with_input(self.input.as_ref());
        self.sampler = conjugate.then_some(GammaSampler);
        debug!(variable = self.index, sampler = ?self.sampler, "sampler selected");
        Ok(())
    }

    /// Draws a new sample from the posterior given incoming messages
    pub fn sample<R: RandomSource + ?Sized>(&mut self, messages: &[Option<&ParameterMessage>], rng: &mut R) -> FGResult<()> {
        if self.fixed.is_some() {
            return Ok(());
        }
        let mut sampler = self.sampler.ok_or(FGError::NoConjugateSampler(self.index))?;
        let mut parameters = sampler.create_parameter_message();
        let inputs = self.input.iter().collect::<Vec<_>>();
        sampler.aggregate_parameters(&mut parameters, messages, &inputs)?;
        self.sample = self.domain.clip(sampler.next_sample(&parameters, rng)?);
        Ok(())
    }

    /// Moves the sample by one random walk step
    ///
    /// # Arguments
    ///
    /// * `log_likelihood` - The sum of log-densities of adjoint factors as a
    ///     function of the sample
    /// * `rng` - A random source
    pub fn random_walk_step<R, L>(&mut self, mut log_likelihood: L, rng: &mut R) -> FGResult<()>
    where
        R: RandomSource + ?Sized,
        L: FnMut(f64) -> FGResult<f64>,
    {
        if self.fixed.is_some() {
            return Ok(());
        }
        let input = self.input.as_ref();
        let log_density = |x: f64| -> FGResult<f64> {
            let prior = input.and_then(|prior| prior_log_density(prior, x)).unwrap_or(0f64);
            Ok(prior + log_likelihood(x)?)
        };
        self.sample = self.walk.step(self.sample, &self.domain, log_density, rng)?;
        Ok(())
    }
}
