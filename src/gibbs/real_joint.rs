use tracing::{debug, warn};

use crate::core::{Datum, Domain, FGError, FGResult, FactorGraph, RandomSource, RealJointDomain};
use crate::gibbs::samplers::{ConjugateSampler, DirichletSampler, SamplerFamily};
use crate::messages::ParameterMessage;

/// A Gibbs solver of a real joint variable
#[derive(Debug, Clone)]
pub struct GibbsRealJoint {
    index: usize,
    domain: RealJointDomain,
    sample: Vec<f64>,
    fixed: Option<Vec<f64>>,
    input: Option<Datum>,
    sampler: Option<DirichletSampler>,
}

impl GibbsRealJoint {
    pub fn new(index: usize, domain: RealJointDomain) -> Self {
        let dimension = domain.dimension();
        GibbsRealJoint {
            index,
            domain,
            sample: vec![1f64 / dimension.max(1) as f64; dimension],
            fixed: None,
            input: None,
            sampler: None,
        }
    }

    #[inline]
    pub fn domain(&self) -> &RealJointDomain {
        &self.domain
    }

    #[inline]
    pub fn current_sample(&self) -> &[f64] {
        self.fixed.as_deref().unwrap_or(&self.sample)
    }

    #[inline]
    pub fn sampler(&self) -> Option<&DirichletSampler> {
        self.sampler.as_ref()
    }

    /// The prior in use, unsupported priors are dropped on `initialize`
    #[inline]
    pub fn input(&self) -> Option<&Datum> {
        self.input.as_ref()
    }

    pub fn initialize(&mut self, graph: &FactorGraph, offered: &[SamplerFamily]) -> FGResult<()> {
        let known = graph.prior_and_condition(self.index);
        self.fixed = known
            .value()
            .and_then(|value| value.as_real_joint())
            .map(|value| value.to_vec());
        let domain = Domain::RealJoint(self.domain.clone());
        let family = SamplerFamily::Dirichlet;
        let compatible = offered.contains(&family) && family.is_compatible_with_domain(&domain);
        self.input = match known.prior() {
            None | Some(Datum::Value(_)) => None,
            Some(prior) if family.is_compatible_with_input(Some(prior)) => Some(prior.clone()),
            Some(other) => {
                warn!(variable = self.index, prior = other.type_name(), "unsupported prior type for a real joint variable, ignored");
                None
            }
        };
        let dimension = self.domain.dimension();
        self.sampler = compatible.then(|| DirichletSampler::with_dimension(dimension));
        debug!(variable = self.index, sampler = ?self.sampler, "sampler selected");
        Ok(())
    }

    pub fn sample<R: RandomSource + ?Sized>(&mut self, messages: &[Option<&ParameterMessage>], rng: &mut R) -> FGResult<()> {
        if self.fixed.is_some() {
            return Ok(());
        }
        let sampler = self
            .sampler
            .as_mut()
            .ok_or(FGError::NoConjugateSampler(self.index))?;
        let mut parameters = sampler.create_parameter_message();
        let inputs = self.input.iter().collect::<Vec<_>>();
        sampler.aggregate_parameters(&mut parameters, messages, &inputs)?;
        self.sample = sampler.next_sample(&parameters, rng)?;
        Ok(())
    }
}
