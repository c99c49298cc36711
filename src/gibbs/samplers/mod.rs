mod dirichlet;
mod gamma;

pub use dirichlet::{normalize_to_simplex, DirichletSampler};
pub use gamma::GammaSampler;

use crate::core::{Datum, Domain, FGResult, RandomSource};
use crate::gibbs::GibbsFactor;
use crate::messages::ParameterMessage;

/// A distribution family of a conjugate sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerFamily {
    Gamma,
    Dirichlet,
}

impl SamplerFamily {
    pub const ALL: [SamplerFamily; 2] = [SamplerFamily::Gamma, SamplerFamily::Dirichlet];

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            SamplerFamily::Gamma => "Gamma",
            SamplerFamily::Dirichlet => "Dirichlet",
        }
    }

    /// Checks whether samples of the family fit a domain. Gamma needs a scalar
    /// domain bounded below at or below zero and unbounded above, Dirichlet
    /// needs every dimension to cover `[0, 1]`
    pub fn is_compatible_with_domain(&self, domain: &Domain) -> bool {
        match (self, domain) {
            (SamplerFamily::Gamma, Domain::Real(d)) => d.lower() <= 0f64 && d.upper() == f64::INFINITY,
            (SamplerFamily::Dirichlet, Domain::RealJoint(d)) => d
                .real_domains()
                .iter()
                .all(|d| d.lower() <= 0f64 && d.upper() >= 1f64),
            _ => false,
        }
    }

    /// Checks whether a prior can be aggregated by the family. No prior and
    /// conditioning values are always acceptable
    pub fn is_compatible_with_input(&self, input: Option<&Datum>) -> bool {
        matches!(
            (self, input),
            (_, None)
                | (_, Some(Datum::Value(_)))
                | (SamplerFamily::Gamma, Some(Datum::Gamma(_)))
                | (SamplerFamily::Dirichlet, Some(Datum::Dirichlet(_)))
        )
    }

    /// Checks whether a family can consume messages a factor sends at `port`
    #[inline]
    pub fn is_compatible_with_factor(&self, factor: &GibbsFactor, port: usize) -> bool {
        factor.conjugate_samplers(port).contains(self)
    }
}

/// A sampler drawing from a closed form posterior of a distribution family
pub trait ConjugateSampler {
    /// Posterior parameters
    type Parameters;
    /// A single draw
    type Sample;

    fn family(&self) -> SamplerFamily;

    /// Returns uninformative parameters of the family
    fn create_parameter_message(&self) -> Self::Parameters;

    /// Sums parameters carried by incoming factor messages and by literal
    /// inputs into `out`
    ///
    /// # Arguments
    ///
    /// * `out` - A destination, it is overwritten
    /// * `edges` - Factor to variable messages, `None` stands for an edge
    ///     carrying no conjugate message
    /// * `inputs` - Literal inputs, i.e. priors
    fn aggregate_parameters(
        &mut self,
        out: &mut Self::Parameters,
        edges: &[Option<&ParameterMessage>],
        inputs: &[&Datum],
    ) -> FGResult<()>;

    /// Draws a sample from a posterior
    fn next_sample<R: RandomSource + ?Sized>(&self, parameters: &Self::Parameters, rng: &mut R) -> FGResult<Self::Sample>;
}
