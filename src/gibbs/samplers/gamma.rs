use crate::core::{Datum, FGError, FGResult, RandomSource};
use crate::gibbs::samplers::{ConjugateSampler, SamplerFamily};
use crate::messages::{GammaParameters, ParameterMessage};

/// A Gamma posterior sampler: shape-minus-one terms and rate terms are summed
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GammaSampler;

impl ConjugateSampler for GammaSampler {
    type Parameters = GammaParameters;
    type Sample = f64;

    #[inline]
    fn family(&self) -> SamplerFamily {
        SamplerFamily::Gamma
    }

    #[inline]
    fn create_parameter_message(&self) -> GammaParameters {
        GammaParameters::default()
    }

    fn aggregate_parameters(
        &mut self,
        out: &mut GammaParameters,
        edges: &[Option<&ParameterMessage>],
        inputs: &[&Datum],
    ) -> FGResult<()> {
        *out = GammaParameters::default();
        for input in inputs {
            match input {
                Datum::Gamma(parameters) => out.add_from(parameters),
                other => {
                    return Err(FGError::UnsupportedInput {
                        family: self.family().name().into(),
                        found: other.type_name().into(),
                    })
                }
            }
        }
        for message in edges.iter().flatten() {
            match message {
                ParameterMessage::Gamma(parameters) => out.add_from(parameters),
                other => {
                    return Err(FGError::MessageFamilyMismatch {
                        expected: self.family().name().into(),
                        found: other.family_name().into(),
                    })
                }
            }
        }
        Ok(())
    }

    fn next_sample<R: RandomSource + ?Sized>(&self, parameters: &GammaParameters, rng: &mut R) -> FGResult<f64> {
        let shape = parameters.alpha();
        let rate = parameters.beta();
        if !(shape > 0f64 && rate > 0f64 && shape.is_finite() && rate.is_finite()) {
            return Err(FGError::InvalidDistribution(format!(
                "Gamma posterior with shape {shape} and rate {rate}"
            )));
        }
        rng.next_gamma(shape, 1f64 / rate)
    }
}
