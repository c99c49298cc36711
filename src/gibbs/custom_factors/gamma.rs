use crate::core::FactorFunction;
use crate::gibbs::custom_factors::{ln_gamma, ConjugateFamily, CustomConjugateFactor, EdgeRole};
use crate::gibbs::samplers::SamplerFamily;
use crate::messages::{GammaParameters, ParameterMessage};

/// `Gamma(outputs | alpha, beta)` with a conjugate update of the rate `beta`
#[derive(Debug, Clone, Copy, Default)]
pub struct GammaFamily;

/// A Gamma factor solved by Gibbs sampling
pub type CustomGamma = CustomConjugateFactor<GammaFamily>;

impl ConjugateFamily for GammaFamily {
    const NAME: &'static str = "Gamma";
    const NUM_PARAMETERS: usize = 2;
    const CONJUGATE_PARAMETER: usize = 1;

    fn constructor_constants(function: &FactorFunction) -> Option<Option<Vec<f64>>> {
        match function {
            FactorFunction::Gamma { constants } => Some(constants.map(|(alpha, beta)| vec![alpha, beta])),
            _ => None,
        }
    }

    /// The likelihood of `n` outputs as a function of the rate is
    /// `beta^(n * alpha) * exp(-beta * sum)`
    fn conjugate_parameter_message(parameters: &[f64], output_count: usize, output_sum: f64) -> ParameterMessage {
        let alpha = parameters[0];
        ParameterMessage::Gamma(GammaParameters::new(output_count as f64 * alpha, output_sum))
    }

    fn output_message(parameters: &[f64]) -> ParameterMessage {
        ParameterMessage::Gamma(GammaParameters::from_shape_and_rate(parameters[0], parameters[1]))
    }

    fn samplers(role: EdgeRole) -> &'static [SamplerFamily] {
        match role {
            EdgeRole::ConjugateParameter | EdgeRole::Output => &[SamplerFamily::Gamma],
            EdgeRole::Other => &[],
        }
    }

    fn log_density(parameters: &[f64], output: f64) -> f64 {
        let (alpha, beta) = (parameters[0], parameters[1]);
        if !(alpha > 0f64 && beta > 0f64 && output > 0f64) {
            return f64::NEG_INFINITY;
        }
        alpha * beta.ln() - ln_gamma(alpha) + (alpha - 1f64) * output.ln() - beta * output
    }
}
