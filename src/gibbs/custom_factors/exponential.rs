use crate::core::FactorFunction;
use crate::gibbs::custom_factors::{ConjugateFamily, CustomConjugateFactor, EdgeRole};
use crate::gibbs::samplers::SamplerFamily;
use crate::messages::{GammaParameters, ParameterMessage};

/// `Exponential(outputs | rate)`, the rate has a Gamma conjugate update
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialFamily;

pub type CustomExponential = CustomConjugateFactor<ExponentialFamily>;

impl ConjugateFamily for ExponentialFamily {
    const NAME: &'static str = "Exponential";
    const NUM_PARAMETERS: usize = 1;
    const CONJUGATE_PARAMETER: usize = 0;

    fn constructor_constants(function: &FactorFunction) -> Option<Option<Vec<f64>>> {
        match function {
            FactorFunction::Exponential { rate } => Some(rate.map(|rate| vec![rate])),
            _ => None,
        }
    }

    fn conjugate_parameter_message(_: &[f64], output_count: usize, output_sum: f64) -> ParameterMessage {
        ParameterMessage::Gamma(GammaParameters::new(output_count as f64, output_sum))
    }

    fn output_message(parameters: &[f64]) -> ParameterMessage {
        ParameterMessage::Gamma(GammaParameters::new(0f64, parameters[0]))
    }

    fn samplers(role: EdgeRole) -> &'static [SamplerFamily] {
        match role {
            EdgeRole::ConjugateParameter | EdgeRole::Output => &[SamplerFamily::Gamma],
            EdgeRole::Other => &[],
        }
    }

    fn log_density(parameters: &[f64], output: f64) -> f64 {
        let rate = parameters[0];
        if !(rate > 0f64 && output >= 0f64) {
            return f64::NEG_INFINITY;
        }
        rate.ln() - rate * output
    }
}
