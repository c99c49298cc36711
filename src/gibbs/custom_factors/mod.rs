mod exponential;
mod gamma;

pub use exponential::{CustomExponential, ExponentialFamily};
pub use gamma::{CustomGamma, GammaFamily};

use std::fmt::Debug;
use std::marker::PhantomData;

use tracing::debug;

use crate::core::{FGError, FGResult, FactorFunction, FactorGraph, FactorNode};
use crate::gibbs::samplers::SamplerFamily;
use crate::messages::ParameterMessage;

/// Current samples of variables, looked up by variable index
pub trait CurrentSamples {
    fn current_sample(&self, variable: usize) -> FGResult<f64>;
}

/// Where a parameter of a conjugate factor comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterSlot {
    /// Baked into the factor function
    FunctionConstant(f64),
    /// A constant argument, or a variable with a fixed value
    ModelConstant(f64),
    /// A live variable attached at a port
    Edge { port: usize, variable: usize },
}

impl ParameterSlot {
    #[inline]
    pub fn port(&self) -> Option<usize> {
        match self {
            ParameterSlot::Edge { port, .. } => Some(*port),
            _ => None,
        }
    }

    #[inline]
    pub fn current_value(&self, samples: &(impl CurrentSamples + ?Sized)) -> FGResult<f64> {
        match self {
            ParameterSlot::FunctionConstant(value) | ParameterSlot::ModelConstant(value) => Ok(*value),
            ParameterSlot::Edge { variable, .. } => samples.current_sample(*variable),
        }
    }
}

/// The role of an edge of a conjugate factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRole {
    /// The edge of the parameter with a conjugate update
    ConjugateParameter,
    /// An output edge
    Output,
    /// Any other parameter edge
    Other,
}

/// A classification of the arguments of a conjugate factor into constants
/// and live edges. It is rebuilt from the graph on every `initialize`
#[derive(Debug, Clone, PartialEq)]
pub struct ConjugateBinding {
    parameters: Vec<ParameterSlot>,
    conjugate_parameter: usize,
    output_ports: Vec<usize>,
    live_outputs: Vec<(usize, usize)>,
    constant_outputs: Vec<f64>,
}

impl ConjugateBinding {
    /// Classifies arguments of a factor
    ///
    /// # Arguments
    ///
    /// * `graph` - A factor graph
    /// * `factor` - The index of a factor
    /// * `function_constants` - Parameter values baked into the factor function,
    ///     if any; otherwise the first `num_parameters` arguments are parameters
    /// * `num_parameters` - A number of parameters of a distribution
    /// * `conjugate_parameter` - The index of the parameter with a conjugate update
    pub fn derive(
        graph: &FactorGraph,
        factor: usize,
        function_constants: Option<Vec<f64>>,
        num_parameters: usize,
        conjugate_parameter: usize,
    ) -> FGResult<Self> {
        let node = graph.factor(factor)?;
        let (parameters, first_output) = match function_constants {
            Some(constants) => (
                constants
                    .into_iter()
                    .map(ParameterSlot::FunctionConstant)
                    .collect::<Vec<_>>(),
                0,
            ),
            None => (
                (0..num_parameters)
                    .map(|argument| classify(graph, node, factor, argument))
                    .collect::<FGResult<Vec<_>>>()?,
                num_parameters,
            ),
        };
        let mut binding = ConjugateBinding {
            parameters,
            conjugate_parameter,
            output_ports: Vec::new(),
            live_outputs: Vec::new(),
            constant_outputs: Vec::new(),
        };
        for argument in first_output..node.arity() {
            match classify(graph, node, factor, argument)? {
                ParameterSlot::Edge { port, variable } => {
                    binding.output_ports.push(port);
                    binding.live_outputs.push((port, variable));
                }
                ParameterSlot::ModelConstant(value) | ParameterSlot::FunctionConstant(value) => {
                    if let Some(port) = node.arg_index_to_sibling_number(argument) {
                        binding.output_ports.push(port);
                    }
                    binding.constant_outputs.push(value);
                }
            }
        }
        Ok(binding)
    }

    #[inline]
    pub fn parameters(&self) -> &[ParameterSlot] {
        &self.parameters
    }

    /// Port of the conjugate parameter, `None` if it is a constant
    #[inline]
    pub fn conjugate_parameter_port(&self) -> Option<usize> {
        self.parameters
            .get(self.conjugate_parameter)
            .and_then(|slot| slot.port())
    }

    /// Ports and variables of outputs that are not fixed
    #[inline]
    pub fn live_outputs(&self) -> &[(usize, usize)] {
        &self.live_outputs
    }

    #[inline]
    pub fn constant_output_count(&self) -> usize {
        self.constant_outputs.len()
    }

    #[inline]
    pub fn constant_output_sum(&self) -> f64 {
        self.constant_outputs.iter().sum()
    }

    /// Total number of outputs, live and constant
    #[inline]
    pub fn output_count(&self) -> usize {
        self.live_outputs.len() + self.constant_outputs.len()
    }

    pub fn edge_role(&self, port: usize) -> EdgeRole {
        if self.conjugate_parameter_port() == Some(port) {
            EdgeRole::ConjugateParameter
        } else if self.output_ports.contains(&port) {
            EdgeRole::Output
        } else {
            EdgeRole::Other
        }
    }

    /// Current values of all parameters
    pub fn parameter_values(&self, samples: &(impl CurrentSamples + ?Sized)) -> FGResult<Vec<f64>> {
        self.parameters
            .iter()
            .map(|slot| slot.current_value(samples))
            .collect()
    }

    /// Sum of current output values, live and constant
    pub fn output_sum(&self, samples: &(impl CurrentSamples + ?Sized)) -> FGResult<f64> {
        self.live_outputs
            .iter()
            .try_fold(self.constant_output_sum(), |acc, (_, variable)| {
                Ok(acc + samples.current_sample(*variable)?)
            })
    }

    /// Current values of all outputs, constant ones first
    pub fn output_values(&self, samples: &(impl CurrentSamples + ?Sized)) -> FGResult<Vec<f64>> {
        let mut values = self.constant_outputs.clone();
        for (_, variable) in &self.live_outputs {
            values.push(samples.current_sample(*variable)?);
        }
        Ok(values)
    }
}

fn classify(graph: &FactorGraph, node: &FactorNode, factor: usize, argument: usize) -> FGResult<ParameterSlot> {
    if let Some(value) = node.constant_value_by_index(argument) {
        return value
            .as_real()
            .map(ParameterSlot::ModelConstant)
            .ok_or(FGError::NonNumericConstant {
                factor,
                index: argument,
            });
    }
    let port = node
        .arg_index_to_sibling_number(argument)
        .ok_or(FGError::OutOfRangePort {
            port: argument,
            degree: node.arity(),
        })?;
    let variable = node.siblings()[port];
    let fixed = graph
        .prior_and_condition(variable)
        .value()
        .and_then(|value| value.as_real());
    Ok(match fixed {
        Some(value) => ParameterSlot::ModelConstant(value),
        None => ParameterSlot::Edge { port, variable },
    })
}

// ------------------------------------------------------------------------------------------

/// A distribution family with a conjugate update of one of its parameters
pub trait ConjugateFamily: Debug + Clone + Send + Sync + 'static {
    const NAME: &'static str;

    /// Number of distribution parameters
    const NUM_PARAMETERS: usize;

    /// Index of the parameter receiving conjugate messages
    const CONJUGATE_PARAMETER: usize;

    /// Returns `None` if a factor function is not of the family, otherwise
    /// the parameter values baked into it, if any
    fn constructor_constants(function: &FactorFunction) -> Option<Option<Vec<f64>>>;

    /// The message to the conjugate parameter
    ///
    /// # Arguments
    ///
    /// * `parameters` - Current values of all parameters
    /// * `output_count` - Number of outputs, live and constant
    /// * `output_sum` - Sum of output values, live and constant
    fn conjugate_parameter_message(parameters: &[f64], output_count: usize, output_sum: f64) -> ParameterMessage;

    /// The message to an output
    fn output_message(parameters: &[f64]) -> ParameterMessage;

    /// Samplers able to consume messages sent on edges of a role
    fn samplers(role: EdgeRole) -> &'static [SamplerFamily];

    /// Log-density of a single output given all parameters,
    /// `-inf` outside of the support
    fn log_density(parameters: &[f64], output: f64) -> f64;
}

/// A factor of a conjugate family solved by Gibbs sampling.
///
/// An update forks on the role of the edge: the conjugate parameter edge gets
/// the posterior contribution of all outputs, an output edge gets the current
/// parameters, and any other edge falls back to a generic update that carries
/// no conjugate message.
#[derive(Debug, Clone)]
pub struct CustomConjugateFactor<F: ConjugateFamily> {
    index: usize,
    binding: ConjugateBinding,
    family: PhantomData<F>,
}

impl<F: ConjugateFamily> CustomConjugateFactor<F> {
    pub fn new(graph: &FactorGraph, index: usize) -> FGResult<Self> {
        let binding = Self::derive_binding(graph, index)?;
        Ok(CustomConjugateFactor {
            index,
            binding,
            family: PhantomData,
        })
    }

    fn derive_binding(graph: &FactorGraph, index: usize) -> FGResult<ConjugateBinding> {
        let node = graph.factor(index)?;
        let constants = F::constructor_constants(node.function()).ok_or_else(|| FGError::UnsupportedFactor {
            factor: index,
            reason: format!("{} is not a {} factor function", node.function().name(), F::NAME),
        })?;
        ConjugateBinding::derive(graph, index, constants, F::NUM_PARAMETERS, F::CONJUGATE_PARAMETER)
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn binding(&self) -> &ConjugateBinding {
        &self.binding
    }

    /// Rebuilds the binding. Returns `true` if the port of the conjugate
    /// parameter has changed, in which case edge states of the factor are stale
    pub fn initialize(&mut self, graph: &FactorGraph) -> FGResult<bool> {
        let binding = Self::derive_binding(graph, self.index)?;
        let old_port = self.binding.conjugate_parameter_port();
        let new_port = binding.conjugate_parameter_port();
        debug!(
            factor = self.index,
            family = F::NAME,
            live_outputs = binding.live_outputs().len(),
            constant_outputs = binding.constant_output_count(),
            "conjugate binding rebuilt"
        );
        self.binding = binding;
        Ok(old_port != new_port)
    }

    #[inline]
    pub fn edge_role(&self, port: usize) -> EdgeRole {
        self.binding.edge_role(port)
    }

    #[inline]
    pub fn conjugate_samplers(&self, port: usize) -> &'static [SamplerFamily] {
        F::samplers(self.edge_role(port))
    }

    /// Computes the message to the variable at `port`, `None` if the edge has
    /// no conjugate update
    pub fn update_edge(&self, port: usize, samples: &(impl CurrentSamples + ?Sized)) -> FGResult<Option<ParameterMessage>> {
        match self.edge_role(port) {
            EdgeRole::ConjugateParameter => {
                let parameters = self.binding.parameter_values(samples)?;
                let sum = self.binding.output_sum(samples)?;
                Ok(Some(F::conjugate_parameter_message(
                    &parameters,
                    self.binding.output_count(),
                    sum,
                )))
            }
            EdgeRole::Output => {
                let parameters = self.binding.parameter_values(samples)?;
                Ok(Some(F::output_message(&parameters)))
            }
            EdgeRole::Other => Ok(None),
        }
    }

    /// Log-density of all outputs at current samples
    pub fn log_density(&self, samples: &(impl CurrentSamples + ?Sized)) -> FGResult<f64> {
        let parameters = self.binding.parameter_values(samples)?;
        Ok(self
            .binding
            .output_values(samples)?
            .into_iter()
            .map(|output| F::log_density(&parameters, output))
            .sum())
    }
}

/// `ln(Γ(x))` for `x > 0`, shifted up by the recurrence `Γ(x + 1) = xΓ(x)`
/// and then evaluated by the Stirling series
pub(crate) fn ln_gamma(x: f64) -> f64 {
    if x <= 0f64 {
        return f64::INFINITY;
    }
    let mut x = x;
    let mut shift = 0f64;
    while x < 10f64 {
        shift -= x.ln();
        x += 1f64;
    }
    let inv_x = 1f64 / x;
    let inv_x2 = inv_x * inv_x;
    let correction = inv_x * (1f64 / 12f64 - inv_x2 * (1f64 / 360f64 - inv_x2 / 1260f64));
    shift + (x - 0.5) * x.ln() - x + 0.5 * (2f64 * std::f64::consts::PI).ln() + correction
}
