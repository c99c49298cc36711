use ndarray::{array, Array1};
use tracing::warn;

use crate::core::{
    Datum, Domain, FGError, FGResult, Factor, FactorFunction, FactorGraph, Value, Variable,
};
use crate::messages::MultivariateNormalParameters;

fn dimension_of(graph: &FactorGraph, variable: usize) -> FGResult<usize> {
    match graph.variable(variable)?.domain() {
        Domain::Real(_) => Ok(1),
        Domain::RealJoint(domain) => Ok(domain.dimension()),
        other => Err(FGError::UnsupportedVariable {
            variable,
            expected: "real joint".into(),
            found: other.kind().into(),
        }),
    }
}

fn value_to_vector(value: &Value) -> Option<Array1<f64>> {
    match value {
        Value::RealJoint(v) => Some(Array1::from_vec(v.clone())),
        scalar => scalar.as_real().map(|x| array![x]),
    }
}

// ------------------------------------------------------------------------------------------

/// A Gaussian sum-product solver of a real joint (or scalar real) variable.
///
/// Messages are in the information form, so combining them is a sum.
/// A fixed variable emits a point mass at its value on every edge.
#[derive(Debug, Clone)]
pub struct SumProductRealJoint {
    index: usize,
    dimension: usize,
    input: Option<MultivariateNormalParameters>,
    fixed: Option<Array1<f64>>,
}

impl SumProductRealJoint {
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn fixed_value(&self) -> Option<&Array1<f64>> {
        self.fixed.as_ref()
    }

    fn sum(
        &self,
        skip: Option<usize>,
        incoming: &[&MultivariateNormalParameters],
        outgoing: &mut MultivariateNormalParameters,
    ) -> FGResult<()> {
        if let Some(fixed) = &self.fixed {
            *outgoing = MultivariateNormalParameters::point_mass(fixed.clone());
            return Ok(());
        }
        *outgoing = match &self.input {
            Some(input) => input.clone(),
            None => MultivariateNormalParameters::no_information(self.dimension),
        };
        for (port, message) in incoming.iter().enumerate() {
            if Some(port) != skip {
                outgoing.add_from(message)?;
            }
        }
        Ok(())
    }
}

impl Variable for SumProductRealJoint {
    type Message = MultivariateNormalParameters;

    fn new(graph: &FactorGraph, index: usize) -> FGResult<Self> {
        let mut variable = SumProductRealJoint {
            index,
            dimension: dimension_of(graph, index)?,
            input: None,
            fixed: None,
        };
        variable.initialize(graph)?;
        Ok(variable)
    }

    fn initialize(&mut self, graph: &FactorGraph) -> FGResult<()> {
        let known = graph.prior_and_condition(self.index);
        self.fixed = known
            .value()
            .and_then(value_to_vector)
            .filter(|v| v.len() == self.dimension);
        self.input = match known.prior() {
            Some(Datum::MultivariateNormal(p)) if p.dimension() == self.dimension => Some(p.clone()),
            Some(Datum::Normal { mean, precision }) if self.dimension == 1 => Some(
                MultivariateNormalParameters::from_information(array![mean * precision], array![[*precision]])?,
            ),
            None | Some(Datum::Value(_)) => None,
            Some(other) => {
                warn!(variable = self.index, prior = other.type_name(), "unsupported prior type for a Gaussian variable, ignored");
                None
            }
        };
        Ok(())
    }

    #[inline]
    fn create_default_message(&self) -> MultivariateNormalParameters {
        MultivariateNormalParameters::no_information(self.dimension)
    }

    #[inline]
    fn input(&self) -> Option<&MultivariateNormalParameters> {
        self.input.as_ref()
    }

    fn set_input(&mut self, input: Option<MultivariateNormalParameters>) -> FGResult<()> {
        if let Some(input) = &input {
            if input.dimension() != self.dimension {
                return Err(FGError::DimensionMismatch {
                    context: format!("input of variable {}", self.index),
                    expected: self.dimension,
                    found: input.dimension(),
                });
            }
        }
        self.input = input;
        Ok(())
    }

    fn update_edge(
        &self,
        port: usize,
        incoming: &[&MultivariateNormalParameters],
        outgoing: &mut MultivariateNormalParameters,
    ) -> FGResult<()> {
        if port >= incoming.len() {
            return Err(FGError::OutOfRangePort {
                port,
                degree: incoming.len(),
            });
        }
        self.sum(Some(port), incoming, outgoing)
    }

    fn belief(&self, incoming: &[&MultivariateNormalParameters]) -> FGResult<MultivariateNormalParameters> {
        let mut belief = self.create_default_message();
        self.sum(None, incoming, &mut belief)?;
        Ok(belief)
    }
}

// ------------------------------------------------------------------------------------------

/// A Gaussian sum-product solver of a factor
#[derive(Debug, Clone)]
pub enum GaussianFactor {
    /// A unary factor with constant parameters, it always sends them
    Prior(MultivariateNormalParameters),

    /// All adjoint variables are equal, every outgoing message is the sum
    /// of the other incoming ones
    Equality { dimension: usize },
}

impl Factor for GaussianFactor {
    type Message = MultivariateNormalParameters;

    fn new(graph: &FactorGraph, index: usize) -> FGResult<Self> {
        let node = graph.factor(index)?;
        if node.has_constants() {
            return Err(FGError::UnsupportedFactor {
                factor: index,
                reason: "constant arguments of a Gaussian factor are not supported".into(),
            });
        }
        let dimensions = node
            .siblings()
            .iter()
            .map(|v| dimension_of(graph, *v))
            .collect::<FGResult<Vec<_>>>()?;
        let dimension = dimensions.first().copied().unwrap_or(0);
        if let Some(found) = dimensions.iter().find(|d| **d != dimension) {
            return Err(FGError::DimensionMismatch {
                context: format!("siblings of factor {index}"),
                expected: dimension,
                found: *found,
            });
        }
        match node.function() {
            FactorFunction::MultivariateNormal(parameters) => {
                if parameters.dimension() != dimension {
                    return Err(FGError::DimensionMismatch {
                        context: format!("parameters of factor {index}"),
                        expected: dimension,
                        found: parameters.dimension(),
                    });
                }
                Ok(GaussianFactor::Prior(parameters.clone()))
            }
            FactorFunction::Equality => Ok(GaussianFactor::Equality { dimension }),
            other => Err(FGError::UnsupportedFactor {
                factor: index,
                reason: format!("{} is not supported by Gaussian sum-product", other.name()),
            }),
        }
    }

    #[inline]
    fn initialize(&mut self, _: &FactorGraph) -> FGResult<()> {
        Ok(())
    }

    fn update_edge(
        &self,
        port: usize,
        incoming: &[&MultivariateNormalParameters],
        outgoing: &mut MultivariateNormalParameters,
    ) -> FGResult<()> {
        if port >= incoming.len() {
            return Err(FGError::OutOfRangePort {
                port,
                degree: incoming.len(),
            });
        }
        match self {
            GaussianFactor::Prior(parameters) => *outgoing = parameters.clone(),
            GaussianFactor::Equality { dimension } => {
                *outgoing = MultivariateNormalParameters::no_information(*dimension);
                for (j, message) in incoming.iter().enumerate() {
                    if j != port {
                        outgoing.add_from(message)?;
                    }
                }
            }
        }
        Ok(())
    }
}
