use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

use crate::core::{
    factor_node::FactorNode,
    value::{Datum, Value},
    variable_node::VariableNode,
};

// ------------------------------------------------------------------------------------------

/// Errors that could appear in factor graph's and solvers' methods
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum FGError {
    /// Message passing error appearing when a message passing does not converge
    #[error("messaged passing has not converged after {iterations_number} iterations, last iteration discrepancy: {last_discrepancy}")]
    MessagePassingError {
        /// Number of iterations past before failure
        iterations_number: usize,

        /// Final discrepancy between last and previous iteration's messages maximized across variables and factors
        last_discrepancy: f64,

        /// Dynamics of discrepancy before failure
        discrepancy_dynamics: Vec<f64>,
    },

    /// Index of a variable is out of range
    #[error("index of a variable {1} is out of range of [0..{0}] variables")]
    OutOfRangeVariable(usize, usize),

    /// Index of a factor is out of range
    #[error("index of a factor {1} is out of range of [0..{0}] factors")]
    OutOfRangeFactor(usize, usize),

    /// Index of an edge is out of range
    #[error("index of an edge {1} is out of range of [0..{0}] edges")]
    OutOfRangeEdge(usize, usize),

    /// Port number is out of range of a node's degree
    #[error("port {port} is out of range of a node with degree {degree}")]
    OutOfRangePort { port: usize, degree: usize },

    /// A table factor solver is attached to a factor with non-discrete siblings
    #[error("factor {0} is not discrete, only discrete factors are supported")]
    NotDiscreteFactor(usize),

    /// A variable solver is attached to a variable with an unexpected domain
    #[error("variable {variable} has a {found} domain, but a {expected} domain is expected")]
    UnsupportedVariable {
        variable: usize,
        expected: String,
        found: String,
    },

    /// A factor solver cannot handle a factor
    #[error("factor {factor} is not supported: {reason}")]
    UnsupportedFactor { factor: usize, reason: String },

    /// Aggregated messages or inputs disagree on dimension
    #[error("dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    /// Dimension could not be inferred from edges or inputs
    #[error("cannot determine the dimension of {0} from edges or inputs")]
    UnknownDimension(String),

    /// A guess index is out of a domain's range
    #[error("guess index {index} is out of range of a domain of size {size}")]
    GuessIndexOutOfRange { index: usize, size: usize },

    /// A guess value is not an element of a domain
    #[error("guess {guess} is not within the domain of variable {variable}")]
    GuessNotInDomain { variable: usize, guess: String },

    /// A guess has a type a variable cannot interpret
    #[error("guess of type {0} is not a numeric value")]
    UnsupportedGuessType(String),

    /// An input is not supported by a sampler
    #[error("input of type {found} is not supported by the {family} sampler")]
    UnsupportedInput { family: String, found: String },

    /// A message of a foreign family reached a sampler
    #[error("message of the {found} family cannot be aggregated by the {expected} sampler")]
    MessageFamilyMismatch { expected: String, found: String },

    /// A fixed value does not belong to a variable's domain
    #[error("value {value} is outside of the domain of variable {variable}")]
    ValueOutsideDomain { variable: usize, value: String },

    /// A constant argument must be numeric
    #[error("constant argument {index} of factor {factor} is not numeric")]
    NonNumericConstant { factor: usize, index: usize },

    /// None of conjugate samplers is compatible with a variable and some
    /// adjoint factor has no log-density for a random walk
    #[error("no sampler is available for variable {0}")]
    NoConjugateSampler(usize),

    /// Parameters of a distribution to sample from are invalid
    #[error("invalid distribution parameters: {0}")]
    InvalidDistribution(String),

    /// A matrix that has to be inverted is singular
    #[error("matrix is singular")]
    SingularMatrix,
}

/// Factor graph's methods result type
pub type FGResult<T> = Result<T, FGError>;

/// Information returned after successful convergence of the a message passing procedure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePassingInfo {
    /// Number of iterations past before convergence
    pub iterations_number: usize,

    /// Final discrepancy between last and previous iteration's messages maximized across variables and factors
    pub last_discrepancy: f64,

    /// Dynamics of discrepancy before failure
    pub discrepancy_dynamics: Vec<f64>,
}

impl Display for MessagePassingInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Messaged passing has converged after {} iterations, last iteration discrepancy: {}",
            self.iterations_number, self.last_discrepancy,
        )
    }
}

// ------------------------------------------------------------------------------------------

/// An edge connecting a factor and a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRef {
    pub factor: usize,
    pub variable: usize,

    /// Position of the edge among the factor's edges
    pub factor_port: usize,

    /// Position of the edge among the variable's edges
    pub variable_port: usize,
}

/// Data known about a variable besides the graph structure
#[derive(Debug, Clone, Default)]
pub(crate) struct KnownData {
    pub(crate) fixed_value: Option<Value>,
    pub(crate) prior: Option<Datum>,
}

/// A read handle on the fixed value and the prior of a variable.
///
/// Known data cannot be changed while any handle is alive, a handle is
/// released when dropped.
pub struct PriorAndCondition<'a> {
    known: RwLockReadGuard<'a, Vec<KnownData>>,
    variable: usize,
}

impl<'a> PriorAndCondition<'a> {
    #[inline]
    fn data(&self) -> Option<&KnownData> {
        self.known.get(self.variable)
    }

    #[inline]
    pub fn fixed_value(&self) -> Option<&Value> {
        self.data().and_then(|d| d.fixed_value.as_ref())
    }

    #[inline]
    pub fn prior(&self) -> Option<&Datum> {
        self.data().and_then(|d| d.prior.as_ref())
    }

    /// The value a variable is known to take: its fixed value, or else
    /// its prior if that prior is a conditioning value
    #[inline]
    pub fn value(&self) -> Option<&Value> {
        self.fixed_value().or(match self.prior() {
            Some(Datum::Value(value)) => Some(value),
            _ => None,
        })
    }

    #[inline]
    pub fn release(self) {}
}

// ------------------------------------------------------------------------------------------

/// A factor graph
///
/// # Notes
///
/// The structure is immutable once built. Fixed values and priors can be
/// changed between solver runs, but never while a `PriorAndCondition`
/// handle is alive.
#[derive(Debug)]
pub struct FactorGraph {
    pub(crate) factors: Vec<FactorNode>,
    pub(crate) variables: Vec<VariableNode>,
    pub(crate) edges: Vec<EdgeRef>,
    pub(crate) known: RwLock<Vec<KnownData>>,
}

impl Clone for FactorGraph {
    fn clone(&self) -> Self {
        FactorGraph {
            factors: self.factors.clone(),
            variables: self.variables.clone(),
            edges: self.edges.clone(),
            known: RwLock::new(self.known.read().clone()),
        }
    }
}

impl FactorGraph {
    #[inline]
    pub fn variables_number(&self) -> usize {
        self.variables.len()
    }

    #[inline]
    pub fn factors_number(&self) -> usize {
        self.factors.len()
    }

    #[inline]
    pub fn edges_number(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn variable(&self, index: usize) -> FGResult<&VariableNode> {
        self.variables
            .get(index)
            .ok_or(FGError::OutOfRangeVariable(self.variables.len(), index))
    }

    #[inline]
    pub fn factor(&self, index: usize) -> FGResult<&FactorNode> {
        self.factors
            .get(index)
            .ok_or(FGError::OutOfRangeFactor(self.factors.len(), index))
    }

    #[inline]
    pub fn edge(&self, index: usize) -> FGResult<EdgeRef> {
        self.edges
            .get(index)
            .copied()
            .ok_or(FGError::OutOfRangeEdge(self.edges.len(), index))
    }

    #[inline]
    pub fn edges(&self) -> &[EdgeRef] {
        &self.edges
    }

    /// Returns degree (number of adjoint factors) of each variable
    #[inline]
    pub fn get_variable_degrees(&self) -> Vec<usize> {
        self.variables.iter().map(|x| x.degree()).collect()
    }

    /// Returns degree (number of adjoint variables) of each factor
    /// in order they were added to a factor graph
    #[inline]
    pub fn get_factor_degrees(&self) -> Vec<usize> {
        self.factors.iter().map(|x| x.sibling_count()).collect()
    }

    /// Checks whether all siblings of a factor are discrete
    pub fn is_discrete_factor(&self, factor: usize) -> FGResult<bool> {
        let factor = self.factor(factor)?;
        Ok(factor
            .siblings()
            .iter()
            .all(|v| self.variables[*v].domain().is_discrete()))
    }

    /// Acquires a read handle on known data of a variable
    #[inline]
    pub fn prior_and_condition(&self, variable: usize) -> PriorAndCondition<'_> {
        PriorAndCondition {
            known: self.known.read(),
            variable,
        }
    }

    #[inline]
    pub fn has_fixed_value(&self, variable: usize) -> bool {
        self.prior_and_condition(variable).fixed_value().is_some()
    }

    /// Fixes a variable to a value or removes a fixed value
    ///
    /// # Arguments
    ///
    /// * `variable` - The index of a variable
    /// * `value` - A value, `None` unfixes the variable
    ///
    /// # Notes
    ///
    /// Solver graphs pick the change up on their next `initialize`
    pub fn fix_variable(&self, variable: usize, value: Option<Value>) -> FGResult<()> {
        let node = self.variable(variable)?;
        if let Some(value) = &value {
            if !node.domain().contains(value) {
                return Err(FGError::ValueOutsideDomain {
                    variable,
                    value: value.to_string(),
                });
            }
        }
        self.known.write()[variable].fixed_value = value;
        Ok(())
    }

    /// Attaches a prior to a variable or removes it
    pub fn set_prior(&self, variable: usize, prior: Option<Datum>) -> FGResult<()> {
        self.variable(variable)?;
        self.known.write()[variable].prior = prior;
        Ok(())
    }

    /// Checks whether known data is currently read locked, i.e. some
    /// `PriorAndCondition` handle has not been released
    #[inline]
    pub fn has_open_known_data_handles(&self) -> bool {
        self.known.is_locked()
    }
}
