use parking_lot::RwLock;
use thiserror::Error;

use crate::core::{
    factor_function::FactorFunction,
    factor_graph::{EdgeRef, FactorGraph, KnownData},
    factor_node::{Argument, FactorNode},
    value::Domain,
    variable_node::VariableNode,
};

// ------------------------------------------------------------------------------------------

/// Errors that could appear in factor graph builder's methods
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FGBuilderError {
    /// Number of arguments is not accepted by a factor function
    #[error("factor function {function} does not accept {arguments} arguments")]
    ArityError { function: String, arguments: usize },

    /// Index of a variable is out of range
    #[error("ID (index) of a variable {1} is out of range of [0..{0}] variables")]
    OutOfRangeVariable(usize, usize),

    /// A variable appears twice among arguments of one factor
    #[error("variable {0} appears more than once among arguments of a factor")]
    RepeatedVariable(usize),
}

/// Factor graph builder's methods result type
pub type FGBuilderResult<T> = Result<T, FGBuilderError>;

// public methods ---------------------------------------------------------------------------

/// A factor graph builder
#[derive(Debug, Default)]
pub struct FactorGraphBuilder {
    factors: Vec<FactorNode>,
    variables: Vec<VariableNode>,
    edges: Vec<EdgeRef>,
}

impl FactorGraphBuilder {
    /// Creates an empty factor graph
    ///
    /// # Example
    ///
    /// ```
    /// use fgsolve::core::FactorGraphBuilder;
    ///
    /// let fgb = FactorGraphBuilder::new();
    /// ```
    #[inline]
    pub fn new() -> Self {
        FactorGraphBuilder {
            factors: Vec::new(),
            variables: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Creates a factor graph with predefined set of variables sharing one
    /// domain and preallocated memory for factors
    ///
    /// # Arguments
    ///
    /// * `domain` - A domain of every variable
    /// * `variables_number` - A number of variables
    /// * `factors_capacity` - A number of factors we need to preallocate memory for
    #[inline]
    pub fn new_with_variables(domain: Domain, variables_number: usize, factors_capacity: usize) -> Self {
        let variables = (0..variables_number)
            .map(|_| VariableNode::new_disconnected(domain.clone()))
            .collect();
        FactorGraphBuilder {
            factors: Vec::with_capacity(factors_capacity),
            variables,
            edges: Vec::new(),
        }
    }

    /// Adds a variable to a factor graph and returns its index
    ///
    /// # Example
    ///
    /// ```
    /// use fgsolve::core::{DiscreteDomain, Domain, FactorGraphBuilder};
    ///
    /// let mut fgb = FactorGraphBuilder::new();
    /// let v = fgb.add_variable(Domain::Discrete(DiscreteDomain::range(0, 2)));
    /// assert_eq!(v, 0);
    /// ```
    #[inline]
    pub fn add_variable(&mut self, domain: Domain) -> usize {
        self.variables.push(VariableNode::new_disconnected(domain));
        self.variables.len() - 1
    }

    /// Adds a factor to a factor graph and returns its index
    ///
    /// # Arguments
    ///
    /// * `function` - A factor function
    /// * `arguments` - Positional arguments, either adjoint variables or constants
    ///
    /// # Notes
    ///
    /// If the number of arguments is not accepted by the factor function, the method
    /// returns an error. If a variable index is out of range of the variables list,
    /// the method returns an error. Edges are numbered in the order factors and
    /// their variable arguments are added
    ///
    /// # Example
    ///
    /// ```
    /// use fgsolve::core::{Argument, FactorFunction, FactorGraphBuilder, Domain, RealDomain};
    ///
    /// let mut fgb = FactorGraphBuilder::new();
    /// let rate = fgb.add_variable(Domain::Real(RealDomain::non_negative()));
    /// let x = fgb.add_variable(Domain::Real(RealDomain::non_negative()));
    /// let f = fgb.add_factor(
    ///     FactorFunction::gamma(),
    ///     &[Argument::constant(2.0), Argument::var(rate), Argument::var(x)],
    /// ).unwrap();
    /// assert_eq!(f, 0);
    /// ```
    pub fn add_factor(&mut self, function: FactorFunction, arguments: &[Argument]) -> FGBuilderResult<usize> {
        if !function.accepts_arity(arguments.len()) {
            return Err(FGBuilderError::ArityError {
                function: function.name().to_string(),
                arguments: arguments.len(),
            });
        }
        let mut seen = Vec::with_capacity(arguments.len());
        for arg in arguments {
            if let Argument::Variable(index) = arg {
                if *index >= self.variables.len() {
                    return Err(FGBuilderError::OutOfRangeVariable(self.variables.len(), *index));
                }
                if seen.contains(index) {
                    return Err(FGBuilderError::RepeatedVariable(*index));
                }
                seen.push(*index);
            }
        }
        let factor_index = self.factors.len();
        let mut factor_node = FactorNode::new_disconnected(function, arguments.to_vec());
        for (factor_port, variable) in seen.into_iter().enumerate() {
            let edge = self.edges.len();
            let variable_node = &mut self.variables[variable];
            self.edges.push(EdgeRef {
                factor: factor_index,
                variable,
                factor_port,
                variable_port: variable_node.edges.len(),
            });
            variable_node.edges.push(edge);
            factor_node.edges.push(edge);
        }
        self.factors.push(factor_node);
        Ok(factor_index)
    }

    /// Returns a factor graph
    #[inline]
    pub fn build(self) -> FactorGraph {
        let known = vec![KnownData::default(); self.variables.len()];
        FactorGraph {
            factors: self.factors,
            variables: self.variables,
            edges: self.edges,
            known: RwLock::new(known),
        }
    }
}
