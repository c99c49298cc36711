use ndarray::{ArrayD, Dimension};
use std::collections::HashMap;

use crate::core::factor_graph::{FGError, FGResult};
use crate::messages::MultivariateNormalParameters;

// ------------------------------------------------------------------------------------------

/// A joint potential table over discrete variables.
///
/// Potentials are energies, i.e. `-ln(weight)`. Only tuples listed in a table
/// are feasible, a table built from dense weights drops zero-weight entries.
#[derive(Debug, Clone)]
pub struct FactorTable {
    dimensions: Vec<usize>,
    indices: Vec<Vec<usize>>,
    energies: Vec<f64>,
    min_potential: f64,
    lookup: HashMap<Vec<usize>, usize>,
}

impl FactorTable {
    /// Creates a sparse table
    ///
    /// # Arguments
    ///
    /// * `dimensions` - Domain sizes of adjoint variables
    /// * `indices` - Feasible joint indices
    /// * `energies` - Energy of each feasible joint index
    pub fn new(dimensions: Vec<usize>, indices: Vec<Vec<usize>>, energies: Vec<f64>) -> FGResult<Self> {
        if indices.len() != energies.len() {
            return Err(FGError::DimensionMismatch {
                context: "factor table energies".into(),
                expected: indices.len(),
                found: energies.len(),
            });
        }
        for tuple in &indices {
            if tuple.len() != dimensions.len() {
                return Err(FGError::DimensionMismatch {
                    context: "factor table joint index".into(),
                    expected: dimensions.len(),
                    found: tuple.len(),
                });
            }
            if let Some((pos, _)) = tuple
                .iter()
                .zip(&dimensions)
                .enumerate()
                .find(|(_, (i, d))| i >= d)
            {
                return Err(FGError::DimensionMismatch {
                    context: format!("factor table index at position {pos}"),
                    expected: dimensions[pos],
                    found: tuple[pos] + 1,
                });
            }
        }
        Ok(Self::from_parts(dimensions, indices, energies))
    }

    /// Creates a table from dense non-negative weights, zero weights are infeasible
    pub fn from_weights(weights: &ArrayD<f64>) -> Self {
        let dimensions = weights.shape().to_vec();
        let (indices, energies): (Vec<Vec<usize>>, Vec<f64>) = weights
            .indexed_iter()
            .filter(|(_, w)| **w > 0f64)
            .map(|(idx, w)| (idx.slice().to_vec(), -w.ln()))
            .unzip();
        Self::from_parts(dimensions, indices, energies)
    }

    /// Creates a table from dense energies
    pub fn from_energies(energies: &ArrayD<f64>) -> Self {
        let dimensions = energies.shape().to_vec();
        let (indices, energies): (Vec<Vec<usize>>, Vec<f64>) = energies
            .indexed_iter()
            .map(|(idx, e)| (idx.slice().to_vec(), *e))
            .unzip();
        Self::from_parts(dimensions, indices, energies)
    }

    fn from_parts(dimensions: Vec<usize>, indices: Vec<Vec<usize>>, energies: Vec<f64>) -> Self {
        let min_potential = energies
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        let min_potential = if min_potential.is_finite() { min_potential } else { 0f64 };
        let lookup = indices
            .iter()
            .enumerate()
            .map(|(pos, tuple)| (tuple.clone(), pos))
            .collect();
        FactorTable {
            dimensions,
            indices,
            energies,
            min_potential,
            lookup,
        }
    }

    #[inline]
    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    /// Feasible joint indices
    #[inline]
    pub fn indices(&self) -> &[Vec<usize>] {
        &self.indices
    }

    #[inline]
    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    /// The smallest energy over all feasible entries
    #[inline]
    pub fn min_potential(&self) -> f64 {
        self.min_potential
    }

    /// Position of a joint index in the table, `None` if infeasible
    #[inline]
    pub fn weight_index(&self, indices: &[usize]) -> Option<usize> {
        self.lookup.get(indices).copied()
    }

    #[inline]
    pub fn energy_at(&self, indices: &[usize]) -> Option<f64> {
        self.weight_index(indices).map(|pos| self.energies[pos])
    }

    /// Returns a copy of a table with every energy shifted by `shift`
    pub fn shifted(&self, shift: f64) -> Self {
        let energies = self.energies.iter().map(|e| e + shift).collect();
        Self::from_parts(self.dimensions.clone(), self.indices.clone(), energies)
    }
}

// ------------------------------------------------------------------------------------------

/// A factor function together with any parameters baked into it
#[derive(Debug, Clone)]
pub enum FactorFunction {
    /// Discrete joint potential
    Table(FactorTable),

    /// Gamma distribution `Gamma(outputs | alpha, beta)`. Without constants
    /// the first two arguments are alpha and beta, the rest are outputs
    Gamma { constants: Option<(f64, f64)> },

    /// Exponential distribution `Exponential(outputs | rate)`. Without a constant
    /// rate the first argument is the rate, the rest are outputs
    Exponential { rate: Option<f64> },

    /// A unary multivariate normal prior with constant parameters
    MultivariateNormal(MultivariateNormalParameters),

    /// All arguments are equal
    Equality,

    /// A factor function no solver specializes on
    Opaque(String),
}

impl FactorFunction {
    #[inline]
    pub fn gamma() -> Self {
        FactorFunction::Gamma { constants: None }
    }

    #[inline]
    pub fn gamma_with_parameters(alpha: f64, beta: f64) -> Self {
        FactorFunction::Gamma {
            constants: Some((alpha, beta)),
        }
    }

    #[inline]
    pub fn exponential() -> Self {
        FactorFunction::Exponential { rate: None }
    }

    #[inline]
    pub fn exponential_with_rate(rate: f64) -> Self {
        FactorFunction::Exponential { rate: Some(rate) }
    }

    pub fn name(&self) -> &str {
        match self {
            FactorFunction::Table(_) => "Table",
            FactorFunction::Gamma { .. } => "Gamma",
            FactorFunction::Exponential { .. } => "Exponential",
            FactorFunction::MultivariateNormal(_) => "MultivariateNormal",
            FactorFunction::Equality => "Equality",
            FactorFunction::Opaque(name) => name,
        }
    }

    /// Checks that a number of arguments is acceptable for a factor function
    pub(crate) fn accepts_arity(&self, arity: usize) -> bool {
        match self {
            FactorFunction::Table(table) => table.dimensions().len() == arity,
            FactorFunction::Gamma { constants: Some(_) } => arity >= 1,
            FactorFunction::Gamma { constants: None } => arity >= 3,
            FactorFunction::Exponential { rate: Some(_) } => arity >= 1,
            FactorFunction::Exponential { rate: None } => arity >= 2,
            FactorFunction::MultivariateNormal(_) => arity == 1,
            FactorFunction::Equality => arity >= 2,
            FactorFunction::Opaque(_) => arity >= 1,
        }
    }
}
