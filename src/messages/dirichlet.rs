use serde::{Deserialize, Serialize};

use crate::core::{FGError, FGResult, Message};

/// Parameters of a Dirichlet distribution kept as a vector of (alpha_i - 1).
///
/// A message of size zero is uninitialized and carries no information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirichletParameters {
    alpha_minus_one: Vec<f64>,
}

impl DirichletParameters {
    /// Creates an uninformative message of a given dimension
    #[inline]
    pub fn new(size: usize) -> Self {
        DirichletParameters {
            alpha_minus_one: vec![0f64; size],
        }
    }

    #[inline]
    pub fn from_alpha_minus_one(alpha_minus_one: Vec<f64>) -> Self {
        DirichletParameters { alpha_minus_one }
    }

    /// Creates parameters from concentrations alpha_i
    #[inline]
    pub fn from_concentration(alpha: &[f64]) -> Self {
        DirichletParameters {
            alpha_minus_one: alpha.iter().map(|a| a - 1f64).collect(),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.alpha_minus_one.len()
    }

    #[inline]
    pub fn alpha_minus_one(&self) -> &[f64] {
        &self.alpha_minus_one
    }

    /// Concentrations alpha_i
    #[inline]
    pub fn concentration(&self) -> Vec<f64> {
        self.alpha_minus_one.iter().map(|a| a + 1f64).collect()
    }

    /// Changes the dimension, discarding current values
    #[inline]
    pub fn set_size(&mut self, size: usize) {
        self.alpha_minus_one.clear();
        self.alpha_minus_one.resize(size, 0f64);
    }

    #[inline]
    pub fn set_null(&mut self) {
        self.alpha_minus_one.fill(0f64);
    }

    /// Adds other parameters elementwise, dimensions must agree
    pub fn add_from(&mut self, other: &DirichletParameters) -> FGResult<()> {
        if other.size() != self.size() {
            return Err(FGError::DimensionMismatch {
                context: "Dirichlet parameters".into(),
                expected: self.size(),
                found: other.size(),
            });
        }
        self.alpha_minus_one
            .iter_mut()
            .zip(&other.alpha_minus_one)
            .for_each(|(dst, src)| *dst += src);
        Ok(())
    }
}

impl Message for DirichletParameters {
    #[inline]
    fn discrepancy(&self, other: &Self) -> f64 {
        if self.size() != other.size() {
            return f64::INFINITY;
        }
        self.alpha_minus_one
            .iter()
            .zip(&other.alpha_minus_one)
            .map(|(lhs, rhs)| (lhs - rhs).abs())
            .fold(0f64, f64::max)
    }

    #[inline]
    fn reset(&mut self) {
        self.set_null();
    }
}
