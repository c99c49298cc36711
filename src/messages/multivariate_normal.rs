use nalgebra::{Cholesky, DMatrix};
use ndarray::{Array1, Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::core::{FGError, FGResult, Message};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum GaussianForm {
    /// (Σ⁻¹μ, Σ⁻¹), zero matrix means no information
    Information {
        vector: Array1<f64>,
        matrix: Array2<f64>,
    },
    /// Zero covariance, i.e. infinite information
    PointMass { mean: Array1<f64> },
}

/// Parameters of a multivariate normal distribution in the information form.
///
/// A zero-covariance distribution has no finite information form and is kept
/// as a point mass. Adding a point mass to anything yields that point mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultivariateNormalParameters {
    form: GaussianForm,
}

impl MultivariateNormalParameters {
    /// Creates a message with zero information (infinite covariance)
    #[inline]
    pub fn no_information(dimension: usize) -> Self {
        MultivariateNormalParameters {
            form: GaussianForm::Information {
                vector: Array1::zeros(dimension),
                matrix: Array2::zeros((dimension, dimension)),
            },
        }
    }

    pub fn from_information(vector: Array1<f64>, matrix: Array2<f64>) -> FGResult<Self> {
        check_square(&matrix, vector.len(), "information matrix")?;
        Ok(MultivariateNormalParameters {
            form: GaussianForm::Information { vector, matrix },
        })
    }

    /// Creates parameters from a mean and a covariance. An all-zero covariance
    /// makes a point mass at the mean.
    pub fn from_mean_and_covariance(mean: Array1<f64>, covariance: Array2<f64>) -> FGResult<Self> {
        check_square(&covariance, mean.len(), "covariance matrix")?;
        if covariance.iter().all(|c| *c == 0f64) {
            return Ok(Self::point_mass(mean));
        }
        let matrix = invert(&covariance).ok_or(FGError::SingularMatrix)?;
        let vector = matrix.dot(&mean);
        Ok(MultivariateNormalParameters {
            form: GaussianForm::Information { vector, matrix },
        })
    }

    #[inline]
    pub fn point_mass(mean: Array1<f64>) -> Self {
        MultivariateNormalParameters {
            form: GaussianForm::PointMass { mean },
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        match &self.form {
            GaussianForm::Information { vector, .. } => vector.len(),
            GaussianForm::PointMass { mean } => mean.len(),
        }
    }

    #[inline]
    pub fn is_point_mass(&self) -> bool {
        matches!(self.form, GaussianForm::PointMass { .. })
    }

    /// Checks whether a message carries no information at all
    #[inline]
    pub fn is_null(&self) -> bool {
        match &self.form {
            GaussianForm::Information { vector, matrix } => {
                vector.iter().all(|x| *x == 0f64) && matrix.iter().all(|x| *x == 0f64)
            }
            GaussianForm::PointMass { .. } => false,
        }
    }

    /// Information vector, `None` for a point mass
    #[inline]
    pub fn information_vector(&self) -> Option<&Array1<f64>> {
        match &self.form {
            GaussianForm::Information { vector, .. } => Some(vector),
            GaussianForm::PointMass { .. } => None,
        }
    }

    /// Information matrix, `None` for a point mass
    #[inline]
    pub fn information_matrix(&self) -> Option<&Array2<f64>> {
        match &self.form {
            GaussianForm::Information { matrix, .. } => Some(matrix),
            GaussianForm::PointMass { .. } => None,
        }
    }

    /// Mean vector, fails if the information matrix is singular
    pub fn mean(&self) -> FGResult<Array1<f64>> {
        match &self.form {
            GaussianForm::Information { vector, matrix } => {
                let covariance = invert(matrix).ok_or(FGError::SingularMatrix)?;
                Ok(covariance.dot(vector))
            }
            GaussianForm::PointMass { mean } => Ok(mean.clone()),
        }
    }

    /// Covariance matrix, fails if the information matrix is singular
    pub fn covariance(&self) -> FGResult<Array2<f64>> {
        match &self.form {
            GaussianForm::Information { matrix, .. } => {
                invert(matrix).ok_or(FGError::SingularMatrix)
            }
            GaussianForm::PointMass { mean } => Ok(Array2::zeros((mean.len(), mean.len()))),
        }
    }

    /// Combines two independent messages
    pub fn add_from(&mut self, other: &MultivariateNormalParameters) -> FGResult<()> {
        if self.dimension() != other.dimension() {
            return Err(FGError::DimensionMismatch {
                context: "multivariate normal parameters".into(),
                expected: self.dimension(),
                found: other.dimension(),
            });
        }
        if self.is_point_mass() {
            return Ok(());
        }
        if other.is_point_mass() {
            *self = other.clone();
            return Ok(());
        }
        if let (
            GaussianForm::Information { vector, matrix },
            GaussianForm::Information {
                vector: other_vector,
                matrix: other_matrix,
            },
        ) = (&mut self.form, &other.form)
        {
            *vector += other_vector;
            *matrix += other_matrix;
        }
        Ok(())
    }
}

impl Message for MultivariateNormalParameters {
    fn discrepancy(&self, other: &Self) -> f64 {
        let max_abs_diff = |lhs: &[f64], rhs: &[f64]| {
            lhs.iter()
                .zip(rhs)
                .map(|(l, r)| (l - r).abs())
                .fold(0f64, f64::max)
        };
        if self.dimension() != other.dimension() {
            return f64::INFINITY;
        }
        match (&self.form, &other.form) {
            (
                GaussianForm::Information { vector, matrix },
                GaussianForm::Information {
                    vector: other_vector,
                    matrix: other_matrix,
                },
            ) => {
                let vector_discrepancy = Zip::from(vector)
                    .and(other_vector)
                    .fold(0f64, |acc, l, r| acc.max((l - r).abs()));
                let matrix_discrepancy = Zip::from(matrix)
                    .and(other_matrix)
                    .fold(0f64, |acc, l, r| acc.max((l - r).abs()));
                vector_discrepancy.max(matrix_discrepancy)
            }
            (GaussianForm::PointMass { mean }, GaussianForm::PointMass { mean: other_mean }) => {
                match (mean.as_slice(), other_mean.as_slice()) {
                    (Some(lhs), Some(rhs)) => max_abs_diff(lhs, rhs),
                    _ => f64::INFINITY,
                }
            }
            _ => f64::INFINITY,
        }
    }

    #[inline]
    fn reset(&mut self) {
        *self = MultivariateNormalParameters::no_information(self.dimension());
    }
}

// ------------------------------------------------------------------------------------------

fn check_square(matrix: &Array2<f64>, dimension: usize, context: &str) -> FGResult<()> {
    let (rows, cols) = matrix.dim();
    if rows != dimension || cols != dimension {
        return Err(FGError::DimensionMismatch {
            context: context.into(),
            expected: dimension,
            found: if rows != dimension { rows } else { cols },
        });
    }
    Ok(())
}

/// Inverts a symmetric positive definite matrix through its Cholesky factor,
/// other matrices through an LU decomposition. `None` if a matrix is singular
pub(crate) fn invert(matrix: &Array2<f64>) -> Option<Array2<f64>> {
    let n = matrix.nrows();
    let dense = DMatrix::from_fn(n, n, |i, j| matrix[[i, j]]);
    if dense.iter().any(|x| !x.is_finite()) {
        return None;
    }
    let inverse = match Cholesky::new(dense.clone()) {
        Some(cholesky) => cholesky.inverse(),
        None => dense.try_inverse()?,
    };
    if inverse.iter().any(|x| !x.is_finite()) {
        return None;
    }
    Some(Array2::from_shape_fn((n, n), |(i, j)| inverse[(i, j)]))
}
