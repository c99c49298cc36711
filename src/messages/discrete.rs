use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::core::Message;

/// A discrete message (or belief), i.e. non-negative weights over a domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteMessage(Array1<f64>);

impl DiscreteMessage {
    /// Creates a uniform (uninformative) message
    #[inline]
    pub fn uniform(size: usize) -> Self {
        DiscreteMessage(Array1::from_elem(size, 1f64 / size.max(1) as f64))
    }

    #[inline]
    pub fn from_weights(weights: Vec<f64>) -> Self {
        DiscreteMessage(Array1::from_vec(weights))
    }

    /// Creates a message concentrated on a single domain index
    #[inline]
    pub fn point_mass(size: usize, index: usize) -> Self {
        let mut weights = Array1::zeros(size);
        weights[index] = 1f64;
        DiscreteMessage(weights)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn weights(&self) -> &Array1<f64> {
        &self.0
    }

    #[inline]
    pub(crate) fn weights_mut(&mut self) -> &mut Array1<f64> {
        &mut self.0
    }

    /// Rescales weights to sum to one, all-zero weights are left untouched
    #[inline]
    pub fn normalize(&mut self) {
        let sum = self.0.sum();
        if sum > 0f64 {
            self.0 /= sum;
        }
    }

    /// Index of the largest weight, ties are resolved by the first occurrence
    pub fn argmax(&self) -> Option<usize> {
        let mut max_weight = f64::NEG_INFINITY;
        let mut max_index = None;
        for (i, w) in self.0.iter().enumerate() {
            if *w > max_weight {
                max_weight = *w;
                max_index = Some(i);
            }
        }
        max_index
    }
}

impl Message for DiscreteMessage {
    #[inline]
    fn discrepancy(&self, other: &Self) -> f64 {
        if self.size() != other.size() {
            return f64::INFINITY;
        }
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(lhs, rhs)| (lhs - rhs).abs())
            .fold(0f64, f64::max)
    }

    #[inline]
    fn reset(&mut self) {
        let size = self.size();
        self.0.fill(1f64 / size.max(1) as f64);
    }
}
