use serde::{Deserialize, Serialize};

use crate::core::Message;

/// Parameters of a Gamma distribution kept as (alpha - 1, beta), so that
/// combining independent Gamma messages is a plain sum of both fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GammaParameters {
    alpha_minus_one: f64,
    beta: f64,
}

impl GammaParameters {
    #[inline]
    pub fn new(alpha_minus_one: f64, beta: f64) -> Self {
        GammaParameters {
            alpha_minus_one,
            beta,
        }
    }

    /// Creates parameters from the conventional shape and rate
    #[inline]
    pub fn from_shape_and_rate(alpha: f64, beta: f64) -> Self {
        GammaParameters::new(alpha - 1f64, beta)
    }

    #[inline]
    pub fn alpha_minus_one(&self) -> f64 {
        self.alpha_minus_one
    }

    /// Shape parameter
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha_minus_one + 1f64
    }

    /// Rate parameter
    #[inline]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    #[inline]
    pub fn set_alpha_minus_one(&mut self, alpha_minus_one: f64) {
        self.alpha_minus_one = alpha_minus_one;
    }

    #[inline]
    pub fn set_beta(&mut self, beta: f64) {
        self.beta = beta;
    }

    #[inline]
    pub fn add_from(&mut self, other: &GammaParameters) {
        self.alpha_minus_one += other.alpha_minus_one;
        self.beta += other.beta;
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.alpha_minus_one == 0f64 && self.beta == 0f64
    }
}

impl Message for GammaParameters {
    #[inline]
    fn discrepancy(&self, other: &Self) -> f64 {
        (self.alpha_minus_one - other.alpha_minus_one)
            .abs()
            .max((self.beta - other.beta).abs())
    }

    #[inline]
    fn reset(&mut self) {
        *self = GammaParameters::default();
    }
}
