use crate::core::{FGError, FGResult, RandomSource};
use crate::gibbs::custom_factors::CurrentSamples;

// Samples of variables indexed by variable index
impl CurrentSamples for [f64] {
    fn current_sample(&self, variable: usize) -> FGResult<f64> {
        self.get(variable)
            .copied()
            .ok_or(FGError::OutOfRangeVariable(self.len(), variable))
    }
}

/// A random source whose `Gamma(shape, 1)` draws are given in advance
pub(super) struct ScriptedDraws {
    pub(super) gamma_draws: Vec<f64>,
    pub(super) next_gamma_position: usize,
    pub(super) picked: usize,
    /// Standard normal draw returned by every `next_normal`
    pub(super) normal_draw: f64,
    pub(super) uniform_draw: f64,
}

impl ScriptedDraws {
    pub(super) fn new(gamma_draws: Vec<f64>, picked: usize) -> Self {
        ScriptedDraws {
            gamma_draws,
            next_gamma_position: 0,
            picked,
            normal_draw: 0f64,
            uniform_draw: 0.5,
        }
    }
}

impl RandomSource for ScriptedDraws {
    fn next_gamma(&mut self, _: f64, scale: f64) -> FGResult<f64> {
        let draw = self.gamma_draws[self.next_gamma_position % self.gamma_draws.len()];
        self.next_gamma_position += 1;
        Ok(draw * scale)
    }

    fn next_normal(&mut self, mean: f64, std_dev: f64) -> FGResult<f64> {
        Ok(mean + std_dev * self.normal_draw)
    }

    fn next_int(&mut self, bound: usize) -> usize {
        self.picked % bound
    }

    fn next_uniform(&mut self) -> f64 {
        self.uniform_draw
    }
}

#[inline]
pub(super) fn assert_close(lhs: f64, rhs: f64, tolerance: f64) {
    assert!(
        (lhs - rhs).abs() < tolerance,
        "{lhs} and {rhs} differ by more than {tolerance}"
    );
}
