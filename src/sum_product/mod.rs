mod discrete;
mod real_joint;
mod table_factor;

pub use discrete::DiscreteVariable;
pub use real_joint::{GaussianFactor, SumProductRealJoint};
pub use table_factor::TableFactor;

use ndarray::Array1;

use crate::core::{FGError, FGResult, SolverGraph, Value};

/// Discrete sum-product over table factors
pub type DiscreteSumProduct<'g> = SolverGraph<'g, DiscreteVariable, TableFactor>;

/// Gaussian sum-product in the information form
pub type GaussianSumProduct<'g> = SolverGraph<'g, SumProductRealJoint, GaussianFactor>;

impl<'g> SolverGraph<'g, DiscreteVariable, TableFactor> {
    /// Returns the domain index of a variable: the index of its known value
    /// if there is one, otherwise the first index of the largest belief entry
    pub fn value_index(&self, variable: usize) -> FGResult<usize> {
        let solver = self.variable_solver(variable)?;
        let known_index = {
            let known = self.graph().prior_and_condition(variable);
            known.value().and_then(|value| solver.domain().index_of(value))
        };
        if let Some(index) = known_index {
            return Ok(index);
        }
        self.belief(variable)?
            .argmax()
            .ok_or_else(|| FGError::UnknownDimension(format!("domain of variable {variable}")))
    }

    pub fn value(&self, variable: usize) -> FGResult<Value> {
        let index = self.value_index(variable)?;
        self.domain_element(variable, index)
    }

    /// Returns the guess index, or the value index if no guess was set
    pub fn guess_index(&self, variable: usize) -> FGResult<usize> {
        self.variable_solver(variable)?
            .guess()
            .index_or_else(|| self.value_index(variable))
    }

    pub fn guess(&self, variable: usize) -> FGResult<Value> {
        let index = self.guess_index(variable)?;
        self.domain_element(variable, index)
    }

    #[inline]
    pub fn guess_was_set(&self, variable: usize) -> FGResult<bool> {
        Ok(self.variable_solver(variable)?.guess().was_set())
    }

    /// Sets a guess by value, `None` clears it
    pub fn set_guess(&mut self, variable: usize, guess: Option<&Value>) -> FGResult<()> {
        let solver = self.variable_solver_mut(variable)?;
        let domain = solver.domain().clone();
        solver.guess.set(guess, &domain, variable)
    }

    pub fn set_guess_index(&mut self, variable: usize, index: usize) -> FGResult<()> {
        let solver = self.variable_solver_mut(variable)?;
        let domain = solver.domain().clone();
        solver.guess.set_index(index, &domain)
    }

    /// Score of a factor at the current guesses of its adjoint variables
    pub fn factor_score(&self, factor: usize) -> FGResult<f64> {
        let indices = self
            .graph()
            .factor(factor)?
            .siblings()
            .iter()
            .map(|v| self.guess_index(*v))
            .collect::<FGResult<Vec<_>>>()?;
        Ok(self.factor_solver(factor)?.score(&indices))
    }

    /// Sum of scores of all factors
    pub fn score(&self) -> FGResult<f64> {
        (0..self.graph().factors_number())
            .map(|factor| self.factor_score(factor))
            .sum()
    }

    #[inline]
    pub fn possible_belief_indices(&self, factor: usize) -> FGResult<&[Vec<usize>]> {
        Ok(self.factor_solver(factor)?.possible_belief_indices())
    }

    fn variable_solver_mut(&mut self, variable: usize) -> FGResult<&mut DiscreteVariable> {
        let size = self.variables.len();
        self.variables
            .get_mut(variable)
            .ok_or(FGError::OutOfRangeVariable(size, variable))
    }

    fn domain_element(&self, variable: usize, index: usize) -> FGResult<Value> {
        let domain = self.variable_solver(variable)?.domain();
        domain
            .element(index)
            .cloned()
            .ok_or(FGError::GuessIndexOutOfRange {
                index,
                size: domain.size(),
            })
    }
}

impl<'g> SolverGraph<'g, SumProductRealJoint, GaussianFactor> {
    /// Returns the mean of a variable's belief
    pub fn value(&self, variable: usize) -> FGResult<Array1<f64>> {
        self.belief(variable)?.mean()
    }
}
