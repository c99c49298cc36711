use crate::core::factor_graph::{FGError, FGResult};
use crate::core::value::{DiscreteDomain, RealDomain, Value};

/// An explicit assignment of a discrete variable used for scoring,
/// independent of its belief
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscreteGuess(Option<usize>);

impl DiscreteGuess {
    #[inline]
    pub fn clear(&mut self) {
        self.0 = None;
    }

    #[inline]
    pub fn was_set(&self) -> bool {
        self.0.is_some()
    }

    /// Returns the guess index, or the result of `fallback` when unset
    #[inline]
    pub fn index_or_else(&self, fallback: impl FnOnce() -> FGResult<usize>) -> FGResult<usize> {
        match self.0 {
            Some(index) => Ok(index),
            None => fallback(),
        }
    }

    #[inline]
    pub fn set_index(&mut self, index: usize, domain: &DiscreteDomain) -> FGResult<()> {
        if index >= domain.size() {
            return Err(FGError::GuessIndexOutOfRange {
                index,
                size: domain.size(),
            });
        }
        self.0 = Some(index);
        Ok(())
    }

    /// Sets a guess by value, `None` clears it
    pub fn set(&mut self, value: Option<&Value>, domain: &DiscreteDomain, variable: usize) -> FGResult<()> {
        let Some(value) = value else {
            self.clear();
            return Ok(());
        };
        let index = domain.index_of(value).ok_or_else(|| FGError::GuessNotInDomain {
            variable,
            guess: value.to_string(),
        })?;
        self.0 = Some(index);
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------

/// An explicit assignment of a real variable, NaN while unset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RealGuess {
    value: f64,
    was_set: bool,
}

impl Default for RealGuess {
    fn default() -> Self {
        RealGuess {
            value: f64::NAN,
            was_set: false,
        }
    }
}

impl RealGuess {
    #[inline]
    pub fn clear(&mut self) {
        *self = RealGuess::default();
    }

    #[inline]
    pub fn was_set(&self) -> bool {
        self.was_set
    }

    #[inline]
    pub fn value(&self) -> Option<f64> {
        self.was_set.then_some(self.value)
    }

    /// Sets a guess, `None` clears it. Only scalar numeric values within
    /// the domain are accepted
    pub fn set(&mut self, value: Option<&Value>, domain: &RealDomain, variable: usize) -> FGResult<()> {
        let Some(value) = value else {
            self.clear();
            return Ok(());
        };
        let x = value
            .as_real()
            .ok_or_else(|| FGError::UnsupportedGuessType(value.type_name().to_string()))?;
        if !domain.in_domain(x) {
            return Err(FGError::GuessNotInDomain {
                variable,
                guess: value.to_string(),
            });
        }
        self.value = x;
        self.was_set = true;
        Ok(())
    }
}
