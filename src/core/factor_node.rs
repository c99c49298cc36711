use crate::core::factor_function::FactorFunction;
use crate::core::value::Value;

/// An argument of a factor function: an adjoint variable or a constant
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Variable(usize),
    Constant(Value),
}

impl Argument {
    #[inline]
    pub fn var(index: usize) -> Self {
        Argument::Variable(index)
    }

    #[inline]
    pub fn constant(value: impl Into<Value>) -> Self {
        Argument::Constant(value.into())
    }
}

/// A factor of a factor graph.
///
/// Arguments are positional. Those bound to variables are siblings, ordered
/// by argument index, and a sibling number is the port of the corresponding edge.
#[derive(Debug, Clone)]
pub struct FactorNode {
    function: FactorFunction,
    arguments: Vec<Argument>,
    siblings: Vec<usize>,
    arg_to_sibling: Vec<Option<usize>>,
    pub(crate) edges: Vec<usize>,
}

impl FactorNode {
    pub(super) fn new_disconnected(function: FactorFunction, arguments: Vec<Argument>) -> Self {
        let mut siblings = Vec::with_capacity(arguments.len());
        let arg_to_sibling = arguments
            .iter()
            .map(|arg| match arg {
                Argument::Variable(index) => {
                    siblings.push(*index);
                    Some(siblings.len() - 1)
                }
                Argument::Constant(_) => None,
            })
            .collect();
        FactorNode {
            function,
            arguments,
            siblings,
            arg_to_sibling,
            edges: Vec::new(),
        }
    }

    #[inline]
    pub fn function(&self) -> &FactorFunction {
        &self.function
    }

    /// Total number of arguments, constants included
    #[inline]
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    #[inline]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Indices of adjoint variables ordered by port
    #[inline]
    pub fn siblings(&self) -> &[usize] {
        &self.siblings
    }

    #[inline]
    pub fn sibling_count(&self) -> usize {
        self.siblings.len()
    }

    /// Edge ids ordered by port
    #[inline]
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    #[inline]
    pub fn has_constants(&self) -> bool {
        self.siblings.len() != self.arguments.len()
    }

    #[inline]
    pub fn has_constant_at_index(&self, index: usize) -> bool {
        matches!(self.arguments.get(index), Some(Argument::Constant(_)))
    }

    #[inline]
    pub fn constant_value_by_index(&self, index: usize) -> Option<&Value> {
        match self.arguments.get(index) {
            Some(Argument::Constant(value)) => Some(value),
            _ => None,
        }
    }

    /// Argument indices bound to constants in increasing order
    pub fn constant_indices(&self) -> Vec<usize> {
        self.arg_to_sibling
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Constant values in the order of `constant_indices`
    pub fn constant_values(&self) -> Vec<&Value> {
        self.arguments
            .iter()
            .filter_map(|arg| match arg {
                Argument::Constant(value) => Some(value),
                Argument::Variable(_) => None,
            })
            .collect()
    }

    /// Port of an argument, `None` if the argument is a constant
    #[inline]
    pub fn arg_index_to_sibling_number(&self, index: usize) -> Option<usize> {
        self.arg_to_sibling.get(index).copied().flatten()
    }
}
