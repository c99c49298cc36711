use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::messages::{
    DirichletParameters, DiscreteMessage, GammaParameters, MultivariateNormalParameters,
};

// ------------------------------------------------------------------------------------------

/// A value a variable can take or a constant argument of a factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Real(f64),
    RealJoint(Vec<f64>),
}

impl Value {
    /// Returns a scalar representation of a value if it is numeric and scalar
    #[inline]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Real(x) => Some(*x),
            Value::RealJoint(_) => None,
        }
    }

    #[inline]
    pub fn as_real_joint(&self) -> Option<&[f64]> {
        match self {
            Value::RealJoint(v) => Some(v),
            _ => None,
        }
    }

    /// Compares values numerically, so that `Int(1)` and `Real(1.0)` are equal
    #[inline]
    pub fn numeric_eq(&self, other: &Value) -> bool {
        match (self.as_real(), other.as_real()) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            _ => self == other,
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "Int",
            Value::Real(_) => "Real",
            Value::RealJoint(_) => "RealJoint",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Real(x) => write!(f, "{x}"),
            Value::RealJoint(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::RealJoint(value)
    }
}

// ------------------------------------------------------------------------------------------

/// An ordered finite set of values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteDomain {
    elements: Vec<Value>,
}

impl DiscreteDomain {
    #[inline]
    pub fn new(elements: Vec<Value>) -> Self {
        DiscreteDomain { elements }
    }

    /// Creates a domain of integers in `[start, end)`
    #[inline]
    pub fn range(start: i64, end: i64) -> Self {
        DiscreteDomain {
            elements: (start..end).map(Value::Int).collect(),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    #[inline]
    pub fn element(&self, index: usize) -> Option<&Value> {
        self.elements.get(index)
    }

    /// Returns the position of a value in the domain's order
    #[inline]
    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.elements.iter().position(|e| e.numeric_eq(value))
    }
}

/// A closed interval of reals, bounds might be infinite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealDomain {
    lower: f64,
    upper: f64,
}

impl Default for RealDomain {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl RealDomain {
    #[inline]
    pub fn new(lower: f64, upper: f64) -> Self {
        RealDomain { lower, upper }
    }

    #[inline]
    pub fn unbounded() -> Self {
        RealDomain::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Creates `[0, +inf)`
    #[inline]
    pub fn non_negative() -> Self {
        RealDomain::new(0f64, f64::INFINITY)
    }

    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower
    }

    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper
    }

    #[inline]
    pub fn in_domain(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    #[inline]
    pub fn clip(&self, value: f64) -> f64 {
        value.max(self.lower).min(self.upper)
    }
}

/// A cartesian product of real intervals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealJointDomain {
    domains: Vec<RealDomain>,
}

impl RealJointDomain {
    #[inline]
    pub fn new(domains: Vec<RealDomain>) -> Self {
        RealJointDomain { domains }
    }

    /// Creates a domain with the same interval in every dimension
    #[inline]
    pub fn uniform(dimension: usize, domain: RealDomain) -> Self {
        RealJointDomain {
            domains: vec![domain; dimension],
        }
    }

    /// Creates `[0, 1]^dimension`, a domain of probability vectors
    #[inline]
    pub fn unit_cube(dimension: usize) -> Self {
        Self::uniform(dimension, RealDomain::new(0f64, 1f64))
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.domains.len()
    }

    #[inline]
    pub fn real_domains(&self) -> &[RealDomain] {
        &self.domains
    }

    #[inline]
    pub fn in_domain(&self, value: &[f64]) -> bool {
        value.len() == self.domains.len()
            && value.iter().zip(&self.domains).all(|(x, d)| d.in_domain(*x))
    }
}

/// A domain of a variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Domain {
    Discrete(DiscreteDomain),
    Real(RealDomain),
    RealJoint(RealJointDomain),
}

impl Domain {
    #[inline]
    pub fn is_discrete(&self) -> bool {
        matches!(self, Domain::Discrete(_))
    }

    #[inline]
    pub fn as_discrete(&self) -> Option<&DiscreteDomain> {
        match self {
            Domain::Discrete(d) => Some(d),
            _ => None,
        }
    }

    #[inline]
    pub fn as_real(&self) -> Option<&RealDomain> {
        match self {
            Domain::Real(d) => Some(d),
            _ => None,
        }
    }

    #[inline]
    pub fn as_real_joint(&self) -> Option<&RealJointDomain> {
        match self {
            Domain::RealJoint(d) => Some(d),
            _ => None,
        }
    }

    /// Checks whether a value belongs to a domain
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Domain::Discrete(d) => d.index_of(value).is_some(),
            Domain::Real(d) => value.as_real().is_some_and(|x| d.in_domain(x)),
            Domain::RealJoint(d) => value.as_real_joint().is_some_and(|x| d.in_domain(x)),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Domain::Discrete(_) => "discrete",
            Domain::Real(_) => "real",
            Domain::RealJoint(_) => "real joint",
        }
    }
}

// ------------------------------------------------------------------------------------------

/// A datum attached to a variable as a prior: either a conditioning value
/// or a distribution over the variable's domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Datum {
    Value(Value),
    Discrete(DiscreteMessage),
    Normal { mean: f64, precision: f64 },
    Gamma(GammaParameters),
    Dirichlet(DirichletParameters),
    MultivariateNormal(MultivariateNormalParameters),
}

impl Datum {
    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Datum::Value(_) => "Value",
            Datum::Discrete(_) => "Discrete",
            Datum::Normal { .. } => "Normal",
            Datum::Gamma(_) => "Gamma",
            Datum::Dirichlet(_) => "Dirichlet",
            Datum::MultivariateNormal(_) => "MultivariateNormal",
        }
    }
}
