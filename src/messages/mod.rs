mod dirichlet;
mod discrete;
mod gamma;
mod multivariate_normal;

pub use dirichlet::DirichletParameters;
pub use discrete::DiscreteMessage;
pub use gamma::GammaParameters;
pub use multivariate_normal::MultivariateNormalParameters;

use serde::{Deserialize, Serialize};

use crate::core::Message;

/// A parameter message carried by a Gibbs edge from a factor to a variable,
/// tagged by its distribution family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterMessage {
    Gamma(GammaParameters),
    Dirichlet(DirichletParameters),
}

impl ParameterMessage {
    pub(crate) fn family_name(&self) -> &'static str {
        match self {
            ParameterMessage::Gamma(_) => "Gamma",
            ParameterMessage::Dirichlet(_) => "Dirichlet",
        }
    }
}

impl Message for ParameterMessage {
    #[inline]
    fn discrepancy(&self, other: &Self) -> f64 {
        match (self, other) {
            (ParameterMessage::Gamma(lhs), ParameterMessage::Gamma(rhs)) => lhs.discrepancy(rhs),
            (ParameterMessage::Dirichlet(lhs), ParameterMessage::Dirichlet(rhs)) => {
                lhs.discrepancy(rhs)
            }
            _ => f64::INFINITY,
        }
    }

    #[inline]
    fn reset(&mut self) {
        match self {
            ParameterMessage::Gamma(p) => p.reset(),
            ParameterMessage::Dirichlet(p) => p.reset(),
        }
    }
}
