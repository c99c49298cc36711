use ndarray::Zip;
use tracing::warn;

use crate::core::{
    Datum, DiscreteDomain, DiscreteGuess, FGError, FGResult, FactorGraph, Variable,
};
use crate::messages::DiscreteMessage;

/// A sum-product solver of a discrete variable
#[derive(Debug, Clone)]
pub struct DiscreteVariable {
    index: usize,
    domain: DiscreteDomain,
    input: Option<DiscreteMessage>,
    conditioned_index: Option<usize>,
    pub(crate) guess: DiscreteGuess,
}

impl DiscreteVariable {
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn domain(&self) -> &DiscreteDomain {
        &self.domain
    }

    /// The domain index of the conditioning value read on the last `initialize`
    #[inline]
    pub fn conditioned_index(&self) -> Option<usize> {
        self.conditioned_index
    }

    #[inline]
    pub fn guess(&self) -> &DiscreteGuess {
        &self.guess
    }

    fn check_size(&self, message: &DiscreteMessage) -> FGResult<()> {
        if message.size() != self.domain.size() {
            return Err(FGError::DimensionMismatch {
                context: format!("discrete message of variable {}", self.index),
                expected: self.domain.size(),
                found: message.size(),
            });
        }
        Ok(())
    }

    /// Multiplies the input and every incoming message except the one at `skip`
    fn product(&self, skip: Option<usize>, incoming: &[&DiscreteMessage], outgoing: &mut DiscreteMessage) -> FGResult<()> {
        if let Some(index) = self.conditioned_index {
            *outgoing = DiscreteMessage::point_mass(self.domain.size(), index);
            return Ok(());
        }
        if outgoing.size() != self.domain.size() {
            *outgoing = self.create_default_message();
        }
        let weights = outgoing.weights_mut();
        match &self.input {
            Some(input) => weights.assign(input.weights()),
            None => weights.fill(1f64),
        }
        for (port, message) in incoming.iter().enumerate() {
            if Some(port) == skip {
                continue;
            }
            self.check_size(message)?;
            Zip::from(&mut *weights)
                .and(message.weights())
                .for_each(|w, m| *w *= m);
        }
        outgoing.normalize();
        Ok(())
    }
}

impl Variable for DiscreteVariable {
    type Message = DiscreteMessage;

    fn new(graph: &FactorGraph, index: usize) -> FGResult<Self> {
        let node = graph.variable(index)?;
        let domain = node
            .domain()
            .as_discrete()
            .ok_or_else(|| FGError::UnsupportedVariable {
                variable: index,
                expected: "discrete".into(),
                found: node.domain().kind().into(),
            })?
            .clone();
        let mut variable = DiscreteVariable {
            index,
            domain,
            input: None,
            conditioned_index: None,
            guess: DiscreteGuess::default(),
        };
        variable.initialize(graph)?;
        Ok(variable)
    }

    fn initialize(&mut self, graph: &FactorGraph) -> FGResult<()> {
        self.guess.clear();
        let known = graph.prior_and_condition(self.index);
        self.conditioned_index = match known.value() {
            Some(value) => {
                let index = self.domain.index_of(value);
                if index.is_none() {
                    warn!(variable = self.index, %value, "conditioning value is outside of the domain, ignored");
                }
                index
            }
            None => None,
        };
        self.input = match known.prior() {
            Some(Datum::Discrete(message)) if message.size() == self.domain.size() => {
                let mut input = message.clone();
                input.normalize();
                Some(input)
            }
            None | Some(Datum::Value(_)) => None,
            Some(other) => {
                warn!(variable = self.index, prior = other.type_name(), "unsupported prior type for a discrete variable, ignored");
                None
            }
        };
        Ok(())
    }

    #[inline]
    fn create_default_message(&self) -> DiscreteMessage {
        DiscreteMessage::uniform(self.domain.size())
    }

    #[inline]
    fn input(&self) -> Option<&DiscreteMessage> {
        self.input.as_ref()
    }

    fn set_input(&mut self, input: Option<DiscreteMessage>) -> FGResult<()> {
        if let Some(input) = &input {
            self.check_size(input)?;
        }
        self.input = input;
        Ok(())
    }

    fn update_edge(&self, port: usize, incoming: &[&DiscreteMessage], outgoing: &mut DiscreteMessage) -> FGResult<()> {
        if port >= incoming.len() {
            return Err(FGError::OutOfRangePort {
                port,
                degree: incoming.len(),
            });
        }
        self.product(Some(port), incoming, outgoing)
    }

    fn belief(&self, incoming: &[&DiscreteMessage]) -> FGResult<DiscreteMessage> {
        let mut belief = self.create_default_message();
        self.product(None, incoming, &mut belief)?;
        Ok(belief)
    }
}
