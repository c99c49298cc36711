use crate::core::factor_graph::{FGResult, FactorGraph};
use crate::core::message::Message;
use std::fmt::Debug;

/// A message passing solver attached to a factor node
pub trait Factor: Debug + Send + Sync + Sized {
    /// Type of a message
    type Message: Message;

    /// Creates a solver for the `index`-th factor of a graph
    fn new(graph: &FactorGraph, index: usize) -> FGResult<Self>;

    /// Resets derived state
    fn initialize(&mut self, graph: &FactorGraph) -> FGResult<()>;

    /// Computes a message to the variable attached at `port`
    ///
    /// # Arguments
    ///
    /// * `port` - The port of the edge to update
    /// * `incoming` - Messages received from adjoint variables previously
    /// * `outgoing` - A destination where to write the message
    ///
    /// # Notes
    ///
    /// incoming[0] corresponds to the message received from the first variable,
    /// incoming[1] corresponds to the message received from the second variable,
    /// etc
    fn update_edge(&self, port: usize, incoming: &[&Self::Message], outgoing: &mut Self::Message) -> FGResult<()>;
}
