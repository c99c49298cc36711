use crate::core::factor_graph::{FGResult, FactorGraph};
use crate::core::message::Message;
use std::fmt::Debug;

/// A message passing solver attached to a variable node
pub trait Variable: Debug + Send + Sync + Sized {
    /// Message type
    type Message: Message;

    /// Creates a solver for the `index`-th variable of a graph
    fn new(graph: &FactorGraph, index: usize) -> FGResult<Self>;

    /// Resets derived state and re-reads fixed values and priors
    fn initialize(&mut self, graph: &FactorGraph) -> FGResult<()>;

    /// Returns an uninformative message of the right dimension
    fn create_default_message(&self) -> Self::Message;

    /// Returns the input message derived from a prior, if any
    fn input(&self) -> Option<&Self::Message>;

    /// Overrides the input message
    fn set_input(&mut self, input: Option<Self::Message>) -> FGResult<()>;

    /// Computes a message to the factor attached at `port`
    ///
    /// # Arguments
    ///
    /// * `port` - The port of the edge to update
    /// * `incoming` - Messages received from adjoint factors previously
    /// * `outgoing` - A destination where to write the message
    ///
    /// # Notes
    ///
    /// incoming[i] is the message received from the factor at port i,
    /// the port being updated is included and has to be skipped
    fn update_edge(&self, port: usize, incoming: &[&Self::Message], outgoing: &mut Self::Message) -> FGResult<()>;

    /// Computes a belief of a variable
    ///
    /// # Arguments
    ///
    /// * `incoming` - Messages received from adjoint factors previously
    fn belief(&self, incoming: &[&Self::Message]) -> FGResult<Self::Message>;
}
