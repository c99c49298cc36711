mod context;
mod edge_state;
mod factor;
mod factor_function;
mod factor_graph;
mod factor_graph_builder;
mod factor_node;
mod guess;
mod message;
mod solver_graph;
mod value;
mod variable;
mod variable_node;

pub use context::{RandomSource, SolverConfig, SolverContext};
pub use edge_state::{EdgeSlot, EdgeState, EdgeStore};
pub use factor::Factor;
pub use factor_function::{FactorFunction, FactorTable};
pub use factor_graph::{EdgeRef, FGError, FGResult, FactorGraph, MessagePassingInfo, PriorAndCondition};
pub use factor_graph_builder::{FGBuilderError, FGBuilderResult, FactorGraphBuilder};
pub use factor_node::{Argument, FactorNode};
pub use guess::{DiscreteGuess, RealGuess};
pub use message::Message;
pub use solver_graph::SolverGraph;
pub use value::{Datum, DiscreteDomain, Domain, RealDomain, RealJointDomain, Value};
pub use variable::Variable;
pub use variable_node::VariableNode;
