/// Custom factors with conjugate updates
pub mod custom_factors;
/// Conjugate samplers
pub mod samplers;

mod metropolis;
mod real;
mod real_joint;
mod replicas;
mod solver_graph;

pub use metropolis::RandomWalk;
pub use real::GibbsReal;
pub use real_joint::GibbsRealJoint;
pub use replicas::{run_replicas, SamplingInfo};
pub use solver_graph::{GibbsEdge, GibbsFactor, GibbsGraph, GibbsVariable};
