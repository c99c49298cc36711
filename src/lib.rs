/// A module containing general logic of factor graphs and solver graphs
pub mod core;
/// A module containing Gibbs sampling solvers with conjugate-distribution shortcuts
pub mod gibbs;
/// A module containing distribution-family specific messages
pub mod messages;
/// A module containing sum-product (belief propagation) solvers
pub mod sum_product;

#[cfg(test)]
mod tests;
