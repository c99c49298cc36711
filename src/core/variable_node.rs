use crate::core::value::Domain;

/// A variable of a factor graph: a domain and adjoint edges in the order
/// factors were attached
#[derive(Debug, Clone)]
pub struct VariableNode {
    domain: Domain,
    pub(crate) edges: Vec<usize>,
}

impl VariableNode {
    #[inline(always)]
    pub(super) fn new_disconnected(domain: Domain) -> Self {
        VariableNode {
            domain,
            edges: Vec::new(),
        }
    }

    #[inline]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Edge ids, the position of an edge in this list is its port number
    #[inline]
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.edges.len()
    }
}
