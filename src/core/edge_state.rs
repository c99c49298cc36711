use crate::core::message::Message;

/// A state kept on a single (factor, variable) adjacency that can be reset
/// to carry no information
pub trait EdgeSlot: Send + Sync {
    fn reset(&mut self);
}

/// A pair of messages living on an edge
#[derive(Debug, Clone)]
pub struct EdgeState<M: Message> {
    pub factor_to_var: M,
    pub var_to_factor: M,
}

impl<M: Message> EdgeState<M> {
    #[inline]
    pub fn new(factor_to_var: M, var_to_factor: M) -> Self {
        EdgeState {
            factor_to_var,
            var_to_factor,
        }
    }
}

impl<M: Message> EdgeSlot for EdgeState<M> {
    #[inline]
    fn reset(&mut self) {
        self.factor_to_var.reset();
        self.var_to_factor.reset();
    }
}

// ------------------------------------------------------------------------------------------

/// An arena of edge states addressed by edge id.
///
/// Solver nodes keep edge ids only. An edge id is mapped to a slot, so that
/// moving messages from one edge to another is a slot reassignment followed
/// by a reset of the vacated edge, never a copy.
#[derive(Debug, Clone)]
pub struct EdgeStore<S: EdgeSlot> {
    slots: Vec<S>,
    slot_of_edge: Vec<usize>,
}

impl<S: EdgeSlot> EdgeStore<S> {
    /// Creates a store with one slot per edge, the i-th state belongs to the i-th edge
    #[inline]
    pub fn new(states: Vec<S>) -> Self {
        let slot_of_edge = (0..states.len()).collect();
        EdgeStore {
            slots: states,
            slot_of_edge,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slot_of_edge.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slot_of_edge.is_empty()
    }

    #[inline]
    pub fn get(&self, edge: usize) -> Option<&S> {
        self.slot_of_edge.get(edge).map(|slot| &self.slots[*slot])
    }

    #[inline]
    pub fn get_mut(&mut self, edge: usize) -> Option<&mut S> {
        self.slot_of_edge
            .get(edge)
            .map(|slot| &mut self.slots[*slot])
    }

    /// Replaces the state of an edge
    #[inline]
    pub fn replace(&mut self, edge: usize, state: S) {
        if let Some(slot) = self.slot_of_edge.get(edge) {
            self.slots[*slot] = state;
        }
    }

    #[inline]
    pub fn reset(&mut self, edge: usize) {
        if let Some(state) = self.get_mut(edge) {
            state.reset();
        }
    }

    #[inline]
    pub fn reset_all(&mut self) {
        self.slots.iter_mut().for_each(|s| s.reset());
    }

    /// Moves the state of `src` to `dst` and leaves `src` reset
    ///
    /// # Notes
    ///
    /// The previous state of `dst` is reused as the new state of `src`,
    /// no message is copied
    #[inline]
    pub fn move_state(&mut self, dst: usize, src: usize) {
        if dst == src || dst >= self.len() || src >= self.len() {
            return;
        }
        self.slot_of_edge.swap(dst, src);
        let vacated = self.slot_of_edge[src];
        self.slots[vacated].reset();
    }
}
