use rayon::prelude::{IntoParallelIterator, ParallelIterator};

use crate::core::{
    edge_state::{EdgeState, EdgeStore},
    factor::Factor,
    factor_graph::{FGError, FGResult, FactorGraph, MessagePassingInfo},
    message::Message,
    variable::Variable,
};

/// Message passing solvers attached to every node of a factor graph together
/// with the messages living on its edges
///
/// # Notes
///
/// Solver nodes never own messages, they are handed the messages of their
/// edges on every update. Edge states are created when a solver graph is
/// built and reset on `initialize`
#[derive(Debug)]
pub struct SolverGraph<'g, V, F>
where
    V: Variable,
    F: Factor<Message = V::Message>,
{
    graph: &'g FactorGraph,
    pub(crate) variables: Vec<V>,
    pub(crate) factors: Vec<F>,
    pub(crate) edges: EdgeStore<EdgeState<V::Message>>,
}

impl<'g, V, F> SolverGraph<'g, V, F>
where
    V: Variable,
    F: Factor<Message = V::Message>,
{
    /// Attaches solvers to every node of a factor graph
    pub fn new(graph: &'g FactorGraph) -> FGResult<Self> {
        let variables = (0..graph.variables_number())
            .map(|index| V::new(graph, index))
            .collect::<FGResult<Vec<_>>>()?;
        let factors = (0..graph.factors_number())
            .map(|index| F::new(graph, index))
            .collect::<FGResult<Vec<_>>>()?;
        let states = graph
            .edges()
            .iter()
            .map(|edge| {
                let message = variables[edge.variable].create_default_message();
                EdgeState::new(message.clone(), message)
            })
            .collect();
        let mut solver_graph = SolverGraph {
            graph,
            variables,
            factors,
            edges: EdgeStore::new(states),
        };
        solver_graph.initialize()?;
        Ok(solver_graph)
    }

    #[inline]
    pub fn graph(&self) -> &'g FactorGraph {
        self.graph
    }

    /// Resets guesses, cached bindings and all edge messages
    pub fn initialize(&mut self) -> FGResult<()> {
        for variable in &mut self.variables {
            variable.initialize(self.graph)?;
        }
        for factor in &mut self.factors {
            factor.initialize(self.graph)?;
        }
        self.edges.reset_all();
        Ok(())
    }

    #[inline]
    pub fn variable_solver(&self, variable: usize) -> FGResult<&V> {
        self.variables
            .get(variable)
            .ok_or(FGError::OutOfRangeVariable(self.variables.len(), variable))
    }

    #[inline]
    pub fn factor_solver(&self, factor: usize) -> FGResult<&F> {
        self.factors
            .get(factor)
            .ok_or(FGError::OutOfRangeFactor(self.factors.len(), factor))
    }

    /// Returns messages of an edge
    #[inline]
    pub fn edge_messages(&self, edge: usize) -> FGResult<&EdgeState<V::Message>> {
        self.edges
            .get(edge)
            .ok_or(FGError::OutOfRangeEdge(self.edges.len(), edge))
    }

    #[inline]
    pub fn variable_edge(&self, variable: usize, port: usize) -> FGResult<usize> {
        let edges = self.graph.variable(variable)?.edges();
        edges.get(port).copied().ok_or(FGError::OutOfRangePort {
            port,
            degree: edges.len(),
        })
    }

    #[inline]
    pub fn factor_edge(&self, factor: usize, port: usize) -> FGResult<usize> {
        let edges = self.graph.factor(factor)?.edges();
        edges.get(port).copied().ok_or(FGError::OutOfRangePort {
            port,
            degree: edges.len(),
        })
    }

    pub fn update_variable_edge(&mut self, variable: usize, port: usize) -> FGResult<()> {
        let (edge, message) = self.compute_variable_edge(variable, port)?;
        self.commit_var_to_factor(edge, message);
        Ok(())
    }

    pub fn update_variable(&mut self, variable: usize) -> FGResult<()> {
        for (edge, message) in self.compute_variable(variable)? {
            self.commit_var_to_factor(edge, message);
        }
        Ok(())
    }

    pub fn update_factor_edge(&mut self, factor: usize, port: usize) -> FGResult<()> {
        let (edge, message) = self.compute_factor_edge(factor, port)?;
        self.commit_factor_to_var(edge, message);
        Ok(())
    }

    pub fn update_factor(&mut self, factor: usize) -> FGResult<()> {
        for (edge, message) in self.compute_factor(factor)? {
            self.commit_factor_to_var(edge, message);
        }
        Ok(())
    }

    /// Computes a belief of a variable from all its incoming messages
    pub fn belief(&self, variable: usize) -> FGResult<V::Message> {
        let incoming = self.factor_to_var_messages(self.graph.variable(variable)?.edges());
        self.variable_solver(variable)?.belief(&incoming)
    }

    /// Returns the input message of a variable derived from its prior
    #[inline]
    pub fn input_msg(&self, variable: usize) -> FGResult<Option<&V::Message>> {
        Ok(self.variable_solver(variable)?.input())
    }

    /// Returns the output message of a variable, which is its belief
    #[inline]
    pub fn output_msg(&self, variable: usize) -> FGResult<V::Message> {
        self.belief(variable)
    }

    pub fn set_input_msg(&mut self, variable: usize, input: Option<V::Message>) -> FGResult<()> {
        let size = self.variables.len();
        self.variables
            .get_mut(variable)
            .ok_or(FGError::OutOfRangeVariable(size, variable))?
            .set_input(input)
    }

    /// Resets both messages of an edge to uninformative ones
    pub fn reset_edge_messages(&mut self, edge: usize) -> FGResult<()> {
        self.edge_messages(edge)?;
        self.edges.reset(edge);
        Ok(())
    }

    /// Moves messages of the edge at `src_port` of `src_variable` to the edge
    /// at `dst_port` of `dst_variable`, the source edge is left reset
    pub fn move_messages(
        &mut self,
        dst_variable: usize,
        dst_port: usize,
        src_variable: usize,
        src_port: usize,
    ) -> FGResult<()> {
        let dst = self.variable_edge(dst_variable, dst_port)?;
        let src = self.variable_edge(src_variable, src_port)?;
        self.edges.move_state(dst, src);
        Ok(())
    }

    /// Runs flooding message passing in parallel. Every iteration updates
    /// all factors and then all variables, each half is computed from the
    /// messages of the previous half.
    ///
    /// # Arguments
    ///
    /// * `max_iterations_number` - A maximal number of iterations, if a process
    ///     does not converge before reaching this number of iterations, it fails
    /// * `threshold` - A threshold specifying the convergence criterion. A process
    ///     is considered as successful if the discrepancy between two subsequent
    ///     messages configurations is less than the threshold
    pub fn iterate(&mut self, max_iterations_number: usize, threshold: f64) -> FGResult<MessagePassingInfo> {
        let mut last_discrepancy = f64::MAX;
        let mut discrepancy_dynamics = Vec::with_capacity(max_iterations_number);
        for i in 0..max_iterations_number {
            let factor_updates = (0..self.factors.len())
                .into_par_iter()
                .map(|factor| self.compute_factor(factor))
                .collect::<FGResult<Vec<_>>>()?;
            let factors_discrepancy = factor_updates
                .into_iter()
                .flatten()
                .map(|(edge, message)| self.commit_factor_to_var(edge, message))
                .fold(0f64, f64::max);
            let variable_updates = (0..self.variables.len())
                .into_par_iter()
                .map(|variable| self.compute_variable(variable))
                .collect::<FGResult<Vec<_>>>()?;
            let variables_discrepancy = variable_updates
                .into_iter()
                .flatten()
                .map(|(edge, message)| self.commit_var_to_factor(edge, message))
                .fold(0f64, f64::max);
            let max_discrepancy = factors_discrepancy.max(variables_discrepancy);
            discrepancy_dynamics.push(max_discrepancy);
            last_discrepancy = max_discrepancy;
            tracing::trace!(iteration = i, discrepancy = max_discrepancy, "message passing iteration");
            if max_discrepancy < threshold {
                return Ok(MessagePassingInfo {
                    iterations_number: i + 1,
                    discrepancy_dynamics,
                    last_discrepancy,
                });
            }
        }
        Err(FGError::MessagePassingError {
            iterations_number: max_iterations_number,
            discrepancy_dynamics,
            last_discrepancy,
        })
    }
}

// private methods --------------------------------------------------------------------------

impl<'g, V, F> SolverGraph<'g, V, F>
where
    V: Variable,
    F: Factor<Message = V::Message>,
{
    #[inline(always)]
    fn factor_to_var_messages(&self, edges: &[usize]) -> Vec<&V::Message> {
        edges
            .iter()
            .filter_map(|edge| self.edges.get(*edge).map(|state| &state.factor_to_var))
            .collect()
    }

    #[inline(always)]
    fn var_to_factor_messages(&self, edges: &[usize]) -> Vec<&V::Message> {
        edges
            .iter()
            .filter_map(|edge| self.edges.get(*edge).map(|state| &state.var_to_factor))
            .collect()
    }

    fn compute_variable_edge(&self, variable: usize, port: usize) -> FGResult<(usize, V::Message)> {
        let edge = self.variable_edge(variable, port)?;
        let incoming = self.factor_to_var_messages(self.graph.variable(variable)?.edges());
        let mut outgoing = self.edge_messages(edge)?.var_to_factor.clone();
        self.variable_solver(variable)?
            .update_edge(port, &incoming, &mut outgoing)?;
        Ok((edge, outgoing))
    }

    fn compute_variable(&self, variable: usize) -> FGResult<Vec<(usize, V::Message)>> {
        (0..self.graph.variable(variable)?.degree())
            .map(|port| self.compute_variable_edge(variable, port))
            .collect()
    }

    fn compute_factor_edge(&self, factor: usize, port: usize) -> FGResult<(usize, V::Message)> {
        let edge = self.factor_edge(factor, port)?;
        let incoming = self.var_to_factor_messages(self.graph.factor(factor)?.edges());
        let mut outgoing = self.edge_messages(edge)?.factor_to_var.clone();
        self.factor_solver(factor)?
            .update_edge(port, &incoming, &mut outgoing)?;
        Ok((edge, outgoing))
    }

    fn compute_factor(&self, factor: usize) -> FGResult<Vec<(usize, V::Message)>> {
        (0..self.graph.factor(factor)?.sibling_count())
            .map(|port| self.compute_factor_edge(factor, port))
            .collect()
    }

    /// Writes a message and returns its discrepancy with the replaced one
    #[inline(always)]
    fn commit_var_to_factor(&mut self, edge: usize, message: V::Message) -> f64 {
        match self.edges.get_mut(edge) {
            Some(state) => {
                let discrepancy = state.var_to_factor.discrepancy(&message);
                message.memcpy(&mut state.var_to_factor);
                discrepancy
            }
            None => 0f64,
        }
    }

    #[inline(always)]
    fn commit_factor_to_var(&mut self, edge: usize, message: V::Message) -> f64 {
        match self.edges.get_mut(edge) {
            Some(state) => {
                let discrepancy = state.factor_to_var.discrepancy(&message);
                message.memcpy(&mut state.factor_to_var);
                discrepancy
            }
            None => 0f64,
        }
    }
}
