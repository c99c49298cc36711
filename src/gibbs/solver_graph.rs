use tracing::{debug, trace};

use crate::core::{
    Domain, EdgeSlot, EdgeStore, FGError, FGResult, FactorFunction, FactorGraph, Message, RandomSource, Value,
};
use crate::gibbs::custom_factors::{CurrentSamples, CustomExponential, CustomGamma};
use crate::gibbs::metropolis::RandomWalk;
use crate::gibbs::real::GibbsReal;
use crate::gibbs::real_joint::GibbsRealJoint;
use crate::gibbs::samplers::SamplerFamily;
use crate::messages::ParameterMessage;

/// State of an edge under Gibbs sampling: the latest conjugate message sent
/// by the factor, `None` if the factor has no conjugate update on the edge
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GibbsEdge {
    pub factor_to_var: Option<ParameterMessage>,
}

impl EdgeSlot for GibbsEdge {
    #[inline]
    fn reset(&mut self) {
        if let Some(message) = &mut self.factor_to_var {
            message.reset();
        }
    }
}

/// A Gibbs solver of a variable
#[derive(Debug, Clone)]
pub enum GibbsVariable {
    Real(GibbsReal),
    RealJoint(GibbsRealJoint),
}

impl GibbsVariable {
    fn new(graph: &FactorGraph, index: usize) -> FGResult<Self> {
        match graph.variable(index)?.domain() {
            Domain::Real(domain) => Ok(GibbsVariable::Real(GibbsReal::new(index, *domain))),
            Domain::RealJoint(domain) => Ok(GibbsVariable::RealJoint(GibbsRealJoint::new(index, domain.clone()))),
            Domain::Discrete(_) => Err(FGError::UnsupportedVariable {
                variable: index,
                expected: "real or real joint".into(),
                found: "discrete".into(),
            }),
        }
    }

    /// The current sample as a value
    pub fn value(&self) -> Value {
        match self {
            GibbsVariable::Real(v) => Value::Real(v.current_sample()),
            GibbsVariable::RealJoint(v) => Value::RealJoint(v.current_sample().to_vec()),
        }
    }
}

/// A Gibbs solver of a factor
#[derive(Debug, Clone)]
pub enum GibbsFactor {
    Gamma(CustomGamma),
    Exponential(CustomExponential),
    /// A factor without a conjugate update, it never sends messages
    Generic { index: usize },
}

impl GibbsFactor {
    fn new(graph: &FactorGraph, index: usize) -> FGResult<Self> {
        match graph.factor(index)?.function() {
            FactorFunction::Gamma { .. } => Ok(GibbsFactor::Gamma(CustomGamma::new(graph, index)?)),
            FactorFunction::Exponential { .. } => Ok(GibbsFactor::Exponential(CustomExponential::new(graph, index)?)),
            _ => Ok(GibbsFactor::Generic { index }),
        }
    }

    fn initialize(&mut self, graph: &FactorGraph) -> FGResult<bool> {
        match self {
            GibbsFactor::Gamma(f) => f.initialize(graph),
            GibbsFactor::Exponential(f) => f.initialize(graph),
            GibbsFactor::Generic { .. } => Ok(false),
        }
    }

    /// Sampler families able to consume messages sent at `port`
    pub fn conjugate_samplers(&self, port: usize) -> &'static [SamplerFamily] {
        match self {
            GibbsFactor::Gamma(f) => f.conjugate_samplers(port),
            GibbsFactor::Exponential(f) => f.conjugate_samplers(port),
            GibbsFactor::Generic { .. } => &[],
        }
    }

    pub fn update_edge(&self, port: usize, samples: &(impl CurrentSamples + ?Sized)) -> FGResult<Option<ParameterMessage>> {
        match self {
            GibbsFactor::Gamma(f) => f.update_edge(port, samples),
            GibbsFactor::Exponential(f) => f.update_edge(port, samples),
            GibbsFactor::Generic { .. } => Ok(None),
        }
    }

    /// Log-density of the factor at current samples, `None` if the factor
    /// function has no known density
    pub fn log_density(&self, samples: &(impl CurrentSamples + ?Sized)) -> FGResult<Option<f64>> {
        match self {
            GibbsFactor::Gamma(f) => f.log_density(samples).map(Some),
            GibbsFactor::Exponential(f) => f.log_density(samples).map(Some),
            GibbsFactor::Generic { .. } => Ok(None),
        }
    }
}

struct Samples<'a>(&'a [GibbsVariable]);

impl CurrentSamples for Samples<'_> {
    fn current_sample(&self, variable: usize) -> FGResult<f64> {
        match self.0.get(variable) {
            Some(GibbsVariable::Real(v)) => Ok(v.current_sample()),
            Some(GibbsVariable::RealJoint(_)) => Err(FGError::UnsupportedVariable {
                variable,
                expected: "real".into(),
                found: "real joint".into(),
            }),
            None => Err(FGError::OutOfRangeVariable(self.0.len(), variable)),
        }
    }
}

// Current samples with one variable moved to a proposed value
struct Proposal<'a> {
    samples: Samples<'a>,
    variable: usize,
    value: f64,
}

impl CurrentSamples for Proposal<'_> {
    fn current_sample(&self, variable: usize) -> FGResult<f64> {
        if variable == self.variable {
            Ok(self.value)
        } else {
            self.samples.current_sample(variable)
        }
    }
}

// ------------------------------------------------------------------------------------------

/// Gibbs solvers attached to every node of a factor graph
#[derive(Debug)]
pub struct GibbsGraph<'g> {
    graph: &'g FactorGraph,
    variables: Vec<GibbsVariable>,
    factors: Vec<GibbsFactor>,
    edges: EdgeStore<GibbsEdge>,
}

impl<'g> GibbsGraph<'g> {
    pub fn new(graph: &'g FactorGraph) -> FGResult<Self> {
        let variables = (0..graph.variables_number())
            .map(|index| GibbsVariable::new(graph, index))
            .collect::<FGResult<Vec<_>>>()?;
        let factors = (0..graph.factors_number())
            .map(|index| GibbsFactor::new(graph, index))
            .collect::<FGResult<Vec<_>>>()?;
        let edges = EdgeStore::new(vec![GibbsEdge::default(); graph.edges_number()]);
        let mut gibbs = GibbsGraph {
            graph,
            variables,
            factors,
            edges,
        };
        gibbs.initialize()?;
        Ok(gibbs)
    }

    #[inline]
    pub fn graph(&self) -> &'g FactorGraph {
        self.graph
    }

    /// Rebuilds factor bindings, re-reads known data, clears guesses and
    /// selects samplers. Edges of a factor whose conjugate parameter port
    /// has changed are recreated empty
    pub fn initialize(&mut self) -> FGResult<()> {
        for (index, factor) in self.factors.iter_mut().enumerate() {
            if factor.initialize(self.graph)? {
                debug!(factor = index, "conjugate parameter port changed, edge states invalidated");
                for edge in self.graph.factor(index)?.edges() {
                    self.edges.replace(*edge, GibbsEdge::default());
                }
            }
        }
        for index in 0..self.variables.len() {
            let offered = self.offered_samplers(index)?;
            match &mut self.variables[index] {
                GibbsVariable::Real(v) => v.initialize(self.graph, &offered)?,
                GibbsVariable::RealJoint(v) => v.initialize(self.graph, &offered)?,
            }
        }
        Ok(())
    }

    /// Families offered by every adjoint factor at the variable's ports
    fn offered_samplers(&self, variable: usize) -> FGResult<Vec<SamplerFamily>> {
        let mut offered = SamplerFamily::ALL.to_vec();
        for edge in self.graph.variable(variable)?.edges() {
            let edge = self.graph.edge(*edge)?;
            let factor = self.gibbs_factor(edge.factor)?;
            offered.retain(|family| family.is_compatible_with_factor(factor, edge.factor_port));
        }
        Ok(offered)
    }

    #[inline]
    pub fn variable_solver(&self, variable: usize) -> FGResult<&GibbsVariable> {
        self.variables
            .get(variable)
            .ok_or(FGError::OutOfRangeVariable(self.variables.len(), variable))
    }

    #[inline]
    pub fn gibbs_factor(&self, factor: usize) -> FGResult<&GibbsFactor> {
        self.factors
            .get(factor)
            .ok_or(FGError::OutOfRangeFactor(self.factors.len(), factor))
    }

    fn real_solver(&self, variable: usize) -> FGResult<&GibbsReal> {
        match self.variable_solver(variable)? {
            GibbsVariable::Real(v) => Ok(v),
            GibbsVariable::RealJoint(_) => Err(FGError::UnsupportedVariable {
                variable,
                expected: "real".into(),
                found: "real joint".into(),
            }),
        }
    }

    fn real_solver_mut(&mut self, variable: usize) -> FGResult<&mut GibbsReal> {
        let size = self.variables.len();
        match self.variables.get_mut(variable) {
            Some(GibbsVariable::Real(v)) => Ok(v),
            Some(GibbsVariable::RealJoint(_)) => Err(FGError::UnsupportedVariable {
                variable,
                expected: "real".into(),
                found: "real joint".into(),
            }),
            None => Err(FGError::OutOfRangeVariable(size, variable)),
        }
    }

    pub fn update_factor_edge(&mut self, factor: usize, port: usize) -> FGResult<()> {
        let graph = self.graph;
        let edges = graph.factor(factor)?.edges();
        let edge = *edges.get(port).ok_or(FGError::OutOfRangePort {
            port,
            degree: edges.len(),
        })?;
        let message = self
            .gibbs_factor(factor)?
            .update_edge(port, &Samples(&self.variables))?;
        self.edges.replace(edge, GibbsEdge { factor_to_var: message });
        Ok(())
    }

    pub fn update_factor(&mut self, factor: usize) -> FGResult<()> {
        for port in 0..self.graph.factor(factor)?.sibling_count() {
            self.update_factor_edge(factor, port)?;
        }
        Ok(())
    }

    /// Refreshes messages from adjoint factors and draws a new sample of a
    /// variable. Fixed variables keep their value, scalar variables without
    /// a conjugate sampler take a random walk step
    pub fn sample_variable<R: RandomSource + ?Sized>(&mut self, variable: usize, rng: &mut R) -> FGResult<()> {
        let graph = self.graph;
        let edges = graph.variable(variable)?.edges();
        for edge in edges {
            let edge = graph.edge(*edge)?;
            self.update_factor_edge(edge.factor, edge.factor_port)?;
        }
        if matches!(&self.variables[variable], GibbsVariable::Real(v) if v.needs_random_walk()) {
            return self.random_walk_variable(variable, rng);
        }
        let messages = edges
            .iter()
            .map(|edge| self.edges.get(*edge).and_then(|state| state.factor_to_var.as_ref()))
            .collect::<Vec<_>>();
        match &mut self.variables[variable] {
            GibbsVariable::Real(v) => v.sample(&messages, rng),
            GibbsVariable::RealJoint(v) => v.sample(&messages, rng),
        }
    }

    /// A Metropolis-Hastings step scored by log-densities of adjoint factors.
    /// Fails if some adjoint factor has no known density
    fn random_walk_variable<R: RandomSource + ?Sized>(&mut self, variable: usize, rng: &mut R) -> FGResult<()> {
        let graph = self.graph;
        let mut factors = graph
            .variable(variable)?
            .edges()
            .iter()
            .map(|edge| graph.edge(*edge).map(|edge| edge.factor))
            .collect::<FGResult<Vec<_>>>()?;
        factors.sort_unstable();
        factors.dedup();
        if let Some(factor) = factors
            .iter()
            .find(|factor| matches!(self.factors[**factor], GibbsFactor::Generic { .. }))
        {
            debug!(variable, factor, "adjoint factor has no log-density");
            return Err(FGError::NoConjugateSampler(variable));
        }
        let mut solver = self.real_solver(variable)?.clone();
        let (variables, gibbs_factors) = (&self.variables, &self.factors);
        solver.random_walk_step(
            |value| {
                let proposal = Proposal {
                    samples: Samples(variables),
                    variable,
                    value,
                };
                factors.iter().try_fold(0f64, |acc, factor| {
                    Ok(acc + gibbs_factors[*factor].log_density(&proposal)?.unwrap_or(0f64))
                })
            },
            rng,
        )?;
        self.variables[variable] = GibbsVariable::Real(solver);
        Ok(())
    }

    /// Samples every variable once in index order
    pub fn sweep<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> FGResult<()> {
        for variable in 0..self.variables.len() {
            self.sample_variable(variable, rng)?;
        }
        trace!("sweep finished");
        Ok(())
    }

    #[inline]
    pub fn current_sample(&self, variable: usize) -> FGResult<f64> {
        Ok(self.real_solver(variable)?.current_sample())
    }

    pub fn current_joint_sample(&self, variable: usize) -> FGResult<&[f64]> {
        match self.variable_solver(variable)? {
            GibbsVariable::RealJoint(v) => Ok(v.current_sample()),
            GibbsVariable::Real(_) => Err(FGError::UnsupportedVariable {
                variable,
                expected: "real joint".into(),
                found: "real".into(),
            }),
        }
    }

    #[inline]
    pub fn sample_value(&self, variable: usize) -> FGResult<Value> {
        Ok(self.variable_solver(variable)?.value())
    }

    /// Overrides the current sample of a real variable
    pub fn set_current_sample(&mut self, variable: usize, sample: f64) -> FGResult<()> {
        self.real_solver_mut(variable)?.set_current_sample(sample);
        Ok(())
    }

    /// Sets the proposal of random walk steps of a real variable
    pub fn set_random_walk(&mut self, variable: usize, walk: RandomWalk) -> FGResult<()> {
        self.real_solver_mut(variable)?.set_random_walk(walk);
        Ok(())
    }

    /// The guess of a real variable if set, otherwise its known value or its
    /// current sample
    #[inline]
    pub fn guess(&self, variable: usize) -> FGResult<f64> {
        Ok(self.real_solver(variable)?.guess_or_value())
    }

    #[inline]
    pub fn guess_was_set(&self, variable: usize) -> FGResult<bool> {
        Ok(self.real_solver(variable)?.guess().was_set())
    }

    /// Sets a guess of a real variable, `None` clears it
    pub fn set_guess(&mut self, variable: usize, guess: Option<&Value>) -> FGResult<()> {
        let solver = self.real_solver_mut(variable)?;
        let domain = *solver.domain();
        solver.guess.set(guess, &domain, variable)
    }

    #[inline]
    pub fn factor_to_var_message(&self, edge: usize) -> FGResult<Option<&ParameterMessage>> {
        self.edges
            .get(edge)
            .map(|state| state.factor_to_var.as_ref())
            .ok_or(FGError::OutOfRangeEdge(self.edges.len(), edge))
    }

    pub fn set_factor_to_var_message(&mut self, edge: usize, message: Option<ParameterMessage>) -> FGResult<()> {
        self.factor_to_var_message(edge)?;
        self.edges.replace(edge, GibbsEdge { factor_to_var: message });
        Ok(())
    }

    pub fn reset_edge_messages(&mut self, edge: usize) -> FGResult<()> {
        self.factor_to_var_message(edge)?;
        self.edges.reset(edge);
        Ok(())
    }

    /// Moves the edge state at `src_port` of `src_variable` to `dst_port` of
    /// `dst_variable`, the source edge is left reset
    pub fn move_messages(&mut self, dst_variable: usize, dst_port: usize, src_variable: usize, src_port: usize) -> FGResult<()> {
        let graph = self.graph;
        let port_edge = |variable: usize, port: usize| -> FGResult<usize> {
            let edges = graph.variable(variable)?.edges();
            edges.get(port).copied().ok_or(FGError::OutOfRangePort {
                port,
                degree: edges.len(),
            })
        };
        let dst = port_edge(dst_variable, dst_port)?;
        let src = port_edge(src_variable, src_port)?;
        self.edges.move_state(dst, src);
        Ok(())
    }
}
