use crate::core::{Factor, FactorFunction, FactorGraph, FactorTable, FGError, FGResult};
use crate::messages::DiscreteMessage;

/// A sum-product solver of a factor with a discrete joint potential table
#[derive(Debug, Clone)]
pub struct TableFactor {
    index: usize,
    table: FactorTable,
}

impl TableFactor {
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn table(&self) -> &FactorTable {
        &self.table
    }

    /// Energy of a joint assignment relative to the smallest energy of the
    /// table, `+inf` for an infeasible assignment
    ///
    /// # Arguments
    ///
    /// * `indices` - Domain indices of adjoint variables ordered by port
    #[inline]
    pub fn score(&self, indices: &[usize]) -> f64 {
        match self.table.energy_at(indices) {
            Some(energy) => energy - self.table.min_potential(),
            None => f64::INFINITY,
        }
    }

    /// Feasible joint indices of adjoint variables
    #[inline]
    pub fn possible_belief_indices(&self) -> &[Vec<usize>] {
        self.table.indices()
    }
}

impl Factor for TableFactor {
    type Message = DiscreteMessage;

    fn new(graph: &FactorGraph, index: usize) -> FGResult<Self> {
        if !graph.is_discrete_factor(index)? {
            return Err(FGError::NotDiscreteFactor(index));
        }
        let node = graph.factor(index)?;
        let table = match node.function() {
            FactorFunction::Table(table) => table.clone(),
            other => {
                return Err(FGError::UnsupportedFactor {
                    factor: index,
                    reason: format!("{} factor function has no table", other.name()),
                })
            }
        };
        if node.has_constants() {
            return Err(FGError::UnsupportedFactor {
                factor: index,
                reason: "constant arguments of a table factor are not supported".into(),
            });
        }
        for (position, (variable, size)) in node.siblings().iter().zip(table.dimensions()).enumerate() {
            let domain_size = graph
                .variable(*variable)?
                .domain()
                .as_discrete()
                .map_or(0, |d| d.size());
            if domain_size != *size {
                return Err(FGError::DimensionMismatch {
                    context: format!("table dimension {position} of factor {index}"),
                    expected: domain_size,
                    found: *size,
                });
            }
        }
        Ok(TableFactor { index, table })
    }

    #[inline]
    fn initialize(&mut self, _: &FactorGraph) -> FGResult<()> {
        Ok(())
    }

    fn update_edge(&self, port: usize, incoming: &[&DiscreteMessage], outgoing: &mut DiscreteMessage) -> FGResult<()> {
        let dimensions = self.table.dimensions();
        if incoming.len() != dimensions.len() {
            return Err(FGError::DimensionMismatch {
                context: format!("incoming messages of factor {}", self.index),
                expected: dimensions.len(),
                found: incoming.len(),
            });
        }
        let size = *dimensions.get(port).ok_or(FGError::OutOfRangePort {
            port,
            degree: dimensions.len(),
        })?;
        for (message, expected) in incoming.iter().zip(dimensions) {
            if message.size() != *expected {
                return Err(FGError::DimensionMismatch {
                    context: format!("incoming message of factor {}", self.index),
                    expected: *expected,
                    found: message.size(),
                });
            }
        }
        *outgoing = DiscreteMessage::from_weights(vec![0f64; size]);
        let weights = outgoing.weights_mut();
        let min_potential = self.table.min_potential();
        for (tuple, energy) in self.table.indices().iter().zip(self.table.energies()) {
            let product = tuple
                .iter()
                .zip(incoming)
                .enumerate()
                .filter(|(j, _)| *j != port)
                .fold((-(energy - min_potential)).exp(), |acc, (_, (i, m))| acc * m.weights()[*i]);
            weights[tuple[port]] += product;
        }
        outgoing.normalize();
        Ok(())
    }
}
