use crate::{
    error::DecompositionError,
    incidence::IncidenceStructure,
    matching::{HopcroftKarp, Matching, MatchingProvider},
};

mod assemble;
mod block_order;
mod components;
mod dependency_graph;

#[cfg(test)]
mod tests;

pub use assemble::BlockTriangularization;
pub use block_order::TieBreak;

pub(crate) use block_order::order_blocks;
pub(crate) use components::strongly_connected_components;
pub(crate) use dependency_graph::DependencyGraph;

/// Options for [`BlockTriangularizer`].
#[derive(Clone, Debug)]
pub struct TriangularizeConfig {
    /// Reject a supplied matching that pairs a row with a column it does not reference.
    pub check_matching_support: bool,

    /// How to order blocks that do not depend on each other.
    pub tie_break: TieBreak,
}

impl Default for TriangularizeConfig {
    fn default() -> Self {
        Self {
            check_matching_support: true,
            tie_break: TieBreak::SmallestRow,
        }
    }
}

/// Computes block-lower-triangular decompositions of square incidence structures.
///
/// Type parameters:
/// - `P`: Provider used when no perfect matching is supplied (default `HopcroftKarp`)
#[derive(Clone, Debug, Default)]
pub struct BlockTriangularizer<P = HopcroftKarp>
where
    P: MatchingProvider,
{
    config: TriangularizeConfig,
    matching_provider: P,
}

impl BlockTriangularizer<HopcroftKarp> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P> BlockTriangularizer<P>
where
    P: MatchingProvider,
{
    pub fn with_config(mut self, config: TriangularizeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_matching_provider<Q: MatchingProvider>(
        self,
        provider: Q,
    ) -> BlockTriangularizer<Q> {
        BlockTriangularizer {
            config: self.config,
            matching_provider: provider,
        }
    }

    pub fn config(&self) -> &TriangularizeConfig {
        &self.config
    }

    /// Partitions `incidence` into ordered diagonal blocks.
    ///
    /// If `matching` is `None`, one is requested from the matching provider. Fails without a
    /// partial result if the structure is not square, if the matching is malformed or not
    /// perfect, or if the assembled result breaks an output invariant.
    pub fn triangularize(
        &self,
        incidence: &IncidenceStructure,
        matching: Option<&Matching>,
    ) -> Result<BlockTriangularization, DecompositionError> {
        let (n_rows, n_cols) = incidence.shape();
        if n_rows != n_cols {
            return Err(DecompositionError::NotSquare { n_rows, n_cols });
        }

        let matching = match matching {
            Some(m) => {
                m.validate_against(incidence, self.config.check_matching_support)?;
                m.clone()
            }
            None => {
                let m = self.matching_provider.maximum_matching(incidence);
                // provider output gets the same checks as a supplied matching
                m.validate_against(incidence, true)?;
                m
            }
        };
        let cardinality = matching.cardinality();
        if cardinality != n_rows {
            return Err(DecompositionError::MatchingIncomplete {
                cardinality,
                n: n_rows,
            });
        }

        let graph = DependencyGraph::build(incidence, &matching);
        let partition = strongly_connected_components(&graph);
        let order = order_blocks(&graph, &partition, self.config.tie_break)?;
        log::debug!(
            "block triangularization: {} rows, {} dependency edges, {} blocks",
            n_rows,
            graph.n_edges(),
            partition.n_components()
        );

        let result = BlockTriangularization::assemble(&partition, &order, matching)?;
        result.verify(incidence)?;
        log::debug!("block sizes: {:?}", result.block_sizes());
        Ok(result)
    }
}

/// Block-triangularizes `incidence` with the default configuration, computing a maximum
/// matching with [`HopcroftKarp`] when `matching` is `None`.
pub fn block_triangularize(
    incidence: &IncidenceStructure,
    matching: Option<&Matching>,
) -> Result<BlockTriangularization, DecompositionError> {
    BlockTriangularizer::new().triangularize(incidence, matching)
}
