use std::{cmp::Reverse, collections::BinaryHeap};

use super::{components::SccPartition, dependency_graph::DependencyGraph};
use crate::error::InternalFault;

/// Rule for ordering blocks that do not depend on each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// Among ready blocks, solve first the one containing the smallest original row index.
    #[default]
    SmallestRow,
    /// Among ready blocks, solve first the one containing the largest original row index.
    LargestRow,
}

/// Solve order of the strongly connected components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BlockOrder {
    /// Component ids in solve order.
    pub(crate) scc_order: Vec<usize>,
    /// `scc_block_map[component]` is the block index of that component.
    pub(crate) scc_block_map: Vec<usize>,
    /// Condensed DAG over component ids, sorted and deduplicated. An edge `x -> y` means
    /// component `x` must be solved before component `y`.
    pub(crate) condensed: Vec<Vec<usize>>,
}

/// Condenses `graph` by `partition` and sorts the result topologically (Kahn's algorithm).
///
/// Edges are reversed while condensing: an edge `u -> v` in `graph` says `u` needs `v`'s
/// variable, so `v`'s component must come first.
pub(crate) fn order_blocks(
    graph: &DependencyGraph,
    partition: &SccPartition,
    tie_break: TieBreak,
) -> Result<BlockOrder, InternalFault> {
    let n_blocks = partition.n_components();
    let mut condensed = vec![Vec::new(); n_blocks];
    for (u, v) in graph.edges() {
        let (cu, cv) = (partition.component_of[u], partition.component_of[v]);
        if cu != cv {
            condensed[cv].push(cu);
        }
    }

    let mut in_degree = vec![0usize; n_blocks];
    for succ in condensed.iter_mut() {
        succ.sort_unstable();
        succ.dedup();
        for &c in succ.iter() {
            in_degree[c] += 1;
        }
    }

    let priority = |c: usize| -> usize {
        let members = &partition.components[c];
        match tie_break {
            TieBreak::SmallestRow => members.first().copied().unwrap_or(usize::MAX),
            TieBreak::LargestRow => usize::MAX - members.last().copied().unwrap_or(0),
        }
    };

    let mut ready: BinaryHeap<Reverse<(usize, usize)>> = (0..n_blocks)
        .filter(|&c| in_degree[c] == 0)
        .map(|c| Reverse((priority(c), c)))
        .collect();

    let mut scc_order = Vec::with_capacity(n_blocks);
    while let Some(Reverse((_, c))) = ready.pop() {
        scc_order.push(c);
        for &next in &condensed[c] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse((priority(next), next)));
            }
        }
    }

    if scc_order.len() != n_blocks {
        return Err(InternalFault::CyclicBlockGraph {
            ordered: scc_order.len(),
            n_blocks,
        });
    }

    let mut scc_block_map = vec![0; n_blocks];
    for (block, &c) in scc_order.iter().enumerate() {
        scc_block_map[c] = block;
    }

    Ok(BlockOrder {
        scc_order,
        scc_block_map,
        condensed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_triangularization::components::strongly_connected_components;
    use pretty_assertions::assert_eq;

    #[test]
    fn owner_of_shared_column_is_solved_first() {
        // row 2 needs row 1 which needs row 0
        let g = DependencyGraph::from_successors(vec![vec![], vec![0], vec![1]]);
        let p = strongly_connected_components(&g);
        let order = order_blocks(&g, &p, TieBreak::SmallestRow).unwrap();
        let blocks: Vec<usize> = (0..3)
            .map(|r| order.scc_block_map[p.component_of[r]])
            .collect();
        assert_eq!(blocks, vec![0, 1, 2]);
    }

    #[test]
    fn independent_blocks_follow_tie_break() {
        let g = DependencyGraph::from_successors(vec![vec![], vec![], vec![]]);
        let p = strongly_connected_components(&g);

        let smallest = order_blocks(&g, &p, TieBreak::SmallestRow).unwrap();
        let rows: Vec<usize> = smallest
            .scc_order
            .iter()
            .map(|&c| p.components[c][0])
            .collect();
        assert_eq!(rows, vec![0, 1, 2]);

        let largest = order_blocks(&g, &p, TieBreak::LargestRow).unwrap();
        let rows: Vec<usize> = largest
            .scc_order
            .iter()
            .map(|&c| p.components[c][0])
            .collect();
        assert_eq!(rows, vec![2, 1, 0]);
    }

    #[test]
    fn cycle_in_condensation_is_a_fault() {
        // a partition that is not the true SCC partition can leave a cycle between components
        let g = DependencyGraph::from_successors(vec![vec![1], vec![0]]);
        let p = SccPartition {
            component_of: vec![0, 1],
            components: vec![vec![0], vec![1]],
        };
        assert_eq!(
            order_blocks(&g, &p, TieBreak::SmallestRow),
            Err(InternalFault::CyclicBlockGraph {
                ordered: 0,
                n_blocks: 2
            })
        );
    }
}
