use nalgebra::{DMatrix, Scalar};

use super::{block_order::BlockOrder, components::SccPartition};
use crate::{error::InternalFault, incidence::IncidenceStructure, matching::Matching};

/// A partition of a square system into diagonal blocks, ordered so that permuting rows and
/// columns block by block yields a block-lower-triangular matrix. Block 0 is solved first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTriangularization {
    row_block_map: Vec<usize>,
    col_block_map: Vec<usize>,
    block_rows: Vec<Vec<usize>>,
    /// Columns of each block, in the order of the rows they are matched to.
    block_cols: Vec<Vec<usize>>,
    dependencies: Vec<Vec<usize>>,
    dependents: Vec<Vec<usize>>,
    matching: Matching,
}

impl BlockTriangularization {
    pub(crate) fn assemble(
        partition: &SccPartition,
        order: &BlockOrder,
        matching: Matching,
    ) -> Result<Self, InternalFault> {
        let n = partition.component_of.len();
        let n_blocks = order.scc_order.len();

        let row_block_map: Vec<usize> = partition
            .component_of
            .iter()
            .map(|&c| order.scc_block_map[c])
            .collect();

        let col_block_map = (0..n)
            .map(|col| {
                matching
                    .row_of(col)
                    .map(|row| row_block_map[row])
                    .ok_or(InternalFault::UnmappedColumn { col })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut block_rows = vec![Vec::new(); n_blocks];
        for (row, &block) in row_block_map.iter().enumerate() {
            block_rows[block].push(row);
        }
        let block_cols = block_rows
            .iter()
            .map(|rows| rows.iter().filter_map(|&r| matching.col_of(r)).collect())
            .collect();

        let mut dependents = vec![Vec::new(); n_blocks];
        let mut dependencies = vec![Vec::new(); n_blocks];
        for (c, succ) in order.condensed.iter().enumerate() {
            let from = order.scc_block_map[c];
            for &s in succ {
                let to = order.scc_block_map[s];
                dependents[from].push(to);
                dependencies[to].push(from);
            }
        }
        for list in dependents.iter_mut().chain(dependencies.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }

        Ok(Self {
            row_block_map,
            col_block_map,
            block_rows,
            block_cols,
            dependencies,
            dependents,
            matching,
        })
    }

    /// Re-checks every output invariant against the structure that was decomposed.
    pub fn verify(&self, incidence: &IncidenceStructure) -> Result<(), InternalFault> {
        let n_blocks = self.n_blocks();

        for (row, &block) in self.row_block_map.iter().enumerate() {
            if block >= n_blocks {
                return Err(InternalFault::RowBlockMapOutOfRange {
                    row,
                    block,
                    n_blocks,
                });
            }
        }
        if let Some(block) = self.block_rows.iter().position(Vec::is_empty) {
            return Err(InternalFault::EmptyBlock { block });
        }

        let mut owners = vec![0usize; self.col_block_map.len()];
        for row in 0..self.row_block_map.len() {
            if let Some(col) = self.matching.col_of(row) {
                owners[col] += 1;
            }
        }
        for (col, &count) in owners.iter().enumerate() {
            match count {
                0 => return Err(InternalFault::UnmappedColumn { col }),
                1 => {}
                _ => return Err(InternalFault::ColumnMappedTwice { col }),
            }
        }

        for (block, deps) in self.dependencies.iter().enumerate() {
            if let Some(&dependency) = deps.iter().find(|&&d| d >= block) {
                return Err(InternalFault::ForwardDependency { block, dependency });
            }
        }

        for (row, col) in incidence.entries() {
            let (row_block, col_block) = (self.row_block_map[row], self.col_block_map[col]);
            if col_block > row_block {
                return Err(InternalFault::LowerTriangularityViolated {
                    row,
                    col,
                    row_block,
                    col_block,
                });
            }
        }
        Ok(())
    }

    pub fn n_blocks(&self) -> usize {
        self.block_rows.len()
    }

    /// `row_block_map()[row]` is the block that solves equation `row`.
    pub fn row_block_map(&self) -> &[usize] {
        &self.row_block_map
    }

    /// `col_block_map()[col]` is the block that solves for variable `col`.
    pub fn col_block_map(&self) -> &[usize] {
        &self.col_block_map
    }

    pub fn block_rows(&self, block: usize) -> &[usize] {
        &self.block_rows[block]
    }

    pub fn block_cols(&self, block: usize) -> &[usize] {
        &self.block_cols[block]
    }

    pub fn block_sizes(&self) -> Vec<usize> {
        self.block_rows.iter().map(Vec::len).collect()
    }

    /// Blocks that must be solved before `block`. Always lower indices.
    pub fn block_dependencies(&self, block: usize) -> &[usize] {
        &self.dependencies[block]
    }

    /// Blocks that use a variable solved by `block`.
    pub fn block_dependents(&self, block: usize) -> &[usize] {
        &self.dependents[block]
    }

    /// The perfect matching the decomposition was computed from.
    pub fn matching(&self) -> &Matching {
        &self.matching
    }

    /// Original row index at each position of the block-lower-triangular permutation.
    pub fn row_order(&self) -> Vec<usize> {
        self.block_rows.iter().flatten().copied().collect()
    }

    /// Original column index at each position of the block-lower-triangular permutation.
    /// Column `i` is matched to row `i` of [`row_order`](Self::row_order), putting the matching on
    /// the diagonal.
    pub fn col_order(&self) -> Vec<usize> {
        self.block_cols.iter().flatten().copied().collect()
    }

    /// Applies [`row_order`](Self::row_order) and [`col_order`](Self::col_order) to a dense matrix
    /// of the decomposed system. Returns `None` if the shape does not match.
    pub fn permute_dense<T: Scalar>(&self, mat: &DMatrix<T>) -> Option<DMatrix<T>> {
        let n = self.row_block_map.len();
        if mat.shape() != (n, n) {
            return None;
        }
        let (rows, cols) = (self.row_order(), self.col_order());
        Some(DMatrix::from_fn(n, n, |i, j| mat[(rows[i], cols[j])].clone()))
    }

    pub fn print_block_structure(&self) {
        println!("Lower block triangular structure:");
        println!("   matching_size = {}", self.matching.cardinality());
        println!("   block_sizes   = {:?}", self.block_sizes());
        println!("   row_order = {:?}", self.row_order());
        println!("   col_order = {:?}", self.col_order());
    }
}
