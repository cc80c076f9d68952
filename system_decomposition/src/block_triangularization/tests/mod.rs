
use super::BlockTriangularization;
use crate::incidence::IncidenceStructure;

pub(super) fn structure(n: usize, rows: Vec<Vec<usize>>) -> IncidenceStructure {
    IncidenceStructure::from_rows(n, n, rows).unwrap()
}

pub(super) fn dense(n: usize) -> IncidenceStructure {
    structure(n, (0..n).map(|_| (0..n).collect()).collect())
}

/// The rows of each block, as the sequence of blocks in solve order.
pub(super) fn blocks_as_rows(result: &BlockTriangularization) -> Vec<Vec<usize>> {
    (0..result.n_blocks())
        .map(|b| result.block_rows(b).to_vec())
        .collect()
}
