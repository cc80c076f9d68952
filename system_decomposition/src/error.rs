use thiserror::Error;

/// Errors raised while building an [`IncidenceStructure`](crate::incidence::IncidenceStructure).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IncidenceError {
    #[error("Entry ({row}, {col}) is out of bounds for a {n_rows}x{n_cols} incidence structure")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        n_rows: usize,
        n_cols: usize,
    },

    #[error("Expected {expected} row lists, got {got}")]
    RowCountMismatch { expected: usize, got: usize },

    #[error("Permutation of length {got} does not relabel {expected} indices")]
    InvalidPermutation { expected: usize, got: usize },
}

/// A supplied matching that is not a valid (partial) bijection for the structure it is used with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchingError {
    #[error("Matched row {row} is out of range; structure has {n_rows} rows")]
    RowOutOfRange { row: usize, n_rows: usize },

    #[error("Matched column {col} is out of range; structure has {n_cols} columns")]
    ColOutOfRange { col: usize, n_cols: usize },

    #[error("Row {row} is matched more than once")]
    RowMatchedTwice { row: usize },

    #[error("Column {col} is matched to both row {first_row} and row {second_row}")]
    ColMatchedTwice {
        col: usize,
        first_row: usize,
        second_row: usize,
    },

    #[error("Matched pair ({row}, {col}) is not a nonzero of the incidence structure")]
    PairNotInStructure { row: usize, col: usize },

    #[error("Matching is sized {m_rows}x{m_cols} but the structure is {n_rows}x{n_cols}")]
    DimensionMismatch {
        m_rows: usize,
        m_cols: usize,
        n_rows: usize,
        n_cols: usize,
    },
}

/// An output invariant of the decomposition did not hold. Always a bug in the algorithm,
/// never a consequence of user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InternalFault {
    #[error("Column {col} has no owning row")]
    UnmappedColumn { col: usize },

    #[error("Column {col} is owned by more than one row")]
    ColumnMappedTwice { col: usize },

    #[error("Row {row} is mapped to block {block}, but only {n_blocks} blocks exist")]
    RowBlockMapOutOfRange {
        row: usize,
        block: usize,
        n_blocks: usize,
    },

    #[error(
        "Condensed block graph has a cycle; only {ordered} of {n_blocks} blocks could be ordered"
    )]
    CyclicBlockGraph { ordered: usize, n_blocks: usize },

    #[error("Block {block} contains no rows")]
    EmptyBlock { block: usize },

    #[error("Block {block} depends on block {dependency}, which is not solved earlier")]
    ForwardDependency { block: usize, dependency: usize },

    #[error(
        "Entry ({row}, {col}) lies above the block diagonal: column block {col_block} > row block {row_block}"
    )]
    LowerTriangularityViolated {
        row: usize,
        col: usize,
        row_block: usize,
        col_block: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompositionError {
    #[error("Number of equations!=unknowns; {n_rows} equations, {n_cols} unknowns")]
    NotSquare { n_rows: usize, n_cols: usize },

    #[error(
        "No perfect matching of rows and columns; cardinality of maximum matching is {cardinality} of {n}"
    )]
    MatchingIncomplete { cardinality: usize, n: usize },

    #[error("Invalid matching: {0}")]
    InvalidMatching(#[from] MatchingError),

    #[error("Internal consistency fault: {0}")]
    InternalConsistency(#[from] InternalFault),
}

/// A hand-built [`SolutionPlan`](crate::solution_plan::SolutionPlan) whose blocks do not form a
/// dependency DAG.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanStructureError {
    #[error("Block index {block_idx} appears more than once in the plan")]
    DuplicateBlock { block_idx: usize },

    #[error("Block {block_idx} depends on block {dependency}, which is not in the plan")]
    UnknownDependency { block_idx: usize, dependency: usize },

    #[error(
        "Block dependencies have a cycle; only {leveled} of {n_blocks} blocks could be leveled"
    )]
    CyclicDependencies { leveled: usize, n_blocks: usize },
}

/// Failure while executing a solution plan block by block.
#[derive(Error, Debug)]
pub enum SolutionPlanError<E>
where
    E: std::error::Error + 'static,
{
    #[error("Block {block_idx} failed to solve: {source}")]
    BlockFailed {
        block_idx: usize,
        #[source]
        source: E,
    },
}
