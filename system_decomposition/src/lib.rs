//! Block-lower-triangular decomposition of square systems of equations.
//!
//! Given which variables appear in which equations, and a perfect matching of equations to
//! variables, [`block_triangularize`](block_triangularization::block_triangularize) partitions
//! the system into the smallest possible diagonal blocks and orders them so each block only
//! uses variables solved by earlier blocks. A [`SolutionPlan`](solution_plan::SolutionPlan)
//! turns the result into a sequence of sub-problems for a block-by-block solver.

pub mod block_triangularization;
pub mod error;
pub mod incidence;
pub mod matching;
pub mod solution_plan;

pub mod prelude {
    pub use crate::{
        block_triangularization::{
            BlockTriangularization, BlockTriangularizer, TieBreak, TriangularizeConfig,
            block_triangularize,
        },
        error::*,
        incidence::IncidenceStructure,
        matching::{HopcroftKarp, Matching, MatchingProvider},
        solution_plan::*,
    };

    pub use nalgebra;
}
