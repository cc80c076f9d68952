use std::{collections::HashMap, fmt};

use crate::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A solution plan for an equation system: its diagonal blocks in solve order.
pub struct SolutionPlan {
    pub blocks: Vec<SolutionBlock>,
}

/// Something that can solve one block of a system, given that every block it depends on has
/// already been solved.
pub trait BlockSolver {
    type Error: std::error::Error + 'static;

    fn solve_block(&mut self, block: &SolutionBlock) -> Result<(), Self::Error>;
}

impl SolutionPlan {
    /// Creates a new SolutionPlan with the given blocks.
    pub fn new(blocks: Vec<SolutionBlock>) -> Self {
        Self { blocks }
    }

    pub fn from_triangularization(btf: &BlockTriangularization) -> Self {
        let blocks = (0..btf.n_blocks())
            .map(|b| SolutionBlock {
                block_idx: b,
                equation_idxs: btf.block_rows(b).to_vec(),
                unknown_idxs: btf.block_cols(b).to_vec(),
                depends_on: btf.block_dependencies(b).to_vec(),
            })
            .collect();
        Self { blocks }
    }

    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Groups blocks into levels: a block's level is one more than the highest level among its
    /// dependencies. Blocks within a level do not depend on each other. Levels hold `block_idx`
    /// values, ascending, and do not depend on the order of `blocks`.
    pub fn levels(&self) -> Result<Vec<Vec<usize>>, PlanStructureError> {
        let mut position = HashMap::with_capacity(self.blocks.len());
        for (pos, block) in self.blocks.iter().enumerate() {
            if position.insert(block.block_idx, pos).is_some() {
                return Err(PlanStructureError::DuplicateBlock {
                    block_idx: block.block_idx,
                });
            }
        }

        let mut in_degree = vec![0usize; self.blocks.len()];
        let mut dependents = vec![Vec::new(); self.blocks.len()];
        for (pos, block) in self.blocks.iter().enumerate() {
            let mut deps = block.depends_on.clone();
            deps.sort_unstable();
            deps.dedup();
            for dependency in deps {
                let &dep_pos = position.get(&dependency).ok_or(
                    PlanStructureError::UnknownDependency {
                        block_idx: block.block_idx,
                        dependency,
                    },
                )?;
                dependents[dep_pos].push(pos);
                in_degree[pos] += 1;
            }
        }

        let mut frontier: Vec<usize> = (0..self.blocks.len())
            .filter(|&pos| in_degree[pos] == 0)
            .collect();
        let mut levels = Vec::new();
        let mut leveled = 0;
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for &pos in &frontier {
                for &d in &dependents[pos] {
                    in_degree[d] -= 1;
                    if in_degree[d] == 0 {
                        next.push(d);
                    }
                }
            }
            leveled += frontier.len();
            let mut level: Vec<usize> =
                frontier.iter().map(|&p| self.blocks[p].block_idx).collect();
            level.sort_unstable();
            levels.push(level);
            frontier = next;
        }

        if leveled != self.blocks.len() {
            return Err(PlanStructureError::CyclicDependencies {
                leveled,
                n_blocks: self.blocks.len(),
            });
        }
        Ok(levels)
    }

    /// Solves the blocks one after another, stopping at the first failure.
    pub fn execute<S: BlockSolver>(
        &self,
        solver: &mut S,
    ) -> Result<(), SolutionPlanError<S::Error>> {
        for block in &self.blocks {
            log::info!(
                "Solving block {} ({} equations)",
                block.block_idx,
                block.equation_idxs.len()
            );
            solver
                .solve_block(block)
                .map_err(|source| SolutionPlanError::BlockFailed {
                    block_idx: block.block_idx,
                    source,
                })?;
        }
        Ok(())
    }

    pub fn print_solution_plan(&self, equation_names: &[&str], unknown_names: &[&str]) {
        for block in self.blocks.iter() {
            println!("Solution Block {}:", block.block_idx);
            self.print_solution_block(block, equation_names, unknown_names);
        }
    }

    pub fn print_solution_block(
        &self,
        block: &SolutionBlock,
        equation_names: &[&str],
        unknown_names: &[&str],
    ) {
        println!("  equations:");
        for e in &block.equation_idxs {
            let fn_name = equation_names.get(*e).copied().unwrap_or("?");
            println!("    {e}: {}", fn_name);
        }
        println!("  unknowns:");

        for u in &block.unknown_idxs {
            let unk_name = unknown_names.get(*u).copied().unwrap_or("?");
            println!("    {u}: {}", unk_name);
        }
    }
}

impl fmt::Display for SolutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            writeln!(
                f,
                "block {}: equations {:?}, unknowns {:?}, after {:?}",
                block.block_idx, block.equation_idxs, block.unknown_idxs, block.depends_on
            )?;
        }
        Ok(())
    }
}

/// A block in the solution plan, representing a subset of equations and unknowns. The indices
/// refer to the positions in the original, unpermuted system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionBlock {
    pub block_idx: usize,
    pub equation_idxs: Vec<usize>,
    pub unknown_idxs: Vec<usize>,
    /// Blocks that must be solved before this one.
    pub depends_on: Vec<usize>,
}

impl SolutionBlock {
    /// Creates a new SolutionBlock.
    pub fn new_fullprob(size: usize) -> Self {
        Self {
            block_idx: 0,
            equation_idxs: (0..size).collect(),
            unknown_idxs: (0..size).collect(),
            depends_on: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.equation_idxs.len()
    }
}

impl From<&BlockTriangularization> for SolutionPlan {
    fn from(btf: &BlockTriangularization) -> Self {
        Self::from_triangularization(btf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plan_for(rows: Vec<Vec<usize>>) -> SolutionPlan {
        let n = rows.len();
        let s = IncidenceStructure::from_rows(n, n, rows).unwrap();
        SolutionPlan::from(&block_triangularize(&s, None).unwrap())
    }

    #[derive(Debug, thiserror::Error)]
    #[error("diverged")]
    struct Diverged;

    /// Records the order blocks are visited in and checks each block's dependencies were
    /// visited first. Fails on a chosen block.
    struct Recorder {
        visited: Vec<usize>,
        fail_on: Option<usize>,
    }

    impl BlockSolver for Recorder {
        type Error = Diverged;

        fn solve_block(&mut self, block: &SolutionBlock) -> Result<(), Diverged> {
            assert!(block.depends_on.iter().all(|d| self.visited.contains(d)));
            if self.fail_on == Some(block.block_idx) {
                return Err(Diverged);
            }
            self.visited.push(block.block_idx);
            Ok(())
        }
    }

    #[test]
    fn plan_mirrors_blocks() {
        let plan = plan_for(vec![vec![0, 1], vec![0, 1], vec![1, 2, 3], vec![2, 3]]);
        assert_eq!(
            plan.blocks,
            vec![
                SolutionBlock {
                    block_idx: 0,
                    equation_idxs: vec![0, 1],
                    unknown_idxs: vec![0, 1],
                    depends_on: vec![],
                },
                SolutionBlock {
                    block_idx: 1,
                    equation_idxs: vec![2, 3],
                    unknown_idxs: vec![2, 3],
                    depends_on: vec![0],
                },
            ]
        );
    }

    #[test]
    fn levels_group_independent_blocks() {
        // rows 0 and 1 are independent, row 2 needs both, row 3 needs row 2
        let plan = plan_for(vec![vec![0], vec![1], vec![0, 1, 2], vec![2, 3]]);
        assert_eq!(plan.levels().unwrap(), vec![vec![0, 1], vec![2], vec![3]]);
    }

    fn block(block_idx: usize, depends_on: Vec<usize>) -> SolutionBlock {
        SolutionBlock {
            block_idx,
            equation_idxs: vec![block_idx],
            unknown_idxs: vec![block_idx],
            depends_on,
        }
    }

    #[test]
    fn levels_follow_dependencies_not_block_order() {
        // 0 needs 1 and 1 needs 2, listed in the "wrong" order
        let plan = SolutionPlan::new(vec![
            block(0, vec![1]),
            block(1, vec![2]),
            block(2, vec![]),
        ]);
        assert_eq!(plan.levels().unwrap(), vec![vec![2], vec![1], vec![0]]);
    }

    #[test]
    fn levels_accept_sparse_block_ids() {
        let plan = SolutionPlan::new(vec![
            block(7, vec![]),
            block(42, vec![7]),
            block(3, vec![]),
        ]);
        assert_eq!(plan.levels().unwrap(), vec![vec![3, 7], vec![42]]);
    }

    #[test]
    fn levels_reject_unknown_dependency() {
        let plan = SolutionPlan::new(vec![block(0, vec![]), block(1, vec![5])]);
        assert_eq!(
            plan.levels(),
            Err(PlanStructureError::UnknownDependency {
                block_idx: 1,
                dependency: 5
            })
        );
    }

    #[test]
    fn levels_reject_duplicate_block() {
        let plan = SolutionPlan::new(vec![block(0, vec![]), block(0, vec![])]);
        assert_eq!(
            plan.levels(),
            Err(PlanStructureError::DuplicateBlock { block_idx: 0 })
        );
    }

    #[test]
    fn levels_reject_cyclic_dependencies() {
        let plan = SolutionPlan::new(vec![
            block(0, vec![]),
            block(1, vec![2]),
            block(2, vec![1]),
        ]);
        assert_eq!(
            plan.levels(),
            Err(PlanStructureError::CyclicDependencies {
                leveled: 1,
                n_blocks: 3
            })
        );
    }

    #[test]
    fn empty_plan_has_no_levels() {
        assert_eq!(SolutionPlan::new(vec![]).levels().unwrap(), Vec::<Vec<usize>>::new());
    }

    #[test]
    fn execute_visits_in_dependency_order() {
        let plan = plan_for(vec![vec![0, 3], vec![1], vec![1, 2], vec![3], vec![2, 4]]);
        let mut solver = Recorder {
            visited: Vec::new(),
            fail_on: None,
        };
        plan.execute(&mut solver).unwrap();
        assert_eq!(solver.visited, (0..plan.n_blocks()).collect::<Vec<_>>());
    }

    #[test]
    fn execute_stops_at_failing_block() {
        let plan = plan_for(vec![vec![0], vec![0, 1], vec![1, 2]]);
        let mut solver = Recorder {
            visited: Vec::new(),
            fail_on: Some(1),
        };
        let err = plan.execute(&mut solver).unwrap_err();
        assert!(matches!(err, SolutionPlanError::BlockFailed { block_idx: 1, .. }));
        assert_eq!(solver.visited, vec![0]);
    }

    #[test]
    fn display_lists_blocks() {
        let plan = plan_for(vec![vec![0], vec![0, 1]]);
        assert_eq!(
            plan.to_string(),
            "block 0: equations [0], unknowns [0], after []\n\
             block 1: equations [1], unknowns [1], after [0]\n"
        );
    }

    #[test]
    fn full_problem_block() {
        let block = SolutionBlock::new_fullprob(3);
        assert_eq!(block.size(), 3);
        assert_eq!(block.unknown_idxs, vec![0, 1, 2]);
    }
}
