use std::collections::VecDeque;

use crate::{
    incidence::IncidenceStructure,
    matching::{Matching, MatchingProvider},
};

/// Maximum bipartite matching in O(E·√V), rows on the left and columns on the right.
#[derive(Debug, Clone, Copy, Default)]
pub struct HopcroftKarp;

impl MatchingProvider for HopcroftKarp {
    fn maximum_matching(&self, incidence: &IncidenceStructure) -> Matching {
        let mut state = HkState::new(incidence);
        while state.layer() {
            state.next_edge.fill(0);
            for row in 0..incidence.n_rows() {
                if state.row_match[row].is_none() {
                    state.augment_from(row);
                }
            }
        }

        let mut matching = Matching::empty(incidence.n_rows(), incidence.n_cols());
        for (row, col) in state.row_match.iter().enumerate() {
            if let Some(col) = *col {
                matching.insert(row, col);
            }
        }
        log::debug!(
            "Hopcroft-Karp: matched {} of {} rows",
            matching.cardinality(),
            incidence.n_rows()
        );
        matching
    }
}

const UNREACHED: usize = usize::MAX;

struct HkState<'a> {
    incidence: &'a IncidenceStructure,
    row_match: Vec<Option<usize>>,
    col_match: Vec<Option<usize>>,
    /// BFS layer of each row in the current phase.
    dist: Vec<usize>,
    /// Per-row cursor into its column list, so each edge is tried once per phase.
    next_edge: Vec<usize>,
}

impl<'a> HkState<'a> {
    fn new(incidence: &'a IncidenceStructure) -> Self {
        Self {
            incidence,
            row_match: vec![None; incidence.n_rows()],
            col_match: vec![None; incidence.n_cols()],
            dist: vec![UNREACHED; incidence.n_rows()],
            next_edge: vec![0; incidence.n_rows()],
        }
    }

    /// Layers rows by alternating-path distance from the free rows. Returns whether some free
    /// column is reachable, i.e. whether an augmenting path exists.
    fn layer(&mut self) -> bool {
        let mut queue = VecDeque::new();
        for (row, m) in self.row_match.iter().enumerate() {
            if m.is_none() {
                self.dist[row] = 0;
                queue.push_back(row);
            } else {
                self.dist[row] = UNREACHED;
            }
        }

        let incidence = self.incidence;
        let mut found_free_col = false;
        while let Some(row) = queue.pop_front() {
            for &col in incidence.row(row) {
                match self.col_match[col] {
                    None => found_free_col = true,
                    Some(next) if self.dist[next] == UNREACHED => {
                        self.dist[next] = self.dist[row] + 1;
                        queue.push_back(next);
                    }
                    Some(_) => {}
                }
            }
        }
        found_free_col
    }

    /// Searches for an augmenting path from the free row `root` along the BFS layers and flips
    /// it if one is found. Iterative so that long alternating paths cannot overflow the stack.
    fn augment_from(&mut self, root: usize) -> bool {
        let incidence = self.incidence;
        let mut stack = vec![root];
        while let Some(&row) = stack.last() {
            let cols = incidence.row(row);
            if self.next_edge[row] == cols.len() {
                // dead end for the rest of this phase
                self.dist[row] = UNREACHED;
                stack.pop();
                continue;
            }
            let col = cols[self.next_edge[row]];
            self.next_edge[row] += 1;

            match self.col_match[col] {
                None => {
                    let mut col = col;
                    while let Some(row) = stack.pop() {
                        let prev = self.row_match[row];
                        self.row_match[row] = Some(col);
                        self.col_match[col] = Some(row);
                        match prev {
                            Some(prev) => col = prev,
                            None => break,
                        }
                    }
                    return true;
                }
                Some(next) if self.dist[next] == self.dist[row] + 1 => stack.push(next),
                Some(_) => {}
            }
        }
        false
    }
}
