use crate::{incidence::IncidenceStructure, matching::Matching};

/// Directed graph over row indices. Edge `u -> v` means row `u` references the column matched
/// to row `v`, so `u` cannot be evaluated before `v`'s variable is fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DependencyGraph {
    successors: Vec<Vec<usize>>,
}

impl DependencyGraph {
    /// Builds the graph for a square structure and a perfect matching on it.
    ///
    /// For every row `v`, each other row sharing `v`'s matched column gets an edge toward `v`.
    /// Callers must have validated the matching; rows without a match contribute no edges.
    pub(crate) fn build(incidence: &IncidenceStructure, matching: &Matching) -> Self {
        let n = incidence.n_rows();
        let mut successors = vec![Vec::new(); n];
        for v in 0..n {
            let Some(col) = matching.col_of(v) else {
                continue;
            };
            for &u in incidence.col(col) {
                if u != v {
                    successors[u].push(v);
                }
            }
        }
        // edges were pushed in increasing `v`, so every list is already sorted and unique
        Self { successors }
    }

    #[cfg(test)]
    pub(crate) fn from_successors(successors: Vec<Vec<usize>>) -> Self {
        Self { successors }
    }

    pub(crate) fn n_nodes(&self) -> usize {
        self.successors.len()
    }

    pub(crate) fn n_edges(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }

    pub(crate) fn successors(&self, node: usize) -> &[usize] {
        &self.successors[node]
    }

    pub(crate) fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.successors
            .iter()
            .enumerate()
            .flat_map(|(u, vs)| vs.iter().map(move |&v| (u, v)))
    }
}
