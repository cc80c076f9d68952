pub mod hopcroft_karp;

pub use hopcroft_karp::HopcroftKarp;

use crate::{error::MatchingError, incidence::IncidenceStructure};

/// Computes a maximum bipartite matching between the rows and columns of an incidence structure.
///
/// Implementations may return a matching of any cardinality up to `min(n_rows, n_cols)`; the
/// caller decides whether a non-perfect result is acceptable.
pub trait MatchingProvider {
    fn maximum_matching(&self, incidence: &IncidenceStructure) -> Matching;
}

/// A (partial) one-to-one pairing of rows with columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matching {
    row_to_col: Vec<Option<usize>>,
    col_to_row: Vec<Option<usize>>,
}

impl Matching {
    /// An empty matching over `n_rows` rows and `n_cols` columns.
    pub fn empty(n_rows: usize, n_cols: usize) -> Self {
        Self {
            row_to_col: vec![None; n_rows],
            col_to_row: vec![None; n_cols],
        }
    }

    /// Row `i` matched with column `i`, for all `i < n`.
    pub fn identity(n: usize) -> Self {
        Self {
            row_to_col: (0..n).map(Some).collect(),
            col_to_row: (0..n).map(Some).collect(),
        }
    }

    /// Builds a matching from `(row, col)` pairs, rejecting any row or column used twice.
    pub fn from_pairs<I>(n_rows: usize, n_cols: usize, pairs: I) -> Result<Self, MatchingError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut matching = Self::empty(n_rows, n_cols);
        for (row, col) in pairs {
            if row >= n_rows {
                return Err(MatchingError::RowOutOfRange { row, n_rows });
            }
            if col >= n_cols {
                return Err(MatchingError::ColOutOfRange { col, n_cols });
            }
            if matching.row_to_col[row].is_some() {
                return Err(MatchingError::RowMatchedTwice { row });
            }
            if let Some(first_row) = matching.col_to_row[col] {
                return Err(MatchingError::ColMatchedTwice {
                    col,
                    first_row,
                    second_row: row,
                });
            }
            matching.row_to_col[row] = Some(col);
            matching.col_to_row[col] = Some(row);
        }
        Ok(matching)
    }

    /// Builds a matching from a `row -> col` table, e.g. `vec![2, 0, 1]`.
    pub fn from_row_to_col(n_cols: usize, row_to_col: &[usize]) -> Result<Self, MatchingError> {
        Self::from_pairs(
            row_to_col.len(),
            n_cols,
            row_to_col.iter().copied().enumerate(),
        )
    }

    pub fn n_rows(&self) -> usize {
        self.row_to_col.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_to_row.len()
    }

    pub fn col_of(&self, row: usize) -> Option<usize> {
        self.row_to_col.get(row).copied().flatten()
    }

    pub fn row_of(&self, col: usize) -> Option<usize> {
        self.col_to_row.get(col).copied().flatten()
    }

    /// Number of matched pairs.
    pub fn cardinality(&self) -> usize {
        self.row_to_col.iter().filter(|c| c.is_some()).count()
    }

    /// True iff every row and every column is matched.
    pub fn is_perfect(&self) -> bool {
        self.n_rows() == self.n_cols() && self.cardinality() == self.n_rows()
    }

    /// Matched `(row, col)` pairs in row order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.row_to_col
            .iter()
            .enumerate()
            .filter_map(|(r, c)| c.map(|c| (r, c)))
    }

    /// Checks that the matching is sized for `incidence` and, if `check_support`, that every
    /// pair is a nonzero of it.
    pub fn validate_against(
        &self,
        incidence: &IncidenceStructure,
        check_support: bool,
    ) -> Result<(), MatchingError> {
        if self.n_rows() != incidence.n_rows() || self.n_cols() != incidence.n_cols() {
            return Err(MatchingError::DimensionMismatch {
                m_rows: self.n_rows(),
                m_cols: self.n_cols(),
                n_rows: incidence.n_rows(),
                n_cols: incidence.n_cols(),
            });
        }
        if check_support {
            if let Some((row, col)) = self.pairs().find(|&(r, c)| !incidence.nonzero(r, c)) {
                return Err(MatchingError::PairNotInStructure { row, col });
            }
        }
        Ok(())
    }

    pub(crate) fn insert(&mut self, row: usize, col: usize) {
        self.row_to_col[row] = Some(col);
        self.col_to_row[col] = Some(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn column_used_twice_is_rejected() {
        let err = Matching::from_row_to_col(3, &[0, 2, 0]).unwrap_err();
        assert_eq!(
            err,
            MatchingError::ColMatchedTwice {
                col: 0,
                first_row: 0,
                second_row: 2
            }
        );
    }

    #[test]
    fn inverse_lookup() {
        let m = Matching::from_row_to_col(3, &[2, 0, 1]).unwrap();
        assert_eq!(m.row_of(2), Some(0));
        assert_eq!(m.col_of(1), Some(0));
        assert!(m.is_perfect());
        assert_eq!(m.pairs().collect::<Vec<_>>(), vec![(0, 2), (1, 0), (2, 1)]);
    }

    #[test]
    fn support_check_flags_structural_zero() {
        let s = IncidenceStructure::from_rows(2, 2, vec![vec![0], vec![0, 1]]).unwrap();
        let m = Matching::from_row_to_col(2, &[1, 0]).unwrap();
        assert_eq!(
            m.validate_against(&s, true),
            Err(MatchingError::PairNotInStructure { row: 0, col: 1 })
        );
        assert_eq!(m.validate_against(&s, false), Ok(()));
    }

    #[test]
    fn dimension_mismatch() {
        let s = IncidenceStructure::from_rows(2, 2, vec![vec![0], vec![1]]).unwrap();
        let m = Matching::identity(3);
        assert!(matches!(
            m.validate_against(&s, true),
            Err(MatchingError::DimensionMismatch { .. })
        ));
    }
}
