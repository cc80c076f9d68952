use nalgebra::{DMatrix, RealField};

use crate::error::IncidenceError;

/// Sparse boolean relation between equations (rows) and variables (columns).
///
/// Stored twice: per-row sorted column lists and the transposed per-column row lists, so that
/// both "which variables does this equation use" and "which equations use this variable" are
/// cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidenceStructure {
    n_rows: usize,
    n_cols: usize,
    rows: Vec<Vec<usize>>,
    cols: Vec<Vec<usize>>,
}

impl IncidenceStructure {
    /// Builds a structure from one column list per row. Duplicate entries are ignored.
    pub fn from_rows(
        n_rows: usize,
        n_cols: usize,
        rows: Vec<Vec<usize>>,
    ) -> Result<Self, IncidenceError> {
        if rows.len() != n_rows {
            return Err(IncidenceError::RowCountMismatch {
                expected: n_rows,
                got: rows.len(),
            });
        }
        let entries = rows
            .iter()
            .enumerate()
            .flat_map(|(r, cols)| cols.iter().map(move |&c| (r, c)));
        Self::from_entries(n_rows, n_cols, entries)
    }

    /// Builds a structure from `(row, col)` coordinates of its nonzeros.
    pub fn from_entries<I>(
        n_rows: usize,
        n_cols: usize,
        entries: I,
    ) -> Result<Self, IncidenceError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut rows = vec![Vec::new(); n_rows];
        for (row, col) in entries {
            if row >= n_rows || col >= n_cols {
                return Err(IncidenceError::IndexOutOfBounds {
                    row,
                    col,
                    n_rows,
                    n_cols,
                });
            }
            rows[row].push(col);
        }
        Ok(Self::build(n_rows, n_cols, rows))
    }

    fn build(n_rows: usize, n_cols: usize, mut rows: Vec<Vec<usize>>) -> Self {
        let mut cols = vec![Vec::new(); n_cols];
        for (r, row) in rows.iter_mut().enumerate() {
            row.sort_unstable();
            row.dedup();
            for &c in row.iter() {
                cols[c].push(r);
            }
        }

        Self {
            n_rows,
            n_cols,
            rows,
            cols,
        }
    }

    /// Sparsity pattern of a dense matrix, e.g. a Jacobian. Non-finite entries count as
    /// nonzero, since the dependency they indicate is real even if its value is not.
    pub fn from_dense<T: RealField + Copy>(mat: &DMatrix<T>) -> Self {
        let (n_rows, n_cols) = mat.shape();
        let rows = (0..n_rows)
            .map(|r| {
                (0..n_cols)
                    .filter(|&c| {
                        let x = mat[(r, c)];
                        !x.is_finite() || x != T::zero()
                    })
                    .collect()
            })
            .collect();
        Self::build(n_rows, n_cols, rows)
    }

    pub fn from_bool_matrix(mat: &DMatrix<bool>) -> Self {
        let (n_rows, n_cols) = mat.shape();
        let rows = (0..n_rows)
            .map(|r| (0..n_cols).filter(|&c| mat[(r, c)]).collect())
            .collect();
        Self::build(n_rows, n_cols, rows)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    pub fn is_square(&self) -> bool {
        self.n_rows == self.n_cols
    }

    /// Number of nonzero entries.
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Columns referenced by `row`, ascending.
    pub fn row(&self, row: usize) -> &[usize] {
        &self.rows[row]
    }

    /// Rows referencing `col`, ascending.
    pub fn col(&self, col: usize) -> &[usize] {
        &self.cols[col]
    }

    pub fn nonzero(&self, row: usize, col: usize) -> bool {
        row < self.n_rows && self.rows[row].binary_search(&col).is_ok()
    }

    /// All `(row, col)` nonzeros in row-major order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(r, cols)| cols.iter().map(move |&c| (r, c)))
    }

    /// Relabels rows and columns: entry `(r, c)` moves to `(row_perm[r], col_perm[c])`.
    pub fn permuted(
        &self,
        row_perm: &[usize],
        col_perm: &[usize],
    ) -> Result<Self, IncidenceError> {
        check_permutation(row_perm, self.n_rows)?;
        check_permutation(col_perm, self.n_cols)?;
        let entries = self.entries().map(|(r, c)| (row_perm[r], col_perm[c]));
        Self::from_entries(self.n_rows, self.n_cols, entries.collect::<Vec<_>>())
    }

    /// 0/1 dense pattern, handy for printing.
    pub fn to_dense_pattern(&self) -> DMatrix<f32> {
        let mut pattern = DMatrix::<f32>::zeros(self.n_rows, self.n_cols);
        for (r, c) in self.entries() {
            pattern[(r, c)] = 1.0;
        }
        pattern
    }
}

pub(crate) fn check_permutation(perm: &[usize], n: usize) -> Result<(), IncidenceError> {
    let invalid = IncidenceError::InvalidPermutation {
        expected: n,
        got: perm.len(),
    };
    if perm.len() != n {
        return Err(invalid);
    }
    let mut seen = vec![false; n];
    for &p in perm {
        if p >= n || seen[p] {
            return Err(invalid);
        }
        seen[p] = true;
    }
    Ok(())
}
