//! Compressed-sparse-row pattern and matrix.
//!
//! Layout is the usual CSR triple:
//!
//! * `row_offsets[i] .. row_offsets[i+1]` = entries of row *i*
//! * `col_indices`                        = concatenated column indices, sorted per row
//! * `values`                             = one value per structural entry
//!
//! A pattern only contains entries that were explicitly inserted. An entry
//! that is absent from the pattern is *structurally* absent: [`CsrMatrix::get`]
//! returns `None` for it, whereas a stored zero returns `Some(0.0)`.

use crate::cut_error::CutError;
use crate::debug_invariants::DebugInvariants;

/// Sparse nonzero structure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparsityPattern {
    nrows: usize,
    ncols: usize,
    row_offsets: Vec<usize>,
    col_indices: Vec<usize>,
}

impl SparsityPattern {
    /// Pattern with no entries.
    pub fn empty(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            row_offsets: vec![0; nrows + 1],
            col_indices: Vec::new(),
        }
    }

    /// Builds a pattern from per-row column lists; lists are sorted and deduplicated.
    pub fn from_rows(ncols: usize, mut rows: Vec<Vec<usize>>) -> Result<Self, CutError> {
        let nrows = rows.len();
        let mut row_offsets = Vec::with_capacity(nrows + 1);
        row_offsets.push(0);
        let mut col_indices = Vec::new();
        for row in rows.iter_mut() {
            row.sort_unstable();
            row.dedup();
            if let Some(&c) = row.last() {
                if c >= ncols {
                    return Err(CutError::IndexOutOfBounds {
                        what: "column",
                        index: c,
                        len: ncols,
                    });
                }
            }
            col_indices.extend_from_slice(row);
            row_offsets.push(col_indices.len());
        }
        Ok(Self {
            nrows,
            ncols,
            row_offsets,
            col_indices,
        })
    }

    /// Union of dense `dofs x dofs` blocks, one block per entry of `blocks`.
    pub fn from_blocks<'a, I>(ndof: usize, blocks: I) -> Result<Self, CutError>
    where
        I: IntoIterator<Item = &'a [usize]>,
    {
        let mut rows: Vec<Vec<usize>> = vec![Vec::new(); ndof];
        for block in blocks {
            for &r in block {
                let row = rows.get_mut(r).ok_or(CutError::IndexOutOfBounds {
                    what: "row",
                    index: r,
                    len: ndof,
                })?;
                row.extend_from_slice(block);
            }
        }
        Self::from_rows(ndof, rows)
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of structural entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.col_indices.len()
    }

    /// Column indices of `row`.
    pub fn row(&self, row: usize) -> &[usize] {
        &self.col_indices[self.row_offsets[row]..self.row_offsets[row + 1]]
    }

    /// Storage position of `(row, col)`, if structurally present.
    pub fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.nrows {
            return None;
        }
        let start = self.row_offsets[row];
        self.row(row)
            .binary_search(&col)
            .ok()
            .map(|k| start + k)
    }

    #[inline]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.index_of(row, col).is_some()
    }

    /// Whether every entry of `self` is present in `other`.
    pub fn is_subset_of(&self, other: &SparsityPattern) -> bool {
        self.nrows == other.nrows
            && self.ncols == other.ncols
            && (0..self.nrows).all(|r| self.row(r).iter().all(|&c| other.contains(r, c)))
    }

    /// Iterates over `(row, col)` of all entries in storage order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.nrows).flat_map(move |r| self.row(r).iter().map(move |&c| (r, c)))
    }

    pub fn row_offsets(&self) -> &[usize] {
        &self.row_offsets
    }

    pub fn col_indices(&self) -> &[usize] {
        &self.col_indices
    }
}

impl DebugInvariants for SparsityPattern {
    fn validate_invariants(&self) -> Result<(), CutError> {
        if self.row_offsets.len() != self.nrows + 1 {
            return Err(CutError::SizeMismatch {
                what: "row offsets",
                expected: self.nrows + 1,
                found: self.row_offsets.len(),
            });
        }
        if self.row_offsets.last().copied() != Some(self.col_indices.len()) {
            return Err(CutError::SizeMismatch {
                what: "column indices",
                expected: self.row_offsets.last().copied().unwrap_or(0),
                found: self.col_indices.len(),
            });
        }
        for r in 0..self.nrows {
            if self.row_offsets[r] > self.row_offsets[r + 1] {
                return Err(CutError::InvalidMesh(format!("row {r} has negative length")));
            }
            let row = self.row(r);
            if row.windows(2).any(|w| w[0] >= w[1]) {
                return Err(CutError::InvalidMesh(format!(
                    "row {r} columns are not strictly increasing"
                )));
            }
            if let Some(&c) = row.last() {
                if c >= self.ncols {
                    return Err(CutError::IndexOutOfBounds {
                        what: "column",
                        index: c,
                        len: self.ncols,
                    });
                }
            }
        }
        Ok(())
    }
}

/// CSR matrix over a fixed pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct CsrMatrix {
    pattern: SparsityPattern,
    values: Vec<f64>,
}

impl CsrMatrix {
    /// All-zero matrix with the given structure.
    pub fn zeros(pattern: SparsityPattern) -> Self {
        let values = vec![0.0; pattern.nnz()];
        Self { pattern, values }
    }

    #[inline]
    pub fn pattern(&self) -> &SparsityPattern {
        &self.pattern
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.pattern.nrows
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.pattern.ncols
    }

    #[inline]
    pub fn nnz(&self) -> usize {
        self.pattern.nnz()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at `(row, col)`; `None` when the entry is structurally absent.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.pattern.index_of(row, col).map(|k| self.values[k])
    }

    /// Adds `value` to a structurally present entry.
    pub fn add_at(&mut self, row: usize, col: usize, value: f64) -> Result<(), CutError> {
        let k = self
            .pattern
            .index_of(row, col)
            .ok_or_else(|| CutError::InconsistentSpace(format!(
                "entry ({row}, {col}) is not in the sparsity pattern"
            )))?;
        self.values[k] += value;
        Ok(())
    }

    /// Adds a dense row-major `dofs.len() x dofs.len()` block.
    pub fn add_block(&mut self, dofs: &[usize], block: &[f64]) -> Result<(), CutError> {
        let n = dofs.len();
        if block.len() != n * n {
            return Err(CutError::SizeMismatch {
                what: "local matrix",
                expected: n * n,
                found: block.len(),
            });
        }
        for (i, &r) in dofs.iter().enumerate() {
            for (j, &c) in dofs.iter().enumerate() {
                self.add_at(r, c, block[i * n + j])?;
            }
        }
        Ok(())
    }

    /// `y = A x`.
    pub fn mul_vec(&self, x: &[f64]) -> Result<Vec<f64>, CutError> {
        if x.len() != self.ncols() {
            return Err(CutError::SizeMismatch {
                what: "vector",
                expected: self.ncols(),
                found: x.len(),
            });
        }
        let y: Vec<f64> = (0..self.nrows())
            .map(|r| {
                let span = self.pattern.row_offsets[r]..self.pattern.row_offsets[r + 1];
                self.pattern.col_indices[span.clone()]
                    .iter()
                    .zip(&self.values[span])
                    .map(|(&c, &v)| v * x[c])
                    .sum::<f64>()
            })
            .collect();
        Ok(y)
    }

    /// Diagonal entries; absent diagonal entries read as zero.
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.nrows().min(self.ncols()))
            .map(|i| self.get(i, i).unwrap_or(0.0))
            .collect()
    }

    /// Dense row-major copy, for small matrices and tests.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        let mut out = vec![vec![0.0; self.ncols()]; self.nrows()];
        for ((r, c), &v) in self.pattern.entries().zip(&self.values) {
            out[r][c] = v;
        }
        out
    }
}
