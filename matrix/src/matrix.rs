//! Immutable integer matrix with a cached element sum.

use std::fmt;

use crate::Error;

const CELL_WIDTH: usize = 5;

/// A dense, row-major integer matrix.
///
/// A `Matrix` never changes after construction, so its element sum is
/// computed once and cached. Moving a `Matrix` between threads is the only
/// way it is shared: there is no interior mutability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    elements: Vec<i64>,
    sum: i64,
}

impl Matrix {
    /// Builds a matrix from a list of rows.
    ///
    /// Every row must have the same, non-zero length.
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<Self, Error> {
        let cols = rows.first().map_or(0, |row| row.len());
        if rows.is_empty() || cols == 0 {
            return Err(Error::Empty);
        }

        let mut elements = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::Ragged {
                    row: i,
                    expected: cols,
                    found: row.len(),
                });
            }
            elements.extend_from_slice(row);
        }

        Ok(Self::from_parts(rows.len(), cols, elements))
    }

    /// Builds a `rows`×`cols` matrix with every element set to `value`.
    ///
    /// Zero dimensions are clamped to one.
    pub fn filled(rows: usize, cols: usize, value: i64) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self::from_parts(rows, cols, vec![value; rows * cols])
    }

    pub(crate) fn from_parts(rows: usize, cols: usize, elements: Vec<i64>) -> Self {
        debug_assert_eq!(elements.len(), rows * cols);
        let sum = elements.iter().sum();
        Self {
            rows,
            cols,
            elements,
            sum,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Sum of all elements.
    pub fn sum(&self) -> i64 {
        self.sum
    }

    pub fn get(&self, row: usize, col: usize) -> Option<i64> {
        if row < self.rows && col < self.cols {
            Some(self.elements[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> Option<&[i64]> {
        let start = row.checked_mul(self.cols)?;
        self.elements.get(start..start + self.cols)
    }

    /// Returns `true` if `self × other` is defined.
    pub fn can_multiply(&self, other: &Matrix) -> bool {
        self.cols == other.rows
    }

    /// Computes `self × other`.
    ///
    /// The result is `rows(self)`×`cols(other)`. Returns
    /// [`Error::DimensionMismatch`] when the inner dimensions differ.
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix, Error> {
        if !self.can_multiply(other) {
            return Err(Error::DimensionMismatch(
                self.rows, self.cols, other.rows, other.cols,
            ));
        }

        let mut elements = vec![0; self.rows * other.cols];
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.elements[i * self.cols + k];
                for j in 0..other.cols {
                    elements[i * other.cols + j] += a * other.elements[k * other.cols + j];
                }
            }
        }

        Ok(Self::from_parts(self.rows, other.cols, elements))
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.elements.chunks(self.cols) {
            write!(f, "|")?;
            for value in row {
                write!(f, "{:>width$}", value, width = CELL_WIDTH)?;
            }
            writeln!(f, "|")?;
        }
        Ok(())
    }
}
