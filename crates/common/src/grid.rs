use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors raised when a grid is built or consumed with invalid input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("grid is empty")]
    Empty,
    #[error("row {row} has {actual} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("buffer of {len} cells does not fit a {rows}x{cols} grid")]
    ShapeMismatch { rows: usize, cols: usize, len: usize },
    #[error("a {rows}x{cols} grid does not fit in memory")]
    TooLarge { rows: usize, cols: usize },
    #[error("grid sum must be strictly positive, got {sum}")]
    NonPositiveSum { sum: f64 },
    #[error("grid sum is not finite")]
    NonFiniteSum,
    #[error("cell ({row}, {col}) is outside a {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

/// A rectangular grid of probability mass, stored row-major.
///
/// Every constructor checks that the grid has at least one row and one
/// column and that all rows share the same length, so a `Grid` value is
/// always rectangular and non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
}

impl Grid {
    /// Create a `rows` x `cols` grid of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, GridError> {
        Self::filled(rows, cols, 0.0)
    }

    /// Create a grid where every cell holds `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Result<Self, GridError> {
        let len = cell_count(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            cells: vec![value; len],
        })
    }

    /// Create a grid with equal mass in every cell, summing to one.
    pub fn uniform(rows: usize, cols: usize) -> Result<Self, GridError> {
        let mass = 1.0 / cell_count(rows, cols)? as f64;
        Self::filled(rows, cols, mass)
    }

    /// Create a grid with all mass concentrated at `(row, col)`.
    pub fn impulse(rows: usize, cols: usize, row: usize, col: usize) -> Result<Self, GridError> {
        let mut grid = Self::zeros(rows, cols)?;
        grid.set(row, col, 1.0)?;
        Ok(grid)
    }

    /// Build a grid from nested rows, rejecting empty or ragged input.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, GridError> {
        let cols = rows.first().map_or(0, Vec::len);
        if cols == 0 {
            return Err(GridError::Empty);
        }
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(GridError::Ragged {
                row,
                expected: cols,
                actual: r.len(),
            });
        }
        let height = rows.len();
        Ok(Self {
            rows: height,
            cols,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Build a grid from a flat row-major buffer.
    pub fn from_vec(rows: usize, cols: usize, cells: Vec<f64>) -> Result<Self, GridError> {
        if cells.len() != cell_count(rows, cols)? {
            return Err(GridError::ShapeMismatch {
                rows,
                cols,
                len: cells.len(),
            });
        }
        Ok(Self { rows, cols, cells })
    }

    /// Number of rows (height).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (width).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false for a constructed grid.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Value at `(row, col)`, or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.index(row, col).map(|i| self.cells[i])
    }

    /// Overwrite the value at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), GridError> {
        let i = self.index(row, col).ok_or(GridError::OutOfBounds {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        })?;
        self.cells[i] = value;
        Ok(())
    }

    /// Cells of row `r`.
    ///
    /// # Panics
    /// Panics if `r >= self.rows()`.
    pub fn row(&self, r: usize) -> &[f64] {
        &self.cells[r * self.cols..(r + 1) * self.cols]
    }

    /// Iterate over rows as slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.cells.chunks_exact(self.cols)
    }

    /// Row-major view of every cell.
    pub fn as_slice(&self) -> &[f64] {
        &self.cells
    }

    /// Sum of all cells.
    pub fn sum(&self) -> f64 {
        self.cells.iter().sum()
    }

    /// Apply `f` to every cell, producing a new grid of the same shape.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Copy out as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter_rows().map(<[f64]>::to_vec).collect()
    }

    /// True when both grids have the same shape and every pair of cells
    /// differs by at most `tolerance`.
    pub fn approx_eq(&self, other: &Grid, tolerance: f64) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self
                .cells
                .iter()
                .zip(&other.cells)
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }
}

/// Number of cells in a `rows` x `cols` grid, rejecting empty and
/// overflowing shapes.
fn cell_count(rows: usize, cols: usize) -> Result<usize, GridError> {
    if rows == 0 || cols == 0 {
        return Err(GridError::Empty);
    }
    rows.checked_mul(cols)
        .ok_or(GridError::TooLarge { rows, cols })
}

impl TryFrom<Vec<Vec<f64>>> for Grid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<Grid> for Vec<Vec<f64>> {
    fn from(grid: Grid) -> Self {
        grid.to_rows()
    }
}

/// Rows of values separated by two spaces. Precision defaults to two
/// decimals; `{:.4}` selects four.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(2);
        for (r, row) in self.iter_rows().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            for (c, value) in row.iter().enumerate() {
                if c > 0 {
                    write!(f, "  ")?;
                }
                write!(f, "{value:.precision$}")?;
            }
        }
        Ok(())
    }
}
