use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use histogrid_common::{Grid, GridError};

/// Errors from reading or converting a map.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("map has no cells")]
    Empty,
    #[error("map row {row} has {actual} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("grid error: {0}")]
    Grid(#[from] GridError),
}

/// Split one line of map data into cell codes, keeping the first character
/// of every whitespace-separated token.
pub fn parse_line(line: &str) -> Vec<char> {
    line.split_whitespace()
        .filter_map(|token| token.chars().next())
        .collect()
}

/// A rectangular world map of category codes, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    rows: usize,
    cols: usize,
    cells: Vec<char>,
}

impl Map {
    /// Parse map text. Blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let lines: Vec<Vec<char>> = text
            .lines()
            .map(parse_line)
            .filter(|row| !row.is_empty())
            .collect();

        let cols = lines.first().map_or(0, Vec::len);
        if cols == 0 {
            return Err(MapError::Empty);
        }
        if let Some((row, r)) = lines.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(MapError::Ragged {
                row,
                expected: cols,
                actual: r.len(),
            });
        }

        Ok(Self {
            rows: lines.len(),
            cols,
            cells: lines.into_iter().flatten().collect(),
        })
    }

    /// Read and parse a map file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let map = Self::parse(&text)?;
        tracing::debug!(
            path = %path.display(),
            rows = map.rows,
            cols = map.cols,
            "loaded map"
        );
        Ok(map)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Category code at `(row, col)`, or `None` outside the map.
    pub fn get(&self, row: usize, col: usize) -> Option<char> {
        (row < self.rows && col < self.cols).then(|| self.cells[row * self.cols + col])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[char]> {
        self.cells.chunks_exact(self.cols)
    }

    /// Number of cells carrying the code `code`.
    pub fn count(&self, code: char) -> usize {
        self.cells.iter().filter(|&&c| c == code).count()
    }

    /// Cell count per category code, in code order.
    pub fn categories(&self) -> BTreeMap<char, usize> {
        let mut counts = BTreeMap::new();
        for &c in &self.cells {
            *counts.entry(c).or_insert(0) += 1;
        }
        counts
    }

    /// Starting belief for a robot that could be anywhere on the map.
    pub fn uniform_prior(&self) -> Result<Grid, MapError> {
        Ok(Grid::uniform(self.rows, self.cols)?)
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.iter_rows().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            let line: Vec<String> = row.iter().map(char::to_string).collect();
            write!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
