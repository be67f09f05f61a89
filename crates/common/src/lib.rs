//! Shared types for histogrid: the rectangular probability grid.
//!
//! # Invariants
//! - A `Grid` has at least one row and one column.
//! - Every row has the same length; storage is flat and row-major.

mod grid;

pub use grid::{Grid, GridError};
