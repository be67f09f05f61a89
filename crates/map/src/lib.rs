//! World maps: rectangular grids of single-character cell categories.
//!
//! A map file holds one row per line, cells separated by whitespace, for
//! example:
//!
//! ```text
//! r g g r
//! r r g r
//! ```
//!
//! Only the first character of each token is kept.

mod map;

pub use map::{Map, MapError, parse_line};
