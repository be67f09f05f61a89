//! Filter primitives: normalization and toroidal blur of probability grids.
//!
//! # Invariants
//! - Operations are pure: inputs are borrowed, outputs are fresh grids.
//! - A successful `normalize` or `blur` returns a grid summing to one.
//! - The world is a torus; blur wraps across every edge.

mod blur;
mod config;
mod kernel;
mod normalize;

pub use blur::{blur, blur_steps};
pub use config::{ConfigError, FilterConfig};
pub use kernel::Kernel;
pub use normalize::normalize;

pub use histogrid_common::{Grid, GridError};

pub fn crate_info() -> &'static str {
    "histogrid-filter v0.1.0"
}
