use histogrid_common::{Grid, GridError};

/// Rescale `grid` so that its cells sum to one.
///
/// Fails with [`GridError::NonPositiveSum`] when the total is zero or
/// negative, and with [`GridError::NonFiniteSum`] when it is NaN or infinite.
/// The input is left untouched.
pub fn normalize(grid: &Grid) -> Result<Grid, GridError> {
    let sum = grid.sum();
    if !sum.is_finite() {
        return Err(GridError::NonFiniteSum);
    }
    if sum <= 0.0 {
        return Err(GridError::NonPositiveSum { sum });
    }
    tracing::trace!(sum, rows = grid.rows(), cols = grid.cols(), "normalize");
    Ok(grid.map(|v| v / sum))
}
