use histogrid_common::{Grid, GridError};

use crate::kernel::Kernel;
use crate::normalize::normalize;

/// Spread probability from each cell over its 3x3 neighbourhood, then
/// normalize.
///
/// The world is cyclic: mass leaving the right edge re-enters on the left and
/// mass leaving the bottom re-enters at the top. With `blurring = 0.12` a
/// unit impulse at the centre of a 3x3 grid becomes
///
/// ```text
/// 0.01  0.02  0.01
/// 0.02  0.88  0.02
/// 0.01  0.02  0.01
/// ```
///
/// On grids one cell high or wide several offsets wrap onto the same
/// destination; their contributions add up.
///
/// `blurring` is expected in `[0, 1]`. Values outside that range are
/// accepted but give a kernel with negative weights and are logged as a
/// warning.
pub fn blur(grid: &Grid, blurring: f64) -> Result<Grid, GridError> {
    let _span = tracing::info_span!("blur", rows = grid.rows(), cols = grid.cols()).entered();
    if !(0.0..=1.0).contains(&blurring) {
        tracing::warn!(blurring, "blur factor outside [0, 1]");
    }

    let diffused = diffuse(grid, &Kernel::new(blurring))?;
    tracing::trace!(mass = diffused.sum(), "diffused");
    normalize(&diffused)
}

/// Apply `steps` successive blurs. Zero steps only normalizes.
pub fn blur_steps(grid: &Grid, blurring: f64, steps: usize) -> Result<Grid, GridError> {
    let mut current = normalize(grid)?;
    for step in 0..steps {
        tracing::debug!(step, blurring, "blur step");
        current = blur(&current, blurring)?;
    }
    Ok(current)
}

/// Accumulate every cell's mass into its wrapped neighbourhood, without
/// normalizing.
pub(crate) fn diffuse(grid: &Grid, kernel: &Kernel) -> Result<Grid, GridError> {
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut out = vec![0.0; rows * cols];

    for (i, row) in grid.iter_rows().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            if value == 0.0 {
                continue;
            }
            for (dy, dx, weight) in kernel.offsets() {
                let ni = wrap(i, dy, rows);
                let nj = wrap(j, dx, cols);
                out[ni * cols + nj] += value * weight;
            }
        }
    }

    Grid::from_vec(rows, cols, out)
}

fn wrap(index: usize, offset: isize, len: usize) -> usize {
    (index as isize + offset).rem_euclid(len as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: Vec<Vec<f64>>) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    #[test]
    fn centre_impulse_matches_reference_pattern() {
        let g = Grid::impulse(3, 3, 1, 1).unwrap();
        let b = blur(&g, 0.12).unwrap();
        let expected = grid(vec![
            vec![0.01, 0.02, 0.01],
            vec![0.02, 0.88, 0.02],
            vec![0.01, 0.02, 0.01],
        ]);
        assert!(b.approx_eq(&expected, 1e-9), "got\n{b}");
        assert!((b.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn corner_impulse_wraps_to_opposite_edges() {
        let g = Grid::impulse(4, 4, 0, 0).unwrap();
        let b = blur(&g, 0.12).unwrap();
        assert!((b.get(0, 0).unwrap() - 0.88).abs() < 1e-9);
        assert!((b.get(3, 0).unwrap() - 0.02).abs() < 1e-9);
        assert!((b.get(0, 3).unwrap() - 0.02).abs() < 1e-9);
        assert!((b.get(3, 3).unwrap() - 0.01).abs() < 1e-9);
        assert_eq!(b.get(2, 2), Some(0.0));
    }

    #[test]
    fn zero_blurring_is_identity_up_to_normalization() {
        let g = grid(vec![vec![1.0, 3.0, 0.0], vec![2.0, 0.5, 4.0]]);
        let b = blur(&g, 0.0).unwrap();
        assert!(b.approx_eq(&normalize(&g).unwrap(), 1e-12));
    }

    #[test]
    fn full_blurring_empties_the_source_cell() {
        let g = Grid::impulse(5, 5, 2, 2).unwrap();
        let b = blur(&g, 1.0).unwrap();
        assert_eq!(b.get(2, 2), Some(0.0));
        assert!((b.get(1, 2).unwrap() - 1.0 / 6.0).abs() < 1e-12);
        assert!((b.get(1, 1).unwrap() - 1.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn sums_to_one_across_blur_factors() {
        let g = grid(vec![
            vec![0.1, 0.4, 2.0, 0.0],
            vec![3.0, 0.0, 0.2, 1.0],
            vec![0.0, 0.7, 0.0, 5.0],
        ]);
        for i in 0..=20 {
            let b = i as f64 / 20.0;
            let out = blur(&g, b).unwrap();
            assert!((out.sum() - 1.0).abs() < 1e-9, "blurring {b}");
        }
    }

    #[test]
    fn diffusion_conserves_mass_before_normalization() {
        let g = grid(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
        let kernel = Kernel::new(0.25);
        let diffused = diffuse(&g, &kernel).unwrap();
        assert!((diffused.sum() - g.sum() * kernel.total()).abs() < 1e-9);
        assert!((diffused.sum() - 21.0).abs() < 1e-9);
    }

    #[test]
    fn single_row_collisions_accumulate() {
        let g = grid(vec![vec![1.0, 0.0, 0.0]]);
        let b = blur(&g, 0.3).unwrap();
        assert!((b.sum() - 1.0).abs() < 1e-12);

        // Rows wrap onto themselves, so the centre column keeps
        // 1 - 0.3 + 2 * 0.05 and each side gets 0.05 + 2 * 0.025.
        assert!((b.get(0, 0).unwrap() - 0.8).abs() < 1e-12);
        assert!((b.get(0, 1).unwrap() - 0.1).abs() < 1e-12);
        assert!((b.get(0, 1).unwrap() - b.get(0, 2).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn single_cell_keeps_all_mass() {
        let g = grid(vec![vec![7.0]]);
        let b = blur(&g, 0.6).unwrap();
        assert_eq!(b.as_slice(), &[1.0]);
    }

    #[test]
    fn input_is_not_mutated() {
        let g = Grid::impulse(3, 3, 0, 2).unwrap();
        let before = g.clone();
        blur(&g, 0.5).unwrap();
        assert_eq!(g, before);
    }

    #[test]
    fn all_zero_grid_fails_normalization() {
        let g = Grid::zeros(2, 2).unwrap();
        assert!(matches!(
            blur(&g, 0.1),
            Err(GridError::NonPositiveSum { .. })
        ));
    }

    #[test]
    fn out_of_range_blurring_is_accepted() {
        let g = Grid::impulse(3, 3, 1, 1).unwrap();
        assert!(blur(&g, 1.2).is_ok());
    }

    #[test]
    fn blur_steps_spreads_further_each_step() {
        let g = Grid::impulse(7, 7, 3, 3).unwrap();
        let zero = blur_steps(&g, 0.2, 0).unwrap();
        assert!(zero.approx_eq(&g, 1e-12));

        let one = blur_steps(&g, 0.2, 1).unwrap();
        let three = blur_steps(&g, 0.2, 3).unwrap();
        assert!(three.get(3, 3).unwrap() < one.get(3, 3).unwrap());
        assert_eq!(one.get(3, 0), Some(0.0));
        assert!(three.get(3, 0).unwrap() > 0.0);
        assert!((three.sum() - 1.0).abs() < 1e-9);
    }
}
