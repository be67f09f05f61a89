/// The fixed 3x3 diffusion kernel for one blur step.
///
/// The centre keeps `1 - blurring`, each edge-adjacent neighbour receives
/// `blurring / 6` and each diagonal neighbour `blurring / 12`. For a blur
/// factor in `[0, 1]` the nine weights sum to one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel {
    weights: [[f64; 3]; 3],
}

impl Kernel {
    pub fn new(blurring: f64) -> Self {
        let center = 1.0 - blurring;
        let adjacent = blurring / 6.0;
        let corner = blurring / 12.0;
        Self {
            weights: [
                [corner, adjacent, corner],
                [adjacent, center, adjacent],
                [corner, adjacent, corner],
            ],
        }
    }

    /// Weight for the destination offset `(dy, dx)`, or `None` unless both
    /// lie in `-1..=1`.
    pub fn weight(&self, dy: isize, dx: isize) -> Option<f64> {
        let row = self.weights.get(usize::try_from(dy + 1).ok()?)?;
        row.get(usize::try_from(dx + 1).ok()?).copied()
    }

    /// Weight kept by the source cell.
    pub fn center(&self) -> f64 {
        self.weights[1][1]
    }

    /// Weight given to each of the four edge-adjacent neighbours.
    pub fn adjacent(&self) -> f64 {
        self.weights[0][1]
    }

    /// Weight given to each of the four diagonal neighbours.
    pub fn corner(&self) -> f64 {
        self.weights[0][0]
    }

    /// Sum of all nine weights.
    pub fn total(&self) -> f64 {
        self.weights.iter().flatten().sum()
    }

    /// Iterate `(dy, dx, weight)` over the nine offsets.
    pub fn offsets(&self) -> impl Iterator<Item = (isize, isize, f64)> + '_ {
        self.weights.iter().zip(-1..=1).flat_map(|(row, dy)| {
            row.iter().zip(-1..=1).map(move |(&w, dx)| (dy, dx, w))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_follow_blur_factor() {
        let k = Kernel::new(0.12);
        assert!((k.center() - 0.88).abs() < 1e-12);
        assert!((k.adjacent() - 0.02).abs() < 1e-12);
        assert!((k.corner() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn weights_sum_to_one_in_range() {
        for i in 0..=10 {
            let b = i as f64 / 10.0;
            assert!((Kernel::new(b).total() - 1.0).abs() < 1e-12, "blurring {b}");
        }
    }

    #[test]
    fn out_of_range_kernel_still_sums_to_one_but_goes_negative() {
        // Sum stays one; the centre weight goes negative.
        let k = Kernel::new(1.5);
        assert!(k.center() < 0.0);
        assert!((k.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn kernel_is_symmetric() {
        let k = Kernel::new(0.3);
        for (dy, dx, w) in k.offsets() {
            assert_eq!(Some(w), k.weight(dy, dx));
            assert_eq!(Some(w), k.weight(-dy, -dx));
            assert_eq!(Some(w), k.weight(dx, dy));
        }
        assert_eq!(k.offsets().count(), 9);
    }

    #[test]
    fn weight_outside_neighbourhood_is_none() {
        let k = Kernel::new(0.2);
        assert_eq!(k.weight(2, 0), None);
        assert_eq!(k.weight(0, -2), None);
        assert_eq!(k.weight(-1, 1), Some(k.corner()));
        assert_eq!(k.weight(0, 1), Some(k.adjacent()));
    }
}
