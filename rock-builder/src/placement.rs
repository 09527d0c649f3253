//! Batch placement
//!
//! Rocks in a batch are laid out on a square-ish grid so they do not overlap.
//! Columns advance along X, rows along Y, and the grid sits on the start
//! point's Z plane.

use glam::Vec3;

pub struct BatchPlacer;

impl BatchPlacer {
    /// Number of origins per row for `count` rocks
    ///
    /// `floor(sqrt(count))`, never less than 1.
    pub fn row_length(count: usize) -> usize {
        count.isqrt().max(1)
    }

    /// Grid origins in row-major order
    ///
    /// Returns exactly `count` origins; the last row may be partial.
    pub fn layout(count: usize, spacing: f32, start: Vec3) -> Vec<Vec3> {
        let row_length = Self::row_length(count);
        (0..count)
            .map(|i| {
                let column = (i % row_length) as f32;
                let row = (i / row_length) as f32;
                start + Vec3::new(column * spacing, row * spacing, 0.0)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_by_three_grid() {
        let origins = BatchPlacer::layout(9, 3.0, Vec3::ZERO);
        assert_eq!(origins.len(), 9);

        for row in 0..3 {
            for column in 0..3 {
                let p = origins[row * 3 + column];
                assert_eq!(p, Vec3::new(column as f32 * 3.0, row as f32 * 3.0, 0.0));
            }
        }

        // Neighbours along each grid axis are exactly one pitch apart
        for row in 0..3 {
            for column in 0..2 {
                let a = origins[row * 3 + column];
                let b = origins[row * 3 + column + 1];
                assert_eq!(a.distance(b), 3.0);
            }
        }
        for row in 0..2 {
            for column in 0..3 {
                let a = origins[row * 3 + column];
                let b = origins[(row + 1) * 3 + column];
                assert_eq!(a.distance(b), 3.0);
            }
        }
    }

    #[test]
    fn test_empty_batch() {
        assert!(BatchPlacer::layout(0, 3.0, Vec3::ONE).is_empty());
    }

    #[test]
    fn test_small_counts_clamp_row_length() {
        assert_eq!(BatchPlacer::row_length(0), 1);
        assert_eq!(BatchPlacer::row_length(1), 1);
        assert_eq!(BatchPlacer::row_length(3), 1);
        assert_eq!(BatchPlacer::row_length(4), 2);

        let origins = BatchPlacer::layout(3, 2.0, Vec3::ZERO);
        assert_eq!(
            origins,
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 2.0, 0.0),
                Vec3::new(0.0, 4.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_partial_last_row() {
        // 10 rocks: rows of 3, last row holds one
        let origins = BatchPlacer::layout(10, 1.0, Vec3::new(5.0, -1.0, 2.0));
        assert_eq!(origins.len(), 10);
        assert_eq!(origins[9], Vec3::new(5.0, 2.0, 2.0));
        assert!(origins.iter().all(|p| p.z == 2.0));
    }

    #[test]
    fn test_distinct_when_spacing_positive() {
        let origins = BatchPlacer::layout(50, 0.5, Vec3::ZERO);
        for (i, a) in origins.iter().enumerate() {
            for b in &origins[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
