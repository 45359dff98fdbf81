//! Near-duplicate point removal.

use nalgebra::Vector3;
use rstar::RTree;
use rstar::primitives::GeomWithData;

type IndexedPoint = GeomWithData<[f64; 3], usize>;

/// Keep the first of every group of points closer than `tolerance`.
///
/// Order is preserved. A non-positive tolerance only removes exact
/// duplicates.
pub(crate) fn clean(points: &[Vector3<f64>], tolerance: f64) -> Vec<Vector3<f64>> {
    #[expect(clippy::float_arithmetic, reason = "rstar compares squared distances")]
    let squared = tolerance * tolerance;
    let mut kept_index: RTree<IndexedPoint> = RTree::new();
    let mut kept = Vec::with_capacity(points.len());
    for point in points {
        let coords = [point.x, point.y, point.z];
        let duplicate = if tolerance > 0.0 {
            kept_index
                .locate_within_distance(coords, squared)
                .next()
                .is_some()
        } else {
            kept_index.locate_at_point(&coords).is_some()
        };
        if !duplicate {
            kept_index.insert(GeomWithData::new(coords, kept.len()));
            kept.push(*point);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn close_points_collapse_onto_the_first() {
        let points = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0005, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0009),
        ];
        let cleaned = clean(&points, 0.001);
        assert_eq!(
            cleaned,
            vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)]
        );
    }

    #[rstest]
    fn zero_tolerance_removes_exact_duplicates_only() {
        let points = [
            Vector3::new(2.0, 2.0, 2.0),
            Vector3::new(2.0, 2.0, 2.0),
            Vector3::new(2.0, 2.0, 2.000_001),
        ];
        assert_eq!(clean(&points, 0.0).len(), 2);
    }
}
