//! Contour merging and cloud extents.

use haulview_core::Surface;
use nalgebra::{SVector, Vector3};

use crate::ReconstructError;

/// Concatenate the vertices of every contour, in the order given, skipping
/// non-finite positions.
pub(crate) fn merge<'a>(
    surfaces: impl IntoIterator<Item = &'a Surface>,
) -> Result<Vec<Vector3<f64>>, ReconstructError> {
    let points: Vec<Vector3<f64>> = surfaces
        .into_iter()
        .flat_map(|surface| surface.vertices.iter())
        .filter(|position| position.is_finite())
        .map(|position| Vector3::from(position.to_array()))
        .collect();
    if points.is_empty() {
        return Err(ReconstructError::NoSurfaceData);
    }
    Ok(points)
}

/// Length of the diagonal of the axis-aligned box around `points`.
pub(crate) fn diagonal<const D: usize>(points: &[SVector<f64, D>]) -> f64 {
    let Some(first) = points.first() else {
        return 0.0;
    };
    let (min, max) = points
        .iter()
        .fold((*first, *first), |(min, max), point| {
            (min.inf(point), max.sup(point))
        });
    (max - min).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use haulview_core::Position;
    use nalgebra::Vector2;
    use rstest::rstest;

    #[rstest]
    fn merging_nothing_reports_no_surface_data() {
        let none: [&Surface; 0] = [];
        assert_eq!(merge(none), Err(ReconstructError::NoSurfaceData));
    }

    #[rstest]
    fn non_finite_vertices_are_dropped() {
        let contour = Surface {
            id: 1,
            vertices: vec![
                Position::new(f64::NAN, 0.0, 0.0),
                Position::new(1.0, 2.0, 3.0),
            ],
        };
        let merged = merge([&contour]).expect("one usable vertex");
        assert_eq!(merged, vec![Vector3::new(1.0, 2.0, 3.0)]);
    }

    #[rstest]
    fn diagonal_spans_the_bounding_box() {
        let points = [Vector3::new(0.0, 0.0, 0.0), Vector3::new(3.0, 4.0, 12.0)];
        assert_eq!(diagonal(&points), 13.0);
        let flat: [Vector2<f64>; 0] = [];
        assert_eq!(diagonal(&flat), 0.0);
    }
}
