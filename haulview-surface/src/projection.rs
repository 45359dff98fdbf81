//! Projection of the point cloud onto a 2D triangulation plane.

use haulview_core::ProjectionPlane;
use nalgebra::{Matrix3, SymmetricEigen, Vector2, Vector3};

/// Orthonormal frame of a projection plane.
///
/// `u`, `v` and `normal` form a right-handed basis, so a triangle that is
/// counter-clockwise in `(u, v)` has a 3D normal on the `normal` side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlaneFrame {
    pub(crate) origin: Vector3<f64>,
    pub(crate) u: Vector3<f64>,
    pub(crate) v: Vector3<f64>,
    pub(crate) normal: Vector3<f64>,
}

impl PlaneFrame {
    /// Build the frame for `plane` around the centroid of `points`.
    pub(crate) fn for_plane(plane: ProjectionPlane, points: &[Vector3<f64>]) -> Self {
        let origin = centroid(points);
        match plane {
            ProjectionPlane::Xy => Self::axis_aligned(origin, Vector3::x(), Vector3::y()),
            ProjectionPlane::Yz => Self::axis_aligned(origin, Vector3::y(), Vector3::z()),
            ProjectionPlane::Xz => Self::axis_aligned(origin, Vector3::x(), Vector3::z()),
            ProjectionPlane::BestFit => Self::best_fit(origin, points),
        }
    }

    fn axis_aligned(origin: Vector3<f64>, u: Vector3<f64>, v: Vector3<f64>) -> Self {
        Self {
            origin,
            u,
            v,
            normal: u.cross(&v),
        }
    }

    /// Least-squares plane: the normal is the eigenvector of the covariance
    /// matrix with the smallest eigenvalue, turned to face `+z`.
    fn best_fit(origin: Vector3<f64>, points: &[Vector3<f64>]) -> Self {
        let covariance = points.iter().fold(Matrix3::zeros(), |acc, point| {
            let offset = point - origin;
            acc + offset * offset.transpose()
        });
        let eigen = SymmetricEigen::new(covariance);
        let smallest = eigen.eigenvalues.imin();
        let mut normal: Vector3<f64> = eigen.eigenvectors.column(smallest).into_owned();
        if normal.try_normalize_mut(f64::EPSILON).is_none() {
            normal = Vector3::z();
        }
        if normal.z < 0.0 {
            normal = -normal;
        }

        let seed = least_aligned_axis(&normal);
        #[expect(clippy::float_arithmetic, reason = "Gram-Schmidt step")]
        let u = (seed - normal * normal.dot(&seed)).normalize();
        let v = normal.cross(&u);
        Self {
            origin,
            u,
            v,
            normal,
        }
    }

    /// Coordinates of `point` in the plane.
    pub(crate) fn project(&self, point: &Vector3<f64>) -> Vector2<f64> {
        let offset = point - self.origin;
        Vector2::new(offset.dot(&self.u), offset.dot(&self.v))
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "centroid is the mean position"
)]
fn centroid(points: &[Vector3<f64>]) -> Vector3<f64> {
    if points.is_empty() {
        return Vector3::zeros();
    }
    points.iter().sum::<Vector3<f64>>() / points.len() as f64
}

fn least_aligned_axis(normal: &Vector3<f64>) -> Vector3<f64> {
    let magnitudes = normal.abs();
    if magnitudes.x <= magnitudes.y && magnitudes.x <= magnitudes.z {
        Vector3::x()
    } else if magnitudes.y <= magnitudes.z {
        Vector3::y()
    } else {
        Vector3::z()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[rstest]
    #[case(ProjectionPlane::Xy, Vector3::z())]
    #[case(ProjectionPlane::Yz, Vector3::x())]
    #[case(ProjectionPlane::Xz, -Vector3::y())]
    fn fixed_planes_are_right_handed(#[case] plane: ProjectionPlane, #[case] normal: Vector3<f64>) {
        let frame = PlaneFrame::for_plane(plane, &[Vector3::new(1.0, 2.0, 3.0)]);
        assert_eq!(frame.normal, normal);
        assert_eq!(frame.u.cross(&frame.v), frame.normal);
    }

    #[rstest]
    fn projection_is_relative_to_the_centroid() {
        let points = [Vector3::new(0.0, 0.0, 0.0), Vector3::new(4.0, 2.0, 10.0)];
        let frame = PlaneFrame::for_plane(ProjectionPlane::Xy, &points);
        assert_eq!(frame.project(&points[1]), Vector2::new(2.0, 1.0));
    }

    #[rstest]
    fn best_fit_recovers_a_tilted_plane() {
        // z = x, so the plane normal is (-1, 0, 1) / sqrt(2).
        let points: Vec<Vector3<f64>> = (0..5)
            .flat_map(|i| (0..5).map(move |j| (f64::from(i), f64::from(j))))
            .map(|(x, y)| Vector3::new(x, y, x))
            .collect();
        let frame = PlaneFrame::for_plane(ProjectionPlane::BestFit, &points);
        let expected = Vector3::new(-1.0, 0.0, 1.0).normalize();
        assert_close(frame.normal.dot(&expected), 1.0);
        assert_close(frame.u.dot(&frame.normal), 0.0);
        assert_close(frame.u.cross(&frame.v).dot(&frame.normal), 1.0);
    }

    #[rstest]
    fn best_fit_of_a_flat_cloud_faces_up() {
        let points = [
            Vector3::new(0.0, 0.0, 5.0),
            Vector3::new(1.0, 0.0, 5.0),
            Vector3::new(0.0, 1.0, 5.0),
            Vector3::new(1.0, 1.0, 5.0),
        ];
        let frame = PlaneFrame::for_plane(ProjectionPlane::BestFit, &points);
        assert_close(frame.normal.z, 1.0);
    }
}
