//! Bowyer-Watson Delaunay triangulation of projected points.

#![expect(clippy::float_arithmetic, reason = "planar triangulation geometry")]
#![expect(
    clippy::indexing_slicing,
    reason = "triangle corners always index vertices already pushed"
)]

use std::collections::HashMap;

use geo::{Coord, Kernel, Orientation, algorithm::kernels::RobustKernel};
use nalgebra::Vector2;
use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::merge::diagonal;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Triangulation controls, with `tolerance` already scaled to projected
/// units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TriangulationParams {
    /// Distance under which a point is treated as already inserted.
    pub(crate) tolerance: f64,
    /// Super-triangle margin as a multiple of the bounding-box diagonal.
    pub(crate) offset: f64,
    /// Largest circumradius kept. `0` keeps every triangle.
    pub(crate) alpha: f64,
}

#[derive(Debug, Clone, Copy)]
struct Triangle {
    corners: [usize; 3],
    centre: Vector2<f64>,
    radius_sq: f64,
}

impl Triangle {
    /// Build a counter-clockwise triangle, or `None` when the corners are
    /// collinear or clockwise.
    fn new(corners: [usize; 3], vertices: &[Vector2<f64>]) -> Option<Self> {
        let [a, b, c] = corners.map(|index| vertices[index]);
        if orientation(a, b, c) != Orientation::CounterClockwise {
            return None;
        }
        let (centre, radius_sq) = circumcircle(a, b, c)?;
        Some(Self {
            corners,
            centre,
            radius_sq,
        })
    }

    fn encloses(&self, point: &Vector2<f64>) -> bool {
        (point - self.centre).norm_squared() < self.radius_sq
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.corners;
        [(a, b), (b, c), (c, a)]
    }

    fn radius(&self) -> f64 {
        self.radius_sq.sqrt()
    }
}

fn orientation(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> Orientation {
    let coord = |p: Vector2<f64>| Coord { x: p.x, y: p.y };
    RobustKernel::orient2d(coord(a), coord(b), coord(c))
}

/// Centre and squared radius of the circle through `a`, `b` and `c`.
fn circumcircle(
    a: Vector2<f64>,
    b: Vector2<f64>,
    c: Vector2<f64>,
) -> Option<(Vector2<f64>, f64)> {
    let ab = b - a;
    let ac = c - a;
    let denominator = 2.0 * ab.perp(&ac);
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    let ab_sq = ab.norm_squared();
    let ac_sq = ac.norm_squared();
    let offset = Vector2::new(
        (ac.y * ab_sq - ab.y * ac_sq) / denominator,
        (ab.x * ac_sq - ac.x * ab_sq) / denominator,
    );
    Some((a + offset, offset.norm_squared()))
}

/// Corners of a counter-clockwise triangle around `points` whose
/// circumradius is `2 * offset` times the bounding-box diagonal.
fn super_triangle(points: &[Vector2<f64>], offset: f64) -> [Vector2<f64>; 3] {
    let (min, max) = points.iter().fold(
        (
            Vector2::repeat(f64::INFINITY),
            Vector2::repeat(f64::NEG_INFINITY),
        ),
        |(min, max), point| (min.inf(point), max.sup(point)),
    );
    let centre = (min + max) / 2.0;
    let radius = 2.0 * offset * diagonal(points);
    [90.0_f64, 210.0, 330.0].map(|degrees| {
        let angle = degrees.to_radians();
        centre + Vector2::new(angle.cos(), angle.sin()) * radius
    })
}

/// Triangulate `points`, returning counter-clockwise corner indices into
/// `points`.
///
/// Points closer than `params.tolerance` to an inserted point are skipped.
/// An empty result means the input was coincident or collinear.
pub(crate) fn triangulate(points: &[Vector2<f64>], params: TriangulationParams) -> Vec<[usize; 3]> {
    if points.len() < 3 || diagonal(points) == 0.0 {
        return Vec::new();
    }

    let first_super = points.len();
    let mut vertices = points.to_vec();
    vertices.extend(super_triangle(points, params.offset));
    let Some(seed) = Triangle::new([first_super, first_super + 1, first_super + 2], &vertices)
    else {
        return Vec::new();
    };
    let mut triangles = vec![seed];

    let squared_tolerance = params.tolerance * params.tolerance;
    let mut inserted: RTree<IndexedPoint> = RTree::new();
    for (index, point) in points.iter().enumerate() {
        let coords = [point.x, point.y];
        let coincident = if params.tolerance > 0.0 {
            inserted
                .locate_within_distance(coords, squared_tolerance)
                .next()
                .is_some()
        } else {
            inserted.locate_at_point(&coords).is_some()
        };
        if coincident {
            continue;
        }
        insert(&mut triangles, &vertices, index);
        inserted.insert(GeomWithData::new(coords, index));
    }

    triangles
        .into_iter()
        .filter(|triangle| triangle.corners.iter().all(|&corner| corner < first_super))
        .filter(|triangle| params.alpha <= 0.0 || triangle.radius() <= params.alpha)
        .map(|triangle| triangle.corners)
        .collect()
}

fn insert(triangles: &mut Vec<Triangle>, vertices: &[Vector2<f64>], index: usize) {
    let point = vertices[index];
    let (bad, good): (Vec<Triangle>, Vec<Triangle>) = triangles
        .drain(..)
        .partition(|triangle| triangle.encloses(&point));
    *triangles = good;

    let mut edge_uses: HashMap<(usize, usize), usize> = HashMap::new();
    for edge in bad.iter().flat_map(Triangle::edges) {
        *edge_uses.entry(undirected(edge)).or_default() += 1;
    }
    let boundary = bad
        .iter()
        .flat_map(Triangle::edges)
        .filter(|&edge| edge_uses.get(&undirected(edge)) == Some(&1));
    triangles.extend(boundary.filter_map(|(a, b)| Triangle::new([a, b, index], vertices)));
}

fn undirected((a, b): (usize, usize)) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn params() -> TriangulationParams {
        TriangulationParams {
            tolerance: 1e-6,
            offset: 1.0,
            alpha: 0.0,
        }
    }

    fn is_counter_clockwise(points: &[Vector2<f64>], [a, b, c]: [usize; 3]) -> bool {
        orientation(points[a], points[b], points[c]) == Orientation::CounterClockwise
    }

    #[rstest]
    fn three_points_form_one_triangle(params: TriangulationParams) {
        let points = [
            Vector2::new(0.0, 0.0),
            Vector2::new(0.0, 4.0),
            Vector2::new(3.0, 0.0),
        ];
        let triangles = triangulate(&points, params);
        assert_eq!(triangles.len(), 1);
        assert!(is_counter_clockwise(&points, triangles[0]));
    }

    #[rstest]
    fn collinear_points_yield_nothing(params: TriangulationParams) {
        let points: Vec<_> = (0..5)
            .map(|i| Vector2::new(f64::from(i), 2.0 * f64::from(i)))
            .collect();
        assert!(triangulate(&points, params).is_empty());
    }

    #[rstest]
    fn coincident_points_are_skipped(params: TriangulationParams) {
        let points = [
            Vector2::new(0.0, 0.0),
            Vector2::new(0.0, 0.0),
            Vector2::new(5.0, 0.0),
            Vector2::new(0.0, 5.0),
        ];
        let triangles = triangulate(&points, params);
        assert_eq!(triangles.len(), 1);
        assert!(triangles.iter().flatten().all(|&corner| corner != 1));
    }

    #[rstest]
    fn interior_point_splits_the_hull(params: TriangulationParams) {
        let points = [
            Vector2::new(0.0, 0.0),
            Vector2::new(10.0, 0.0),
            Vector2::new(4.0, 9.0),
            Vector2::new(4.0, 3.0),
        ];
        let triangles = triangulate(&points, params);
        assert_eq!(triangles.len(), 3);
        assert!(triangles.iter().all(|&t| is_counter_clockwise(&points, t)));
        assert!(triangles.iter().all(|t| t.contains(&3)));
    }

    #[rstest]
    fn alpha_drops_large_triangles(params: TriangulationParams) {
        let points = [
            Vector2::new(0.0, 0.0),
            Vector2::new(0.0, 40.0),
            Vector2::new(30.0, 0.0),
        ];
        let tight = TriangulationParams {
            alpha: 10.0,
            ..params
        };
        assert!(triangulate(&points, tight).is_empty());
        let loose = TriangulationParams {
            alpha: 26.0,
            ..params
        };
        assert_eq!(triangulate(&points, loose).len(), 1);
    }

    #[rstest]
    fn circumcircle_of_right_triangle_sits_on_hypotenuse() {
        let (centre, radius_sq) = circumcircle(
            Vector2::new(0.0, 0.0),
            Vector2::new(6.0, 0.0),
            Vector2::new(0.0, 8.0),
        )
        .expect("non-degenerate");
        assert_eq!(centre, Vector2::new(3.0, 4.0));
        assert_eq!(radius_sq, 25.0);
    }
}
