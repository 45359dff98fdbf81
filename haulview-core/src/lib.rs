//! Core domain types for the Haulview survey engine.
//!
//! The crate models the three geometric entity kinds captured by a mine
//! survey (haul-road polylines, named waypoints and terrain contour
//! surfaces), the in-memory [`EntityStore`] that owns them, and the
//! configuration values consumed by surface reconstruction and rendering.
//!
//! Nothing here performs I/O. Parsing and persistence live in
//! `haulview-data`; mesh construction lives in `haulview-surface`.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};

pub mod mesh;
pub mod point;
pub mod polyline;
pub mod presentation;
pub mod profile;
pub mod store;
pub mod surface;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use mesh::SurfaceMesh;
pub use point::{Waypoint, WaypointRecord};
pub use polyline::{Polyline, PolylineVertex, VertexAttributes, gradient};
pub use presentation::{PresentationCfg, PresentationError, Rgb};
pub use profile::{ProfileError, ProjectionPlane, ReconstructionProfile, UnknownProjectionPlane};
pub use store::{EntityBatch, EntityError, EntityKind, EntityStore, IngestMode, ParsedBatch};
pub use surface::Surface;

/// A location in survey space.
///
/// `x` and `y` are planar easting/northing values, `z` is elevation. All
/// three share the survey's linear unit.
///
/// # Examples
/// ```
/// use haulview_core::Position;
///
/// let a = Position::new(0.0, 0.0, 0.0);
/// let b = Position::new(3.0, 4.0, 12.0);
/// assert_eq!(a.planar_distance(&b), 5.0);
/// assert_eq!(a.distance(&b), 13.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Easting.
    pub x: f64,
    /// Northing.
    pub y: f64,
    /// Elevation.
    pub z: f64,
}

impl Position {
    /// Construct a position from its three components.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Return the position with each component rounded to three decimals.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            x: round3(self.x),
            y: round3(self.y),
            z: round3(self.z),
        }
    }

    /// Drop the elevation, keeping the planar coordinate.
    #[must_use]
    pub const fn planar(&self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }

    /// Horizontal distance to `other`, ignoring elevation.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "planar distance is a difference of coordinates"
    )]
    pub fn planar_distance(&self, other: &Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Straight-line distance to `other` in three dimensions.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "slope distance combines planar and vertical deltas"
    )]
    pub fn distance(&self, other: &Self) -> f64 {
        self.planar_distance(other).hypot(other.z - self.z)
    }

    /// Report whether every component is finite.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Components as an array, in `x, y, z` order.
    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Position {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Round `value` to three decimal places.
///
/// Survey files carry millimetre precision; coordinates, gradients and
/// lengths are all normalised through this helper.
///
/// # Examples
/// ```
/// assert_eq!(haulview_core::round3(1.23456), 1.235);
/// assert_eq!(haulview_core::round3(-0.0004), -0.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "decimal rounding scales, rounds and rescales"
)]
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Grow `bounds` so it covers `coord`.
///
/// Returns a degenerate rectangle when `bounds` is empty.
#[must_use]
pub fn include_coord(bounds: Option<Rect<f64>>, coord: Coord<f64>) -> Option<Rect<f64>> {
    if !(coord.x.is_finite() && coord.y.is_finite()) {
        return bounds;
    }
    let grown = match bounds {
        Some(existing) => Rect::new(
            Coord {
                x: existing.min().x.min(coord.x),
                y: existing.min().y.min(coord.y),
            },
            Coord {
                x: existing.max().x.max(coord.x),
                y: existing.max().y.max(coord.y),
            },
        ),
        None => Rect::new(coord, coord),
    };
    Some(grown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1.0004, 1.0)]
    #[case(2.34567, 2.346)]
    #[case(-5.55555, -5.556)]
    #[case(10.0, 10.0)]
    fn rounds_to_three_decimals(#[case] value: f64, #[case] expected: f64) {
        assert_eq!(round3(value), expected);
    }

    #[rstest]
    fn bounds_grow_to_cover_coordinates() {
        let first = include_coord(None, Coord { x: 1.0, y: 2.0 });
        let grown = include_coord(first, Coord { x: -1.0, y: 5.0 }).expect("bounds");
        assert_eq!(grown.min(), Coord { x: -1.0, y: 2.0 });
        assert_eq!(grown.max(), Coord { x: 1.0, y: 5.0 });
    }

    #[rstest]
    fn bounds_ignore_non_finite_coordinates() {
        let bounds = include_coord(None, Coord { x: f64::NAN, y: 0.0 });
        assert!(bounds.is_none());
    }

    #[rstest]
    fn rounded_position_normalises_each_component() {
        let position = Position::new(1.23449, 2.0001, -3.9996).rounded();
        assert_eq!(position, Position::new(1.234, 2.0, -4.0));
    }
}
