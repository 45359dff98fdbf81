//! Haul-road polylines and their per-vertex attributes.
//!
//! A polyline is an ordered chain of survey vertices. Each vertex carries a
//! derived gradient, an optional route key used for tonnage aggregation, and
//! a fixed set of optional haulage attributes.

use serde::{Deserialize, Serialize};

use crate::{Position, round3};

/// Optional haulage attributes attached to a polyline vertex.
///
/// The six slots map one-to-one onto the `attr_1..attr_6` columns of the
/// persisted `polylines` table, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VertexAttributes {
    /// Maximum travel speed along the segment.
    pub max_speed: Option<f64>,
    /// Rolling resistance of the road surface, in percent.
    pub rolling_resistance: Option<f64>,
    /// Posted speed limit.
    pub speed_limit: Option<f64>,
    /// Speed at which trucks start braking.
    pub braking_speed: Option<f64>,
    /// Rimpull available on the segment.
    pub rimpull: Option<f64>,
    /// Retarder effort on downhill segments.
    pub retarder: Option<f64>,
}

impl VertexAttributes {
    /// Number of persisted attribute columns.
    pub const COLUMNS: usize = 6;

    /// Attribute values in column order.
    #[must_use]
    pub const fn to_columns(&self) -> [Option<f64>; Self::COLUMNS] {
        [
            self.max_speed,
            self.rolling_resistance,
            self.speed_limit,
            self.braking_speed,
            self.rimpull,
            self.retarder,
        ]
    }

    /// Rebuild attributes from values in column order.
    #[must_use]
    pub const fn from_columns(columns: [Option<f64>; Self::COLUMNS]) -> Self {
        let [
            max_speed,
            rolling_resistance,
            speed_limit,
            braking_speed,
            rimpull,
            retarder,
        ] = columns;
        Self {
            max_speed,
            rolling_resistance,
            speed_limit,
            braking_speed,
            rimpull,
            retarder,
        }
    }

    /// Report whether no attribute is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_columns().iter().all(Option::is_none)
    }
}

/// One vertex of a [`Polyline`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolylineVertex {
    /// Survey position.
    pub position: Position,
    /// Slope from the previous vertex, in percent. Always `0.0` for the
    /// first vertex.
    pub gradient: f64,
    /// Route key matched against aggregated tonnage segments.
    pub route: Option<String>,
    /// Tonnage hauled over the route for the active period.
    pub tonne: Option<f64>,
    /// Remaining haulage attributes.
    pub attributes: VertexAttributes,
}

impl PolylineVertex {
    /// Construct a vertex with no route, tonnage or attributes.
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Attach a route key, returning `self` for chaining.
    #[must_use]
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }
}

/// Percentage slope between two consecutive vertices, rounded to three
/// decimals.
///
/// Returns `0.0` when the vertices share the same planar location so a
/// vertical step never divides by zero.
///
/// # Examples
/// ```
/// use haulview_core::{Position, gradient};
///
/// let start = Position::new(0.0, 0.0, 0.0);
/// let end = Position::new(3.0, 4.0, 10.0);
/// assert_eq!(gradient(&start, &end), 200.0);
/// assert_eq!(gradient(&start, &Position::new(0.0, 0.0, 5.0)), 0.0);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "gradient is rise over run expressed as a percentage"
)]
pub fn gradient(previous: &Position, current: &Position) -> f64 {
    let run = previous.planar_distance(current);
    if run == 0.0 {
        return 0.0;
    }
    round3((current.z - previous.z) / run * 100.0)
}

/// Recompute the gradient of every vertex from its predecessor.
pub fn assign_gradients(vertices: &mut [PolylineVertex]) {
    let mut previous: Option<Position> = None;
    for vertex in vertices {
        vertex.gradient = previous.map_or(0.0, |prior| gradient(&prior, &vertex.position));
        previous = Some(vertex.position);
    }
}

/// An ordered chain of vertices identified within a session.
///
/// # Examples
/// ```
/// use haulview_core::{Polyline, PolylineVertex, Position};
///
/// let vertices = vec![
///     PolylineVertex::new(Position::new(0.0, 0.0, 0.0)),
///     PolylineVertex::new(Position::new(3.0, 4.0, 0.0)),
/// ];
/// let polyline = Polyline::new(1, vertices).expect("non-empty polyline");
/// assert_eq!(polyline.length(), 5.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    /// Session-unique identifier.
    pub id: u64,
    /// Vertices in survey order.
    pub vertices: Vec<PolylineVertex>,
}

impl Polyline {
    /// Validate and construct a polyline.
    ///
    /// Vertices are kept as supplied; gradients are not recomputed.
    pub fn new(id: u64, vertices: Vec<PolylineVertex>) -> Result<Self, crate::EntityError> {
        if vertices.is_empty() {
            return Err(crate::EntityError::EmptyPolyline { id });
        }
        Ok(Self { id, vertices })
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always `false` for a validated polyline.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Route key of the polyline, taken from its first vertex.
    #[must_use]
    pub fn route(&self) -> Option<&str> {
        self.vertices.first().and_then(|vertex| vertex.route.as_deref())
    }

    /// Tonnage recorded on the first vertex.
    #[must_use]
    pub fn tonne(&self) -> Option<f64> {
        self.vertices.first().and_then(|vertex| vertex.tonne)
    }

    /// Overwrite the tonnage recorded on the first vertex.
    pub fn set_tonne(&mut self, tonne: f64) {
        if let Some(first) = self.vertices.first_mut() {
            first.tonne = Some(tonne);
        }
    }

    /// Slope length along the chain, rounded to three decimals.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "length sums segment distances")]
    pub fn length(&self) -> f64 {
        let total: f64 = self
            .vertices
            .windows(2)
            .filter_map(|pair| match pair {
                [from, to] => Some(from.position.distance(&to.position)),
                _ => None,
            })
            .sum();
        round3(total)
    }

    /// Iterate over vertex positions.
    pub fn positions(&self) -> impl Iterator<Item = &Position> + '_ {
        self.vertices.iter().map(|vertex| &vertex.position)
    }
}
