//! Fixture builders shared by unit and behaviour tests across the workspace.

use crate::{EntityStore, IngestMode, ParsedBatch, PolylineVertex, Position, WaypointRecord};

/// Build a contour ring of `segments` vertices around `(cx, cy)` at
/// elevation `z`.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "ring vertices are placed by angle"
)]
pub fn contour_ring(cx: f64, cy: f64, radius: f64, z: f64, segments: usize) -> Vec<Position> {
    (0..segments)
        .map(|index| {
            let angle = std::f64::consts::TAU * index as f64 / segments as f64;
            Position::new(cx + radius * angle.cos(), cy + radius * angle.sin(), z)
        })
        .collect()
}

/// Concentric contour rings describing a small hill: each ring is smaller
/// and higher than the last.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "ring radius and elevation step with the level"
)]
pub fn hill_contours(levels: usize) -> Vec<Vec<Position>> {
    (0..levels)
        .map(|level| {
            let step = level as f64;
            contour_ring(0.0, 0.0, 50.0 - step * 10.0, 100.0 + step * 5.0, 16)
        })
        .collect()
}

/// Build a polyline vertex chain from `(x, y, z)` triples, tagging the first
/// vertex with `route`.
#[must_use]
pub fn route_chain(route: &str, points: &[(f64, f64, f64)]) -> Vec<PolylineVertex> {
    points
        .iter()
        .enumerate()
        .map(|(index, &(x, y, z))| {
            let vertex = PolylineVertex::new(Position::new(x, y, z));
            if index == 0 {
                vertex.with_route(route)
            } else {
                vertex
            }
        })
        .collect()
}

/// A store holding two routed polylines, one waypoint and three contours.
#[must_use]
pub fn sample_store() -> EntityStore {
    let mut store = EntityStore::new();
    store.ingest(
        ParsedBatch::Polylines(vec![
            route_chain("R1", &[(0.0, 0.0, 100.0), (30.0, 40.0, 105.0)]),
            route_chain("R2", &[(50.0, 0.0, 100.0), (50.0, 20.0, 98.0), (70.0, 20.0, 98.0)]),
        ]),
        IngestMode::NewSession,
    );
    store.ingest(
        ParsedBatch::Points(vec![WaypointRecord::new(
            Position::new(10.0, 10.0, 101.0),
            "Crusher",
        )]),
        IngestMode::Append,
    );
    store.ingest(ParsedBatch::Surfaces(hill_contours(3)), IngestMode::Append);
    store
}
