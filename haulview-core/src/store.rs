//! In-memory entity collection with session-scoped identifier counters.
//!
//! [`EntityStore`] is the single owner of every polyline, waypoint and
//! contour loaded in a session. Identifiers are assigned here, never by the
//! readers, so that append ingestion continues from the last id handed out
//! and a new session restarts every counter at 1.
//!
//! The store is not synchronised. Callers serialise ingestion, aggregation
//! and reconstruction against a given instance.

use std::collections::BTreeMap;
use std::fmt;

use geo::Rect;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::polyline::assign_gradients;
use crate::{Polyline, PolylineVertex, Position, Surface, Waypoint, WaypointRecord, include_coord};

/// The three entity kinds held by an [`EntityStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Haul-road polylines.
    Polyline,
    /// Named waypoints.
    Point,
    /// Terrain contour lines.
    Surface,
}

impl EntityKind {
    /// Every kind, in presentation order.
    pub const ALL: [Self; 3] = [Self::Polyline, Self::Point, Self::Surface];

    /// Return the kind as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Polyline => "polyline",
            Self::Point => "point",
            Self::Surface => "surface",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an ingestion interacts with what the store already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngestMode {
    /// Clear every entity and restart all counters at 1.
    #[default]
    NewSession,
    /// Keep existing entities and continue from the current counters.
    Append,
}

/// Errors raised when constructing entities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityError {
    /// A polyline was supplied without vertices.
    #[error("polyline {id} has no vertices")]
    EmptyPolyline {
        /// Identifier of the rejected polyline.
        id: u64,
    },
    /// A contour was supplied without vertices.
    #[error("surface {id} has no vertices")]
    EmptySurface {
        /// Identifier of the rejected contour.
        id: u64,
    },
}

/// Entity geometry produced by a reader, before identifiers are assigned.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBatch {
    /// Vertex chains for polylines. Gradients are recomputed on ingest.
    Polylines(Vec<Vec<PolylineVertex>>),
    /// Waypoint records.
    Points(Vec<WaypointRecord>),
    /// Vertex chains for contours.
    Surfaces(Vec<Vec<Position>>),
}

impl ParsedBatch {
    /// Kind of entity carried by the batch.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Polylines(_) => EntityKind::Polyline,
            Self::Points(_) => EntityKind::Point,
            Self::Surfaces(_) => EntityKind::Surface,
        }
    }

    /// Number of entities in the batch, counting only non-empty chains.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Polylines(chains) => chains.iter().filter(|chain| !chain.is_empty()).count(),
            Self::Points(records) => records.len(),
            Self::Surfaces(chains) => chains.iter().filter(|chain| !chain.is_empty()).count(),
        }
    }

    /// Report whether the batch would add nothing to a store.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Summary of the entities added by one ingestion.
///
/// Presentation layers use the id list to build handles for the new
/// entities and the bounds to frame them.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityBatch {
    /// Kind of entity that was added.
    pub kind: EntityKind,
    /// Identifiers assigned, in ascending order.
    pub ids: Vec<u64>,
    /// Planar bounding box of every added vertex.
    pub bounds: Option<Rect<f64>>,
}

impl EntityBatch {
    /// Start an empty summary for `kind`.
    #[must_use]
    pub const fn empty(kind: EntityKind) -> Self {
        Self {
            kind,
            ids: Vec::new(),
            bounds: None,
        }
    }

    /// Record an added entity and grow the bounds over its vertices.
    pub fn record(&mut self, id: u64, positions: impl IntoIterator<Item = Position>) {
        self.ids.push(id);
        for position in positions {
            self.bounds = include_coord(self.bounds, position.planar());
        }
    }

    /// Number of entities added.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Report whether nothing was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Lowest identifier assigned.
    #[must_use]
    pub fn first_id(&self) -> Option<u64> {
        self.ids.first().copied()
    }

    /// Highest identifier assigned.
    #[must_use]
    pub fn last_id(&self) -> Option<u64> {
        self.ids.last().copied()
    }
}

/// Authoritative in-memory collection of survey entities.
///
/// # Examples
/// ```
/// use haulview_core::{EntityKind, EntityStore, IngestMode, ParsedBatch, Position};
///
/// let mut store = EntityStore::new();
/// let contours = ParsedBatch::Surfaces(vec![
///     vec![Position::new(0.0, 0.0, 5.0)],
///     Vec::new(),
///     vec![Position::new(1.0, 1.0, 6.0)],
/// ]);
/// let batch = store.ingest(contours, IngestMode::NewSession);
///
/// assert_eq!(batch.ids, vec![1, 2]);
/// assert_eq!(store.count(EntityKind::Surface), 2);
/// assert!(store.surface(2).is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EntityStore {
    polylines: BTreeMap<u64, Polyline>,
    points: BTreeMap<u64, Waypoint>,
    surfaces: BTreeMap<u64, Surface>,
    next_polyline_id: u64,
    next_point_id: u64,
    next_surface_id: u64,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Construct an empty store with every counter at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            polylines: BTreeMap::new(),
            points: BTreeMap::new(),
            surfaces: BTreeMap::new(),
            next_polyline_id: 1,
            next_point_id: 1,
            next_surface_id: 1,
        }
    }

    /// Drop every entity and reset all counters to 1.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Add parsed entities, assigning identifiers from the kind's counter.
    ///
    /// Empty vertex chains are discarded before an identifier is assigned,
    /// so identifiers never have gaps. Polyline gradients are recomputed
    /// from the vertex positions.
    pub fn ingest(&mut self, parsed: ParsedBatch, mode: IngestMode) -> EntityBatch {
        if mode == IngestMode::NewSession {
            self.clear();
        }

        let mut batch = EntityBatch::empty(parsed.kind());
        match parsed {
            ParsedBatch::Polylines(chains) => {
                for mut vertices in chains.into_iter().filter(|chain| !chain.is_empty()) {
                    assign_gradients(&mut vertices);
                    let id = take_id(&mut self.next_polyline_id);
                    batch.record(id, vertices.iter().map(|vertex| vertex.position));
                    self.polylines.insert(id, Polyline { id, vertices });
                }
            }
            ParsedBatch::Points(records) => {
                for record in records {
                    let id = take_id(&mut self.next_point_id);
                    batch.record(id, [record.position]);
                    self.points.insert(id, record.into_waypoint(id));
                }
            }
            ParsedBatch::Surfaces(chains) => {
                for vertices in chains.into_iter().filter(|chain| !chain.is_empty()) {
                    let id = take_id(&mut self.next_surface_id);
                    batch.record(id, vertices.iter().copied());
                    self.surfaces.insert(id, Surface { id, vertices });
                }
            }
        }
        batch
    }

    /// Insert a polyline under its existing identifier.
    ///
    /// Used when restoring persisted entities. An entity with the same id is
    /// replaced, and the counter advances past the inserted id.
    pub fn insert_polyline(&mut self, polyline: Polyline) {
        advance_past(&mut self.next_polyline_id, polyline.id);
        self.polylines.insert(polyline.id, polyline);
    }

    /// Insert a waypoint under its existing identifier.
    pub fn insert_point(&mut self, point: Waypoint) {
        advance_past(&mut self.next_point_id, point.id);
        self.points.insert(point.id, point);
    }

    /// Insert a contour under its existing identifier.
    pub fn insert_surface(&mut self, surface: Surface) {
        advance_past(&mut self.next_surface_id, surface.id);
        self.surfaces.insert(surface.id, surface);
    }

    /// Look up a polyline.
    #[must_use]
    pub fn polyline(&self, id: u64) -> Option<&Polyline> {
        self.polylines.get(&id)
    }

    /// Look up a polyline for mutation.
    pub fn polyline_mut(&mut self, id: u64) -> Option<&mut Polyline> {
        self.polylines.get_mut(&id)
    }

    /// Look up a waypoint.
    #[must_use]
    pub fn point(&self, id: u64) -> Option<&Waypoint> {
        self.points.get(&id)
    }

    /// Look up a contour.
    #[must_use]
    pub fn surface(&self, id: u64) -> Option<&Surface> {
        self.surfaces.get(&id)
    }

    /// Polylines in ascending id order.
    pub fn polylines(&self) -> impl Iterator<Item = &Polyline> + '_ {
        self.polylines.values()
    }

    /// Mutable polylines in ascending id order.
    pub fn polylines_mut(&mut self) -> impl Iterator<Item = &mut Polyline> + '_ {
        self.polylines.values_mut()
    }

    /// Waypoints in ascending id order.
    pub fn points(&self) -> impl Iterator<Item = &Waypoint> + '_ {
        self.points.values()
    }

    /// Contours in ascending id order.
    pub fn surfaces(&self) -> impl Iterator<Item = &Surface> + '_ {
        self.surfaces.values()
    }

    /// Number of entities of `kind`.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Polyline => self.polylines.len(),
            EntityKind::Point => self.points.len(),
            EntityKind::Surface => self.surfaces.len(),
        }
    }

    /// Report whether any entity of `kind` is held.
    #[must_use]
    pub fn has_any(&self, kind: EntityKind) -> bool {
        self.count(kind) > 0
    }

    /// Identifier the next ingested entity of `kind` will receive.
    #[must_use]
    pub const fn next_id(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::Polyline => self.next_polyline_id,
            EntityKind::Point => self.next_point_id,
            EntityKind::Surface => self.next_surface_id,
        }
    }
}

fn take_id(counter: &mut u64) -> u64 {
    let id = *counter;
    *counter = counter.saturating_add(1);
    id
}

fn advance_past(counter: &mut u64, id: u64) {
    *counter = (*counter).max(id.saturating_add(1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    fn chain(points: &[(f64, f64, f64)]) -> Vec<PolylineVertex> {
        points
            .iter()
            .map(|&(x, y, z)| PolylineVertex::new(Position::new(x, y, z)))
            .collect()
    }

    #[fixture]
    fn two_polylines() -> ParsedBatch {
        ParsedBatch::Polylines(vec![
            chain(&[(0.0, 0.0, 0.0), (3.0, 4.0, 10.0)]),
            chain(&[(10.0, 10.0, 1.0)]),
        ])
    }

    #[rstest]
    fn new_session_assigns_ids_from_one(two_polylines: ParsedBatch) {
        let mut store = EntityStore::new();
        let batch = store.ingest(two_polylines, IngestMode::NewSession);
        assert_eq!(batch.ids, vec![1, 2]);
        assert_eq!(store.next_id(EntityKind::Polyline), 3);
        let first = store.polyline(1).expect("polyline 1");
        assert_eq!(first.vertices[1].gradient, 200.0);
    }

    #[rstest]
    fn append_continues_from_current_counter(two_polylines: ParsedBatch) {
        let mut store = EntityStore::new();
        store.ingest(two_polylines.clone(), IngestMode::NewSession);
        let appended = store.ingest(two_polylines, IngestMode::Append);
        assert_eq!(appended.ids, vec![3, 4]);
        assert_eq!(store.count(EntityKind::Polyline), 4);
    }

    #[rstest]
    fn new_session_resets_every_kind(two_polylines: ParsedBatch) {
        let mut store = EntityStore::new();
        store.ingest(two_polylines.clone(), IngestMode::NewSession);
        store.ingest(
            ParsedBatch::Points(vec![WaypointRecord::new(Position::default(), "P")]),
            IngestMode::Append,
        );
        let batch = store.ingest(two_polylines, IngestMode::NewSession);
        assert_eq!(batch.ids, vec![1, 2]);
        assert!(!store.has_any(EntityKind::Point));
        assert_eq!(store.next_id(EntityKind::Point), 1);
    }

    #[rstest]
    fn empty_chains_are_discarded_without_consuming_ids() {
        let mut store = EntityStore::new();
        let batch = store.ingest(
            ParsedBatch::Polylines(vec![Vec::new(), Vec::new()]),
            IngestMode::NewSession,
        );
        assert!(batch.is_empty());
        assert!(!store.has_any(EntityKind::Polyline));
        assert_eq!(store.next_id(EntityKind::Polyline), 1);
    }

    #[rstest]
    fn batch_bounds_cover_all_vertices(two_polylines: ParsedBatch) {
        let mut store = EntityStore::new();
        let batch = store.ingest(two_polylines, IngestMode::NewSession);
        let bounds = batch.bounds.expect("bounds");
        assert_eq!(bounds.min().x, 0.0);
        assert_eq!(bounds.max().y, 10.0);
    }

    #[rstest]
    fn restored_entities_advance_counters() {
        let mut store = EntityStore::new();
        store.insert_surface(Surface {
            id: 7,
            vertices: vec![Position::default()],
        });
        assert_eq!(store.next_id(EntityKind::Surface), 8);
        let batch = store.ingest(
            ParsedBatch::Surfaces(vec![vec![Position::default()]]),
            IngestMode::Append,
        );
        assert_eq!(batch.ids, vec![8]);
    }

    proptest! {
        #[test]
        fn appended_ids_are_contiguous(sizes in proptest::collection::vec(0usize..6, 1..6)) {
            let mut store = EntityStore::new();
            let mut expected_next = 1u64;
            for size in sizes {
                let records = (0..size)
                    .map(|_| WaypointRecord::new(Position::default(), "P"))
                    .collect();
                let batch = store.ingest(ParsedBatch::Points(records), IngestMode::Append);
                let expected: Vec<u64> = (expected_next..expected_next + size as u64).collect();
                prop_assert_eq!(batch.ids, expected);
                expected_next += size as u64;
            }
            prop_assert_eq!(store.next_id(EntityKind::Point), expected_next);
        }
    }
}
