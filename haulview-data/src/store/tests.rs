//! Unit tests for the persistence gateway.

use camino::Utf8PathBuf;
use haulview_core::{
    EntityKind, EntityStore, IngestMode, ParsedBatch, Position, VertexAttributes,
    test_support::sample_store,
};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

struct TempStore {
    _dir: TempDir,
    gateway: PersistenceGateway,
}

#[fixture]
fn temp_store() -> TempStore {
    let dir = TempDir::new().expect("create temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
    TempStore {
        gateway: PersistenceGateway::new(root.join("nested/survey.db")),
        _dir: dir,
    }
}

#[rstest]
fn saving_an_empty_kind_is_rejected(temp_store: TempStore) {
    let error = temp_store
        .gateway
        .save(&EntityStore::new(), EntityKind::Surface)
        .expect_err("empty dataset");
    assert!(matches!(
        error,
        StoreError::EmptyDataset {
            kind: EntityKind::Surface
        }
    ));
    assert!(!temp_store.gateway.table_exists("surfaces"));
}

#[rstest]
fn saved_entities_load_back_in_id_order(temp_store: TempStore) {
    let store = sample_store();
    for kind in EntityKind::ALL {
        temp_store.gateway.save(&store, kind).expect("save kind");
    }

    let snapshot = temp_store.gateway.load().expect("load store");
    let polylines = snapshot.polylines.expect("polylines table");
    assert_eq!(polylines, store.polylines().cloned().collect::<Vec<_>>());
    let points = snapshot.points.expect("points table");
    assert_eq!(points, store.points().cloned().collect::<Vec<_>>());
    let surfaces = snapshot.surfaces.expect("surfaces table");
    assert_eq!(surfaces.len(), 3);
    assert_eq!(surfaces[2].vertices, store.surface(3).expect("surface 3").vertices);
}

#[rstest]
fn saving_replaces_the_whole_table(temp_store: TempStore) {
    let mut store = sample_store();
    temp_store
        .gateway
        .save(&store, EntityKind::Polyline)
        .expect("first save");
    store.ingest(
        ParsedBatch::Polylines(vec![vec![haulview_core::PolylineVertex::new(
            Position::new(1.0, 1.0, 1.0),
        )]]),
        IngestMode::NewSession,
    );
    let rows = temp_store
        .gateway
        .save(&store, EntityKind::Polyline)
        .expect("second save");
    assert_eq!(rows, 1);
    assert_eq!(temp_store.gateway.row_count("polylines").expect("count"), 1);
}

#[rstest]
fn vertex_attributes_survive_persistence(temp_store: TempStore) {
    let mut store = sample_store();
    let polyline = store.polyline_mut(1).expect("polyline 1");
    polyline.set_tonne(42.5);
    polyline.vertices[1].attributes = VertexAttributes {
        rimpull: Some(3.0),
        ..VertexAttributes::default()
    };
    temp_store
        .gateway
        .save(&store, EntityKind::Polyline)
        .expect("save polylines");

    let snapshot = temp_store.gateway.load().expect("load");
    let loaded = &snapshot.polylines.expect("polylines")[0];
    assert_eq!(loaded.tonne(), Some(42.5));
    assert_eq!(loaded.route(), Some("R1"));
    assert_eq!(loaded.vertices[1].attributes.rimpull, Some(3.0));
    assert!(snapshot.points.is_none());
}

#[rstest]
fn probing_a_missing_store_does_not_create_it(temp_store: TempStore) {
    assert!(!temp_store.gateway.table_exists("polylines"));
    assert_eq!(temp_store.gateway.row_count("polylines").expect("count"), 0);
    assert!(!temp_store.gateway.path().exists());
    assert!(matches!(
        temp_store.gateway.load(),
        Err(StoreError::Open { .. })
    ));
}

#[rstest]
fn snapshot_restores_ids_and_counters(temp_store: TempStore) {
    let mut store = sample_store();
    store.ingest(
        ParsedBatch::Points(vec![haulview_core::WaypointRecord::new(
            Position::default(),
            "Workshop",
        )]),
        IngestMode::Append,
    );
    temp_store
        .gateway
        .save(&store, EntityKind::Point)
        .expect("save points");

    let mut restored = EntityStore::new();
    let batches = temp_store
        .gateway
        .load()
        .expect("load")
        .into_store(&mut restored);
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].ids, vec![1, 2]);
    assert_eq!(restored.next_id(EntityKind::Point), 3);
    assert!(!restored.has_any(EntityKind::Polyline));
}
