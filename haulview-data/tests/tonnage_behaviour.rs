//! Behavioural tests for period tonnage aggregation.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use haulview_core::{EntityStore, IngestMode, ParsedBatch, test_support::route_chain};
use haulview_data::{PeriodCursor, RouteMatch, TonnageAggregator};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

struct TonnageWorld {
    _dir: TempDir,
    root: Utf8PathBuf,
    aggregator: TonnageAggregator,
    cursor: RefCell<PeriodCursor>,
    store: RefCell<EntityStore>,
}

#[fixture]
fn world() -> TonnageWorld {
    let dir = TempDir::new().expect("create temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
    let mut store = EntityStore::new();
    store.ingest(
        ParsedBatch::Polylines(vec![
            route_chain("R1", &[(0.0, 0.0, 0.0), (5.0, 0.0, 1.0)]),
            route_chain("R12", &[(0.0, 5.0, 0.0), (5.0, 5.0, 1.0)]),
        ]),
        IngestMode::NewSession,
    );
    TonnageWorld {
        aggregator: TonnageAggregator::new(root.join("survey.db")),
        root,
        _dir: dir,
        cursor: RefCell::new(PeriodCursor::default()),
        store: RefCell::new(store),
    }
}

#[given("routes and tonnage imported for {periods} periods")]
fn given_sources(world: &TonnageWorld, periods: u32) {
    let routes = world.root.join("routes.txt");
    let tonnes = world.root.join("tonnes.csv");
    std::fs::write(&routes, "HAUL-A,R1,R2\nHAUL-B,R12\n").expect("write routes");
    let rows: String = (1..=periods)
        .map(|period| format!("{period},HAUL-A,100\n{period},HAUL-B,40\n"))
        .collect();
    std::fs::write(&tonnes, rows).expect("write tonnes");
    world.aggregator.import_routes(&routes).expect("import routes");
    world.aggregator.import_tonnes(&tonnes).expect("import tonnes");
}

#[when("the joined tonnage table is built")]
fn when_built(world: &TonnageWorld) {
    world.aggregator.build().expect("build joined table");
    let max = world.aggregator.max_period().expect("max period");
    world.cursor.replace(PeriodCursor::new(max));
}

#[when("the period cursor steps back from the first period")]
fn when_step_back(world: &TonnageWorld) {
    world.cursor.borrow_mut().previous();
}

#[when("period {period} is applied with token matching")]
fn when_applied(world: &TonnageWorld, period: u32) {
    world
        .aggregator
        .apply_period(period, &mut world.store.borrow_mut(), RouteMatch::Token)
        .expect("apply period");
}

#[then("the cursor points at period {period}")]
fn then_cursor(world: &TonnageWorld, period: u32) {
    assert_eq!(world.cursor.borrow().current(), period);
}

#[then("polyline {id} carries {tonnes} tonnes")]
fn then_tonnes(world: &TonnageWorld, id: u64, tonnes: f64) {
    let store = world.store.borrow();
    let polyline = store.polyline(id).expect("polyline exists");
    assert_eq!(polyline.tonne(), Some(tonnes));
}

#[scenario(path = "tests/features/tonnage.feature", index = 0)]
fn cursor_wraps(world: TonnageWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/tonnage.feature", index = 1)]
fn token_matching(world: TonnageWorld) {
    let _ = world;
}
