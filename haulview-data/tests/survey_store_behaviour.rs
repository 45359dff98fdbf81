//! Behavioural tests for reading survey files and persisting them.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use haulview_core::{EntityKind, EntityStore, IngestMode};
use haulview_data::{PersistenceGateway, SourceFormat, read_file};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

struct SurveyWorld {
    _dir: TempDir,
    root: Utf8PathBuf,
    inputs: RefCell<Vec<(Utf8PathBuf, SourceFormat)>>,
    store: RefCell<EntityStore>,
    restored: RefCell<EntityStore>,
}

impl SurveyWorld {
    fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
        Self {
            _dir: dir,
            root,
            inputs: RefCell::new(Vec::new()),
            store: RefCell::new(EntityStore::new()),
            restored: RefCell::new(EntityStore::new()),
        }
    }

    fn gateway(&self) -> PersistenceGateway {
        PersistenceGateway::new(self.root.join("db/survey.db"))
    }

    fn add_input(&self, name: &str, contents: &str, format: SourceFormat) {
        let path = self.root.join(name);
        std::fs::write(&path, contents).expect("write input");
        self.inputs.borrow_mut().push((path, format));
    }
}

#[fixture]
fn world() -> SurveyWorld {
    SurveyWorld::new()
}

fn chains(count: usize) -> String {
    (0..count)
        .map(|index| format!("{index} 0 100\n{index} 10 101.5\n$\n"))
        .collect()
}

#[given("a polyline text file with {count} polylines")]
fn given_polylines(world: &SurveyWorld, count: usize) {
    world.add_input("roads.xyz", &chains(count), SourceFormat::PolylineText);
}

#[given("a contour text file with {count} contours")]
fn given_contours(world: &SurveyWorld, count: usize) {
    world.add_input("terrain.srg", &chains(count), SourceFormat::SurfaceText);
}

#[given("no survey store on disk")]
fn given_no_store(world: &SurveyWorld) {
    assert!(!world.gateway().path().exists());
}

#[when("both files are read into a new session")]
fn when_read(world: &SurveyWorld) {
    let mut store = world.store.borrow_mut();
    for (index, (path, format)) in world.inputs.borrow().iter().enumerate() {
        let parsed = read_file(path, *format).expect("read survey file");
        let mode = if index == 0 {
            IngestMode::NewSession
        } else {
            IngestMode::Append
        };
        store.ingest(parsed, mode);
    }
}

#[when("every kind is saved to the survey store")]
fn when_saved(world: &SurveyWorld) {
    let store = world.store.borrow();
    for kind in [EntityKind::Polyline, EntityKind::Surface] {
        world.gateway().save(&store, kind).expect("save kind");
    }
}

#[when("the survey store is loaded into a fresh entity store")]
fn when_loaded(world: &SurveyWorld) {
    let snapshot = world.gateway().load().expect("load store");
    snapshot.into_store(&mut world.restored.borrow_mut());
}

#[then("the fresh store holds {polylines} polylines and {contours} contours")]
fn then_counts(world: &SurveyWorld, polylines: usize, contours: usize) {
    let restored = world.restored.borrow();
    assert_eq!(restored.count(EntityKind::Polyline), polylines);
    assert_eq!(restored.count(EntityKind::Surface), contours);
    let original = world.store.borrow();
    assert_eq!(
        restored.polylines().collect::<Vec<_>>(),
        original.polylines().collect::<Vec<_>>()
    );
}

#[then("the next polyline identifier is {id}")]
fn then_next_id(world: &SurveyWorld, id: u64) {
    assert_eq!(world.restored.borrow().next_id(EntityKind::Polyline), id);
}

#[then("the survey store reports no polylines table")]
fn then_no_table(world: &SurveyWorld) {
    assert!(!world.gateway().table_exists("polylines"));
}

#[then("the survey store file was not created")]
fn then_not_created(world: &SurveyWorld) {
    assert!(!world.gateway().path().exists());
}

#[scenario(path = "tests/features/survey_store.feature", index = 0)]
fn survey_round_trip(world: SurveyWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/survey_store.feature", index = 1)]
fn probing_missing_store(world: SurveyWorld) {
    let _ = world;
}
