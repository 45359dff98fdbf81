//! The survey workspace driven by presentation layers.

use camino::Utf8Path;
use haulview_core::{
    EntityBatch, EntityKind, EntityStore, IngestMode, Polyline, PresentationCfg,
    ReconstructionProfile, Surface, SurfaceMesh, Waypoint,
};
use haulview_data::{
    PeriodCursor, PeriodReport, PersistenceGateway, RouteMatch, SourceFormat, Table,
    TonnageAggregator, TonnageError, read_file,
};
use haulview_surface::SurfaceReconstructor;
use log::{debug, info};

use crate::WorkspaceError;

/// Owns the loaded survey together with its tonnage and presentation state.
///
/// Every call runs to completion on the caller's thread. Entities are
/// returned by reference and addressed by id; rendering handles stay with
/// the caller.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use haulview::{EntityKind, IngestMode, SourceFormat, Workspace};
///
/// let mut workspace = Workspace::new();
/// let batch = workspace.load_from_file(
///     Utf8Path::new("haul_roads.xyz"),
///     SourceFormat::PolylineText,
///     IngestMode::NewSession,
/// )?;
/// println!("loaded polylines {:?}", batch.ids);
/// workspace.save_to_store(Utf8Path::new("survey.db"), EntityKind::Polyline)?;
/// # Ok::<(), haulview::WorkspaceError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    store: EntityStore,
    presentation: PresentationCfg,
    tonnage: Option<TonnageAggregator>,
    cursor: PeriodCursor,
    route_match: RouteMatch,
}

impl Workspace {
    /// Create an empty workspace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `path` as `format` and add its entities to the store.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::Read`] when the file cannot be opened or a
    /// strict format holds a malformed token. The store is untouched on
    /// failure.
    pub fn load_from_file(
        &mut self,
        path: &Utf8Path,
        format: SourceFormat,
        mode: IngestMode,
    ) -> Result<EntityBatch, WorkspaceError> {
        let parsed = read_file(path, format)?;
        let batch = self.store.ingest(parsed, mode);
        info!(
            "loaded {} {} entities from {path} as {format}",
            batch.len(),
            batch.kind
        );
        Ok(batch)
    }

    /// Load `path`, choosing the reader from its extension.
    ///
    /// A `.db` file is loaded as a persisted store, which always starts a
    /// new session; other files yield a single batch.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::UnrecognisedFormat`] for unknown extensions
    /// and the errors of [`Self::load_from_file`] or
    /// [`Self::load_from_store`] otherwise.
    pub fn load_detected(
        &mut self,
        path: &Utf8Path,
        mode: IngestMode,
    ) -> Result<Vec<EntityBatch>, WorkspaceError> {
        if SourceFormat::is_store_path(path) {
            return self.load_from_store(path);
        }
        let format =
            SourceFormat::from_path(path).ok_or_else(|| WorkspaceError::UnrecognisedFormat {
                path: path.to_path_buf(),
            })?;
        Ok(vec![self.load_from_file(path, format, mode)?])
    }

    /// Replace the session with the contents of the store at `path`.
    ///
    /// Returns one batch per entity table present. When the store also holds
    /// a built `routes_tonnes` table it is attached for period navigation;
    /// otherwise any previously attached tonnage store is detached.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::Store`] when the store cannot be read.
    pub fn load_from_store(&mut self, path: &Utf8Path) -> Result<Vec<EntityBatch>, WorkspaceError> {
        let gateway = PersistenceGateway::new(path);
        let snapshot = gateway.load()?;
        let batches = snapshot.into_store(&mut self.store);
        if gateway.table_exists(Table::RoutesTonnes.name()) {
            self.attach_tonnage(path)?;
        } else {
            debug!("{path} has no routes_tonnes table; detaching period navigation");
            self.tonnage = None;
            self.cursor = PeriodCursor::default();
        }
        Ok(batches)
    }

    /// Replace the `kind` table of the store at `path` with the session's
    /// entities of that kind.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::Store`], including
    /// [`haulview_data::StoreError::EmptyDataset`] when nothing of `kind` is
    /// loaded.
    pub fn save_to_store(&self, path: &Utf8Path, kind: EntityKind) -> Result<usize, WorkspaceError> {
        Ok(PersistenceGateway::new(path).save(&self.store, kind)?)
    }

    /// Use the store at `path` for tonnage import and period navigation.
    ///
    /// Returns the highest period already built, or `0`.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::Tonnage`] when an existing store cannot be
    /// queried.
    pub fn attach_tonnage(&mut self, path: &Utf8Path) -> Result<u32, WorkspaceError> {
        let aggregator = TonnageAggregator::new(path);
        let max = aggregator.max_period()?;
        self.tonnage = Some(aggregator);
        self.cursor = PeriodCursor::new(max);
        Ok(max)
    }

    /// The attached tonnage aggregator, if any.
    #[must_use]
    pub const fn tonnage(&self) -> Option<&TonnageAggregator> {
        self.tonnage.as_ref()
    }

    fn aggregator(&self) -> Result<&TonnageAggregator, WorkspaceError> {
        self.tonnage.as_ref().ok_or(WorkspaceError::NoTonnageStore)
    }

    /// Import a route definition file into the attached store.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::NoTonnageStore`] when no store is attached
    /// and [`WorkspaceError::Tonnage`] for I/O or store failures.
    pub fn import_routes(&self, file: &Utf8Path) -> Result<usize, WorkspaceError> {
        Ok(self.aggregator()?.import_routes(file)?)
    }

    /// Import a tonnage file into the attached store.
    ///
    /// # Errors
    /// As for [`Self::import_routes`].
    pub fn import_tonnes(&self, file: &Utf8Path) -> Result<usize, WorkspaceError> {
        Ok(self.aggregator()?.import_tonnes(file)?)
    }

    /// Rebuild `routes_tonnes` and reset the period cursor to its range.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::Tonnage`] when either source table is
    /// missing.
    pub fn build_tonnage(&mut self) -> Result<usize, WorkspaceError> {
        let aggregator = self.aggregator()?;
        let rows = aggregator.build()?;
        let max = aggregator.max_period()?;
        self.cursor = PeriodCursor::new(max);
        Ok(rows)
    }

    /// Highest period available, or `0` before tonnage is built.
    #[must_use]
    pub const fn max_period(&self) -> u32 {
        self.cursor.max()
    }

    /// Period most recently selected.
    #[must_use]
    pub const fn current_period(&self) -> u32 {
        self.cursor.current()
    }

    /// Route matching rule applied by period updates.
    #[must_use]
    pub const fn route_match(&self) -> RouteMatch {
        self.route_match
    }

    /// Switch the route matching rule used by later period updates.
    pub const fn set_route_match(&mut self, route_match: RouteMatch) {
        self.route_match = route_match;
    }

    /// Apply `period` to every polyline.
    ///
    /// The current period only changes once the update has been applied.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::NoTonnageStore`] without an attached store
    /// and [`WorkspaceError::Tonnage`] for a period outside `1..=max`.
    pub fn set_period(&mut self, period: u32) -> Result<PeriodReport, WorkspaceError> {
        self.aggregator()?;
        let mut cursor = self.cursor;
        cursor.set(period)?;
        self.move_to(cursor)
    }

    /// Advance to the next period, wrapping after the last.
    ///
    /// # Errors
    /// As for [`Self::set_period`].
    pub fn next_period(&mut self) -> Result<PeriodReport, WorkspaceError> {
        self.aggregator()?;
        let mut cursor = self.cursor;
        cursor.next();
        self.move_to(cursor)
    }

    /// Step back to the previous period, wrapping before the first.
    ///
    /// # Errors
    /// As for [`Self::set_period`].
    pub fn previous_period(&mut self) -> Result<PeriodReport, WorkspaceError> {
        self.aggregator()?;
        let mut cursor = self.cursor;
        cursor.previous();
        self.move_to(cursor)
    }

    fn move_to(&mut self, cursor: PeriodCursor) -> Result<PeriodReport, WorkspaceError> {
        let period = cursor.current();
        if period == 0 {
            return Err(TonnageError::PeriodOutOfRange { period, max: 0 }.into());
        }
        let aggregator = self.tonnage.as_ref().ok_or(WorkspaceError::NoTonnageStore)?;
        let report = aggregator.apply_period(period, &mut self.store, self.route_match)?;
        self.cursor = cursor;
        Ok(report)
    }

    /// Triangulate every loaded contour with `profile`.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::Reconstruct`] for an invalid profile, when
    /// no contour is loaded, or when the contours are degenerate.
    pub fn reconstruct_surface(
        &self,
        profile: &ReconstructionProfile,
    ) -> Result<SurfaceMesh, WorkspaceError> {
        Ok(SurfaceReconstructor::new(*profile)?.reconstruct(&self.store)?)
    }

    /// Look up a polyline.
    #[must_use]
    pub fn polyline(&self, id: u64) -> Option<&Polyline> {
        self.store.polyline(id)
    }

    /// Look up a waypoint.
    #[must_use]
    pub fn point(&self, id: u64) -> Option<&Waypoint> {
        self.store.point(id)
    }

    /// Look up a contour.
    #[must_use]
    pub fn surface(&self, id: u64) -> Option<&Surface> {
        self.store.surface(id)
    }

    /// The underlying entity store.
    #[must_use]
    pub const fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Drop every loaded entity and reset identifiers.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Current presentation settings.
    #[must_use]
    pub const fn presentation(&self) -> &PresentationCfg {
        &self.presentation
    }

    /// Replace the presentation settings.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::Presentation`] when a value is out of
    /// range; the previous settings are kept.
    pub fn set_presentation(&mut self, presentation: PresentationCfg) -> Result<(), WorkspaceError> {
        presentation.validate()?;
        self.presentation = presentation;
        Ok(())
    }
}
