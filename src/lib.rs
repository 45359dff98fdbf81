//! Facade crate for the Haulview survey engine.
//!
//! Re-exports the domain, data and surface crates and provides
//! [`Workspace`], the single owner of a loaded survey that presentation
//! layers drive: loading files and stores, saving tables, stepping through
//! tonnage periods and reconstructing terrain meshes.

#![forbid(unsafe_code)]

mod error;
mod workspace;

pub use error::WorkspaceError;
pub use workspace::Workspace;

pub use haulview_core::{
    EntityBatch, EntityError, EntityKind, EntityStore, IngestMode, ParsedBatch, Polyline,
    PolylineVertex, Position, PresentationCfg, PresentationError, ProfileError, ProjectionPlane,
    ReconstructionProfile, Rgb, Surface, SurfaceMesh, VertexAttributes, Waypoint,
};
pub use haulview_data::{
    PeriodCursor, PeriodReport, PersistenceGateway, ReadError, RouteMatch, SourceFormat,
    StoreError, Table, TableStatus, TonnageAggregator, TonnageError,
};
pub use haulview_surface::{ReconstructError, SurfaceReconstructor};
