//! Surface reconstruction for Haulview.
//!
//! [`SurfaceReconstructor`] turns the terrain contours held in an
//! [`EntityStore`] into a single normal-annotated [`SurfaceMesh`]. The
//! pipeline runs synchronously on the caller's thread:
//!
//! 1. merge every contour's vertices into one point cloud;
//! 2. collapse points closer than the cleaner tolerance;
//! 3. project onto the configured plane and run a Delaunay triangulation,
//!    optionally trimmed by an alpha circumradius;
//! 4. orient the triangles consistently and compute cell normals, averaged
//!    point normals and feature edges.
//!
//! Both tolerances in [`ReconstructionProfile`] are fractions of the point
//! cloud's bounding-box diagonal, so the same profile behaves alike on
//! small benches and whole pits. `alpha` is an absolute circumradius in
//! survey units.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod clean;
mod delaunay;
mod error;
mod merge;
mod normals;
mod projection;

use haulview_core::{EntityStore, ReconstructionProfile, Surface, SurfaceMesh};
use log::info;
use nalgebra::{SVector, Vector2, Vector3};

pub use error::ReconstructError;

use crate::delaunay::{TriangulationParams, triangulate};
use crate::merge::{diagonal, merge};
use crate::normals::{orient, shade};
use crate::projection::PlaneFrame;

/// Builds triangle meshes from terrain contours.
///
/// # Examples
/// ```
/// use haulview_core::{ReconstructionProfile, test_support::sample_store};
/// use haulview_surface::SurfaceReconstructor;
///
/// let reconstructor = SurfaceReconstructor::new(ReconstructionProfile::default())
///     .expect("default profile is valid");
/// let mesh = reconstructor
///     .reconstruct(&sample_store())
///     .expect("sample contours triangulate");
/// assert!(!mesh.is_empty());
/// assert_eq!(mesh.point_normals.len(), mesh.vertex_count());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceReconstructor {
    profile: ReconstructionProfile,
}

impl SurfaceReconstructor {
    /// Validate `profile` and wrap it in a reconstructor.
    ///
    /// # Errors
    /// Returns [`ReconstructError::Profile`] when a parameter is out of
    /// range.
    pub fn new(profile: ReconstructionProfile) -> Result<Self, ReconstructError> {
        profile.validate()?;
        Ok(Self { profile })
    }

    /// The profile in use.
    #[must_use]
    pub const fn profile(&self) -> &ReconstructionProfile {
        &self.profile
    }

    /// Reconstruct the mesh for every contour in `store`.
    ///
    /// # Errors
    /// See [`Self::reconstruct_surfaces`].
    pub fn reconstruct(&self, store: &EntityStore) -> Result<SurfaceMesh, ReconstructError> {
        self.reconstruct_surfaces(store.surfaces())
    }

    /// Reconstruct the mesh for an explicit set of contours.
    ///
    /// # Errors
    /// Returns [`ReconstructError::NoSurfaceData`] when no finite vertex is
    /// supplied and [`ReconstructError::DegenerateSurface`] when the cleaned
    /// points cannot form a single triangle in the projection plane.
    pub fn reconstruct_surfaces<'a>(
        &self,
        surfaces: impl IntoIterator<Item = &'a Surface>,
    ) -> Result<SurfaceMesh, ReconstructError> {
        let merged = merge(surfaces)?;
        let tolerance = scaled(self.profile.cleaner_tolerance, &merged);
        let cleaned = clean::clean(&merged, tolerance);

        let frame = PlaneFrame::for_plane(self.profile.projection_plane, &cleaned);
        let projected: Vec<Vector2<f64>> =
            cleaned.iter().map(|point| frame.project(point)).collect();
        let params = TriangulationParams {
            tolerance: scaled(self.profile.triangulation_tolerance, &projected),
            offset: self.profile.offset,
            alpha: self.profile.alpha,
        };
        let triangles = triangulate(&projected, params);
        if triangles.is_empty() {
            return Err(ReconstructError::DegenerateSurface {
                points: cleaned.len(),
            });
        }

        let (vertices, mut triangles) = compact(&cleaned, &triangles);
        orient(&mut triangles, &vertices, &frame.normal);
        let shading = shade(
            &triangles,
            &vertices,
            &frame.normal,
            self.profile.feature_angle,
        );

        let mesh = SurfaceMesh {
            vertices: vertices.iter().map(to_array).collect(),
            triangles,
            point_normals: shading.point_normals.iter().map(to_array).collect(),
            cell_normals: shading.cell_normals.iter().map(to_array).collect(),
            feature_edges: shading.feature_edges,
        };
        info!(
            "reconstructed surface from {} points: {} vertices, {} triangles, {} feature edges",
            merged.len(),
            mesh.vertex_count(),
            mesh.triangle_count(),
            mesh.feature_edges.len()
        );
        Ok(mesh)
    }
}

/// Drop vertices no triangle references and renumber the triangles.
#[expect(
    clippy::indexing_slicing,
    reason = "triangulation only emits indices into the cleaned points"
)]
fn compact(
    points: &[Vector3<f64>],
    triangles: &[[usize; 3]],
) -> (Vec<Vector3<f64>>, Vec<[usize; 3]>) {
    let mut remap: Vec<Option<usize>> = vec![None; points.len()];
    let mut vertices = Vec::new();
    let renumbered = triangles
        .iter()
        .map(|triangle| {
            triangle.map(|corner| {
                *remap[corner].get_or_insert_with(|| {
                    let next = vertices.len();
                    vertices.push(points[corner]);
                    next
                })
            })
        })
        .collect();
    (vertices, renumbered)
}

#[expect(clippy::float_arithmetic, reason = "tolerances scale with the cloud")]
fn scaled<const D: usize>(fraction: f64, points: &[SVector<f64, D>]) -> f64 {
    fraction * diagonal(points)
}

fn to_array(vector: &Vector3<f64>) -> [f64; 3] {
    [vector.x, vector.y, vector.z]
}
