//! Triangulated surface produced by reconstruction.

use serde::{Deserialize, Serialize};

/// A normal-annotated triangle mesh.
///
/// Triangle and edge entries index into [`Self::vertices`]. Each vertex has
/// exactly one averaged normal; normals are never split along feature edges.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceMesh {
    /// Vertex positions in survey coordinates.
    pub vertices: Vec<[f64; 3]>,
    /// Counter-clockwise triangles, consistently oriented.
    pub triangles: Vec<[usize; 3]>,
    /// Unit normal per vertex.
    pub point_normals: Vec<[f64; 3]>,
    /// Unit normal per triangle.
    pub cell_normals: Vec<[f64; 3]>,
    /// Edges whose dihedral angle exceeds the profile's feature angle, with
    /// the lower vertex index first.
    pub feature_edges: Vec<[usize; 2]>,
}

impl SurfaceMesh {
    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Report whether the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}
