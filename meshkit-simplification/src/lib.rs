//! Mesh decimation by vertex clustering
//!
//! This crate reduces mesh complexity by collapsing groups of nearby vertices
//! into one representative each:
//! - Uniform grid clustering ([`GridSimplifier`])
//! - Adaptive octree clustering ([`OctreeSimplifier`])
//!
//! Triangles whose corners land in fewer than three distinct clusters are
//! dropped.

pub mod cube;
pub mod grid;
pub mod octree;

pub use cube::*;
pub use grid::*;
pub use octree::*;

use meshkit_core::{Face, Point3f, Result, TriangleMesh, Vector3f};

/// Collapse a mesh into fewer vertices
pub trait MeshSimplifier {
    /// Compute the decimated arrays without touching `mesh`
    fn collapse(&self, mesh: &TriangleMesh) -> Result<Decimation>;

    /// Decimated copy of `mesh`
    fn decimate(&self, mesh: &TriangleMesh) -> Result<TriangleMesh> {
        self.collapse(mesh)?.into_mesh()
    }

    /// Decimate `mesh` in place. On error the mesh is unchanged.
    fn decimate_in_place(&self, mesh: &mut TriangleMesh) -> Result<()> {
        self.collapse(mesh)?.apply_to(mesh)
    }
}

/// Output of a clustering pass: one vertex per occupied cluster and the
/// surviving triangles remapped onto them.
#[derive(Debug, Clone, Default)]
pub struct Decimation {
    pub vertices: Vec<Point3f>,
    pub normals: Vec<Vector3f>,
    pub faces: Vec<Face>,
}

impl Decimation {
    /// Replace the geometry of `mesh` with the decimated arrays
    pub fn apply_to(self, mesh: &mut TriangleMesh) -> Result<()> {
        log::debug!(
            "decimated {} -> {} vertices, {} -> {} faces",
            mesh.vertex_count(),
            self.vertices.len(),
            mesh.face_count(),
            self.faces.len()
        );
        mesh.replace_geometry(self.vertices, self.normals, self.faces)
    }

    pub fn into_mesh(self) -> Result<TriangleMesh> {
        let mut mesh = TriangleMesh::new();
        mesh.replace_geometry(self.vertices, self.normals, self.faces)?;
        Ok(mesh)
    }
}

/// Running sums for the vertices collapsed into one cluster.
#[derive(Debug, Clone, Default)]
pub struct VertexCluster {
    pub count: usize,
    pub position_sum: Vector3f,
    pub normal_sum: Vector3f,
}

impl VertexCluster {
    pub fn add(&mut self, position: &Point3f, normal: &Vector3f) {
        self.count += 1;
        self.position_sum += position.coords;
        self.normal_sum += normal;
    }

    /// Mean position and normalized mean normal (zero if the normals cancel).
    pub fn representative(&self) -> (Point3f, Vector3f) {
        let n = self.count.max(1) as f32;
        let normal = (self.normal_sum / n)
            .try_normalize(f32::MIN_POSITIVE)
            .unwrap_or_else(Vector3f::zeros);
        (Point3f::from(self.position_sum / n), normal)
    }
}

/// Keep `[a, b, c]` only if its three corners are pairwise distinct.
pub(crate) fn remap_face(a: usize, b: usize, c: usize) -> Option<Face> {
    (a != b && b != c && a != c).then_some([a, b, c])
}
