//! Mesh data structures and functionality

use crate::error::{Error, Result};
use crate::parameterization::planar_parameterization;
use crate::point::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// Modification counters used to validate caches derived from a mesh.
///
/// `topology` changes whenever the triangle list or the vertex count changes.
/// `geometry` changes whenever vertex positions change, which includes every
/// topology change. Values are drawn from a process-wide counter, so two
/// independently built meshes never share a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Revision {
    pub topology: u64,
    pub geometry: u64,
}

impl Revision {
    /// A revision no other mesh has used.
    pub fn fresh() -> Self {
        let id = next_revision_id();
        Self {
            topology: id,
            geometry: id,
        }
    }
}

fn next_revision_id() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// A triangle mesh with per-vertex normals and texture coordinates.
///
/// Positions, normals and texture coordinates are parallel arrays that always
/// have the same length; every face index is smaller than the vertex count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleMesh {
    vertices: Vec<Point3f>,
    normals: Vec<Vector3f>,
    tex_coords: Vec<TexCoord2f>,
    faces: Vec<Face>,
    #[serde(skip, default = "Revision::fresh")]
    revision: Revision,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            tex_coords: Vec::new(),
            faces: Vec::new(),
            revision: Revision::fresh(),
        }
    }

    /// Create a mesh from vertices and faces.
    ///
    /// Normals start out as zero vectors and texture coordinates come from the
    /// planar parameterization. Face indices are not checked, see [`Self::validate`].
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<Face>) -> Self {
        let normals = vec![Vector3f::zeros(); vertices.len()];
        let tex_coords = planar_parameterization(&vertices);
        Self {
            vertices,
            normals,
            tex_coords,
            faces,
            revision: Revision::fresh(),
        }
    }

    /// Create a mesh from all of its attribute arrays, checking consistency.
    pub fn from_parts(
        vertices: Vec<Point3f>,
        normals: Vec<Vector3f>,
        tex_coords: Vec<TexCoord2f>,
        faces: Vec<Face>,
    ) -> Result<Self> {
        let mesh = Self {
            vertices,
            normals,
            tex_coords,
            faces,
            revision: Revision::fresh(),
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh has no vertices
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Fail with [`Error::EmptyMesh`] when the mesh has no vertices.
    pub fn require_vertices(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::EmptyMesh);
        }
        Ok(())
    }

    pub fn vertices(&self) -> &[Point3f] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vector3f] {
        &self.normals
    }

    pub fn tex_coords(&self) -> &[TexCoord2f] {
        &self.tex_coords
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Current modification counters
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Replace every vertex position, keeping the connectivity.
    pub fn set_positions(&mut self, positions: Vec<Point3f>) -> Result<()> {
        if positions.len() != self.vertices.len() {
            return Err(Error::InvalidData(format!(
                "expected {} positions, got {}",
                self.vertices.len(),
                positions.len()
            )));
        }
        self.vertices = positions;
        self.bump_geometry();
        Ok(())
    }

    /// Set vertex normals. Normals are derived data and do not change the revision.
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) -> Result<()> {
        if normals.len() != self.vertices.len() {
            return Err(Error::InvalidData(format!(
                "expected {} normals, got {}",
                self.vertices.len(),
                normals.len()
            )));
        }
        self.normals = normals;
        Ok(())
    }

    /// Replace the whole geometry after a topology-changing operation.
    ///
    /// Texture coordinates are regenerated with the planar parameterization.
    /// The mesh is left untouched if the new arrays are inconsistent.
    pub fn replace_geometry(
        &mut self,
        vertices: Vec<Point3f>,
        normals: Vec<Vector3f>,
        faces: Vec<Face>,
    ) -> Result<()> {
        if normals.len() != vertices.len() {
            return Err(Error::InvalidData(format!(
                "{} normals for {} vertices",
                normals.len(),
                vertices.len()
            )));
        }
        check_face_indices(&faces, vertices.len())?;

        self.tex_coords = planar_parameterization(&vertices);
        self.vertices = vertices;
        self.normals = normals;
        self.faces = faces;
        self.bump_topology();
        Ok(())
    }

    /// Recompute texture coordinates from the current positions.
    pub fn recompute_tex_coords(&mut self) {
        self.tex_coords = planar_parameterization(&self.vertices);
    }

    /// Calculate unit face normals.
    ///
    /// Degenerate faces (zero area) yield `None`.
    pub fn calculate_face_normals(&self) -> Vec<Option<Vector3f>> {
        self.faces
            .iter()
            .map(|face| face_normal(&self.vertices, face))
            .collect()
    }

    /// Check that all attribute arrays match and every face index is in range.
    pub fn validate(&self) -> Result<()> {
        let n = self.vertices.len();
        if self.normals.len() != n || self.tex_coords.len() != n {
            return Err(Error::InvalidData(format!(
                "attribute length mismatch: {} positions, {} normals, {} texture coordinates",
                n,
                self.normals.len(),
                self.tex_coords.len()
            )));
        }
        check_face_indices(&self.faces, n)
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.normals.clear();
        self.tex_coords.clear();
        self.faces.clear();
        self.bump_topology();
    }

    fn bump_geometry(&mut self) {
        self.revision.geometry = next_revision_id();
    }

    fn bump_topology(&mut self) {
        self.revision = Revision::fresh();
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Unit normal of a face following its winding, `None` for degenerate faces.
pub fn face_normal(vertices: &[Point3f], face: &Face) -> Option<Vector3f> {
    let v0 = vertices[face[0]];
    let v1 = vertices[face[1]];
    let v2 = vertices[face[2]];

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    edge1.cross(&edge2).try_normalize(f32::MIN_POSITIVE)
}

fn check_face_indices(faces: &[Face], vertex_count: usize) -> Result<()> {
    for (fi, face) in faces.iter().enumerate() {
        if let Some(&vi) = face.iter().find(|&&vi| vi >= vertex_count) {
            return Err(Error::InvalidData(format!(
                "face {fi} references vertex {vi} but the mesh has {vertex_count} vertices"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_single_triangle() -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_from_vertices_and_faces_fills_attributes() {
        let mesh = make_single_triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(mesh.normals().len(), 3);
        assert_eq!(mesh.tex_coords().len(), 3);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_from_parts_rejects_out_of_range_index() {
        let result = TriangleMesh::from_parts(
            vec![Point3f::origin(); 3],
            vec![Vector3f::zeros(); 3],
            vec![[0.0, 0.0]; 3],
            vec![[0, 1, 3]],
        );
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_from_parts_rejects_length_mismatch() {
        let result = TriangleMesh::from_parts(
            vec![Point3f::origin(); 3],
            vec![Vector3f::zeros(); 2],
            vec![[0.0, 0.0]; 3],
            vec![[0, 1, 2]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_set_positions_bumps_geometry_only() {
        let mut mesh = make_single_triangle();
        let before = mesh.revision();
        let moved = mesh.vertices().iter().map(|p| p + Vector3f::z()).collect();
        mesh.set_positions(moved).unwrap();

        let after = mesh.revision();
        assert_eq!(after.topology, before.topology);
        assert!(after.geometry > before.geometry);
    }

    #[test]
    fn test_set_positions_rejects_wrong_length() {
        let mut mesh = make_single_triangle();
        let before = mesh.revision();
        assert!(mesh.set_positions(vec![Point3f::origin()]).is_err());
        assert_eq!(mesh.revision(), before);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_replace_geometry_bumps_topology() {
        let mut mesh = make_single_triangle();
        let before = mesh.revision();
        mesh.replace_geometry(
            vec![Point3f::origin(), Point3f::new(2.0, 0.0, 0.0)],
            vec![Vector3f::z(); 2],
            Vec::new(),
        )
        .unwrap();

        assert!(mesh.revision().topology > before.topology);
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(mesh.tex_coords().len(), 2);
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn test_replace_geometry_is_transactional() {
        let mut mesh = make_single_triangle();
        let result = mesh.replace_geometry(
            vec![Point3f::origin()],
            vec![Vector3f::z()],
            vec![[0, 1, 2]],
        );
        assert!(result.is_err());
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn test_face_normals() {
        let mesh = make_single_triangle();
        let normals = mesh.calculate_face_normals();
        let n = normals[0].unwrap();
        assert_relative_eq!(n, Vector3f::z(), epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_face_normal() {
        let vertices = vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(2.0, 0.0, 0.0),
        ];
        assert!(face_normal(&vertices, &[0, 1, 2]).is_none());
    }

    #[test]
    fn test_independent_meshes_have_distinct_revisions() {
        let a = make_single_triangle();
        let b = make_single_triangle();
        assert_ne!(a.revision(), b.revision());
        assert_eq!(a.clone().revision(), a.revision());
    }

    #[test]
    fn test_clear() {
        let mut mesh = make_single_triangle();
        mesh.clear();
        assert!(mesh.is_empty());
        assert_eq!(mesh.face_count(), 0);
        assert!(mesh.normals().is_empty());
        assert!(mesh.tex_coords().is_empty());
        assert!(matches!(mesh.require_vertices(), Err(Error::EmptyMesh)));
    }
}
