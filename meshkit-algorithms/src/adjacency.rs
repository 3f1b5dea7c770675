//! Vertex adjacency derived from the triangle list
//!
//! - [`CotangentWeights`]: symmetric cotangent edge weights for the Laplacian
//! - [`CotangentCache`]: revision-checked cache of those weights
//! - [`OneRing`]: 1-ring neighborhoods with position snapshots
//! - [`EdgeKey`]: order-independent edge identifier

use std::collections::BTreeMap;

use itertools::Itertools;
use meshkit_core::{Face, Point3f, Revision, TriangleMesh};

/// An undirected edge, stored with the smaller vertex index first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(usize, usize);

impl EdgeKey {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            EdgeKey(a, b)
        } else {
            EdgeKey(b, a)
        }
    }

    /// Smaller endpoint
    pub fn low(&self) -> usize {
        self.0
    }

    /// Larger endpoint
    pub fn high(&self) -> usize {
        self.1
    }
}

/// The three edges of a face in winding order, each with its opposite vertex.
///
/// Yields `(a, b, opposite)` for the edges `ab`, `bc` and `ca`.
pub fn face_edges(face: &Face) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
    face.iter()
        .copied()
        .circular_tuple_windows()
}

/// Symmetric cotangent weights for every edge of a mesh.
///
/// Each triangle adds `cot(θ)/2` to the edge opposite its corner angle `θ`,
/// so an interior edge ends up with `(cot α + cot β)/2` and a boundary edge
/// with the single contribution of its only triangle.
#[derive(Debug, Clone, Default)]
pub struct CotangentWeights {
    weights: Vec<BTreeMap<usize, f32>>,
}

impl CotangentWeights {
    /// Build weights from the current positions and faces.
    ///
    /// Corners of degenerate triangles contribute nothing.
    pub fn build(mesh: &TriangleMesh) -> Self {
        let positions = mesh.vertices();
        let mut weights = vec![BTreeMap::new(); positions.len()];

        for face in mesh.faces() {
            for (a, b, opposite) in face_edges(face) {
                let Some(cot) = cotangent_at(&positions[opposite], &positions[a], &positions[b])
                else {
                    continue;
                };
                let half = cot / 2.0;
                *weights[a].entry(b).or_insert(0.0) += half;
                *weights[b].entry(a).or_insert(0.0) += half;
            }
        }

        Self { weights }
    }

    /// Weighted neighbors of vertex `i`, ordered by neighbor index
    pub fn neighbors(&self, i: usize) -> &BTreeMap<usize, f32> {
        &self.weights[i]
    }

    /// Weight of edge `(i, j)`, if it exists
    pub fn weight(&self, i: usize, j: usize) -> Option<f32> {
        self.weights.get(i)?.get(&j).copied()
    }

    /// Number of vertices the weights were built for
    pub fn vertex_count(&self) -> usize {
        self.weights.len()
    }
}

/// Cotangent of the angle at `apex` in the triangle `(apex, a, b)`.
fn cotangent_at(apex: &Point3f, a: &Point3f, b: &Point3f) -> Option<f32> {
    let ea = a - apex;
    let eb = b - apex;
    let sin_scaled = ea.cross(&eb).norm();
    if sin_scaled <= f32::MIN_POSITIVE {
        return None;
    }
    Some(ea.dot(&eb) / sin_scaled)
}

/// Which mesh changes make cached weights stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum CacheInvalidation {
    /// Rebuild only when the connectivity changes; weights stay fixed while
    /// smoothing moves vertices around.
    #[default]
    OnTopologyChange,
    /// Rebuild whenever any vertex moves.
    OnGeometryChange,
}

/// Cotangent weights together with the mesh revision they were built at.
#[derive(Debug, Clone, Default)]
pub struct CotangentCache {
    policy: CacheInvalidation,
    cached: Option<(Revision, CotangentWeights)>,
}

impl CotangentCache {
    pub fn new(policy: CacheInvalidation) -> Self {
        Self {
            policy,
            cached: None,
        }
    }

    pub fn policy(&self) -> CacheInvalidation {
        self.policy
    }

    /// Whether the cached weights can be used for `mesh` as it is now.
    pub fn is_valid_for(&self, mesh: &TriangleMesh) -> bool {
        let Some((built_at, _)) = &self.cached else {
            return false;
        };
        let now = mesh.revision();
        match self.policy {
            CacheInvalidation::OnTopologyChange => built_at.topology == now.topology,
            CacheInvalidation::OnGeometryChange => *built_at == now,
        }
    }

    /// Cached weights for `mesh`, rebuilding them first if stale.
    pub fn get_or_build(&mut self, mesh: &TriangleMesh) -> &CotangentWeights {
        if !self.is_valid_for(mesh) {
            self.cached = None;
        }
        let (_, weights) = self.cached.get_or_insert_with(|| {
            log::debug!(
                "building cotangent weights for {} vertices, {} faces",
                mesh.vertex_count(),
                mesh.face_count()
            );
            (mesh.revision(), CotangentWeights::build(mesh))
        });
        weights
    }

    /// Drop the cached weights
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

/// 1-ring neighborhoods: for each vertex, its edge-connected neighbors and
/// their positions at build time.
#[derive(Debug, Clone, Default)]
pub struct OneRing {
    rings: Vec<BTreeMap<usize, Point3f>>,
}

impl OneRing {
    pub fn build(mesh: &TriangleMesh) -> Self {
        let positions = mesh.vertices();
        let mut rings = vec![BTreeMap::new(); positions.len()];

        for face in mesh.faces() {
            for (a, b, _) in face_edges(face) {
                rings[a].entry(b).or_insert(positions[b]);
                rings[b].entry(a).or_insert(positions[a]);
            }
        }

        Self { rings }
    }

    /// Neighbors of vertex `i` with their snapshot positions
    pub fn neighbors(&self, i: usize) -> &BTreeMap<usize, Point3f> {
        &self.rings[i]
    }

    /// Number of neighbors of vertex `i`
    pub fn valence(&self, i: usize) -> usize {
        self.rings[i].len()
    }

    pub fn vertex_count(&self) -> usize {
        self.rings.len()
    }
}
