//! Loop subdivision for triangle meshes.
//!
//! One step inserts an "odd" vertex on every edge, repositions every
//! original "even" vertex, and splits each triangle into four.
//!
//! # Vertex rules
//!
//! - **Odd vertex**: each triangle adds `3/16 * (a + b) + 1/8 * opposite`
//!   for every one of its edges `ab`, so an interior edge ends at
//!   `3/8 * (a + b) + 1/8 * (c + d)`.
//! - **Even vertex** with `n` neighbors:
//!   `(1 - β) * p + β/n * Σ odd(p, neighbor)` where
//!   `β = (40 - (3 + 2 cos(2π/n))²) / 64`.
//!
//! Boundary edges only see one triangle. [`BoundaryRule`] selects whether
//! that single contribution is kept or replaced by the edge midpoint.

use std::collections::HashMap;

use meshkit_core::{Face, Point3f, Result, TriangleMesh, Vector3f};

use crate::adjacency::{face_edges, EdgeKey, OneRing};
use crate::normals::{compute_vertex_normals, NormalWeighting};

/// Odd-vertex rule for edges with a single incident triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryRule {
    /// Keep the one-triangle contribution as accumulated.
    #[default]
    SingleContribution,
    /// Place the odd vertex at the edge midpoint.
    Midpoint,
}

/// Options for [`loop_subdivide`].
#[derive(Debug, Clone, Default)]
pub struct SubdivisionOptions {
    pub boundary_rule: BoundaryRule,
}

impl SubdivisionOptions {
    pub fn with_boundary_rule(mut self, boundary_rule: BoundaryRule) -> Self {
        self.boundary_rule = boundary_rule;
        self
    }
}

/// Counts describing one subdivision step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubdivisionStats {
    /// Vertices before the step (the even vertices)
    pub original_vertices: usize,
    /// Distinct edges, one odd vertex each
    pub edge_vertices: usize,
    /// Triangles after the step
    pub faces: usize,
}

/// Odd vertices accumulated per distinct edge, in first-seen order.
struct EdgeVertices {
    index: HashMap<EdgeKey, usize>,
    edges: Vec<EdgeKey>,
    positions: Vec<Vector3f>,
    incidence: Vec<u32>,
}

impl EdgeVertices {
    fn accumulate(positions: &[Point3f], faces: &[Face]) -> Self {
        let mut odd = EdgeVertices {
            index: HashMap::new(),
            edges: Vec::new(),
            positions: Vec::new(),
            incidence: Vec::new(),
        };

        for face in faces {
            for (a, b, opposite) in face_edges(face) {
                let key = EdgeKey::new(a, b);
                let slot = *odd.index.entry(key).or_insert_with(|| {
                    odd.edges.push(key);
                    odd.positions.push(Vector3f::zeros());
                    odd.incidence.push(0);
                    odd.edges.len() - 1
                });
                odd.positions[slot] += (positions[a].coords + positions[b].coords) * (3.0 / 16.0)
                    + positions[opposite].coords * (1.0 / 8.0);
                odd.incidence[slot] += 1;
            }
        }

        odd
    }

    fn apply_boundary_rule(&mut self, positions: &[Point3f], rule: BoundaryRule) {
        if rule != BoundaryRule::Midpoint {
            return;
        }
        for (slot, key) in self.edges.iter().enumerate() {
            if self.incidence[slot] == 1 {
                self.positions[slot] =
                    (positions[key.low()].coords + positions[key.high()].coords) * 0.5;
            }
        }
    }

    fn slot(&self, a: usize, b: usize) -> usize {
        self.index[&EdgeKey::new(a, b)]
    }

    fn len(&self) -> usize {
        self.edges.len()
    }
}

/// Loop smoothing weight for an even vertex with `n` neighbors.
pub fn loop_beta(n: usize) -> f32 {
    let n = n as f32;
    let t = 3.0 + 2.0 * (2.0 * std::f32::consts::PI / n).cos();
    (40.0 - t * t) / 64.0
}

/// Perform one step of Loop subdivision on `mesh` in place.
///
/// The result has `V + E` vertices and `4T` triangles, where `E` is the
/// number of distinct edges. Odd vertices are appended after the original
/// vertices in the order their edges are first met while walking the faces.
/// Normals are recomputed (uniform weighting) and texture coordinates
/// regenerated.
///
/// # Errors
/// [`meshkit_core::Error::EmptyMesh`] for a mesh without vertices, leaving it
/// unchanged.
pub fn loop_subdivide(
    mesh: &mut TriangleMesh,
    options: &SubdivisionOptions,
) -> Result<SubdivisionStats> {
    mesh.require_vertices()?;

    let positions = mesh.vertices();
    let faces = mesh.faces();

    let mut odd = EdgeVertices::accumulate(positions, faces);
    odd.apply_boundary_rule(positions, options.boundary_rule);

    // Even vertices only read the old positions and the finished odd vertices
    let ring = OneRing::build(mesh);
    let mut vertices: Vec<Point3f> = positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let n = ring.valence(i);
            if n == 0 {
                return *p;
            }
            let beta = loop_beta(n);
            let neighbor_sum = ring
                .neighbors(i)
                .keys()
                .fold(Vector3f::zeros(), |acc, &j| acc + odd.positions[odd.slot(i, j)]);
            Point3f::from(p.coords * (1.0 - beta) + neighbor_sum * (beta / n as f32))
        })
        .collect();

    let base = vertices.len();
    vertices.extend(odd.positions.iter().map(|&v| Point3f::from(v)));

    let mut new_faces = Vec::with_capacity(faces.len() * 4);
    for &[a, b, c] in faces {
        let ab = base + odd.slot(a, b);
        let bc = base + odd.slot(b, c);
        let ac = base + odd.slot(a, c);
        new_faces.push([a, ab, ac]);
        new_faces.push([ac, bc, c]);
        new_faces.push([ac, ab, bc]);
        new_faces.push([ab, b, bc]);
    }

    let stats = SubdivisionStats {
        original_vertices: base,
        edge_vertices: odd.len(),
        faces: new_faces.len(),
    };

    let normals = compute_vertex_normals(&vertices, &new_faces, NormalWeighting::Uniform);
    mesh.replace_geometry(vertices, normals, new_faces)?;

    log::debug!(
        "loop subdivision: {} + {} vertices, {} faces",
        stats.original_vertices,
        stats.edge_vertices,
        stats.faces
    );
    Ok(stats)
}
