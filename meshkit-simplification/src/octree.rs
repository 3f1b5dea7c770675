//! Adaptive octree decimation
//!
//! The bounding cube is split recursively until every leaf holds at most
//! `leaf_capacity` vertices. Each non-empty leaf collapses to one vertex, so
//! dense regions keep more detail than sparse ones.

use meshkit_core::{Error, Point3f, Result, TriangleMesh, Vector3f};

use crate::cube::BoundingCube;
use crate::{remap_face, Decimation, MeshSimplifier, VertexCluster};

/// Depth limit; coincident vertices would otherwise split forever.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Node payload: eight children or a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Arena indices of the children, in octant order
    Internal([usize; 8]),
    /// Output vertex index; `None` for an empty leaf
    Leaf(Option<usize>),
}

#[derive(Debug, Clone)]
pub struct OctreeNode {
    pub cube: BoundingCube,
    pub depth: usize,
    pub kind: NodeKind,
}

/// Octree over mesh vertices. Nodes live in an arena, the root at index 0.
#[derive(Debug, Clone)]
pub struct Octree {
    nodes: Vec<OctreeNode>,
    clusters: Vec<VertexCluster>,
}

impl Octree {
    /// Build the tree over `positions` within `cube`.
    ///
    /// `normals` runs parallel to `positions`. Output indices are assigned to
    /// non-empty leaves in depth-first octant order.
    pub fn build(
        cube: BoundingCube,
        positions: &[Point3f],
        normals: &[Vector3f],
        leaf_capacity: usize,
        max_depth: usize,
    ) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            clusters: Vec::new(),
        };
        let builder = Builder {
            positions,
            normals,
            leaf_capacity,
            max_depth,
        };
        let members = (0..positions.len()).collect();
        builder.build_node(&mut tree, cube, members, 0);
        tree
    }

    /// Output index of the leaf containing `p`, descending from the root.
    pub fn locate(&self, p: &Point3f) -> Option<usize> {
        let mut node = self.nodes.first()?;
        loop {
            match &node.kind {
                NodeKind::Internal(children) => {
                    node = &self.nodes[children[node.cube.octant_of(p)]];
                }
                NodeKind::Leaf(output) => return *output,
            }
        }
    }

    pub fn nodes(&self) -> &[OctreeNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of non-empty leaves, which is the output vertex count
    pub fn occupied_leaves(&self) -> usize {
        self.clusters.len()
    }

    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }
}

struct Builder<'a> {
    positions: &'a [Point3f],
    normals: &'a [Vector3f],
    leaf_capacity: usize,
    max_depth: usize,
}

impl Builder<'_> {
    fn build_node(
        &self,
        tree: &mut Octree,
        cube: BoundingCube,
        members: Vec<usize>,
        depth: usize,
    ) -> usize {
        let id = tree.nodes.len();
        tree.nodes.push(OctreeNode {
            cube,
            depth,
            kind: NodeKind::Leaf(None),
        });

        if members.len() <= self.leaf_capacity || depth >= self.max_depth {
            if members.len() > self.leaf_capacity {
                log::warn!(
                    "octree leaf at max depth {} holds {} vertices",
                    depth,
                    members.len()
                );
            }
            if !members.is_empty() {
                let mut cluster = VertexCluster::default();
                for &vi in &members {
                    cluster.add(&self.positions[vi], &self.normals[vi]);
                }
                tree.nodes[id].kind = NodeKind::Leaf(Some(tree.clusters.len()));
                tree.clusters.push(cluster);
            }
            return id;
        }

        let mut buckets: [Vec<usize>; 8] = Default::default();
        for vi in members {
            buckets[cube.octant_of(&self.positions[vi])].push(vi);
        }

        let mut children = [0; 8];
        for (octant, bucket) in buckets.into_iter().enumerate() {
            children[octant] = self.build_node(tree, cube.child(octant), bucket, depth + 1);
        }
        tree.nodes[id].kind = NodeKind::Internal(children);
        id
    }
}

/// Adaptive octree vertex clustering.
#[derive(Debug, Clone)]
pub struct OctreeSimplifier {
    /// Most vertices a leaf may hold
    pub leaf_capacity: usize,
    pub max_depth: usize,
}

impl Default for OctreeSimplifier {
    fn default() -> Self {
        Self {
            leaf_capacity: 10,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl OctreeSimplifier {
    pub fn new(leaf_capacity: usize) -> Self {
        Self {
            leaf_capacity,
            ..Default::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl MeshSimplifier for OctreeSimplifier {
    fn collapse(&self, mesh: &TriangleMesh) -> Result<Decimation> {
        if self.leaf_capacity == 0 {
            return Err(Error::invalid_param(
                "leaf_capacity",
                self.leaf_capacity,
                "must be at least 1",
            ));
        }
        let cube = BoundingCube::enclosing(mesh.vertices()).ok_or(Error::EmptyMesh)?;

        let tree = Octree::build(
            cube,
            mesh.vertices(),
            mesh.normals(),
            self.leaf_capacity,
            self.max_depth,
        );
        let (vertices, normals) = tree.clusters.iter().map(VertexCluster::representative).unzip();

        let mut faces = Vec::new();
        for &[a, b, c] in mesh.faces() {
            let corners = [a, b, c].map(|vi| tree.locate(&mesh.vertices()[vi]));
            // Every vertex sits in a non-empty leaf
            let [Some(a), Some(b), Some(c)] = corners else {
                continue;
            };
            faces.extend(remap_face(a, b, c));
        }

        log::debug!(
            "octree: {} nodes, depth {}, {} occupied leaves",
            tree.node_count(),
            tree.depth(),
            tree.occupied_leaves()
        );

        Ok(Decimation {
            vertices,
            normals,
            faces,
        })
    }
}

/// Decimate `mesh` in place with an octree holding at most `leaf_capacity`
/// vertices per leaf.
///
/// # Errors
/// [`Error::InvalidParameter`] for a zero capacity and [`Error::EmptyMesh`]
/// for a mesh without vertices; the mesh is unchanged in both cases.
pub fn decimate_adaptive(mesh: &mut TriangleMesh, leaf_capacity: usize) -> Result<()> {
    OctreeSimplifier::new(leaf_capacity).decimate_in_place(mesh)
}
