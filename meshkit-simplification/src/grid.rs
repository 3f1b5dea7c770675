//! Uniform grid decimation
//!
//! Vertices are bucketed into an `R × R × R` grid laid over the bounding cube.
//! Each occupied cell becomes one vertex at the mean of its members.

use std::collections::BTreeMap;

use meshkit_core::{Error, Point3f, Result, TriangleMesh, Vector3f};

use crate::cube::BoundingCube;
use crate::{remap_face, Decimation, MeshSimplifier, VertexCluster};

/// Integer cell coordinates. Field order makes the derived ordering match
/// the flattened index `x + y·R + z·R²`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellCoord {
    pub z: usize,
    pub y: usize,
    pub x: usize,
}

impl CellCoord {
    /// Flattened cell index `x + y·R + z·R²`
    pub fn flat_index(&self, resolution: usize) -> usize {
        self.x + self.y * resolution + self.z * resolution * resolution
    }
}

/// Occupied cells of a uniform grid, in ascending cell order.
#[derive(Debug, Clone)]
pub struct Grid {
    cube: BoundingCube,
    resolution: usize,
    cells: BTreeMap<CellCoord, VertexCluster>,
}

impl Grid {
    /// Bucket every position into a grid over `cube`. `normals` runs parallel
    /// to `positions`.
    pub fn build(
        cube: BoundingCube,
        resolution: usize,
        positions: &[Point3f],
        normals: &[Vector3f],
    ) -> Self {
        let mut grid = Self {
            cube,
            resolution,
            cells: BTreeMap::new(),
        };
        for (p, n) in positions.iter().zip(normals) {
            let cell = grid.cell_of(p);
            grid.cells.entry(cell).or_default().add(p, n);
        }
        grid
    }

    /// Cell holding `p`, clamped into the grid.
    pub fn cell_of(&self, p: &Point3f) -> CellCoord {
        let scale = self.resolution.saturating_sub(1) as f32 / self.cube.edge;
        let max = self.resolution.saturating_sub(1) as f32;
        let axis = |k: usize| ((p[k] - self.cube.origin[k]) * scale).floor().clamp(0.0, max) as usize;
        CellCoord {
            x: axis(0),
            y: axis(1),
            z: axis(2),
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Dense output index of every occupied cell, in ascending cell order.
    fn output_indices(&self) -> BTreeMap<CellCoord, usize> {
        self.cells
            .keys()
            .enumerate()
            .map(|(index, cell)| (*cell, index))
            .collect()
    }
}

/// Uniform grid vertex clustering.
#[derive(Debug, Clone)]
pub struct GridSimplifier {
    /// Cells per axis
    pub resolution: usize,
}

impl Default for GridSimplifier {
    fn default() -> Self {
        Self { resolution: 16 }
    }
}

impl GridSimplifier {
    pub fn new(resolution: usize) -> Self {
        Self { resolution }
    }
}

impl MeshSimplifier for GridSimplifier {
    fn collapse(&self, mesh: &TriangleMesh) -> Result<Decimation> {
        if self.resolution == 0 {
            return Err(Error::invalid_param(
                "resolution",
                self.resolution,
                "must be at least 1",
            ));
        }
        let cube = BoundingCube::enclosing(mesh.vertices()).ok_or(Error::EmptyMesh)?;

        let grid = Grid::build(cube, self.resolution, mesh.vertices(), mesh.normals());
        let indices = grid.output_indices();

        let (vertices, normals) = grid.cells.values().map(VertexCluster::representative).unzip();

        let cell_index = |vi: usize| indices[&grid.cell_of(&mesh.vertices()[vi])];
        let faces = mesh
            .faces()
            .iter()
            .filter_map(|&[a, b, c]| remap_face(cell_index(a), cell_index(b), cell_index(c)))
            .collect();

        log::debug!(
            "grid {}^3: {} occupied cells",
            grid.resolution(),
            grid.occupied_cells()
        );

        Ok(Decimation {
            vertices,
            normals,
            faces,
        })
    }
}

/// Decimate `mesh` in place on a uniform grid with `resolution` cells per axis.
///
/// # Errors
/// [`Error::InvalidParameter`] for a zero resolution and [`Error::EmptyMesh`]
/// for a mesh without vertices; the mesh is unchanged in both cases.
pub fn decimate_uniform(mesh: &mut TriangleMesh, resolution: usize) -> Result<()> {
    GridSimplifier::new(resolution).decimate_in_place(mesh)
}
