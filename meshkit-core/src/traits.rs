//! Core traits for meshkit

use crate::{error::Result, mesh::*, point::*};

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f;

    /// Get a sphere `(center, radius)` enclosing the object
    fn bounding_sphere(&self) -> (Point3f, f32);
}

/// Receiver of mesh uploads, typically GPU vertex and index buffers.
///
/// A full upload replaces everything previously uploaded and happens after the
/// initial load and after every topology change. A position upload rewrites
/// the positions in place and is only valid while the vertex count is
/// unchanged since the last full upload.
pub trait GpuBufferSink {
    /// Replace all buffers with the given mesh arrays
    fn full_upload(
        &mut self,
        positions: &[Point3f],
        normals: &[Vector3f],
        tex_coords: &[TexCoord2f],
        faces: &[Face],
    ) -> Result<()>;

    /// Overwrite vertex positions only
    fn upload_positions(&mut self, positions: &[Point3f]) -> Result<()>;
}

impl<S: GpuBufferSink + ?Sized> GpuBufferSink for &mut S {
    fn full_upload(
        &mut self,
        positions: &[Point3f],
        normals: &[Vector3f],
        tex_coords: &[TexCoord2f],
        faces: &[Face],
    ) -> Result<()> {
        (**self).full_upload(positions, normals, tex_coords, faces)
    }

    fn upload_positions(&mut self, positions: &[Point3f]) -> Result<()> {
        (**self).upload_positions(positions)
    }
}

impl TriangleMesh {
    /// Send every attribute array to `sink`
    pub fn upload_to<S: GpuBufferSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        sink.full_upload(self.vertices(), self.normals(), self.tex_coords(), self.faces())
    }
}

impl Drawable for TriangleMesh {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        let Some(&first) = self.vertices().first() else {
            return (Point3f::origin(), Point3f::origin());
        };

        let mut min = first;
        let mut max = first;

        for vertex in self.vertices() {
            min.x = min.x.min(vertex.x);
            min.y = min.y.min(vertex.y);
            min.z = min.z.min(vertex.z);

            max.x = max.x.max(vertex.x);
            max.y = max.y.max(vertex.y);
            max.z = max.z.max(vertex.z);
        }

        (min, max)
    }

    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        Point3f::new(
            (min.x + max.x) / 2.0,
            (min.y + max.y) / 2.0,
            (min.z + max.z) / 2.0,
        )
    }

    /// Centered on the vertex centroid, radius reaching the farthest vertex.
    fn bounding_sphere(&self) -> (Point3f, f32) {
        if self.is_empty() {
            return (Point3f::origin(), 0.0);
        }

        let sum = self
            .vertices()
            .iter()
            .fold(Vector3f::zeros(), |acc, v| acc + v.coords);
        let center = Point3f::from(sum / self.vertex_count() as f32);
        let radius = self
            .vertices()
            .iter()
            .map(|v| nalgebra::distance(&center, v))
            .fold(0.0f32, f32::max);

        (center, radius)
    }
}
