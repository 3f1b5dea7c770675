//! Headless upload sinks

use meshkit_core::{Face, GpuBufferSink, Point3f, Result, TexCoord2f, Vector3f};

/// Sink that only logs and counts uploads, for running without a GPU.
#[derive(Debug, Default)]
pub struct LoggingSink {
    pub full_uploads: usize,
    pub position_uploads: usize,
    vertex_count: usize,
}

impl LoggingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vertices in the last full upload
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}

impl GpuBufferSink for LoggingSink {
    fn full_upload(
        &mut self,
        positions: &[Point3f],
        _normals: &[Vector3f],
        _tex_coords: &[TexCoord2f],
        faces: &[Face],
    ) -> Result<()> {
        self.full_uploads += 1;
        self.vertex_count = positions.len();
        log::debug!(
            "full upload #{}: {} vertices, {} faces",
            self.full_uploads,
            positions.len(),
            faces.len()
        );
        Ok(())
    }

    fn upload_positions(&mut self, positions: &[Point3f]) -> Result<()> {
        if positions.len() != self.vertex_count {
            return Err(meshkit_core::Error::Gpu(format!(
                "position upload with {} vertices after a full upload of {}",
                positions.len(),
                self.vertex_count
            )));
        }
        self.position_uploads += 1;
        log::debug!("position upload #{}", self.position_uploads);
        Ok(())
    }
}
