//! The operator surface driven by keyboard input

use meshkit_algorithms::{
    laplacian_smooth, loop_subdivide, CotangentCache, SmoothOptions, SubdivisionOptions,
    SubdivisionStats,
};
use meshkit_core::{GpuBufferSink, Result, TriangleMesh};
use meshkit_simplification::{GridSimplifier, MeshSimplifier, OctreeSimplifier};

use crate::command::{Command, EditorConfig};

/// What has to be sent to the sink after an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Upload {
    Positions,
    Full,
}

/// Owns the working mesh and keeps a [`GpuBufferSink`] in sync with it.
///
/// Every operator runs to completion before returning. An operator either
/// succeeds and uploads, or fails and leaves both the mesh and the sink as
/// they were.
pub struct MeshEditor<S: GpuBufferSink> {
    mesh: TriangleMesh,
    original: TriangleMesh,
    cache: CotangentCache,
    sink: S,
    config: EditorConfig,
}

impl<S: GpuBufferSink> MeshEditor<S> {
    /// Take ownership of a freshly loaded mesh and upload it in full.
    pub fn new(mesh: TriangleMesh, sink: S) -> Result<Self> {
        Self::with_config(mesh, sink, EditorConfig::default())
    }

    pub fn with_config(mesh: TriangleMesh, mut sink: S, config: EditorConfig) -> Result<Self> {
        mesh.validate()?;
        mesh.upload_to(&mut sink)?;
        log::info!(
            "editing mesh with {} vertices, {} faces",
            mesh.vertex_count(),
            mesh.face_count()
        );

        Ok(Self {
            original: mesh.clone(),
            mesh,
            cache: CotangentCache::new(config.cache_invalidation),
            sink,
            config,
        })
    }

    pub fn mesh(&self) -> &TriangleMesh {
        &self.mesh
    }

    /// The mesh as it was loaded
    pub fn original(&self) -> &TriangleMesh {
        &self.original
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Give back the working mesh and the sink
    pub fn into_parts(self) -> (TriangleMesh, S) {
        (self.mesh, self.sink)
    }

    /// One Laplacian smoothing step; only positions are re-uploaded.
    pub fn smooth(&mut self, alpha: f32, use_cotangent: bool) -> Result<()> {
        let options = SmoothOptions::default()
            .with_alpha(alpha)
            .with_cotangent(use_cotangent);
        stage(&mut self.mesh, &mut self.sink, Upload::Positions, |mesh| {
            laplacian_smooth(mesh, &options, &mut self.cache)
        })
    }

    /// Uniform grid decimation with `resolution` cells per axis.
    pub fn decimate_uniform(&mut self, resolution: usize) -> Result<()> {
        let simplifier = GridSimplifier::new(resolution);
        stage(&mut self.mesh, &mut self.sink, Upload::Full, |mesh| {
            simplifier.decimate_in_place(mesh)
        })
    }

    /// Octree decimation with at most `leaf_capacity` vertices per leaf.
    pub fn decimate_adaptive(&mut self, leaf_capacity: usize) -> Result<()> {
        let simplifier =
            OctreeSimplifier::new(leaf_capacity).with_max_depth(self.config.octree_max_depth);
        stage(&mut self.mesh, &mut self.sink, Upload::Full, |mesh| {
            simplifier.decimate_in_place(mesh)
        })
    }

    /// One step of Loop subdivision.
    pub fn subdivide_once(&mut self) -> Result<SubdivisionStats> {
        let mut stats = None;
        stage(&mut self.mesh, &mut self.sink, Upload::Full, |mesh| {
            stats = Some(loop_subdivide(mesh, &SubdivisionOptions::default())?);
            Ok(())
        })?;
        stats.ok_or_else(|| meshkit_core::Error::Algorithm("subdivision produced no result".into()))
    }

    /// Go back to the mesh as it was loaded.
    pub fn reset(&mut self) -> Result<()> {
        let original = self.original.clone();
        stage(&mut self.mesh, &mut self.sink, Upload::Full, |mesh| {
            *mesh = original;
            Ok(())
        })?;
        self.cache.invalidate();
        log::info!("reset to the loaded mesh");
        Ok(())
    }

    /// Run one command.
    pub fn apply(&mut self, command: Command) -> Result<()> {
        log::debug!("applying {:?}", command);
        match command {
            Command::Smooth {
                alpha,
                use_cotangent,
            } => self.smooth(alpha, use_cotangent),
            Command::DecimateUniform { resolution } => self.decimate_uniform(resolution),
            Command::DecimateAdaptive { leaf_capacity } => self.decimate_adaptive(leaf_capacity),
            Command::Subdivide => self.subdivide_once().map(|_| ()),
            Command::Reset => self.reset(),
        }
    }

    /// Run the command bound to `key`. Returns `Ok(false)` for unbound keys.
    pub fn handle_key(&mut self, key: char) -> Result<bool> {
        match Command::from_key(key, &self.config) {
            Some(command) => self.apply(command).map(|()| true),
            None => Ok(false),
        }
    }
}

/// Run `operator` on a copy of `mesh`, upload the result, then commit it.
fn stage<S, F>(mesh: &mut TriangleMesh, sink: &mut S, upload: Upload, operator: F) -> Result<()>
where
    S: GpuBufferSink,
    F: FnOnce(&mut TriangleMesh) -> Result<()>,
{
    let mut next = mesh.clone();
    operator(&mut next)?;

    match upload {
        Upload::Positions => sink.upload_positions(next.vertices())?,
        Upload::Full => next.upload_to(sink)?,
    }

    log::debug!(
        "mesh now has {} vertices, {} faces",
        next.vertex_count(),
        next.face_count()
    );
    *mesh = next;
    Ok(())
}
