//! # Meshkit GPU
//!
//! GPU-resident mesh buffers using WGPU.
//!
//! [`GpuMeshBuffers`] implements [`meshkit_core::GpuBufferSink`], so an editor
//! can keep vertex and index buffers in sync with CPU-side mesh edits.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use meshkit_gpu::{GpuContext, GpuMeshBuffers};
//! use meshkit_core::{Point3f, TriangleMesh};
//!
//! async fn example() -> meshkit_core::Result<()> {
//!     let gpu_context = Arc::new(GpuContext::new().await?);
//!     let mut buffers = GpuMeshBuffers::new(gpu_context);
//!
//!     let mesh = TriangleMesh::from_vertices_and_faces(
//!         vec![Point3f::origin(), Point3f::new(1.0, 0.0, 0.0), Point3f::new(0.0, 1.0, 0.0)],
//!         vec![[0, 1, 2]],
//!     );
//!     mesh.upload_to(&mut buffers)?;
//!     let positions = buffers.read_positions().await?;
//!     Ok(())
//! }
//! ```

pub mod buffers;
pub mod device;

pub use buffers::GpuMeshBuffers;
pub use device::GpuContext;
