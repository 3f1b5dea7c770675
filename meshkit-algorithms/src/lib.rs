//! # Meshkit Algorithms
//!
//! Per-vertex algorithms over triangle meshes.
//!
//! This crate provides normal estimation, edge adjacency with cotangent
//! weights, Laplacian smoothing and Loop subdivision. Every operation works
//! on a [`meshkit_core::TriangleMesh`] in place and leaves it untouched when
//! it returns an error.

pub mod adjacency;
pub mod normals;
pub mod smoothing;
pub mod subdivision;

// Re-export commonly used items
pub use adjacency::*;
pub use normals::*;
pub use smoothing::*;
pub use subdivision::*;
