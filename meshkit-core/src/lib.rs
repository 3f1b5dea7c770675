//! Core data structures and traits for meshkit
//!
//! This crate provides the CPU-side geometry store for triangle mesh editing:
//! the mesh itself, its revision counters, bounds helpers, texture coordinate
//! generation and the interface meshes are uploaded through.

pub mod point;
pub mod mesh;
pub mod parameterization;
pub mod traits;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use parameterization::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
