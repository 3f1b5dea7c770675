//! Interactive mesh editing
//!
//! This crate ties the mesh operators to a keyboard-driven editor:
//! - [`MeshEditor`]: owns the working mesh and keeps GPU buffers in sync
//! - [`Command`] and [`EditorConfig`]: key bindings and their parameters
//! - [`LoggingSink`]: a headless upload sink

pub mod command;
pub mod editor;
pub mod sink;

pub use command::*;
pub use editor::*;
pub use sink::*;
