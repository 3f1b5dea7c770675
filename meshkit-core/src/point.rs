//! Point, vector and texture coordinate types

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A 2D texture coordinate `[u, v]`
pub type TexCoord2f = [f32; 2];

/// A triangle as three vertex indices
pub type Face = [usize; 3];
