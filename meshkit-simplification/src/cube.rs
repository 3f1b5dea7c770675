//! Bounding cube shared by the grid and octree decimators

use meshkit_core::{Point3f, Vector3f};

/// Relative margin added around the bounding box.
pub const CUBE_MARGIN: f32 = 0.02;

/// Corner offsets of the eight octants, in child order.
pub const OCTANT_OFFSETS: [[u8; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [1, 1, 1],
    [1, 0, 1],
    [0, 1, 0],
    [0, 1, 1],
    [0, 0, 1],
];

/// Axis-aligned cube given by its minimum corner and edge length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingCube {
    pub origin: Point3f,
    pub edge: f32,
}

impl BoundingCube {
    /// Smallest cube around `points` with a small margin, or `None` without
    /// points.
    ///
    /// The edge is the largest bounding box extent. The origin moves back by
    /// `edge * √3 * CUBE_MARGIN` on every axis and the edge grows by
    /// `2 * CUBE_MARGIN`. Coincident points get an edge of 1.
    pub fn enclosing(points: &[Point3f]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points.iter().fold((first, first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        });

        let extent = (max - min).max();
        let extent = if extent > 0.0 { extent } else { 1.0 };

        let shift = extent * 3.0f32.sqrt() * CUBE_MARGIN;
        Some(Self {
            origin: min - Vector3f::repeat(shift),
            edge: extent * (1.0 + 2.0 * CUBE_MARGIN),
        })
    }

    pub fn center(&self) -> Point3f {
        self.origin + Vector3f::repeat(self.edge * 0.5)
    }

    /// The child cube for `octant`, an index into [`OCTANT_OFFSETS`].
    pub fn child(&self, octant: usize) -> Self {
        let half = self.edge * 0.5;
        let [x, y, z] = OCTANT_OFFSETS[octant];
        Self {
            origin: self.origin
                + Vector3f::new(f32::from(x), f32::from(y), f32::from(z)) * half,
            edge: half,
        }
    }

    /// Octant of `p` relative to the cube center.
    ///
    /// Children are half-open: a coordinate equal to the center belongs to the
    /// upper half. Points outside the cube go to the nearest octant.
    pub fn octant_of(&self, p: &Point3f) -> usize {
        let c = self.center();
        let key = [u8::from(p.x >= c.x), u8::from(p.y >= c.y), u8::from(p.z >= c.z)];
        OCTANT_OFFSETS
            .iter()
            .position(|offset| *offset == key)
            .unwrap_or(0)
    }

    /// Half-open containment test
    pub fn contains(&self, p: &Point3f) -> bool {
        (0..3).all(|k| p[k] >= self.origin[k] && p[k] < self.origin[k] + self.edge)
    }
}
