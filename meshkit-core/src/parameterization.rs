//! Texture coordinate generation

use crate::point::{Point3f, TexCoord2f};

/// Planar parameterization onto the XY plane.
///
/// `u` and `v` are the x and y coordinates rescaled to `[0, 1]` over the
/// bounding rectangle. An axis with zero span maps to 0.
pub fn planar_parameterization(vertices: &[Point3f]) -> Vec<TexCoord2f> {
    let Some(first) = vertices.first() else {
        return Vec::new();
    };

    let (mut min_x, mut max_x) = (first.x, first.x);
    let (mut min_y, mut max_y) = (first.y, first.y);
    for v in vertices {
        min_x = min_x.min(v.x);
        max_x = max_x.max(v.x);
        min_y = min_y.min(v.y);
        max_y = max_y.max(v.y);
    }

    let span_x = max_x - min_x;
    let span_y = max_y - min_y;
    let rescale = |value: f32, min: f32, span: f32| {
        if span > 0.0 {
            (value - min) / span
        } else {
            0.0
        }
    };

    vertices
        .iter()
        .map(|v| [rescale(v.x, min_x, span_x), rescale(v.y, min_y, span_y)])
        .collect()
}
