//! Per-vertex normal estimation for triangle meshes

use meshkit_core::{face_normal, Face, Point3f, Result, TriangleMesh, Vector3f};

/// How face normals are weighted when accumulated at a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalWeighting {
    /// Every incident face contributes its unit normal.
    #[default]
    Uniform,
    /// Each incident face contributes its unit normal scaled by the interior
    /// angle of the face at that vertex.
    AngleWeighted,
}

/// Estimate one unit normal per vertex following the face winding.
///
/// Degenerate faces contribute nothing. A vertex that is not touched by any
/// non-degenerate face gets the zero vector.
///
/// # Example
/// ```rust
/// use meshkit_core::Point3f;
/// use meshkit_algorithms::{compute_vertex_normals, NormalWeighting};
///
/// let positions = vec![
///     Point3f::new(0.0, 0.0, 0.0),
///     Point3f::new(1.0, 0.0, 0.0),
///     Point3f::new(0.0, 1.0, 0.0),
/// ];
/// let normals = compute_vertex_normals(&positions, &[[0, 1, 2]], NormalWeighting::Uniform);
/// assert!((normals[0].z - 1.0).abs() < 1e-6);
/// ```
pub fn compute_vertex_normals(
    positions: &[Point3f],
    faces: &[Face],
    weighting: NormalWeighting,
) -> Vec<Vector3f> {
    let mut normals = vec![Vector3f::zeros(); positions.len()];
    let mut degenerate = 0usize;

    for face in faces {
        let Some(n) = face_normal(positions, face) else {
            degenerate += 1;
            continue;
        };

        match weighting {
            NormalWeighting::Uniform => {
                for &vi in face {
                    normals[vi] += n;
                }
            }
            NormalWeighting::AngleWeighted => {
                for corner in 0..3 {
                    let vi = face[corner];
                    let angle = interior_angle(
                        &positions[vi],
                        &positions[face[(corner + 1) % 3]],
                        &positions[face[(corner + 2) % 3]],
                    );
                    normals[vi] += n * angle;
                }
            }
        }
    }

    if degenerate > 0 {
        log::warn!("skipped {degenerate} degenerate faces while estimating normals");
    }

    for n in &mut normals {
        *n = n.try_normalize(f32::MIN_POSITIVE).unwrap_or_else(Vector3f::zeros);
    }

    normals
}

/// Recompute the normals stored in `mesh` from its current positions.
pub fn recompute_normals(mesh: &mut TriangleMesh, weighting: NormalWeighting) -> Result<()> {
    let normals = compute_vertex_normals(mesh.vertices(), mesh.faces(), weighting);
    mesh.set_normals(normals)
}

/// Angle at `apex` between the edges towards `a` and `b`, in radians.
pub(crate) fn interior_angle(apex: &Point3f, a: &Point3f, b: &Point3f) -> f32 {
    let (Some(ea), Some(eb)) = (
        (a - apex).try_normalize(f32::MIN_POSITIVE),
        (b - apex).try_normalize(f32::MIN_POSITIVE),
    ) else {
        return 0.0;
    };
    ea.dot(&eb).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Regular tetrahedron centered at the origin, faces wound outwards.
    fn make_tetrahedron() -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(1.0, 1.0, 1.0),
                Point3f::new(1.0, -1.0, -1.0),
                Point3f::new(-1.0, 1.0, -1.0),
                Point3f::new(-1.0, -1.0, 1.0),
            ],
            vec![[1, 3, 2], [0, 2, 3], [0, 3, 1], [0, 1, 2]],
        )
    }

    fn make_plane_grid(size: usize) -> TriangleMesh {
        let mut vertices = Vec::new();
        for y in 0..size {
            for x in 0..size {
                vertices.push(Point3f::new(x as f32, y as f32, 0.0));
            }
        }
        let mut faces = Vec::new();
        for y in 0..(size - 1) {
            for x in 0..(size - 1) {
                let tl = y * size + x;
                let tr = tl + 1;
                let bl = (y + 1) * size + x;
                let br = bl + 1;
                faces.push([tl, tr, bl]);
                faces.push([tr, br, bl]);
            }
        }
        TriangleMesh::from_vertices_and_faces(vertices, faces)
    }

    #[test]
    fn test_tetrahedron_outward_unit_normals() {
        let mesh = make_tetrahedron();
        let normals = compute_vertex_normals(mesh.vertices(), mesh.faces(), NormalWeighting::Uniform);

        assert_eq!(normals.len(), 4);
        for (n, p) in normals.iter().zip(mesh.vertices()) {
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-5);
            // Centered at the origin, so the outward direction is the position itself
            assert_relative_eq!(*n, p.coords.normalize(), epsilon = 1e-5);
        }
    }

    #[test]
    fn test_angle_weighted_matches_on_symmetric_mesh() {
        let mesh = make_tetrahedron();
        let uniform = compute_vertex_normals(mesh.vertices(), mesh.faces(), NormalWeighting::Uniform);
        let weighted =
            compute_vertex_normals(mesh.vertices(), mesh.faces(), NormalWeighting::AngleWeighted);
        for (a, b) in uniform.iter().zip(&weighted) {
            assert_relative_eq!(*a, *b, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_plane_normals_point_up() {
        let mesh = make_plane_grid(4);
        for weighting in [NormalWeighting::Uniform, NormalWeighting::AngleWeighted] {
            let normals = compute_vertex_normals(mesh.vertices(), mesh.faces(), weighting);
            for n in &normals {
                assert_relative_eq!(*n, Vector3f::z(), epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_angle_weighting_differs_on_irregular_fan() {
        // Apex with one wide and one narrow face folded along the x axis
        let positions = vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0) + Vector3f::new(0.0, -0.1, -1.0),
        ];
        let faces = vec![[0, 1, 2], [0, 3, 1]];
        let uniform = compute_vertex_normals(&positions, &faces, NormalWeighting::Uniform);
        let weighted = compute_vertex_normals(&positions, &faces, NormalWeighting::AngleWeighted);

        assert_relative_eq!(weighted[0].norm(), 1.0, epsilon = 1e-5);
        assert!((uniform[0] - weighted[0]).norm() > 1e-3);
    }

    #[test]
    fn test_degenerate_faces_are_skipped() {
        let positions = vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(2.0, 0.0, 0.0),
        ];
        // Second face is collinear; vertex 3 only touches it
        let faces = vec![[0, 1, 2], [0, 1, 3]];
        let normals = compute_vertex_normals(&positions, &faces, NormalWeighting::Uniform);

        assert!(normals.iter().all(|n| n.iter().all(|c| c.is_finite())));
        assert_relative_eq!(normals[0], Vector3f::z(), epsilon = 1e-6);
        assert_eq!(normals[3], Vector3f::zeros());
    }

    #[test]
    fn test_isolated_vertex_gets_zero_normal() {
        let positions = vec![Point3f::origin()];
        let normals = compute_vertex_normals(&positions, &[], NormalWeighting::AngleWeighted);
        assert_eq!(normals, vec![Vector3f::zeros()]);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut mesh = make_tetrahedron();
        recompute_normals(&mut mesh, NormalWeighting::AngleWeighted).unwrap();
        let first = mesh.normals().to_vec();
        recompute_normals(&mut mesh, NormalWeighting::AngleWeighted).unwrap();
        assert_eq!(first, mesh.normals());
    }

    #[test]
    fn test_interior_angle() {
        let apex = Point3f::origin();
        let a = Point3f::new(1.0, 0.0, 0.0);
        let b = Point3f::new(0.0, 2.0, 0.0);
        assert_relative_eq!(interior_angle(&apex, &a, &b), std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
        assert_eq!(interior_angle(&apex, &apex, &b), 0.0);
    }
}
