use approx::assert_relative_eq;
use meshkit_core::{
    Drawable, Error, Face, GpuBufferSink, Point3f, Result, TexCoord2f, TriangleMesh, Vector3f,
};
use meshkit_editor::{Command, EditorConfig, MeshEditor};

#[derive(Debug, Clone, PartialEq)]
enum Upload {
    Full { vertices: usize, faces: usize },
    Positions(Vec<Point3f>),
}

/// Records every upload and can be told to fail.
#[derive(Default)]
struct RecordingSink {
    uploads: Vec<Upload>,
    fail: bool,
}

impl GpuBufferSink for RecordingSink {
    fn full_upload(
        &mut self,
        positions: &[Point3f],
        normals: &[Vector3f],
        tex_coords: &[TexCoord2f],
        faces: &[Face],
    ) -> Result<()> {
        if self.fail {
            return Err(Error::Gpu("device lost".to_string()));
        }
        assert_eq!(normals.len(), positions.len());
        assert_eq!(tex_coords.len(), positions.len());
        self.uploads.push(Upload::Full {
            vertices: positions.len(),
            faces: faces.len(),
        });
        Ok(())
    }

    fn upload_positions(&mut self, positions: &[Point3f]) -> Result<()> {
        if self.fail {
            return Err(Error::Gpu("device lost".to_string()));
        }
        self.uploads.push(Upload::Positions(positions.to_vec()));
        Ok(())
    }
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

/// Square fan around a raised center vertex
fn make_raised_fan() -> TriangleMesh {
    TriangleMesh::from_vertices_and_faces(
        vec![
            Point3f::new(0.0, 0.0, 1.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(-1.0, 0.0, 0.0),
            Point3f::new(0.0, -1.0, 0.0),
        ],
        vec![[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 1]],
    )
}

fn editor(mesh: TriangleMesh) -> MeshEditor<RecordingSink> {
    MeshEditor::new(mesh, RecordingSink::default()).unwrap()
}

#[test]
fn test_initial_full_upload() {
    let editor = editor(make_plane_grid(4));
    assert_eq!(
        editor.sink().uploads,
        vec![Upload::Full { vertices: 16, faces: 18 }]
    );
}

#[test]
fn test_smoothing_syncs_positions() {
    let mut editor = editor(make_raised_fan());
    editor.smooth(0.5, false).unwrap();

    let uploads = &editor.sink().uploads;
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[1], Upload::Positions(editor.mesh().vertices().to_vec()));
    // Uniform weights: the apex sits halfway between 1 and the ring average 0
    assert_relative_eq!(editor.mesh().vertices()[0].z, 0.5, epsilon = 1e-6);
}

#[test]
fn test_smoothing_identity_alpha() {
    let mut editor = editor(make_raised_fan());
    let before = editor.mesh().vertices().to_vec();
    editor.smooth(1.0, true).unwrap();
    assert_eq!(editor.mesh().vertices(), before.as_slice());
}

#[test]
fn test_repeated_smoothing_flattens() {
    let mut editor = editor(make_raised_fan());
    for _ in 0..5 {
        editor.smooth(0.5, true).unwrap();
    }
    let apex = editor.mesh().vertices()[0];
    assert!(apex.z < 0.5);
    assert!(editor.mesh().normals().iter().all(|n| n.iter().all(|c| c.is_finite())));
}

#[test]
fn test_decimation_full_uploads() {
    let mut editor = editor(make_plane_grid(10));

    editor.decimate_uniform(4).unwrap();
    let after_grid = editor.mesh().vertex_count();
    assert!(after_grid <= 64);
    assert_eq!(
        editor.sink().uploads.last(),
        Some(&Upload::Full {
            vertices: after_grid,
            faces: editor.mesh().face_count()
        })
    );

    editor.decimate_adaptive(editor.mesh().vertex_count()).unwrap();
    assert_eq!(editor.mesh().vertex_count(), 1);
    assert_eq!(editor.mesh().face_count(), 0);
    assert_eq!(editor.sink().uploads.len(), 3);
}

#[test]
fn test_subdivision_growth() {
    let mut editor = editor(make_plane_grid(3));
    // 3x3 grid: 9 vertices, 16 edges, 8 triangles
    let stats = editor.subdivide_once().unwrap();
    assert_eq!(stats.edge_vertices, 16);
    assert_eq!(editor.mesh().vertex_count(), 25);
    assert_eq!(editor.mesh().face_count(), 32);
    assert_eq!(
        editor.sink().uploads.last(),
        Some(&Upload::Full { vertices: 25, faces: 32 })
    );
}

#[test]
fn test_smoothing_after_topology_change() {
    let mut editor = editor(make_plane_grid(5));
    editor.smooth(0.5, true).unwrap();
    editor.subdivide_once().unwrap();
    // Cached weights from before the subdivision must not be reused
    editor.smooth(0.5, true).unwrap();
    assert_eq!(
        editor.sink().uploads.last(),
        Some(&Upload::Positions(editor.mesh().vertices().to_vec()))
    );
}

#[test]
fn test_failed_operator_changes_nothing() {
    let mut editor = editor(make_plane_grid(4));
    let before = editor.mesh().clone();

    assert!(matches!(
        editor.smooth(1.5, true),
        Err(Error::InvalidParameter { name: "alpha", .. })
    ));
    assert!(matches!(
        editor.decimate_uniform(0),
        Err(Error::InvalidParameter { .. })
    ));
    assert!(matches!(
        editor.decimate_adaptive(0),
        Err(Error::InvalidParameter { .. })
    ));

    assert_eq!(editor.mesh().vertices(), before.vertices());
    assert_eq!(editor.mesh().faces(), before.faces());
    assert_eq!(editor.mesh().revision(), before.revision());
    assert_eq!(editor.sink().uploads.len(), 1);
}

#[test]
fn test_failed_upload_keeps_mesh() {
    let mut editor = editor(make_plane_grid(4));
    let revision = editor.mesh().revision();

    editor.sink_mut().fail = true;
    assert!(matches!(editor.subdivide_once(), Err(Error::Gpu(_))));
    assert!(matches!(editor.smooth(0.5, true), Err(Error::Gpu(_))));
    assert_eq!(editor.mesh().vertex_count(), 16);
    assert_eq!(editor.mesh().revision(), revision);

    editor.sink_mut().fail = false;
    editor.subdivide_once().unwrap();
    assert_eq!(editor.mesh().vertex_count(), 16 + 33);
}

#[test]
fn test_empty_mesh() {
    let mut editor = editor(TriangleMesh::new());
    assert!(matches!(editor.smooth(0.5, true), Err(Error::EmptyMesh)));
    assert!(matches!(editor.decimate_uniform(8), Err(Error::EmptyMesh)));
    assert!(matches!(editor.decimate_adaptive(8), Err(Error::EmptyMesh)));
    assert!(matches!(editor.subdivide_once(), Err(Error::EmptyMesh)));
    assert_eq!(editor.sink().uploads, vec![Upload::Full { vertices: 0, faces: 0 }]);
}

#[test]
fn test_reset_restores_loaded_mesh() {
    let mut editor = editor(make_plane_grid(6));
    editor.decimate_uniform(2).unwrap();
    editor.subdivide_once().unwrap();
    editor.reset().unwrap();

    assert_eq!(editor.mesh().vertices(), editor.original().vertices());
    assert_eq!(editor.mesh().faces(), editor.original().faces());
    assert_eq!(
        editor.sink().uploads.last(),
        Some(&Upload::Full { vertices: 36, faces: 50 })
    );
}

#[test]
fn test_key_sequence() {
    let config = EditorConfig {
        grid_resolution: 3,
        ..Default::default()
    };
    let mut editor =
        MeshEditor::with_config(make_plane_grid(8), RecordingSink::default(), config).unwrap();

    for key in "2BSdLr".chars() {
        assert!(editor.handle_key(key).unwrap());
    }
    assert_eq!(editor.mesh().vertex_count(), 64);
    assert_eq!(editor.sink().uploads.len(), 7);

    assert!(!editor.handle_key('q').unwrap());
    assert_eq!(editor.sink().uploads.len(), 7);
}

#[test]
fn test_apply_commands() {
    let mut editor = editor(make_raised_fan());
    editor
        .apply(Command::Smooth {
            alpha: 0.1,
            use_cotangent: true,
        })
        .unwrap();
    editor.apply(Command::Subdivide).unwrap();
    editor.apply(Command::DecimateAdaptive { leaf_capacity: 100 }).unwrap();

    assert_eq!(editor.mesh().vertex_count(), 1);
    let (center, radius) = editor.mesh().bounding_sphere();
    assert_eq!(radius, 0.0);
    assert_eq!(center, editor.mesh().vertices()[0]);
}
