//! Mesh vertex and index buffers on the GPU

use std::sync::Arc;

use meshkit_core::{Error, Face, GpuBufferSink, Point3f, Result, TexCoord2f, Vector3f};

use crate::GpuContext;

const POSITION_STRIDE: u64 = std::mem::size_of::<[f32; 3]>() as u64;

/// Buffers sized for one uploaded mesh
struct MeshBufferSet {
    positions: wgpu::Buffer,
    normals: wgpu::Buffer,
    tex_coords: wgpu::Buffer,
    indices: wgpu::Buffer,
    vertex_count: usize,
    index_count: u32,
}

impl MeshBufferSet {
    fn destroy(self) {
        self.positions.destroy();
        self.normals.destroy();
        self.tex_coords.destroy();
        self.indices.destroy();
    }
}

/// wgpu-backed [`GpuBufferSink`].
///
/// Positions, normals and texture coordinates live in three vertex buffers
/// (locations 0, 1 and 2) next to a `u32` index buffer.
pub struct GpuMeshBuffers {
    context: Arc<GpuContext>,
    buffers: Option<MeshBufferSet>,
}

impl GpuMeshBuffers {
    pub fn new(context: Arc<GpuContext>) -> Self {
        Self {
            context,
            buffers: None,
        }
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    /// Vertices in the current buffers, 0 before the first upload
    pub fn vertex_count(&self) -> usize {
        self.buffers.as_ref().map_or(0, |b| b.vertex_count)
    }

    /// Indices in the current index buffer, three per triangle
    pub fn index_count(&self) -> u32 {
        self.buffers.as_ref().map_or(0, |b| b.index_count)
    }

    /// Vertex buffers in shader location order
    pub fn vertex_buffers(&self) -> Option<[&wgpu::Buffer; 3]> {
        self.buffers
            .as_ref()
            .map(|b| [&b.positions, &b.normals, &b.tex_coords])
    }

    pub fn index_buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffers.as_ref().map(|b| &b.indices)
    }

    /// Layouts matching [`Self::vertex_buffers`]
    pub fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 3] {
        const POSITION: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
        const NORMAL: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
        const TEX_COORD: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x2];

        let layout = |stride: usize, attributes: &'static [wgpu::VertexAttribute]| {
            wgpu::VertexBufferLayout {
                array_stride: stride as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes,
            }
        };
        [
            layout(std::mem::size_of::<[f32; 3]>(), &POSITION),
            layout(std::mem::size_of::<[f32; 3]>(), &NORMAL),
            layout(std::mem::size_of::<[f32; 2]>(), &TEX_COORD),
        ]
    }

    /// Read the position buffer back from the GPU
    pub async fn read_positions(&self) -> Result<Vec<Point3f>> {
        let buffers = self
            .buffers
            .as_ref()
            .ok_or_else(|| Error::Gpu("no mesh has been uploaded".to_string()))?;
        let size = buffers.vertex_count as u64 * POSITION_STRIDE;
        let data: Vec<[f32; 3]> = self.context.read_buffer(&buffers.positions, size).await?;
        Ok(data.into_iter().map(Point3f::from).collect())
    }
}

fn position_data(positions: &[Point3f]) -> Vec<[f32; 3]> {
    positions.iter().map(|p| [p.x, p.y, p.z]).collect()
}

impl GpuBufferSink for GpuMeshBuffers {
    fn full_upload(
        &mut self,
        positions: &[Point3f],
        normals: &[Vector3f],
        tex_coords: &[TexCoord2f],
        faces: &[Face],
    ) -> Result<()> {
        if normals.len() != positions.len() || tex_coords.len() != positions.len() {
            return Err(Error::Gpu(format!(
                "attribute length mismatch: {} positions, {} normals, {} texture coordinates",
                positions.len(),
                normals.len(),
                tex_coords.len()
            )));
        }
        let indices = faces
            .iter()
            .flatten()
            .map(|&i| u32::try_from(i))
            .collect::<std::result::Result<Vec<u32>, _>>()
            .map_err(|_| Error::Gpu("vertex index does not fit in u32".to_string()))?;
        let index_count = u32::try_from(indices.len())
            .map_err(|_| Error::Gpu("too many indices for one draw".to_string()))?;

        if let Some(old) = self.buffers.take() {
            old.destroy();
        }

        let normal_data: Vec<[f32; 3]> = normals.iter().map(|n| [n.x, n.y, n.z]).collect();
        let ctx = &self.context;
        let vertex_usage = wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST;
        self.buffers = Some(MeshBufferSet {
            positions: ctx.create_buffer_init(
                "Mesh Positions",
                &position_data(positions),
                vertex_usage | wgpu::BufferUsages::COPY_SRC,
            ),
            normals: ctx.create_buffer_init("Mesh Normals", &normal_data, vertex_usage),
            tex_coords: ctx.create_buffer_init("Mesh Texture Coordinates", tex_coords, vertex_usage),
            indices: ctx.create_buffer_init(
                "Mesh Indices",
                &indices,
                wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            ),
            vertex_count: positions.len(),
            index_count,
        });

        log::debug!(
            "uploaded mesh buffers: {} vertices, {} indices",
            positions.len(),
            index_count
        );
        Ok(())
    }

    fn upload_positions(&mut self, positions: &[Point3f]) -> Result<()> {
        let buffers = self
            .buffers
            .as_ref()
            .ok_or_else(|| Error::Gpu("position upload before any full upload".to_string()))?;
        if buffers.vertex_count != positions.len() {
            return Err(Error::Gpu(format!(
                "position upload with {} vertices into buffers sized for {}",
                positions.len(),
                buffers.vertex_count
            )));
        }

        self.context.queue.write_buffer(
            &buffers.positions,
            0,
            bytemuck::cast_slice(&position_data(positions)),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Try to create a GPU context, return None if not available
    async fn try_create_gpu_context() -> Option<Arc<GpuContext>> {
        match GpuContext::new().await {
            Ok(gpu) => Some(Arc::new(gpu)),
            Err(_) => {
                println!("GPU not available, skipping GPU-dependent test");
                None
            }
        }
    }

    fn triangle() -> (Vec<Point3f>, Vec<Vector3f>, Vec<TexCoord2f>, Vec<Face>) {
        (
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![Vector3f::z(); 3],
            vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_layouts() {
        let layouts = GpuMeshBuffers::vertex_layouts();
        assert_eq!(layouts[0].array_stride, 12);
        assert_eq!(layouts[2].array_stride, 8);
        assert_eq!(layouts[1].attributes[0].shader_location, 1);
    }

    #[test]
    fn test_full_upload_and_readback() {
        pollster::block_on(async {
            let Some(gpu) = try_create_gpu_context().await else {
                return;
            };
            let mut sink = GpuMeshBuffers::new(gpu);
            let (p, n, t, f) = triangle();

            sink.full_upload(&p, &n, &t, &f).unwrap();
            assert_eq!(sink.vertex_count(), 3);
            assert_eq!(sink.index_count(), 3);

            let read = sink.read_positions().await.unwrap();
            assert_eq!(read, p);
        });
    }

    #[test]
    fn test_position_upload_in_place() {
        pollster::block_on(async {
            let Some(gpu) = try_create_gpu_context().await else {
                return;
            };
            let mut sink = GpuMeshBuffers::new(gpu);
            let (p, n, t, f) = triangle();
            sink.full_upload(&p, &n, &t, &f).unwrap();

            let moved: Vec<Point3f> = p.iter().map(|q| q + Vector3f::new(0.0, 0.0, 0.5)).collect();
            sink.upload_positions(&moved).unwrap();

            let read = sink.read_positions().await.unwrap();
            for (a, b) in read.iter().zip(&moved) {
                assert_relative_eq!(*a, *b);
            }
        });
    }

    #[test]
    fn test_position_upload_rejects_wrong_count() {
        pollster::block_on(async {
            let Some(gpu) = try_create_gpu_context().await else {
                return;
            };
            let mut sink = GpuMeshBuffers::new(gpu);
            let (p, n, t, f) = triangle();

            assert!(matches!(sink.upload_positions(&p), Err(Error::Gpu(_))));

            sink.full_upload(&p, &n, &t, &f).unwrap();
            assert!(matches!(sink.upload_positions(&p[..2]), Err(Error::Gpu(_))));
        });
    }

    #[test]
    fn test_full_upload_replaces_buffers() {
        pollster::block_on(async {
            let Some(gpu) = try_create_gpu_context().await else {
                return;
            };
            let mut sink = GpuMeshBuffers::new(gpu);
            let (p, n, t, f) = triangle();
            sink.full_upload(&p, &n, &t, &f).unwrap();

            let mut p4 = p.clone();
            p4.push(Point3f::new(1.0, 1.0, 0.0));
            let n4 = vec![Vector3f::z(); 4];
            let t4 = vec![[0.0, 0.0]; 4];
            sink.full_upload(&p4, &n4, &t4, &[[0, 1, 2], [1, 3, 2]]).unwrap();

            assert_eq!(sink.vertex_count(), 4);
            assert_eq!(sink.index_count(), 6);
            assert!(sink.upload_positions(&p4).is_ok());
        });
    }
}
