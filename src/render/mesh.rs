use crate::render::api::{BufferTarget, GraphicsApi, RawHandle};
use glam::Vec3;
use log::info;
use std::mem;

/// Vertex attribute slot the position is bound to (`layout (location = 0)`).
pub const POSITION_LOCATION: u32 = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vec3>,
    /// Triangles as vertex index triplets. `None` draws `vertices` in order.
    pub indices: Option<Vec<[u32; 3]>>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vec3>, indices: Option<Vec<[u32; 3]>>) -> Self {
        Self { vertices, indices }
    }

    /// Axis-aligned quad of side 1 centred on the origin, two indexed triangles.
    pub fn quad() -> Self {
        Self::new(
            vec![
                Vec3::new(0.5, 0.5, 0.0),   // top right
                Vec3::new(0.5, -0.5, 0.0),  // bottom right
                Vec3::new(-0.5, -0.5, 0.0), // bottom left
                Vec3::new(-0.5, 0.5, 0.0),  // top left
            ],
            Some(vec![[0, 1, 3], [1, 2, 3]]),
        )
    }

    /// The same quad spelled out as six vertices with no index list.
    pub fn triangle_pair() -> Self {
        Self::new(
            vec![
                Vec3::new(0.5, 0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
                Vec3::new(-0.5, 0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::new(-0.5, 0.5, 0.0),
            ],
            None,
        )
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len(),
            None => self.vertices.len() / 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Indexed { count: i32 },
    Sequential { count: i32 },
}

/// Vertex array plus its buffers. Contents are fixed once uploaded.
pub struct GeometryBuffer<'gl, G: GraphicsApi> {
    gl: &'gl G,
    vao: RawHandle,
    vbo: RawHandle,
    ebo: Option<RawHandle>,
    mode: DrawMode,
}

impl<'gl, G: GraphicsApi> GeometryBuffer<'gl, G> {
    pub fn upload(gl: &'gl G, mesh: &MeshData) -> Self {
        let vao = gl.create_vertex_array();
        let vbo = gl.create_buffer();
        gl.bind_vertex_array(vao);

        gl.bind_buffer(BufferTarget::Array, vbo);
        gl.buffer_data(BufferTarget::Array, bytemuck::cast_slice(&mesh.vertices));

        let (ebo, mode) = match &mesh.indices {
            Some(indices) => {
                let ebo = gl.create_buffer();
                // element buffer binding is recorded in the bound vertex array
                gl.bind_buffer(BufferTarget::ElementArray, ebo);
                gl.buffer_data(BufferTarget::ElementArray, bytemuck::cast_slice(indices));
                let count = (indices.len() * 3) as i32;
                (Some(ebo), DrawMode::Indexed { count })
            }
            None => (
                None,
                DrawMode::Sequential {
                    count: mesh.vertices.len() as i32,
                },
            ),
        };

        gl.vertex_attrib_f32(
            POSITION_LOCATION,
            3,
            mem::size_of::<Vec3>() as i32,
            0,
        );
        gl.enable_vertex_attrib(POSITION_LOCATION);

        gl.bind_buffer(BufferTarget::Array, 0);
        gl.bind_vertex_array(0);

        info!(
            "Uploaded {} vertices, {} triangles ({:?})",
            mesh.vertices.len(),
            mesh.triangle_count(),
            mode
        );

        Self {
            gl,
            vao,
            vbo,
            ebo,
            mode,
        }
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Binds the vertex array and issues one draw call.
    pub fn draw(&self) {
        self.gl.bind_vertex_array(self.vao);
        match self.mode {
            DrawMode::Indexed { count } => self.gl.draw_elements(count),
            DrawMode::Sequential { count } => self.gl.draw_arrays(0, count),
        }
    }
}

impl<G: GraphicsApi> Drop for GeometryBuffer<'_, G> {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(self.vao);
        self.gl.delete_buffer(self.vbo);
        if let Some(ebo) = self.ebo {
            self.gl.delete_buffer(ebo);
        }
    }
}
