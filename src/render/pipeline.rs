use crate::config::{GeometryKind, ShaderConfig};
use crate::render::api::GraphicsApi;
use crate::render::mesh::{GeometryBuffer, MeshData};
use crate::render::shaders::{ShaderError, ShaderProgram};

/// Everything the frame loop draws with, built once before it starts.
pub struct RenderResources<'gl, G: GraphicsApi> {
    pub program: ShaderProgram<'gl, G>,
    pub geometry: GeometryBuffer<'gl, G>,
}

impl<'gl, G: GraphicsApi> RenderResources<'gl, G> {
    /// Builds the program from the configured files, then uploads the mesh.
    /// Nothing is uploaded when the program fails to build.
    pub fn prepare(
        gl: &'gl G,
        shaders: &ShaderConfig,
        geometry: GeometryKind,
    ) -> Result<Self, ShaderError> {
        let program = ShaderProgram::from_files(gl, &shaders.vertex, &shaders.fragment)?;
        let mesh = match geometry {
            GeometryKind::Quad => MeshData::quad(),
            GeometryKind::TrianglePair => MeshData::triangle_pair(),
        };
        let geometry = GeometryBuffer::upload(gl, &mesh);
        Ok(Self { program, geometry })
    }
}
