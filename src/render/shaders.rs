// shaders.rs - Vertex/fragment program build and validation

use crate::render::api::{GraphicsApi, RawHandle, ShaderStage};
use log::{debug, info};
use std::ffi::{CString, NulError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("{stage} shader compilation failed:\n{log}")]
    CompileFailed { stage: ShaderStage, log: String },
    #[error("Program linking failed:\n{log}")]
    LinkFailed { log: String },
    #[error("Failed to read shader {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage} shader source contains a NUL byte: {source}")]
    InvalidSource {
        stage: ShaderStage,
        #[source]
        source: NulError,
    },
}

/// Text of one shader stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    text: String,
}

impl ShaderSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn from_file(path: &Path) -> Result<Self, ShaderError> {
        let text = fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded shader source {:?} ({} bytes)", path, text.len());
        Ok(Self { text })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// A successfully compiled stage. Deleted on drop; a program that has it
/// attached keeps working after that.
pub struct CompiledShader<'gl, G: GraphicsApi> {
    gl: &'gl G,
    id: RawHandle,
}

impl<'gl, G: GraphicsApi> CompiledShader<'gl, G> {
    pub fn compile(
        gl: &'gl G,
        stage: ShaderStage,
        source: &ShaderSource,
    ) -> Result<Self, ShaderError> {
        let source = CString::new(source.as_str())
            .map_err(|source| ShaderError::InvalidSource { stage, source })?;

        let shader = Self {
            gl,
            id: gl.create_shader(stage),
        };
        gl.shader_source(shader.id, &source);
        gl.compile_shader(shader.id);

        if !gl.compile_status(shader.id) {
            return Err(ShaderError::CompileFailed {
                stage,
                log: gl.shader_info_log(shader.id),
            });
        }
        Ok(shader)
    }

    pub fn id(&self) -> RawHandle {
        self.id
    }
}

impl<G: GraphicsApi> Drop for CompiledShader<'_, G> {
    fn drop(&mut self) {
        self.gl.delete_shader(self.id);
    }
}

/// A linked vertex + fragment program, ready to bind.
pub struct ShaderProgram<'gl, G: GraphicsApi> {
    gl: &'gl G,
    id: RawHandle,
}

impl<'gl, G: GraphicsApi> ShaderProgram<'gl, G> {
    /// Compiles both stages, then links them.
    ///
    /// Compile errors carry the failing stage and stop the build before a
    /// program object exists. A link error means both stages compiled but do
    /// not fit together, e.g. a fragment input the vertex stage never writes.
    /// The compiled stages are deleted once the link has been attempted,
    /// whatever its outcome.
    pub fn build(
        gl: &'gl G,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
    ) -> Result<Self, ShaderError> {
        let vertex = CompiledShader::compile(gl, ShaderStage::Vertex, vertex)?;
        let fragment = CompiledShader::compile(gl, ShaderStage::Fragment, fragment)?;

        let program = Self {
            gl,
            id: gl.create_program(),
        };
        gl.attach_shader(program.id, vertex.id());
        gl.attach_shader(program.id, fragment.id());
        gl.link_program(program.id);

        // No longer needed after linking
        drop(vertex);
        drop(fragment);

        if !gl.link_status(program.id) {
            return Err(ShaderError::LinkFailed {
                log: gl.program_info_log(program.id),
            });
        }

        info!("Shader program {} linked", program.id);
        Ok(program)
    }

    /// Reads both stages from disk and builds them.
    pub fn from_files(
        gl: &'gl G,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Result<Self, ShaderError> {
        let vertex = ShaderSource::from_file(vertex_path)?;
        let fragment = ShaderSource::from_file(fragment_path)?;
        Self::build(gl, &vertex, &fragment)
    }

    pub fn id(&self) -> RawHandle {
        self.id
    }

    pub fn bind(&self) {
        self.gl.use_program(self.id);
    }
}

impl<G: GraphicsApi> Drop for ShaderProgram<'_, G> {
    fn drop(&mut self) {
        self.gl.delete_program(self.id);
    }
}
