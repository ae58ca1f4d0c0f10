use gl::types::*;
use std::ffi::{c_void, CStr};
use std::ptr;
use thiserror::Error;

/// Raw GL object name. Only the owning wrappers in this crate hand these out.
pub type RawHandle = GLuint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_enum(self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

impl BufferTarget {
    fn gl_enum(self) -> GLenum {
        match self {
            BufferTarget::Array => gl::ARRAY_BUFFER,
            BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
        }
    }
}

/// The subset of OpenGL this demo talks to.
///
/// Every call assumes a current context on the calling thread. Handles are
/// plain GL names; ownership lives in `CompiledShader`, `ShaderProgram` and
/// `GeometryBuffer`.
pub trait GraphicsApi {
    fn create_shader(&self, stage: ShaderStage) -> RawHandle;
    fn shader_source(&self, shader: RawHandle, source: &CStr);
    fn compile_shader(&self, shader: RawHandle);
    fn compile_status(&self, shader: RawHandle) -> bool;
    fn shader_info_log(&self, shader: RawHandle) -> String;
    fn delete_shader(&self, shader: RawHandle);

    fn create_program(&self) -> RawHandle;
    fn attach_shader(&self, program: RawHandle, shader: RawHandle);
    fn link_program(&self, program: RawHandle);
    fn link_status(&self, program: RawHandle) -> bool;
    fn program_info_log(&self, program: RawHandle) -> String;
    fn use_program(&self, program: RawHandle);
    fn delete_program(&self, program: RawHandle);

    fn create_vertex_array(&self) -> RawHandle;
    fn bind_vertex_array(&self, vao: RawHandle);
    fn delete_vertex_array(&self, vao: RawHandle);

    fn create_buffer(&self) -> RawHandle;
    fn bind_buffer(&self, target: BufferTarget, buffer: RawHandle);
    fn buffer_data(&self, target: BufferTarget, data: &[u8]);
    fn delete_buffer(&self, buffer: RawHandle);

    /// Describes a float attribute at `location` for the bound array buffer.
    fn vertex_attrib_f32(&self, location: u32, components: i32, stride: i32, offset: usize);
    fn enable_vertex_attrib(&self, location: u32);

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, rgba: [f32; 4]);
    fn clear_color_buffer(&self);
    fn draw_arrays(&self, first: i32, count: i32);
    /// Draws `count` `u32` indices from the bound element buffer.
    fn draw_elements(&self, count: i32);
}

#[derive(Debug, Error)]
#[error("OpenGL entry points not loaded: {}", .missing.join(", "))]
pub struct LoaderError {
    pub missing: Vec<&'static str>,
}

/// `GraphicsApi` backed by the global function table of the `gl` crate.
#[derive(Debug)]
pub struct GlApi {
    _loaded: (),
}

impl GlApi {
    /// Loads GL function pointers through `loader` and checks that every entry
    /// point this crate calls resolved.
    pub fn load_with<F>(loader: F) -> Result<Self, LoaderError>
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        let required = [
            ("glCreateShader", gl::CreateShader::is_loaded()),
            ("glShaderSource", gl::ShaderSource::is_loaded()),
            ("glCompileShader", gl::CompileShader::is_loaded()),
            ("glCreateProgram", gl::CreateProgram::is_loaded()),
            ("glLinkProgram", gl::LinkProgram::is_loaded()),
            ("glUseProgram", gl::UseProgram::is_loaded()),
            ("glGenVertexArrays", gl::GenVertexArrays::is_loaded()),
            ("glGenBuffers", gl::GenBuffers::is_loaded()),
            ("glBufferData", gl::BufferData::is_loaded()),
            ("glVertexAttribPointer", gl::VertexAttribPointer::is_loaded()),
            ("glViewport", gl::Viewport::is_loaded()),
            ("glClear", gl::Clear::is_loaded()),
            ("glDrawArrays", gl::DrawArrays::is_loaded()),
            ("glDrawElements", gl::DrawElements::is_loaded()),
        ];
        let missing: Vec<_> = required
            .iter()
            .filter(|(_, loaded)| !loaded)
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(Self { _loaded: () })
        } else {
            Err(LoaderError { missing })
        }
    }

    fn read_info_log(len: GLint, fetch: impl FnOnce(GLsizei, *mut GLchar)) -> String {
        if len <= 0 {
            return String::new();
        }
        let mut buffer = vec![0u8; len as usize];
        fetch(len, buffer.as_mut_ptr() as *mut GLchar);
        // GL writes a trailing NUL into the buffer
        while buffer.last() == Some(&0) {
            buffer.pop();
        }
        String::from_utf8_lossy(&buffer).trim_end().to_string()
    }
}

impl GraphicsApi for GlApi {
    fn create_shader(&self, stage: ShaderStage) -> RawHandle {
        unsafe { gl::CreateShader(stage.gl_enum()) }
    }

    fn shader_source(&self, shader: RawHandle, source: &CStr) {
        unsafe { gl::ShaderSource(shader, 1, &source.as_ptr(), ptr::null()) }
    }

    fn compile_shader(&self, shader: RawHandle) {
        unsafe { gl::CompileShader(shader) }
    }

    fn compile_status(&self, shader: RawHandle) -> bool {
        let mut success = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success) };
        success != 0
    }

    fn shader_info_log(&self, shader: RawHandle) -> String {
        let mut len = 0;
        unsafe { gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len) };
        Self::read_info_log(len, |len, buf| unsafe {
            gl::GetShaderInfoLog(shader, len, ptr::null_mut(), buf)
        })
    }

    fn delete_shader(&self, shader: RawHandle) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&self) -> RawHandle {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: RawHandle, shader: RawHandle) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn link_program(&self, program: RawHandle) {
        unsafe { gl::LinkProgram(program) }
    }

    fn link_status(&self, program: RawHandle) -> bool {
        let mut success = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut success) };
        success != 0
    }

    fn program_info_log(&self, program: RawHandle) -> String {
        let mut len = 0;
        unsafe { gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len) };
        Self::read_info_log(len, |len, buf| unsafe {
            gl::GetProgramInfoLog(program, len, ptr::null_mut(), buf)
        })
    }

    fn use_program(&self, program: RawHandle) {
        unsafe { gl::UseProgram(program) }
    }

    fn delete_program(&self, program: RawHandle) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn create_vertex_array(&self) -> RawHandle {
        let mut vao = 0;
        unsafe { gl::GenVertexArrays(1, &mut vao) };
        vao
    }

    fn bind_vertex_array(&self, vao: RawHandle) {
        unsafe { gl::BindVertexArray(vao) }
    }

    fn delete_vertex_array(&self, vao: RawHandle) {
        unsafe { gl::DeleteVertexArrays(1, &vao) }
    }

    fn create_buffer(&self) -> RawHandle {
        let mut buffer = 0;
        unsafe { gl::GenBuffers(1, &mut buffer) };
        buffer
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: RawHandle) {
        unsafe { gl::BindBuffer(target.gl_enum(), buffer) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        unsafe {
            gl::BufferData(
                target.gl_enum(),
                data.len() as GLsizeiptr,
                data.as_ptr() as *const _,
                gl::STATIC_DRAW,
            )
        }
    }

    fn delete_buffer(&self, buffer: RawHandle) {
        unsafe { gl::DeleteBuffers(1, &buffer) }
    }

    fn vertex_attrib_f32(&self, location: u32, components: i32, stride: i32, offset: usize) {
        unsafe {
            gl::VertexAttribPointer(
                location,
                components,
                gl::FLOAT,
                gl::FALSE,
                stride,
                offset as *const _,
            )
        }
    }

    fn enable_vertex_attrib(&self, location: u32) {
        unsafe { gl::EnableVertexAttribArray(location) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { gl::Viewport(x, y, width, height) }
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        unsafe { gl::ClearColor(rgba[0], rgba[1], rgba[2], rgba[3]) }
    }

    fn clear_color_buffer(&self) {
        unsafe { gl::Clear(gl::COLOR_BUFFER_BIT) }
    }

    fn draw_arrays(&self, first: i32, count: i32) {
        unsafe { gl::DrawArrays(gl::TRIANGLES, first, count) }
    }

    fn draw_elements(&self, count: i32) {
        unsafe { gl::DrawElements(gl::TRIANGLES, count, gl::UNSIGNED_INT, ptr::null()) }
    }
}
