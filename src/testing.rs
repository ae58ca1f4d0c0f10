//! In-process doubles for the graphics API, the window surface and the
//! platform, used by the unit tests.

use crate::config::core::WindowConfig;
use crate::engine::Platform;
use crate::render::api::{BufferTarget, GraphicsApi, RawHandle, ShaderStage};
use crate::window::{Key, KeyState, Surface};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::ffi::CStr;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CompileShader(ShaderStage),
    LinkProgram(RawHandle),
    UseProgram(RawHandle),
    BufferData(BufferTarget, Vec<u8>),
    Viewport(i32, i32, i32, i32),
    ClearColor([f32; 4]),
    Clear,
    DrawArrays { first: i32, count: i32 },
    DrawElements { count: i32 },
}

#[derive(Debug, Default)]
struct ShaderObject {
    stage: Option<ShaderStage>,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<RawHandle>,
    linked: bool,
    log: String,
}

#[derive(Debug, Default)]
struct GlState {
    next_handle: RawHandle,
    shaders: HashMap<RawHandle, ShaderObject>,
    programs: HashMap<RawHandle, ProgramObject>,
    live: HashSet<RawHandle>,
    deleted: Vec<RawHandle>,
    calls: Vec<GlCall>,
}

/// Records every call and validates GLSL just enough to tell syntax errors
/// from stage interface mismatches.
#[derive(Debug, Default)]
pub struct RecordingGl {
    state: RefCell<GlState>,
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    pub fn draw_calls(&self) -> Vec<GlCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, GlCall::DrawArrays { .. } | GlCall::DrawElements { .. }))
            .collect()
    }

    pub fn link_attempts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GlCall::LinkProgram(_)))
            .count()
    }

    pub fn live_objects(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn deleted(&self) -> Vec<RawHandle> {
        self.state.borrow().deleted.clone()
    }

    fn alloc(&self) -> RawHandle {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        let handle = state.next_handle;
        state.live.insert(handle);
        handle
    }

    fn release(&self, handle: RawHandle) {
        let mut state = self.state.borrow_mut();
        assert!(state.live.remove(&handle), "handle {handle} released twice");
        state.deleted.push(handle);
    }

    fn record(&self, call: GlCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

fn check_syntax(source: &str) -> Result<(), String> {
    if !source.contains("void main") {
        return Err("0:1(1): error: missing entry point `main'".to_string());
    }
    let opened = source.matches('{').count();
    let closed = source.matches('}').count();
    if opened != closed {
        return Err("0:1(1): error: syntax error, unexpected end of file".to_string());
    }
    Ok(())
}

/// Collects `(type, name)` pairs declared with the given storage qualifier.
fn interface(source: &str, qualifier: &str) -> Vec<(String, String)> {
    source
        .lines()
        .filter_map(|line| {
            let tokens: Vec<_> = line.split_whitespace().collect();
            let at = tokens.iter().position(|t| *t == qualifier)?;
            let ty = tokens.get(at + 1)?;
            let name = tokens.get(at + 2)?.trim_end_matches(';');
            Some((ty.to_string(), name.to_string()))
        })
        .collect()
}

impl GraphicsApi for RecordingGl {
    fn create_shader(&self, stage: ShaderStage) -> RawHandle {
        let handle = self.alloc();
        self.state.borrow_mut().shaders.insert(
            handle,
            ShaderObject {
                stage: Some(stage),
                ..ShaderObject::default()
            },
        );
        handle
    }

    fn shader_source(&self, shader: RawHandle, source: &CStr) {
        let mut state = self.state.borrow_mut();
        let object = state.shaders.get_mut(&shader).expect("unknown shader");
        object.source = source.to_string_lossy().into_owned();
    }

    fn compile_shader(&self, shader: RawHandle) {
        let stage = {
            let mut state = self.state.borrow_mut();
            let object = state.shaders.get_mut(&shader).expect("unknown shader");
            match check_syntax(&object.source) {
                Ok(()) => object.compiled = true,
                Err(log) => object.log = log,
            }
            object.stage.expect("shader without stage")
        };
        self.record(GlCall::CompileShader(stage));
    }

    fn compile_status(&self, shader: RawHandle) -> bool {
        self.state.borrow().shaders[&shader].compiled
    }

    fn shader_info_log(&self, shader: RawHandle) -> String {
        self.state.borrow().shaders[&shader].log.clone()
    }

    fn delete_shader(&self, shader: RawHandle) {
        self.release(shader);
    }

    fn create_program(&self) -> RawHandle {
        let handle = self.alloc();
        self.state
            .borrow_mut()
            .programs
            .insert(handle, ProgramObject::default());
        handle
    }

    fn attach_shader(&self, program: RawHandle, shader: RawHandle) {
        let mut state = self.state.borrow_mut();
        let object = state.programs.get_mut(&program).expect("unknown program");
        object.attached.push(shader);
    }

    fn link_program(&self, program: RawHandle) {
        self.record(GlCall::LinkProgram(program));
        let mut state = self.state.borrow_mut();
        let attached = state.programs[&program].attached.clone();
        let source_of = |stage| {
            attached
                .iter()
                .map(|h| &state.shaders[h])
                .find(|s| s.stage == Some(stage) && s.compiled)
                .map(|s| s.source.clone())
        };

        let result = match (source_of(ShaderStage::Vertex), source_of(ShaderStage::Fragment)) {
            (Some(vertex), Some(fragment)) => {
                let outputs = interface(&vertex, "out");
                match interface(&fragment, "in")
                    .into_iter()
                    .find(|input| !outputs.contains(input))
                {
                    Some((_, name)) => Err(format!(
                        "error: fragment shader input `{name}' has no matching vertex output"
                    )),
                    None => Ok(()),
                }
            }
            _ => Err("error: program needs a compiled vertex and fragment shader".to_string()),
        };

        let object = state.programs.get_mut(&program).expect("unknown program");
        match result {
            Ok(()) => object.linked = true,
            Err(log) => object.log = log,
        }
    }

    fn link_status(&self, program: RawHandle) -> bool {
        self.state.borrow().programs[&program].linked
    }

    fn program_info_log(&self, program: RawHandle) -> String {
        self.state.borrow().programs[&program].log.clone()
    }

    fn use_program(&self, program: RawHandle) {
        self.record(GlCall::UseProgram(program));
    }

    fn delete_program(&self, program: RawHandle) {
        self.release(program);
    }

    fn create_vertex_array(&self) -> RawHandle {
        self.alloc()
    }

    fn bind_vertex_array(&self, _vao: RawHandle) {}

    fn delete_vertex_array(&self, vao: RawHandle) {
        self.release(vao);
    }

    fn create_buffer(&self) -> RawHandle {
        self.alloc()
    }

    fn bind_buffer(&self, _target: BufferTarget, _buffer: RawHandle) {}

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        self.record(GlCall::BufferData(target, data.to_vec()));
    }

    fn delete_buffer(&self, buffer: RawHandle) {
        self.release(buffer);
    }

    fn vertex_attrib_f32(&self, _location: u32, _components: i32, _stride: i32, _offset: usize) {}

    fn enable_vertex_attrib(&self, _location: u32) {}

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport(x, y, width, height));
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.record(GlCall::ClearColor(rgba));
    }

    fn clear_color_buffer(&self) {
        self.record(GlCall::Clear);
    }

    fn draw_arrays(&self, first: i32, count: i32) {
        self.record(GlCall::DrawArrays { first, count });
    }

    fn draw_elements(&self, count: i32) {
        self.record(GlCall::DrawElements { count });
    }
}

/// A surface whose close request arrives after a fixed number of polls.
#[derive(Debug, Default)]
pub struct ScriptedSurface {
    pub size: (u32, u32),
    pub close_after_polls: Option<usize>,
    pub escape_after_polls: Option<usize>,
    pub resizes: Vec<(usize, (u32, u32))>,
    pub fail_swap: bool,
    pub polls: usize,
    pub swaps: usize,
    close_requested: bool,
    escape_down: bool,
    pending_resize: Option<(u32, u32)>,
}

impl ScriptedSurface {
    pub fn new(size: (u32, u32)) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}

impl Surface for ScriptedSurface {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn should_close(&self) -> bool {
        self.close_requested
    }

    fn request_close(&mut self) {
        self.close_requested = true;
    }

    fn poll_events(&mut self) {
        self.polls += 1;
        if self.close_after_polls == Some(self.polls) {
            self.close_requested = true;
        }
        if self.escape_after_polls == Some(self.polls) {
            self.escape_down = true;
        }
        if let Some((_, size)) = self.resizes.iter().find(|(at, _)| *at == self.polls) {
            self.size = *size;
            self.pending_resize = Some(*size);
        }
    }

    fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.pending_resize.take()
    }

    fn key_state(&self, key: Key) -> KeyState {
        match key {
            Key::Escape if self.escape_down => KeyState::Pressed,
            _ => KeyState::Released,
        }
    }

    fn swap_buffers(&mut self) -> anyhow::Result<()> {
        if self.fail_swap {
            anyhow::bail!("surface lost");
        }
        self.swaps += 1;
        Ok(())
    }
}

/// Platform double. `gl_loads` counts how often graphics loading was reached.
#[derive(Debug)]
pub struct ScriptedPlatform {
    pub window_fails: bool,
    pub loader_fails: bool,
    pub close_after_polls: usize,
    pub gl: Rc<RecordingGl>,
    pub gl_loads: Cell<usize>,
}

impl ScriptedPlatform {
    pub fn new(close_after_polls: usize) -> Self {
        Self {
            window_fails: false,
            loader_fails: false,
            close_after_polls,
            gl: Rc::new(RecordingGl::new()),
            gl_loads: Cell::new(0),
        }
    }
}

impl GraphicsApi for Rc<RecordingGl> {
    fn create_shader(&self, stage: ShaderStage) -> RawHandle {
        (**self).create_shader(stage)
    }
    fn shader_source(&self, shader: RawHandle, source: &CStr) {
        (**self).shader_source(shader, source)
    }
    fn compile_shader(&self, shader: RawHandle) {
        (**self).compile_shader(shader)
    }
    fn compile_status(&self, shader: RawHandle) -> bool {
        (**self).compile_status(shader)
    }
    fn shader_info_log(&self, shader: RawHandle) -> String {
        (**self).shader_info_log(shader)
    }
    fn delete_shader(&self, shader: RawHandle) {
        (**self).delete_shader(shader)
    }
    fn create_program(&self) -> RawHandle {
        (**self).create_program()
    }
    fn attach_shader(&self, program: RawHandle, shader: RawHandle) {
        (**self).attach_shader(program, shader)
    }
    fn link_program(&self, program: RawHandle) {
        (**self).link_program(program)
    }
    fn link_status(&self, program: RawHandle) -> bool {
        (**self).link_status(program)
    }
    fn program_info_log(&self, program: RawHandle) -> String {
        (**self).program_info_log(program)
    }
    fn use_program(&self, program: RawHandle) {
        (**self).use_program(program)
    }
    fn delete_program(&self, program: RawHandle) {
        (**self).delete_program(program)
    }
    fn create_vertex_array(&self) -> RawHandle {
        (**self).create_vertex_array()
    }
    fn bind_vertex_array(&self, vao: RawHandle) {
        (**self).bind_vertex_array(vao)
    }
    fn delete_vertex_array(&self, vao: RawHandle) {
        (**self).delete_vertex_array(vao)
    }
    fn create_buffer(&self) -> RawHandle {
        (**self).create_buffer()
    }
    fn bind_buffer(&self, target: BufferTarget, buffer: RawHandle) {
        (**self).bind_buffer(target, buffer)
    }
    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        (**self).buffer_data(target, data)
    }
    fn delete_buffer(&self, buffer: RawHandle) {
        (**self).delete_buffer(buffer)
    }
    fn vertex_attrib_f32(&self, location: u32, components: i32, stride: i32, offset: usize) {
        (**self).vertex_attrib_f32(location, components, stride, offset)
    }
    fn enable_vertex_attrib(&self, location: u32) {
        (**self).enable_vertex_attrib(location)
    }
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        (**self).viewport(x, y, width, height)
    }
    fn clear_color(&self, rgba: [f32; 4]) {
        (**self).clear_color(rgba)
    }
    fn clear_color_buffer(&self) {
        (**self).clear_color_buffer()
    }
    fn draw_arrays(&self, first: i32, count: i32) {
        (**self).draw_arrays(first, count)
    }
    fn draw_elements(&self, count: i32) {
        (**self).draw_elements(count)
    }
}

impl Platform for ScriptedPlatform {
    type Surface = ScriptedSurface;
    type Gl = Rc<RecordingGl>;

    fn create_window(&mut self, config: &WindowConfig) -> anyhow::Result<Self::Surface> {
        if self.window_fails {
            anyhow::bail!("no display available");
        }
        let mut surface = ScriptedSurface::new((config.width, config.height));
        surface.close_after_polls = Some(self.close_after_polls);
        Ok(surface)
    }

    fn load_graphics(&mut self, _surface: &Self::Surface) -> anyhow::Result<Self::Gl> {
        self.gl_loads.set(self.gl_loads.get() + 1);
        if self.loader_fails {
            anyhow::bail!("glCreateShader missing");
        }
        Ok(Rc::clone(&self.gl))
    }
}
