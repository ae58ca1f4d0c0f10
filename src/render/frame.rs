use crate::render::api::GraphicsApi;
use crate::render::pipeline::RenderResources;
use crate::utils::error::{AppError, Result};
use crate::window::{Key, KeyState, Surface};
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Closing,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
}

/// Clear, bind, draw, present, poll; until the window asks to close.
pub struct FrameLoop {
    clear_color: [f32; 4],
    state: LoopState,
    stats: FrameStats,
}

impl FrameLoop {
    pub fn new(clear_color: [f32; 4]) -> Self {
        Self {
            clear_color,
            state: LoopState::Running,
            stats: FrameStats::default(),
        }
    }

    pub fn run<S, G>(
        mut self,
        surface: &mut S,
        gl: &G,
        resources: &RenderResources<'_, G>,
    ) -> Result<FrameStats>
    where
        S: Surface,
        G: GraphicsApi,
    {
        gl.clear_color(self.clear_color);

        while self.state == LoopState::Running {
            self.process_input(surface);
            if self.state == LoopState::Closing {
                break;
            }

            gl.clear_color_buffer();
            resources.program.bind();
            resources.geometry.draw();

            surface
                .swap_buffers()
                .map_err(|e| AppError::Present(format!("{e:#}")))?;
            self.stats.frames += 1;

            surface.poll_events();
            // a minimised window reports 0x0; keep the last usable viewport
            if let Some((width, height)) = surface.take_resize().filter(|&(w, h)| w > 0 && h > 0) {
                debug!("Viewport set to {}x{}", width, height);
                gl.viewport(0, 0, width as i32, height as i32);
            }
        }

        info!("Frame loop finished after {} frames", self.stats.frames);
        Ok(self.stats)
    }

    fn process_input<S: Surface>(&mut self, surface: &mut S) {
        if surface.key_state(Key::Escape) == KeyState::Pressed {
            surface.request_close();
        }
        if surface.should_close() {
            self.state = LoopState::Closing;
        }
    }
}
