use crate::{
    config::{AppConfig, WindowConfig},
    render::{api::GraphicsApi, frame::FrameLoop, pipeline::RenderResources, FrameStats},
    utils::error::{AppError, Result},
    window::Surface,
};
use log::info;

/// Source of windows and GL function tables.
pub trait Platform {
    type Surface: Surface;
    type Gl: GraphicsApi;

    fn create_window(&mut self, config: &WindowConfig) -> anyhow::Result<Self::Surface>;

    /// Loads GL entry points for the context current on `surface`.
    fn load_graphics(&mut self, surface: &Self::Surface) -> anyhow::Result<Self::Gl>;
}

pub struct Engine {
    config: AppConfig,
}

impl Engine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Window, GL, program, geometry, then the frame loop until close.
    ///
    /// Each setup step either succeeds or ends the run; a failed window never
    /// reaches GL loading, a failed program never reaches the loop.
    pub fn run<P: Platform>(&self, platform: &mut P) -> Result<FrameStats> {
        let mut surface = platform
            .create_window(&self.config.window)
            .map_err(|e| AppError::WindowCreationFailed(format!("{e:#}")))?;

        let gl = platform
            .load_graphics(&surface)
            .map_err(|e| AppError::GraphicsLoaderFailed(format!("{e:#}")))?;

        let (width, height) = surface.size();
        gl.viewport(0, 0, width as i32, height as i32);

        let resources = RenderResources::prepare(
            &gl,
            &self.config.shaders,
            self.config.rendering.geometry,
        )?;
        info!("Render resources ready, entering frame loop");

        let stats = FrameLoop::new(self.config.rendering.clear_color).run(
            &mut surface,
            &gl,
            &resources,
        )?;
        Ok(stats)
    }
}
