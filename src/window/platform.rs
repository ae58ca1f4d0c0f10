use super::{InputState, Key, KeyState, Surface};
use crate::config::core::WindowConfig;
use crate::engine::Platform;
use crate::render::api::GlApi;
use anyhow::{anyhow, bail, Context, Result};
use glutin::{
    config::ConfigTemplateBuilder,
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::{Display, GetGlDisplay},
    prelude::*,
    surface::{Surface as GlutinSurface, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use log::{debug, info, warn};
use raw_window_handle::HasRawWindowHandle;
use std::{
    ffi::CString,
    num::NonZeroU32,
    panic::{self, AssertUnwindSafe},
    ptr,
    time::Duration,
};
use winit::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowBuilder},
};

/// Creates winit windows with a glutin OpenGL core-profile context.
#[derive(Debug, Default)]
pub struct GlutinPlatform;

impl GlutinPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Platform for GlutinPlatform {
    type Surface = GlutinWindow;
    type Gl = GlApi;

    fn create_window(&mut self, config: &WindowConfig) -> Result<GlutinWindow> {
        GlutinWindow::new(config)
    }

    fn load_graphics(&mut self, surface: &GlutinWindow) -> Result<GlApi> {
        let display = &surface.gl_display;
        let api = GlApi::load_with(|symbol| match CString::new(symbol) {
            Ok(symbol) => display.get_proc_address(symbol.as_c_str()),
            Err(_) => ptr::null(),
        })?;
        info!("OpenGL functions loaded");
        Ok(api)
    }
}

/// Unwind payload for a config picker handed an empty iterator. The picker
/// must return a config, so it cannot report "none" any other way.
struct NoMatchingConfig;

/// The config with the most MSAA samples; the first one wins ties.
fn most_samples<C>(configs: impl Iterator<Item = C>, samples: impl Fn(&C) -> u8) -> Option<C> {
    configs.reduce(|accum, config| {
        if samples(&config) > samples(&accum) {
            config
        } else {
            accum
        }
    })
}

/// Runs `build`, turning a `NoMatchingConfig` unwind into an error. Any other
/// panic keeps unwinding.
fn catch_no_config<T>(build: impl FnOnce() -> T) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(build)) {
        Ok(value) => Ok(value),
        Err(payload) if payload.is::<NoMatchingConfig>() => {
            bail!("No GL config matches the requested template")
        }
        Err(payload) => panic::resume_unwind(payload),
    }
}

/// Window, GL context and surface, driven by pumping the winit event loop
/// once per frame.
pub struct GlutinWindow {
    gl_surface: GlutinSurface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    gl_display: Display,
    window: Window,
    event_loop: EventLoop<()>,
    input: InputState,
    pending_resize: Option<(u32, u32)>,
    close_requested: bool,
}

impl GlutinWindow {
    pub fn new(config: &WindowConfig) -> Result<Self> {
        let event_loop = EventLoop::new().context("Failed to create event loop")?;

        let window_builder = WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(LogicalSize::new(config.width, config.height));

        let template = ConfigTemplateBuilder::new().with_alpha_size(8);
        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));

        let (window, gl_config) = catch_no_config(|| {
            display_builder.build(&event_loop, template, |configs| {
                most_samples(configs, |config| config.num_samples())
                    .unwrap_or_else(|| panic::resume_unwind(Box::new(NoMatchingConfig)))
            })
        })?
        .map_err(|e| anyhow!("Failed to build GL display: {e}"))?;

        let window = window.ok_or_else(|| anyhow!("Display builder returned no window"))?;
        let raw_window_handle = window.raw_window_handle();

        let [major, minor] = config.gl_version;
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_window_handle));

        let gl_display = gl_config.display();
        let not_current = unsafe {
            gl_display
                .create_context(&gl_config, &context_attributes)
                .with_context(|| format!("Failed to create OpenGL {major}.{minor} context"))?
        };

        let attrs = window.build_surface_attributes(<_>::default());
        let gl_surface = unsafe {
            gl_display
                .create_window_surface(&gl_config, &attrs)
                .context("Failed to create GL surface")?
        };

        let gl_context = not_current
            .make_current(&gl_surface)
            .context("Failed to make context current")?;

        if config.vsync {
            if let Err(e) =
                gl_surface.set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::MIN))
            {
                warn!("Failed to enable vsync: {}", e);
            }
        }

        info!(
            "Created {}x{} window \"{}\" with OpenGL {}.{} core context",
            config.width, config.height, config.title, major, minor
        );

        Ok(Self {
            gl_surface,
            gl_context,
            gl_display,
            window,
            event_loop,
            input: InputState::default(),
            pending_resize: None,
            close_requested: false,
        })
    }

    fn handle_window_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.close_requested = true,
            WindowEvent::Resized(size) => {
                // a minimised window reports 0x0; the surface cannot shrink to that
                if let (Some(width), Some(height)) =
                    (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                {
                    self.gl_surface.resize(&self.gl_context, width, height);
                    self.pending_resize = Some((size.width, size.height));
                    debug!("Framebuffer resized to {}x{}", size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.input.handle_key(event.physical_key, event.state);
            }
            WindowEvent::Focused(false) => self.input.reset(),
            _ => {}
        }
    }
}

impl Surface for GlutinWindow {
    fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn should_close(&self) -> bool {
        self.close_requested
    }

    fn request_close(&mut self) {
        self.close_requested = true;
    }

    fn poll_events(&mut self) {
        let mut events = Vec::new();
        let status = self
            .event_loop
            .pump_events(Some(Duration::ZERO), |event, _| {
                if let Event::WindowEvent { event, .. } = event {
                    events.push(event);
                }
            });

        for event in events {
            self.handle_window_event(event);
        }
        if let PumpStatus::Exit(code) = status {
            debug!("Event loop exited with code {}", code);
            self.close_requested = true;
        }
    }

    fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.pending_resize.take()
    }

    fn key_state(&self, key: Key) -> KeyState {
        self.input.key_state(key)
    }

    fn swap_buffers(&mut self) -> Result<()> {
        self.gl_surface
            .swap_buffers(&self.gl_context)
            .context("Failed to swap buffers")
    }
}
