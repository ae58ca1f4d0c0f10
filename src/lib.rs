pub mod config;
pub mod engine;
pub mod render;
pub mod utils;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{AppConfig, CONFIG_FILE};
pub use engine::{Engine, Platform};
pub use render::{FrameStats, GlApi, GraphicsApi, ShaderError, ShaderProgram};
pub use utils::error::AppError;
pub use window::{GlutinPlatform, Surface};
