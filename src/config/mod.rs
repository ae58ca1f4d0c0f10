pub mod core;
pub mod rendering;

pub use self::core::{AppConfig, ConfigError, ShaderConfig, WindowConfig, CONFIG_FILE};
pub use rendering::{GeometryKind, RenderConfig};
