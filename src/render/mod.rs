pub mod api;
pub mod frame;
pub mod mesh;
pub mod pipeline;
pub mod shaders;

pub use api::{GlApi, GraphicsApi, ShaderStage};
pub use frame::{FrameLoop, FrameStats, LoopState};
pub use mesh::{DrawMode, GeometryBuffer, MeshData};
pub use pipeline::RenderResources;
pub use shaders::{ShaderError, ShaderProgram, ShaderSource};
