use crate::config::ConfigError;
use crate::render::shaders::ShaderError;
use std::process::ExitCode;
use thiserror::Error;

/// Every way a run can end early. All of them are fatal.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create window: {0}")]
    WindowCreationFailed(String),

    #[error("Failed to load OpenGL functions: {0}")]
    GraphicsLoaderFailed(String),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error("Failed to present frame: {0}")]
    Present(String),
}

impl AppError {
    /// Process exit status, one per failure class. Zero is reserved for a
    /// normal close.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 1,
            AppError::WindowCreationFailed(_) => 2,
            AppError::GraphicsLoaderFailed(_) => 3,
            AppError::Shader(_) => 4,
            AppError::Present(_) => 5,
        }
    }
}

impl From<AppError> for ExitCode {
    fn from(err: AppError) -> Self {
        ExitCode::from(err.exit_code())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
