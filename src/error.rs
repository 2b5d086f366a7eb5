//! Top-level error type for the cam2ascii binary.

use thiserror::Error;

use crate::ascii::QuantizeError;
use crate::camera::{CameraError, DecodeError};
use crate::config::ConfigError;

/// Every error that ends the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Quantize(#[from] QuantizeError),

    #[error("Failed to write to terminal: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl AppError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Task(e.to_string())
    }
}
