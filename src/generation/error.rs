use std::path::PathBuf;
use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation model not found at path: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load generation model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("failed to load adapter: {reason}")]
    AdapterLoadFailed { reason: String },

    #[error("{device} device unavailable: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    #[error("generation failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("invalid generation configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<candle_core::Error> for GenerationError {
    fn from(err: candle_core::Error) -> Self {
        GenerationError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for GenerationError {
    fn from(err: std::io::Error) -> Self {
        GenerationError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}

impl From<EmbeddingError> for GenerationError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::DeviceUnavailable { device, reason } => {
                GenerationError::DeviceUnavailable { device, reason }
            }
            _ => GenerationError::ModelLoadFailed {
                reason: err.to_string(),
            },
        }
    }
}
