use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for the embedding exporter.
///
/// Each variant captures the context specific to its failure domain
/// (filesystem, image decoding, model inference, serialization) so callers
/// never have to parse error strings.
#[derive(Error, Debug)]
pub enum SamEmbedError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not load image: {path}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write embedding: {path}")]
    EmbeddingWrite {
        path: PathBuf,
        #[source]
        source: ndarray_npy::WriteNpyError,
    },

    #[error("Model error: {operation} failed")]
    Model {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {field} {reason}")]
    Validation { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, SamEmbedError>;

/// Convert ONNX Runtime errors to model errors.
impl From<ort::Error> for SamEmbedError {
    fn from(err: ort::Error) -> Self {
        Self::Model {
            operation: "ort operation".to_string(),
            source: Box::new(err),
        }
    }
}

/// Convert ndarray shape errors to model errors.
///
/// Shape errors only occur during tensor operations that are part of model
/// inference, so they share the model error category rather than getting a
/// separate tensor variant.
impl From<ndarray::ShapeError> for SamEmbedError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::Model {
            operation: "tensor shape conversion".to_string(),
            source: Box::new(err),
        }
    }
}
