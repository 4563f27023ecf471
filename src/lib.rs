pub mod config;
pub mod errors;
pub mod model;
pub mod traits;

pub mod mocks;

use ndarray_npy::write_npy;
use std::path::PathBuf;

pub use config::Config;
pub use errors::{Result, SamEmbedError};
pub use model::{ImageEncoder, ModelType};
pub use traits::ImageEmbeddingModel;

/// What a pipeline run produced.
#[derive(Debug)]
pub struct EmbeddingArtifact {
    pub path: PathBuf,
    pub shape: Vec<usize>,
}

/// Decode one image, encode it, and persist the embedding.
pub struct EmbeddingPipeline<M: ImageEmbeddingModel> {
    model: M,
    config: Config,
}

impl<M: ImageEmbeddingModel> EmbeddingPipeline<M> {
    pub const fn new(model: M, config: Config) -> Self {
        Self { model, config }
    }

    /// Run the whole pipeline once.
    ///
    /// The image is decoded before anything touches the output path, so a
    /// failed decode never leaves a partial output file behind.
    pub fn run(&self) -> Result<EmbeddingArtifact> {
        let image = image::open(&self.config.image).map_err(|e| SamEmbedError::ImageDecode {
            path: self.config.image.clone(),
            source: e,
        })?;

        let embedding = self.model.embed_image(&image)?;

        let output = self.config.output_path();
        write_npy(&output, &embedding).map_err(|e| SamEmbedError::EmbeddingWrite {
            path: output.clone(),
            source: e,
        })?;

        Ok(EmbeddingArtifact {
            path: output,
            shape: embedding.shape().to_vec(),
        })
    }
}

impl EmbeddingPipeline<ImageEncoder> {
    /// Build the pipeline with the real ONNX encoder named by the config.
    pub fn with_onnx_encoder(config: Config) -> Result<Self> {
        let model = config
            .model_type
            .load(&config.checkpoint, config.device_id)?;
        Ok(Self::new(model, config))
    }
}
