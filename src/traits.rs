use crate::errors::Result;
use image::DynamicImage;
use ndarray::prelude::*;

/// Abstraction over the image encoder.
///
/// The glue code depends on this seam instead of the concrete ONNX session
/// so the pipeline can be exercised without a real checkpoint.
pub trait ImageEmbeddingModel: Send + Sync {
    /// Preprocess the image and run the forward pass, returning the
    /// image-embedding tensor.
    fn embed_image(&self, img: &DynamicImage) -> Result<Array4<f32>>;

    /// Spatial size of the encoder input, in pixels per side.
    fn input_image_size(&self) -> u32;

    /// Raw forward pass on an already-preprocessed `(1, 3, S, S)` tensor.
    fn predict(&self, tensor: ArrayView4<f32>) -> Result<Array4<f32>>;
}
