use std::path::Path;

use clap::ValueEnum;
use image::{imageops, imageops::FilterType, DynamicImage, RgbImage};
use ndarray::prelude::*;
use nshare::AsNdarray3;
use ort::value::TensorRef;
use ort::{
    execution_providers::{CUDAExecutionProvider, TensorRTExecutionProvider},
    session::{builder::SessionBuilder, Session},
};
use parking_lot::Mutex;

use crate::{
    errors::{Result, SamEmbedError},
    traits::ImageEmbeddingModel,
};

/// Encoder input size used when the export carries dynamic spatial dims.
pub const DEFAULT_IMAGE_SIZE: u32 = 1024;

/// Channel count of the image embedding produced by every SAM backbone.
pub const EMBED_CHANNELS: usize = 256;

/// ViT patch size; the embedding is `input_size / PATCH_SIZE` per spatial axis.
pub const PATCH_SIZE: u32 = 16;

/// Per-channel normalization applied before the forward pass, in RGB order.
/// Same constants the original predictor bakes into `set_image`.
pub const PIXEL_MEAN: [f32; 3] = [123.675, 116.28, 103.53];
pub const PIXEL_STD: [f32; 3] = [58.395, 57.12, 57.375];

/// Registry of supported SAM backbones, keyed by the `--model-type` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelType {
    #[value(name = "vit_h")]
    VitH,
    #[value(name = "vit_l")]
    VitL,
    #[value(name = "vit_b")]
    VitB,
}

impl ModelType {
    pub const fn name(self) -> &'static str {
        match self {
            Self::VitH => "vit_h",
            Self::VitL => "vit_l",
            Self::VitB => "vit_b",
        }
    }

    /// Width of the ViT trunk, for diagnostics only. All backbones project
    /// down to the same [`EMBED_CHANNELS`]-channel embedding.
    pub const fn encoder_width(self) -> usize {
        match self {
            Self::VitH => 1280,
            Self::VitL => 1024,
            Self::VitB => 768,
        }
    }

    /// Construct the encoder for this backbone from a checkpoint file.
    pub fn load(self, checkpoint: &Path, device_id: i32) -> Result<ImageEncoder> {
        ImageEncoder::new(self, checkpoint, device_id)
    }
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// SAM image encoder behind an ONNX Runtime session.
pub struct ImageEncoder {
    pub model_type: ModelType,
    pub image_size: u32,
    input_name: String,
    output_name: String,
    session: Mutex<Session>,
}

impl ImageEncoder {
    pub fn new(model_type: ModelType, checkpoint: &Path, device_id: i32) -> Result<Self> {
        let session = SessionBuilder::new()
            .map_err(|e| SamEmbedError::Model {
                operation: "session builder initialization".to_string(),
                source: Box::new(e),
            })?
            .with_execution_providers([
                TensorRTExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
                CUDAExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
            ])
            .map_err(|e| SamEmbedError::Model {
                operation: "execution provider setup".to_string(),
                source: Box::new(e),
            })?
            .with_memory_pattern(true)
            .map_err(|e| SamEmbedError::Model {
                operation: "memory pattern setup".to_string(),
                source: Box::new(e),
            })?
            .commit_from_file(checkpoint)
            .map_err(|e| SamEmbedError::Model {
                operation: format!(
                    "loading {} checkpoint: {}",
                    model_type,
                    checkpoint.display()
                ),
                source: Box::new(e),
            })?;

        // SAM encoder exports take a single (1, 3, S, S) image tensor and
        // produce a single embedding tensor; capture the names so exports
        // that call them something other than "images"/"image_embeddings"
        // keep working.
        let input_name = session.inputs[0].name.clone();
        let output_name = session.outputs[0].name.clone();

        // Dynamic-dim exports report -1 here.
        let image_size = session.inputs[0]
            .input_type
            .tensor_shape()
            .and_then(|shape| shape.get(2).copied())
            .filter(|&dim| dim > 0)
            .map_or(DEFAULT_IMAGE_SIZE, |dim| dim as u32);

        Ok(Self {
            model_type,
            image_size,
            input_name,
            output_name,
            session: Mutex::new(session),
        })
    }
}

impl ImageEmbeddingModel for ImageEncoder {
    fn embed_image(&self, img: &DynamicImage) -> Result<Array4<f32>> {
        let rgb_img = img.to_rgb8();
        let tensor = preprocess(&rgb_img, self.image_size);
        let embedding = self.predict(tensor.view())?;
        ensure_embedding_shape(embedding.shape(), self.image_size)?;
        Ok(embedding)
    }

    fn input_image_size(&self) -> u32 {
        self.image_size
    }

    fn predict(&self, tensor: ArrayView4<f32>) -> Result<Array4<f32>> {
        let mut binding = self.session.lock();
        let outputs = binding.run(ort::inputs![
            self.input_name.as_str() => TensorRef::from_array_view(&tensor.as_standard_layout())?
        ])?;
        Ok(outputs[self.output_name.as_str()]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix4>()?
            .to_owned())
    }
}

/// Scaled dimensions for a longest-side resize, with the original
/// predictor's `int(dim * scale + 0.5)` rounding.
pub fn preprocess_shape(width: u32, height: u32, long_side: u32) -> (u32, u32) {
    let scale = long_side as f32 / width.max(height) as f32;
    let new_width = (width as f32 * scale + 0.5) as u32;
    let new_height = (height as f32 * scale + 0.5) as u32;
    (new_width, new_height)
}

/// The `set_image` transform: resize so the longest side equals
/// `image_size`, normalize per channel, and zero-pad bottom-right to a
/// square CHW tensor. Padding happens after normalization, so the padded
/// region is exactly 0.0.
pub fn preprocess(image: &RgbImage, image_size: u32) -> Array4<f32> {
    let (width, height) = image.dimensions();
    let (new_width, new_height) = preprocess_shape(width, height, image_size);
    let resized = imageops::resize(image, new_width, new_height, FilterType::Triangle);

    let pixels = resized.as_ndarray3();
    let mut tensor = Array4::<f32>::zeros((1, 3, image_size as usize, image_size as usize));
    for channel in 0..3 {
        let normalized = pixels
            .slice(s![channel, .., ..])
            .map(|&v| (f32::from(v) - PIXEL_MEAN[channel]) / PIXEL_STD[channel]);
        tensor
            .slice_mut(s![0, channel, ..new_height as usize, ..new_width as usize])
            .assign(&normalized);
    }

    tensor
}

/// Expected embedding shape for a given encoder input size.
pub fn embedding_shape(image_size: u32) -> [usize; 4] {
    let spatial = (image_size / PATCH_SIZE) as usize;
    [1, EMBED_CHANNELS, spatial, spatial]
}

/// Reject embeddings whose shape does not match the documented layout.
pub fn ensure_embedding_shape(shape: &[usize], image_size: u32) -> Result<()> {
    let expected = embedding_shape(image_size);
    if shape != expected {
        return Err(SamEmbedError::Validation {
            field: "embedding shape".to_string(),
            reason: format!("expected {expected:?}, got {shape:?}"),
        });
    }
    Ok(())
}
