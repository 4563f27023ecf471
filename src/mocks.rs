use crate::errors::Result;
use crate::model::{embedding_shape, preprocess};
use crate::traits::ImageEmbeddingModel;
use image::DynamicImage;
use ndarray::prelude::*;

/// Encoder stand-in for tests: zero embedding with the documented shape.
#[derive(Debug, Clone)]
pub struct MockImageEncoder {
    pub image_size: u32,
}

impl MockImageEncoder {
    pub const fn new(image_size: u32) -> Self {
        Self { image_size }
    }
}

impl ImageEmbeddingModel for MockImageEncoder {
    fn embed_image(&self, img: &DynamicImage) -> Result<Array4<f32>> {
        let rgb_img = img.to_rgb8();
        let tensor = preprocess(&rgb_img, self.image_size);
        self.predict(tensor.view())
    }

    fn input_image_size(&self) -> u32 {
        self.image_size
    }

    fn predict(&self, _tensor: ArrayView4<f32>) -> Result<Array4<f32>> {
        let [n, c, h, w] = embedding_shape(self.image_size);
        Ok(Array4::<f32>::zeros((n, c, h, w)))
    }
}

pub const fn create_mock_encoder() -> MockImageEncoder {
    MockImageEncoder::new(crate::model::DEFAULT_IMAGE_SIZE)
}
