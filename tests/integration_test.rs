use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use ndarray::Array4;
use tempfile::TempDir;

use sam_embed_rs::{
    mocks::MockImageEncoder, Config, EmbeddingPipeline, ImageEmbeddingModel, SamEmbedError,
};

fn config_for(image: PathBuf, output: Option<PathBuf>) -> Config {
    Config {
        checkpoint: PathBuf::from("encoder.onnx"),
        model_type: sam_embed_rs::ModelType::VitH,
        image,
        output,
        device_id: 0,
    }
}

fn write_test_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(48, 32, Rgb([120, 80, 40]))
        .save(&path)
        .unwrap();
    path
}

#[test]
fn test_pipeline_writes_embedding_with_documented_shape() {
    let temp_dir = TempDir::new().unwrap();
    let image_path = write_test_image(temp_dir.path(), "casaTest.png");
    let output_path = temp_dir.path().join("casaTest_embedding.npy");

    let config = config_for(image_path, Some(output_path.clone()));
    let pipeline = EmbeddingPipeline::new(MockImageEncoder::new(1024), config);

    let artifact = pipeline.run().unwrap();

    assert_eq!(artifact.path, output_path);
    assert_eq!(artifact.shape, vec![1, 256, 64, 64]);
    assert!(output_path.exists());

    // The file on disk round-trips to the same tensor shape.
    let stored: Array4<f32> = ndarray_npy::read_npy(&output_path).unwrap();
    assert_eq!(stored.shape(), &[1, 256, 64, 64]);
}

#[test]
fn test_unreadable_image_fails_without_output() {
    let temp_dir = TempDir::new().unwrap();
    let image_path = temp_dir.path().join("missing.png");
    let output_path = temp_dir.path().join("missing_embedding.npy");

    let config = config_for(image_path, Some(output_path.clone()));
    let pipeline = EmbeddingPipeline::new(MockImageEncoder::new(1024), config);

    let err = pipeline.run().unwrap_err();
    assert!(matches!(err, SamEmbedError::ImageDecode { .. }));
    assert!(!output_path.exists());
}

#[test]
fn test_undecodable_file_fails_without_output() {
    let temp_dir = TempDir::new().unwrap();
    let image_path = temp_dir.path().join("not_an_image.png");
    fs::write(&image_path, b"this is not a png").unwrap();
    let output_path = temp_dir.path().join("not_an_image_embedding.npy");

    let config = config_for(image_path, Some(output_path.clone()));
    let pipeline = EmbeddingPipeline::new(MockImageEncoder::new(1024), config);

    let err = pipeline.run().unwrap_err();
    assert!(matches!(err, SamEmbedError::ImageDecode { .. }));
    assert!(!output_path.exists());
}

#[test]
fn test_default_output_name_derivation() {
    let config = config_for(PathBuf::from("assets/data/casaTest.png"), None);
    assert_eq!(
        config.output_path(),
        PathBuf::from("casaTest_embedding.npy")
    );
}

#[test]
fn test_mock_encoder_matches_trait_contract() {
    let mock = MockImageEncoder::new(1024);
    assert_eq!(mock.input_image_size(), 1024);

    let tensor = Array4::<f32>::zeros((1, 3, 1024, 1024));
    let embedding = mock.predict(tensor.view()).unwrap();
    assert_eq!(embedding.shape(), &[1, 256, 64, 64]);
}
