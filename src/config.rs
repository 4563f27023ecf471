use clap::Parser;
use std::path::PathBuf;

use crate::model::ModelType;

/// Command-line surface for the embedding exporter.
#[derive(Parser, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// SAM image encoder checkpoint (ONNX export)
    #[arg(short, long)]
    pub checkpoint: PathBuf,

    /// SAM backbone the checkpoint was exported from
    #[arg(short, long, value_enum)]
    pub model_type: ModelType,

    /// Image to embed
    #[arg(short, long)]
    pub image: PathBuf,

    /// Output .npy path, defaults to `<image stem>_embedding.npy`
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Device for the CUDA/TensorRT execution providers
    #[arg(short, long, default_value_t = 0)]
    pub device_id: i32,
}

impl Config {
    /// Resolve where the embedding gets written.
    ///
    /// Without `--output`, the path is the input image's base name with an
    /// `_embedding` suffix and the `.npy` extension, relative to the working
    /// directory.
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let stem = self
                .image
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            PathBuf::from(format!("{stem}_embedding.npy"))
        })
    }
}
