use std::process;

use anyhow::{ensure, Result};
use clap::Parser;

use sam_embed_rs::{Config, EmbeddingPipeline, SamEmbedError};

fn main() -> Result<()> {
    let config = Config::parse();

    ensure!(
        config.checkpoint.exists(),
        "Checkpoint path does not exist: {}",
        config.checkpoint.display()
    );

    println!("Loading SAM image encoder ({})...", config.model_type);
    let pipeline = EmbeddingPipeline::with_onnx_encoder(config)?;

    println!("Setting image and generating embedding...");
    match pipeline.run() {
        Ok(artifact) => {
            println!(
                "Successfully generated {} with shape {:?}",
                artifact.path.display(),
                artifact.shape
            );
            Ok(())
        }
        // The one handled failure: a missing or undecodable image.
        Err(err @ SamEmbedError::ImageDecode { .. }) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}
