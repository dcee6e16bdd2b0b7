//! CLI for ImageForge - generate an image from a prompt and reference files.

use clap::Parser;
use imageforge::{ForgeConfig, GeminiModel, GenerationOutcome, GenerationRequest, Orchestrator};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "imageforge")]
#[command(about = "Generate an image from a text prompt and local reference images")]
#[command(version)]
struct Cli {
    /// The text prompt describing the desired image
    prompt: String,

    /// Reference image file, may be given multiple times
    #[arg(short, long = "image")]
    images: Vec<PathBuf>,

    /// Directory generated images are written into
    #[arg(long, default_value = imageforge::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Gemini model variant
    #[arg(long, value_parser = parse_model, default_value = "preview")]
    model: GeminiModel,

    /// API key (falls back to GOOGLE_API_KEY)
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

fn parse_model(s: &str) -> Result<GeminiModel, String> {
    match s {
        "preview" => Ok(GeminiModel::FlashImagePreview),
        "flash" => Ok(GeminiModel::FlashImage),
        other => Err(format!("unknown model '{other}' (expected: preview, flash)")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let mut builder = ForgeConfig::builder()
        .model(cli.model)
        .output_dir(cli.output_dir);
    if let Some(key) = cli.api_key {
        builder = builder.api_key(key);
    }
    let orchestrator = Orchestrator::new(builder.build()?);

    let request = GenerationRequest::new(cli.prompt).with_reference_images(cli.images);

    match orchestrator.generate(&request).await {
        GenerationOutcome::ImageSaved(path) => {
            println!("Generated image: {}", path.display());
            Ok(())
        }
        GenerationOutcome::NoImage => {
            println!("No image was generated. Check the log for text output.");
            Ok(())
        }
        GenerationOutcome::Failed(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
    }
}
