//! Configuration for the orchestrator.
//!
//! All environment access happens once, inside [`ForgeConfigBuilder::build`];
//! the orchestrator itself only ever sees an explicit [`ForgeConfig`].

use crate::error::{ImageForgeError, Result};
use std::path::PathBuf;

/// Default directory generated images are written into, relative to the
/// process working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "generated_images";

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 2.5 Flash Image preview build.
    #[default]
    FlashImagePreview,
    /// Gemini 2.5 Flash Image (GA).
    FlashImage,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlashImagePreview => "gemini-2.5-flash-image-preview",
            Self::FlashImage => "gemini-2.5-flash-image",
        }
    }
}

impl std::fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolved configuration handed to [`Orchestrator::new`].
///
/// [`Orchestrator::new`]: crate::Orchestrator::new
#[derive(Debug, Clone)]
pub struct ForgeConfig {
    /// Gemini API key.
    pub api_key: String,
    /// Model identifier used for every request.
    pub model: GeminiModel,
    /// Directory generated images are saved into (created on demand).
    pub output_dir: PathBuf,
}

impl ForgeConfig {
    /// Creates a new `ForgeConfigBuilder`.
    pub fn builder() -> ForgeConfigBuilder {
        ForgeConfigBuilder::new()
    }
}

/// Builder for [`ForgeConfig`].
#[derive(Debug, Clone, Default)]
pub struct ForgeConfigBuilder {
    api_key: Option<String>,
    model: GeminiModel,
    output_dir: Option<PathBuf>,
}

impl ForgeConfigBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Sets the output directory for generated images.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Builds the config, resolving the API key.
    pub fn build(self) -> Result<ForgeConfig> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| {
                ImageForgeError::Auth("GOOGLE_API_KEY not set and no API key provided".into())
            })?;

        Ok(ForgeConfig {
            api_key,
            model: self.model,
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        })
    }
}
