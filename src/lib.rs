#![warn(missing_docs)]
//! ImageForge - prompt + reference images in, Gemini-generated image out.
//!
//! This crate is the orchestration core of a small desktop tool: the
//! presentation shell collects a prompt and a set of local image files, the
//! [`Orchestrator`] submits them to the Gemini image API, saves any returned
//! image under a timestamped path, and reports one of three outcomes for the
//! shell to display.
//!
//! # Quick Start
//!
//! ```no_run
//! use imageforge::{ForgeConfig, GenerationOutcome, GenerationRequest, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> imageforge::Result<()> {
//!     let config = ForgeConfig::builder().build()?; // GOOGLE_API_KEY from env
//!     let orchestrator = Orchestrator::new(config);
//!
//!     let request = GenerationRequest::new("A toy action figure in blister packaging")
//!         .with_reference_images(vec!["portrait.jpg", "accessory.png"]);
//!
//!     match orchestrator.generate(&request).await {
//!         GenerationOutcome::ImageSaved(path) => println!("saved to {}", path.display()),
//!         GenerationOutcome::NoImage => println!("no image was produced"),
//!         GenerationOutcome::Failed(msg) => eprintln!("{msg}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Driving from an interactive loop
//!
//! A GUI shell must never block its interactive thread on the network
//! round-trip. [`Dispatcher`] runs the orchestrator on a single background
//! worker and delivers the completion through a channel the shell polls from
//! its event loop:
//!
//! ```no_run
//! use imageforge::{Dispatcher, ForgeConfig, GenerationRequest, Orchestrator};
//! use std::sync::Arc;
//!
//! # fn main() -> imageforge::Result<()> {
//! let orchestrator = Arc::new(Orchestrator::new(ForgeConfig::builder().build()?));
//! let mut dispatcher = Dispatcher::new(orchestrator);
//!
//! dispatcher.submit(GenerationRequest::new("A puppy"))?;
//! // ... in the event loop, while dispatcher.is_busy() keep the trigger disabled:
//! if let Some(outcome) = dispatcher.poll() {
//!     // display the outcome; the trigger is re-enabled
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod dispatch;
mod error;
mod gemini;
mod orchestrator;

pub use config::{ForgeConfig, ForgeConfigBuilder, GeminiModel, DEFAULT_OUTPUT_DIR};
pub use dispatch::{Dispatcher, ImageGenerator};
pub use error::{ImageForgeError, Result};
pub use gemini::{ContentPart, GeminiClient, InlineImage, ReferenceImage};
pub use orchestrator::{GenerationOutcome, GenerationRequest, Orchestrator};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::ForgeConfig;
    pub use crate::dispatch::{Dispatcher, ImageGenerator};
    pub use crate::error::{ImageForgeError, Result};
    pub use crate::orchestrator::{GenerationOutcome, GenerationRequest, Orchestrator};
}
