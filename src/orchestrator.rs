//! Request/response orchestration between the presentation shell and the
//! Gemini call.
//!
//! [`Orchestrator::generate`] is the whole flow: open the reference images,
//! submit one combined payload, scan the response parts in order, save the
//! first inline image under a timestamped name. Every failure along the way
//! is collapsed into [`GenerationOutcome::Failed`]; the call never returns
//! an error to the shell.

use crate::config::ForgeConfig;
use crate::error::{ImageForgeError, Result};
use crate::gemini::{detect_image_mime, ContentPart, GeminiClient, ReferenceImage};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// One user-triggered prompt + reference-images submission.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The text prompt guiding generation.
    pub prompt: String,
    /// Local reference image files, in the order supplied by the caller.
    pub reference_images: Vec<PathBuf>,
}

impl GenerationRequest {
    /// Creates a request with the given prompt and no reference images.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            reference_images: Vec::new(),
        }
    }

    /// Sets the reference image paths.
    pub fn with_reference_images<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.reference_images = paths.into_iter().map(Into::into).collect();
        self
    }
}

/// Outcome of one generation request, handed to the presentation shell.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "the outcome should be shown to the operator"]
pub enum GenerationOutcome {
    /// A newly written local file containing the generated image.
    ///
    /// The bytes are written verbatim under the fixed `.png` name; when the
    /// service reports another format (e.g. `image/jpeg`) the extension
    /// follows the filename scheme, not the payload.
    ImageSaved(PathBuf),
    /// The call succeeded but returned no image payload (only text).
    NoImage,
    /// The call failed; the message is the human-readable cause.
    Failed(String),
}

/// Mediates between the shell trigger and the external service call.
pub struct Orchestrator {
    client: GeminiClient,
    output_dir: PathBuf,
}

impl Orchestrator {
    /// Creates an orchestrator from a resolved configuration.
    pub fn new(config: ForgeConfig) -> Self {
        let client = GeminiClient::new(&config);
        Self {
            client,
            output_dir: config.output_dir,
        }
    }

    /// Runs one generation request to completion.
    ///
    /// Never panics or returns an error on the failure paths: every outcome
    /// is one of the three [`GenerationOutcome`] variants.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        match self.generate_inner(request).await {
            Ok(Some(path)) => {
                tracing::info!(path = %path.display(), "generated image saved");
                GenerationOutcome::ImageSaved(path)
            }
            Ok(None) => {
                tracing::info!("response contained no image data");
                GenerationOutcome::NoImage
            }
            Err(e) => {
                tracing::error!(error = %e, "generation failed");
                GenerationOutcome::Failed(format!("Error: {e}"))
            }
        }
    }

    async fn generate_inner(&self, request: &GenerationRequest) -> Result<Option<PathBuf>> {
        let images = request
            .reference_images
            .iter()
            .map(ReferenceImage::open)
            .collect::<Result<Vec<_>>>()?;

        let parts = self
            .client
            .generate_content(&request.prompt, &images)
            .await?;

        scan_parts(&self.output_dir, parts)
    }
}

/// Scans response parts in wire order: the first inline image wins and is
/// decoded and saved immediately, remaining parts are not inspected (a
/// malformed payload there cannot fail the call); text-only parts are logged
/// and scanning continues.
fn scan_parts(output_dir: &Path, parts: Vec<ContentPart>) -> Result<Option<PathBuf>> {
    for part in parts {
        match part {
            ContentPart::Image(image) => {
                let data = image.decode()?;
                return save_image(output_dir, &data).map(Some);
            }
            ContentPart::Text(text) => {
                tracing::info!("{text}");
            }
        }
    }
    Ok(None)
}

fn save_image(output_dir: &Path, data: &[u8]) -> Result<PathBuf> {
    if detect_image_mime(data).is_none() {
        return Err(ImageForgeError::Decode(
            "returned inline data is not a recognized image format".into(),
        ));
    }

    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(timestamped_filename(Local::now()));
    std::fs::write(&path, data)?;
    Ok(path)
}

/// Filename for a generated image, second granularity. Two saves within the
/// same second collide and the later one overwrites; accepted limitation.
fn timestamped_filename(now: DateTime<Local>) -> String {
    format!("generated_{}.png", now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForgeConfigBuilder;
    use crate::gemini::InlineImage;
    use base64::Engine;
    use chrono::TimeZone;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn png_part() -> ContentPart {
        ContentPart::Image(InlineImage {
            mime_type: "image/png".into(),
            data: base64::engine::general_purpose::STANDARD.encode(PNG_MAGIC),
        })
    }

    fn test_orchestrator(output_dir: &Path) -> Orchestrator {
        let config = ForgeConfigBuilder::new()
            .api_key("test-key")
            .output_dir(output_dir)
            .build()
            .unwrap();
        Orchestrator::new(config)
    }

    #[test]
    fn test_timestamped_filename_format() {
        let now = Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        assert_eq!(timestamped_filename(now), "generated_20260314_092653.png");
    }

    #[test]
    fn test_timestamped_filenames_distinct_across_seconds() {
        let a = Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let b = Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 54).unwrap();
        assert_ne!(timestamped_filename(a), timestamped_filename(b));
    }

    #[test]
    fn test_scan_parts_image_saved() {
        let dir = tempfile::tempdir().unwrap();
        let parts = vec![png_part()];

        let path = scan_parts(dir.path(), parts).unwrap().unwrap();
        assert!(path.starts_with(dir.path()));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("generated_"));
        assert!(name.ends_with(".png"));
        // generated_YYYYMMDD_HHMMSS.png
        assert_eq!(name.len(), "generated_00000000_000000.png".len());
        assert_eq!(std::fs::read(&path).unwrap(), PNG_MAGIC.to_vec());
    }

    #[test]
    fn test_scan_parts_text_only_is_no_image() {
        let dir = tempfile::tempdir().unwrap();
        let parts = vec![
            ContentPart::Text("I cannot draw that.".into()),
            ContentPart::Text("Try a different prompt.".into()),
        ];
        assert_eq!(scan_parts(dir.path(), parts).unwrap(), None);
    }

    #[test]
    fn test_scan_parts_text_then_image_wins() {
        let dir = tempfile::tempdir().unwrap();
        let parts = vec![ContentPart::Text("Here you go:".into()), png_part()];
        assert!(scan_parts(dir.path(), parts).unwrap().is_some());
    }

    #[test]
    fn test_scan_parts_first_image_wins_over_malformed_trailer() {
        // Later parts are never inspected once an image is found; a trailing
        // part with undecodable base64 must not fail the call.
        let dir = tempfile::tempdir().unwrap();
        let parts = vec![
            png_part(),
            ContentPart::Image(InlineImage {
                mime_type: "image/png".into(),
                data: "!!!not base64!!!".into(),
            }),
        ];
        let path = scan_parts(dir.path(), parts).unwrap().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), PNG_MAGIC.to_vec());
    }

    #[test]
    fn test_scan_parts_first_image_bad_base64_fails() {
        // The selected part's own payload still has to decode
        let dir = tempfile::tempdir().unwrap();
        let parts = vec![ContentPart::Image(InlineImage {
            mime_type: "image/png".into(),
            data: "!!!not base64!!!".into(),
        })];
        let err = scan_parts(dir.path(), parts).unwrap_err();
        assert!(matches!(err, ImageForgeError::Decode(_)));
    }

    #[test]
    fn test_scan_parts_empty_response() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(scan_parts(dir.path(), Vec::new()).unwrap(), None);
    }

    #[test]
    fn test_save_image_rejects_undecodable_data() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_image(dir.path(), b"definitely not an image").unwrap_err();
        assert!(matches!(err, ImageForgeError::Decode(_)));
    }

    #[test]
    fn test_save_image_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("generated");
        let path = save_image(&nested, &PNG_MAGIC).unwrap();
        assert!(path.exists());
        assert!(path.starts_with(&nested));
    }

    #[tokio::test]
    async fn test_generate_unreadable_reference_is_failed() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = test_orchestrator(dir.path());

        let request = GenerationRequest::new("A toy action figure")
            .with_reference_images(vec![dir.path().join("does_not_exist.jpg")]);

        let outcome = orchestrator.generate(&request).await;
        match outcome {
            GenerationOutcome::Failed(msg) => assert!(msg.starts_with("Error:")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_non_image_reference_is_failed() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("notes.txt");
        std::fs::write(&bad, b"plain text, long enough to scan").unwrap();

        let orchestrator = test_orchestrator(dir.path());
        let request =
            GenerationRequest::new("A toy action figure").with_reference_images(vec![bad]);

        let outcome = orchestrator.generate(&request).await;
        match outcome {
            GenerationOutcome::Failed(msg) => {
                assert!(msg.starts_with("Error:"));
                assert!(msg.contains("notes.txt"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_request_builder() {
        let request = GenerationRequest::new("A puppy")
            .with_reference_images(vec!["a.png", "b.jpg"]);
        assert_eq!(request.prompt, "A puppy");
        assert_eq!(
            request.reference_images,
            vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")]
        );

        let empty = GenerationRequest::new("A puppy");
        assert!(empty.reference_images.is_empty());
    }
}
