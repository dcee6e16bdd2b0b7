//! Gemini `generateContent` wire client.
//!
//! Builds the combined payload (prompt text first, then reference images in
//! caller order), performs the HTTP call, and flattens the response into an
//! ordered list of [`ContentPart`]s for the orchestrator to scan.

use crate::config::{ForgeConfig, GeminiModel};
use crate::error::{ImageForgeError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Detects an image MIME type from magic bytes.
///
/// Covers the formats the file picker of a typical image tool offers:
/// PNG, JPEG, WebP, GIF, BMP and TIFF.
pub(crate) fn detect_image_mime(data: &[u8]) -> Option<&'static str> {
    if data.len() < 12 {
        return None;
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }

    // WebP: RIFF....WEBP
    if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("image/gif");
    }

    if data.starts_with(b"BM") {
        return Some("image/bmp");
    }

    // TIFF: little- or big-endian byte-order mark
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A]) {
        return Some("image/tiff");
    }

    None
}

/// A reference image loaded from disk, ready to be attached to a request.
#[derive(Debug, Clone)]
pub struct ReferenceImage {
    /// Detected MIME type.
    pub mime_type: &'static str,
    /// Raw file bytes.
    pub data: Vec<u8>,
}

impl ReferenceImage {
    /// Reads the file at `path` and detects its format from magic bytes.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let mime_type = detect_image_mime(&data)
            .ok_or_else(|| ImageForgeError::UnsupportedImage(path.to_path_buf()))?;
        Ok(Self { mime_type, data })
    }
}

/// One unit of a service response: inline image data or plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    /// A text-only part (commentary, refusal text, captions).
    Text(String),
    /// An inline image payload, still base64-encoded.
    Image(InlineImage),
}

/// Inline image data as received off the wire.
///
/// The payload stays base64-encoded until [`InlineImage::decode`] is called,
/// so a malformed part the caller never selects costs nothing and fails
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// MIME type reported by the service.
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl InlineImage {
    /// Decodes the base64 payload into raw image bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| ImageForgeError::Decode(e.to_string()))
    }
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: GeminiModel,
}

impl GeminiClient {
    /// Creates a client from a resolved configuration.
    pub fn new(config: &ForgeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model,
        }
    }

    /// Submits the prompt and reference images, returning the response's
    /// content parts in wire order.
    pub async fn generate_content(
        &self,
        prompt: &str,
        reference_images: &[ReferenceImage],
    ) -> Result<Vec<ContentPart>> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model.as_str(),
        );

        let body = GeminiRequest::new(prompt, reference_images);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        extract_parts(gemini_response)
    }
}

fn parse_error(status: u16, text: &str) -> ImageForgeError {
    if status == 401 || status == 403 {
        return ImageForgeError::Auth(text.to_string());
    }
    ImageForgeError::Api {
        status,
        message: text.to_string(),
    }
}

/// Flattens a response into ordered [`ContentPart`]s, surfacing safety
/// blocks and shape errors.
fn extract_parts(response: GeminiResponse) -> Result<Vec<ContentPart>> {
    // Prompt blocks come back as HTTP 200 with feedback attached
    if let Some(ref feedback) = response.prompt_feedback {
        if let Some(ref reason) = feedback.block_reason {
            let msg = feedback
                .block_reason_message
                .clone()
                .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
            return Err(ImageForgeError::ContentBlocked(msg));
        }
    }

    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        ImageForgeError::UnexpectedResponse("No candidates in Gemini response".into())
    })?;

    if let Some(ref finish_reason) = candidate.finish_reason {
        match finish_reason.as_str() {
            "SAFETY" | "IMAGE_SAFETY" | "IMAGE_PROHIBITED_CONTENT" | "IMAGE_RECITATION"
            | "RECITATION" | "PROHIBITED_CONTENT" | "BLOCKLIST" => {
                return Err(ImageForgeError::ContentBlocked(format!(
                    "Content blocked by Gemini safety filter: {}",
                    finish_reason
                )));
            }
            _ => {} // STOP, MAX_TOKENS, etc. are normal
        }
    }

    let content = candidate.content.ok_or_else(|| {
        ImageForgeError::UnexpectedResponse("No content in Gemini candidate".into())
    })?;

    let mut parts = Vec::with_capacity(content.parts.len());
    for part in content.parts {
        if let Some(inline) = part.inline_data {
            // Not decoded here: parts after the first selected image are
            // never inspected, so their payloads must not be able to fail
            // the call
            parts.push(ContentPart::Image(InlineImage {
                mime_type: inline.mime_type,
                data: inline.data,
            }));
        } else if let Some(text) = part.text {
            parts.push(ContentPart::Text(text));
        }
        // Parts carrying neither are skipped
    }

    Ok(parts)
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - can be text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text { text: String },
    InlineData { inline_data: GeminiInlineData },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
}

impl GeminiRequest {
    fn new(prompt: &str, reference_images: &[ReferenceImage]) -> Self {
        let mut parts = Vec::with_capacity(1 + reference_images.len());

        // Prompt text first, then the reference images in caller order
        parts.push(GeminiRequestPart::Text {
            text: prompt.to_string(),
        });

        for image in reference_images {
            parts.push(GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: image.mime_type.to_string(),
                    data: base64::engine::general_purpose::STANDARD.encode(&image.data),
                },
            });
        }

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                // Text parts (commentary) must be observable alongside images
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}
