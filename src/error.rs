//! Error types for image generation.

use std::path::PathBuf;

/// Errors that can occur while generating an image.
#[derive(Debug, thiserror::Error)]
pub enum ImageForgeError {
    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Response was missing candidates or content.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A reference image file is not a recognized image format.
    #[error("not a recognized image format: {}", .0.display())]
    UnsupportedImage(PathBuf),

    /// Failed to decode base64 or returned image data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., reading a reference image or saving the output).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A generation request is already in flight.
    #[error("a generation request is already in flight")]
    Busy,
}

/// Result type alias for image generation operations.
pub type Result<T> = std::result::Result<T, ImageForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ImageForgeError::Api {
            status: 404,
            message: "Not found".into(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Not found");

        let err = ImageForgeError::ContentBlocked("Safety filter triggered".into());
        assert_eq!(err.to_string(), "content blocked: Safety filter triggered");

        let err = ImageForgeError::UnsupportedImage(PathBuf::from("notes.txt"));
        assert_eq!(err.to_string(), "not a recognized image format: notes.txt");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.jpg");
        let err: ImageForgeError = io.into();
        assert!(matches!(err, ImageForgeError::Io(_)));
        assert!(err.to_string().contains("missing.jpg"));
    }
}
