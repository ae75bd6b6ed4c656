//! Error types for encoding, the remote client and configuration

use thiserror::Error;

/// Failures while turning an image into a text-safe payload (or back)
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Data URL without a payload section
    #[error("Invalid format for encoding")]
    InvalidFormat,

    /// Data URL header without a `:<type>;` segment
    #[error("Could not determine MIME type")]
    MissingMimeType,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Upload whose content is not a PNG, JPEG or WEBP image
    #[error("Unsupported file type {0}; please upload a PNG, JPG or WEBP line drawing")]
    UnsupportedType(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures talking to the image generation service
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Gemini API key not configured")]
    MissingApiKey,

    /// Connection, TLS or body read failure
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response; the message is the service's own when it sent one
    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Any failure that ends a colorization attempt
#[derive(Debug, Error)]
pub enum ColorizeError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Location(String),

    #[error("Failed to access config at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failures while saving a generated image to disk
#[derive(Debug, Error)]
pub enum ArtworkError {
    #[error("There is no colorized artwork to save yet")]
    NothingToSave,

    #[error(transparent)]
    Decode(#[from] EncodeError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
