//! Data models and structures used throughout the application

use serde::{Deserialize, Serialize};

use crate::encoder::detect_media_type;
use crate::preview::PreviewHandle;

/// A user-supplied line drawing, held in memory for the current session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl SourceImage {
    /// Builds a source image, detecting the media type from the content
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let media_type = detect_media_type(&bytes, &file_name);
        Self {
            file_name,
            media_type,
            bytes,
        }
    }

    /// Builds a source image whose media type was already detected upstream
    pub fn with_media_type(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }
}

/// Base64 text of an image paired with its media type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedPayload {
    pub payload: String,
    pub media_type: String,
}

/// Coarse state of the colorizer session, derived from the session fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Ready,
    Loading,
    Succeeded,
    Failed,
}

/// Everything the webview needs to render the session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub file_name: Option<String>,
    pub media_type: Option<String>,
    pub preview: Option<PreviewHandle>,
    pub result_url: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
    pub prompt: String,
    pub can_submit: bool,
    /// Increases with every transition; older snapshots can be dropped
    pub revision: u64,
}
