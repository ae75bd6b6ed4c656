//! Binary-to-text encoding of uploaded images
//!
//! Images travel as data URLs (`data:<mediaType>;base64,<payload>`), the same
//! shape the webview produces when it reads a dropped or pasted file. Encoding
//! renders the blob into that shape and splits it back into payload and media
//! type, so uploads from either side go through one parser.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::EncodeError;
use crate::models::{EncodedPayload, SourceImage};

/// Media type used when neither the content nor the name identify the file
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Media types accepted as line drawings
pub const LINE_DRAWING_MEDIA_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/webp"];

/// Detects the media type from magic bytes, falling back to the file extension
pub fn detect_media_type(bytes: &[u8], file_name: &str) -> String {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type().to_string();
    }
    mime_guess::from_path(file_name)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string())
}

/// Reads a file from disk into a [`SourceImage`]
pub async fn read_source_image(path: &Path) -> Result<SourceImage, EncodeError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| EncodeError::Read {
            path: path.display().to_string(),
            source,
        })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "drawing".to_string());

    Ok(SourceImage::new(file_name, bytes))
}

/// Passes the image through only when its media type is an accepted line drawing type
pub fn ensure_line_drawing(source: SourceImage) -> Result<SourceImage, EncodeError> {
    if LINE_DRAWING_MEDIA_TYPES.contains(&source.media_type.as_str()) {
        Ok(source)
    } else {
        Err(EncodeError::UnsupportedType(source.media_type))
    }
}

/// Renders bytes as a base64 data URL
pub fn to_data_url(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, BASE64.encode(bytes))
}

/// Splits a data URL into its base64 payload and media type
pub fn split_data_url(data_url: &str) -> Result<EncodedPayload, EncodeError> {
    let (header, payload) = data_url
        .split_once(',')
        .ok_or(EncodeError::InvalidFormat)?;

    if header.is_empty() || payload.is_empty() {
        return Err(EncodeError::InvalidFormat);
    }

    let media_type = media_type_from_header(header).ok_or(EncodeError::MissingMimeType)?;

    Ok(EncodedPayload {
        payload: payload.to_string(),
        media_type,
    })
}

/// Extracts the shortest `:(.*?);` match from a data URL header
fn media_type_from_header(header: &str) -> Option<String> {
    let (_, rest) = header.split_once(':')?;
    let (media_type, _) = rest.split_once(';')?;
    if media_type.is_empty() {
        None
    } else {
        Some(media_type.to_string())
    }
}

/// Encodes a source image for transport to the generation service
pub fn encode(source: &SourceImage) -> Result<EncodedPayload, EncodeError> {
    split_data_url(&to_data_url(&source.media_type, &source.bytes))
}

/// Decodes a base64 payload back into raw bytes
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, EncodeError> {
    Ok(BASE64.decode(payload.trim())?)
}

/// Builds a [`SourceImage`] from a data URL handed over by the webview
pub fn source_from_data_url(file_name: &str, data_url: &str) -> Result<SourceImage, EncodeError> {
    let encoded = split_data_url(data_url)?;
    let bytes = decode_payload(&encoded.payload)?;
    Ok(SourceImage::with_media_type(
        file_name,
        encoded.media_type,
        bytes,
    ))
}
