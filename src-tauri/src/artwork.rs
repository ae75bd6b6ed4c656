//! Saving colorized results to disk

use std::path::Path;

use log::info;

use crate::encoder::{decode_payload, split_data_url};
use crate::error::ArtworkError;

/// Decodes a result data URL and writes the image bytes to `path`
pub async fn write_artwork(path: &Path, result_url: &str) -> Result<usize, ArtworkError> {
    let encoded = split_data_url(result_url)?;
    let bytes = decode_payload(&encoded.payload)?;

    tokio::fs::write(path, &bytes)
        .await
        .map_err(|source| ArtworkError::Write {
            path: path.display().to_string(),
            source,
        })?;

    info!("[artwork] Saved {} bytes to {}", bytes.len(), path.display());
    Ok(bytes.len())
}
