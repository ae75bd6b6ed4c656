//! Local preview handles for uploaded drawings
//!
//! A handle stands in for the uploaded image on the webview side. Each one pins
//! a rendered data URL in memory until it is released, so the session releases
//! the old handle explicitly whenever a new file replaces it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::encoder::to_data_url;
use crate::models::SourceImage;

/// Opaque identifier for a live preview
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PreviewHandle {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Default)]
pub struct PreviewStore {
    next_id: u64,
    live: HashMap<PreviewHandle, String>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins a preview of `source` and returns its handle
    pub fn acquire(&mut self, source: &SourceImage) -> PreviewHandle {
        self.next_id += 1;
        let handle = PreviewHandle(format!("preview-{}", self.next_id));
        self.live.insert(
            handle.clone(),
            to_data_url(&source.media_type, &source.bytes),
        );
        handle
    }

    /// Releases a handle. Returns false if it was not live.
    pub fn release(&mut self, handle: &PreviewHandle) -> bool {
        self.live.remove(handle).is_some()
    }

    pub fn resolve(&self, handle: &PreviewHandle) -> Option<&str> {
        self.live.get(handle).map(String::as_str)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawing(name: &str) -> SourceImage {
        SourceImage::with_media_type(name, "image/png", vec![1, 2, 3])
    }

    #[test]
    fn acquire_issues_distinct_handles() {
        let mut store = PreviewStore::new();
        let a = store.acquire(&drawing("a.png"));
        let b = store.acquire(&drawing("b.png"));
        assert_ne!(a, b);
        assert_eq!(store.live_count(), 2);
        assert_eq!(store.resolve(&a), Some("data:image/png;base64,AQID"));
    }

    #[test]
    fn release_frees_the_preview_once() {
        let mut store = PreviewStore::new();
        let handle = store.acquire(&drawing("a.png"));
        assert!(store.release(&handle));
        assert!(!store.release(&handle));
        assert!(store.resolve(&handle).is_none());
        assert_eq!(store.live_count(), 0);
    }
}
