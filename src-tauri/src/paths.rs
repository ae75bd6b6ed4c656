//! Path utilities and file system helpers

use std::path::PathBuf;

/// Identifier used for the per-user data directory
pub const APP_IDENTIFIER: &str = "com.pastelartisan.desktop";

/// File name offered when saving a colorized result
pub const ARTWORK_FILE_NAME: &str = "artwork.png";

/// Extensions accepted by the open dialog
pub const LINE_DRAWING_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Gets the application data directory
pub fn get_app_data_dir() -> Result<PathBuf, String> {
    dirs::data_dir()
        .map(|p| p.join(APP_IDENTIFIER))
        .ok_or_else(|| "Could not find app data directory".to_string())
}

/// Gets the configuration file path
pub fn get_config_path() -> Result<PathBuf, String> {
    get_app_data_dir().map(|p| p.join("config.json"))
}
