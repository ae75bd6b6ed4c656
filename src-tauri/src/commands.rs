//! Tauri commands and the webview event bridge

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{error, info, warn};
use tauri::{command, AppHandle, Emitter, State};
use tauri_plugin_dialog::DialogExt;

use crate::artwork::write_artwork;
use crate::client::GeminiClient;
use crate::config::{load_config, resolve_api_key, save_config};
use crate::encoder::{ensure_line_drawing, read_source_image, source_from_data_url};
use crate::error::ArtworkError;
use crate::models::SessionSnapshot;
use crate::paths::{ARTWORK_FILE_NAME, LINE_DRAWING_EXTENSIONS};
use crate::preview::PreviewHandle;
use crate::session::{SessionController, SessionListener};

/// Event carrying a [`SessionSnapshot`] after every transition
pub const SESSION_CHANGED_EVENT: &str = "session-changed";

pub struct AppState {
    pub controller: Arc<SessionController>,
}

/// Forwards session snapshots to the webview
pub struct WebviewEmitter {
    app: AppHandle,
}

impl WebviewEmitter {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl SessionListener for WebviewEmitter {
    fn session_changed(&self, snapshot: &SessionSnapshot) {
        if let Err(e) = self.app.emit(SESSION_CHANGED_EVENT, snapshot) {
            warn!("[session] Failed to emit snapshot: {}", e);
        }
    }
}

async fn upload_from_path(
    state: &State<'_, AppState>,
    path: &Path,
) -> Result<SessionSnapshot, String> {
    let source = read_source_image(path)
        .await
        .and_then(ensure_line_drawing)
        .map_err(|e| {
            error!("[upload] {}: {}", path.display(), e);
            e.to_string()
        })?;
    Ok(state.controller.upload(source))
}

// ============ Session Commands ============

#[command]
pub async fn get_session(state: State<'_, AppState>) -> Result<SessionSnapshot, String> {
    Ok(state.controller.snapshot())
}

/// Click-to-browse: native open dialog filtered to supported image types
#[command]
pub async fn pick_line_drawing(
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<SessionSnapshot, String> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    app.dialog()
        .file()
        .add_filter("Line drawing", &LINE_DRAWING_EXTENSIONS)
        .pick_file(move |file| {
            let _ = tx.send(file);
        });

    let picked = rx
        .await
        .map_err(|e| format!("File dialog closed unexpectedly: {}", e))?;
    let Some(file) = picked else {
        info!("[upload] Dialog cancelled");
        return Ok(state.controller.snapshot());
    };

    let path = file
        .into_path()
        .map_err(|e| format!("Unsupported file selection: {}", e))?;
    upload_from_path(&state, &path).await
}

/// Drag-and-drop of a file onto the window
#[command]
pub async fn upload_line_drawing(
    path: String,
    state: State<'_, AppState>,
) -> Result<SessionSnapshot, String> {
    upload_from_path(&state, &PathBuf::from(path)).await
}

/// Paste or in-page drop: the webview already read the file as a data URL
#[command]
pub async fn upload_line_drawing_data(
    file_name: String,
    data_url: String,
    state: State<'_, AppState>,
) -> Result<SessionSnapshot, String> {
    let source = source_from_data_url(&file_name, &data_url)
        .and_then(ensure_line_drawing)
        .map_err(|e| {
            error!("[upload] {}: {}", file_name, e);
            e.to_string()
        })?;
    Ok(state.controller.upload(source))
}

#[command]
pub async fn set_prompt(
    prompt: String,
    state: State<'_, AppState>,
) -> Result<SessionSnapshot, String> {
    Ok(state.controller.set_prompt(prompt))
}

#[command]
pub async fn reset_prompt(state: State<'_, AppState>) -> Result<SessionSnapshot, String> {
    Ok(state.controller.reset_prompt())
}

#[command]
pub async fn submit_colorization(state: State<'_, AppState>) -> Result<SessionSnapshot, String> {
    let controller = state.controller.clone();
    Ok(controller.submit().await)
}

#[command]
pub async fn get_preview(
    handle: String,
    state: State<'_, AppState>,
) -> Result<Option<String>, String> {
    Ok(state.controller.preview(&PreviewHandle::from(handle)))
}

/// Offers the current result as `artwork.png` through a native save dialog
#[command]
pub async fn save_artwork(
    app: AppHandle,
    state: State<'_, AppState>,
) -> Result<Option<String>, String> {
    let result_url = state
        .controller
        .snapshot()
        .result_url
        .ok_or_else(|| ArtworkError::NothingToSave.to_string())?;

    let (tx, rx) = tokio::sync::oneshot::channel();
    app.dialog()
        .file()
        .set_file_name(ARTWORK_FILE_NAME)
        .add_filter("PNG image", &["png"])
        .save_file(move |file| {
            let _ = tx.send(file);
        });

    let picked = rx
        .await
        .map_err(|e| format!("Save dialog closed unexpectedly: {}", e))?;
    let Some(file) = picked else {
        return Ok(None);
    };

    let path = file
        .into_path()
        .map_err(|e| format!("Unsupported save location: {}", e))?;
    write_artwork(&path, &result_url)
        .await
        .map_err(|e| e.to_string())?;
    Ok(Some(path.display().to_string()))
}

#[command]
pub async fn end_session(state: State<'_, AppState>) -> Result<SessionSnapshot, String> {
    Ok(state.controller.end_session())
}

// ============ API Key Commands ============

#[command]
pub async fn save_api_key(key: String, state: State<'_, AppState>) -> Result<(), String> {
    info!("[save_api_key] Saving Gemini API key");
    let mut config = load_config().map_err(|e| e.to_string())?;
    config.api_key = Some(key.trim().to_string()).filter(|k| !k.is_empty());
    save_config(&config).map_err(|e| e.to_string())?;
    state
        .controller
        .set_client(Arc::new(GeminiClient::from_config(&config)));
    info!("[save_api_key] Gemini API key saved successfully");
    Ok(())
}

#[command]
pub async fn has_api_key() -> Result<bool, String> {
    let config = load_config().map_err(|e| e.to_string())?;
    Ok(resolve_api_key(&config).is_some())
}

// ============ Frontend Logging ============

#[command]
pub fn log_from_frontend(level: String, message: String) {
    match level.as_str() {
        "error" => error!("[Frontend] {}", message),
        "warn" => warn!("[Frontend] {}", message),
        _ => info!("[Frontend] {}", message),
    }
}
