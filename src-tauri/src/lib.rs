//! Pastel Artisan: colorize line drawings in the famille-rose style
//!
//! The core (encoder, Gemini client, preview store, session controller) is
//! plain Rust. The `desktop` feature adds the Tauri shell that exposes it to
//! the webview.

pub mod artwork;
pub mod client;
pub mod config;
pub mod encoder;
pub mod error;
mod keymask;
pub mod models;
pub mod paths;
pub mod preview;
pub mod prompts;
pub mod session;

#[cfg(feature = "desktop")]
pub mod commands;

pub use client::{ColorizationClient, GeminiClient};
pub use error::{ArtworkError, ClientError, ColorizeError, ConfigError, EncodeError};
pub use models::{EncodedPayload, SessionPhase, SessionSnapshot, SourceImage};
pub use session::{Session, SessionController, SessionListener};

#[cfg(feature = "desktop")]
pub fn run() {
    use std::sync::Arc;

    use log::{info, warn};
    use tauri::Manager;

    use crate::commands::{AppState, WebviewEmitter};
    use crate::config::{load_config, AppConfig};

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(
            tauri_plugin_log::Builder::new()
                .target(tauri_plugin_log::Target::new(
                    tauri_plugin_log::TargetKind::LogDir {
                        file_name: Some("pastel-artisan".into()),
                    },
                ))
                .level(log::LevelFilter::Info)
                .build(),
        )
        .setup(|app| {
            info!("=== Pastel Artisan Starting ===");

            let config = load_config().unwrap_or_else(|e| {
                warn!("[startup] Falling back to default config: {}", e);
                AppConfig::default()
            });
            info!(
                "[startup] Model: {}, API key configured: {}",
                config.model,
                config::resolve_api_key(&config).is_some()
            );

            let controller = Arc::new(SessionController::new(Arc::new(
                GeminiClient::from_config(&config),
            )));
            controller.subscribe(Arc::new(WebviewEmitter::new(app.handle().clone())));
            app.manage(AppState { controller });
            Ok(())
        })
        .on_window_event(|window, event| {
            if window.label() == "main" {
                if let tauri::WindowEvent::Destroyed = event {
                    if let Some(state) = window.try_state::<AppState>() {
                        state.controller.end_session();
                    }
                }
            }
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_session,
            commands::pick_line_drawing,
            commands::upload_line_drawing,
            commands::upload_line_drawing_data,
            commands::set_prompt,
            commands::reset_prompt,
            commands::submit_colorization,
            commands::get_preview,
            commands::save_artwork,
            commands::end_session,
            commands::save_api_key,
            commands::has_api_key,
            commands::log_from_frontend,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
