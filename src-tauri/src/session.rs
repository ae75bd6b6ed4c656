//! Upload/session state and the controller that drives colorization
//!
//! [`Session`] holds the observable state and applies transitions
//! synchronously. [`SessionController`] wraps it for the async command layer:
//! it never holds the lock across the encode + network step, and tells
//! subscribers about every transition with a fresh [`SessionSnapshot`].

use std::sync::Arc;

use log::{info, warn};
use parking_lot::Mutex;

use crate::client::ColorizationClient;
use crate::encoder;
use crate::error::ColorizeError;
use crate::models::{SessionPhase, SessionSnapshot, SourceImage};
use crate::preview::{PreviewHandle, PreviewStore};
use crate::prompts::DEFAULT_COLORIZE_PROMPT;

pub const NO_FILE_MESSAGE: &str = "please upload a line drawing first";
pub const EMPTY_PROMPT_MESSAGE: &str = "please describe how the drawing should be colored";
pub const EMPTY_RESULT_MESSAGE: &str = "failed to generate image, please retry";
pub const UNKNOWN_ERROR_MESSAGE: &str = "an unknown error occurred while coloring";

/// Renders a generated payload as something the webview can display
pub fn result_data_url(payload: &str) -> String {
    format!("data:image/png;base64,{}", payload)
}

/// Inputs captured when a submission enters `Loading`
#[derive(Debug, Clone)]
pub struct Submission {
    epoch: u64,
    source: Arc<SourceImage>,
    prompt: String,
}

impl Submission {
    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Why a submission never left the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    NoFile,
    EmptyPrompt,
    /// A submission is already in flight; state is left untouched
    InFlight,
}

#[derive(Debug)]
pub struct Session {
    source: Option<Arc<SourceImage>>,
    preview: Option<PreviewHandle>,
    result: Option<String>,
    loading: bool,
    error: Option<String>,
    prompt: String,
    // Bumped by every upload and by session end; stale submissions compare against it
    epoch: u64,
    // Bumped by every mutation; snapshots carry it so observers can order them
    revision: u64,
    previews: PreviewStore,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            source: None,
            preview: None,
            result: None,
            loading: false,
            error: None,
            prompt: DEFAULT_COLORIZE_PROMPT.to_string(),
            epoch: 0,
            revision: 0,
            previews: PreviewStore::new(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Loading
        } else if self.error.is_some() {
            SessionPhase::Failed
        } else if self.result.is_some() {
            SessionPhase::Succeeded
        } else if self.source.is_some() {
            SessionPhase::Ready
        } else {
            SessionPhase::Idle
        }
    }

    /// Replaces the current file; valid from any state
    pub fn upload(&mut self, source: SourceImage) {
        self.release_preview();
        self.preview = Some(self.previews.acquire(&source));
        self.source = Some(Arc::new(source));
        self.result = None;
        self.error = None;
        self.loading = false;
        self.epoch += 1;
        self.revision += 1;
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
        self.revision += 1;
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Enters `Loading`, or records an input error and stays put
    pub fn begin_submission(&mut self) -> Result<Submission, SubmitRejection> {
        if self.loading {
            return Err(SubmitRejection::InFlight);
        }

        let Some(source) = self.source.clone() else {
            self.fail_input(NO_FILE_MESSAGE);
            return Err(SubmitRejection::NoFile);
        };

        if self.prompt.trim().is_empty() {
            self.fail_input(EMPTY_PROMPT_MESSAGE);
            return Err(SubmitRejection::EmptyPrompt);
        }

        self.loading = true;
        self.error = None;
        self.result = None;
        self.revision += 1;

        Ok(Submission {
            epoch: self.epoch,
            source,
            prompt: self.prompt.clone(),
        })
    }

    /// Applies a finished submission. Returns false when a newer upload or
    /// session end has made it stale, in which case nothing changes.
    pub fn settle(
        &mut self,
        submission: &Submission,
        outcome: Result<Option<String>, ColorizeError>,
    ) -> bool {
        if submission.epoch != self.epoch {
            return false;
        }

        self.loading = false;
        self.revision += 1;
        match outcome {
            Ok(Some(payload)) if !payload.is_empty() => {
                self.result = Some(result_data_url(&payload));
            }
            Ok(_) => {
                self.error = Some(EMPTY_RESULT_MESSAGE.to_string());
            }
            Err(err) => {
                self.error = Some(failure_message(&err));
            }
        }
        true
    }

    /// Releases the preview and forgets the file; the prompt survives
    pub fn end(&mut self) {
        self.release_preview();
        self.source = None;
        self.result = None;
        self.error = None;
        self.loading = false;
        self.epoch += 1;
        self.revision += 1;
    }

    pub fn preview_url(&self, handle: &PreviewHandle) -> Option<String> {
        self.previews.resolve(handle).map(str::to_string)
    }

    pub fn live_previews(&self) -> usize {
        self.previews.live_count()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            file_name: self.source.as_ref().map(|s| s.file_name.clone()),
            media_type: self.source.as_ref().map(|s| s.media_type.clone()),
            preview: self.preview.clone(),
            result_url: self.result.clone(),
            loading: self.loading,
            error: self.error.clone(),
            prompt: self.prompt.clone(),
            can_submit: self.source.is_some() && !self.loading,
            revision: self.revision,
        }
    }

    fn fail_input(&mut self, message: &str) {
        self.result = None;
        self.error = Some(message.to_string());
        self.revision += 1;
    }

    fn release_preview(&mut self) {
        if let Some(handle) = self.preview.take() {
            self.previews.release(&handle);
        }
    }
}

fn failure_message(err: &ColorizeError) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        UNKNOWN_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

/// Receives a snapshot after every session transition.
///
/// Called with the session locked, so snapshots arrive in revision order.
/// Implementations must not call back into the controller.
pub trait SessionListener: Send + Sync {
    fn session_changed(&self, snapshot: &SessionSnapshot);
}

pub struct SessionController {
    session: Mutex<Session>,
    client: Mutex<Arc<dyn ColorizationClient>>,
    listeners: Mutex<Vec<Arc<dyn SessionListener>>>,
}

impl SessionController {
    pub fn new(client: Arc<dyn ColorizationClient>) -> Self {
        Self {
            session: Mutex::new(Session::new()),
            client: Mutex::new(client),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Swaps the remote client, e.g. after the API key changes
    pub fn set_client(&self, client: Arc<dyn ColorizationClient>) {
        *self.client.lock() = client;
    }

    pub fn subscribe(&self, listener: Arc<dyn SessionListener>) {
        self.listeners.lock().push(listener);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().snapshot()
    }

    pub fn preview(&self, handle: &PreviewHandle) -> Option<String> {
        self.session.lock().preview_url(handle)
    }

    pub fn live_previews(&self) -> usize {
        self.session.lock().live_previews()
    }

    pub fn upload(&self, source: SourceImage) -> SessionSnapshot {
        info!(
            "[upload] {} ({}, {} bytes)",
            source.file_name,
            source.media_type,
            source.bytes.len()
        );
        self.transition(|session| session.upload(source))
    }

    pub fn set_prompt(&self, prompt: impl Into<String>) -> SessionSnapshot {
        let prompt = prompt.into();
        self.transition(|session| session.set_prompt(prompt))
    }

    pub fn reset_prompt(&self) -> SessionSnapshot {
        self.set_prompt(DEFAULT_COLORIZE_PROMPT)
    }

    pub fn end_session(&self) -> SessionSnapshot {
        info!("[session] Ending session");
        self.transition(Session::end)
    }

    /// Runs one colorization: encode, call the service, settle.
    pub async fn submit(&self) -> SessionSnapshot {
        let (begun, snapshot) = {
            let mut session = self.session.lock();
            let begun = session.begin_submission();
            let snapshot = session.snapshot();
            if !matches!(begun, Err(SubmitRejection::InFlight)) {
                self.notify(&snapshot);
            }
            (begun, snapshot)
        };

        let submission = match begun {
            Ok(submission) => submission,
            Err(SubmitRejection::InFlight) => {
                warn!("[submit] Ignored: a colorization is already in flight");
                return snapshot;
            }
            Err(rejection) => {
                info!("[submit] Rejected before sending: {:?}", rejection);
                return snapshot;
            }
        };

        let client = self.client.lock().clone();
        let outcome = colorize_submission(client.as_ref(), &submission).await;
        if let Err(err) = &outcome {
            warn!("[submit] Colorization failed: {}", err);
        }

        let (applied, snapshot) = {
            let mut session = self.session.lock();
            let applied = session.settle(&submission, outcome);
            let snapshot = session.snapshot();
            if applied {
                self.notify(&snapshot);
            }
            (applied, snapshot)
        };

        if applied {
            info!("[submit] Settled as {:?}", snapshot.phase);
        } else {
            info!("[submit] Discarded result for a replaced drawing");
        }
        snapshot
    }

    fn transition(&self, apply: impl FnOnce(&mut Session)) -> SessionSnapshot {
        let mut session = self.session.lock();
        apply(&mut session);
        let snapshot = session.snapshot();
        self.notify(&snapshot);
        snapshot
    }

    /// Callers hold the session lock
    fn notify(&self, snapshot: &SessionSnapshot) {
        let listeners = self.listeners.lock().clone();
        for listener in listeners {
            listener.session_changed(snapshot);
        }
    }
}

async fn colorize_submission(
    client: &dyn ColorizationClient,
    submission: &Submission,
) -> Result<Option<String>, ColorizeError> {
    let encoded = encoder::encode(submission.source())?;
    let image = client
        .colorize(&encoded.payload, &encoded.media_type, submission.prompt())
        .await?;
    Ok(image)
}
