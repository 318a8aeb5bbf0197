//! Export pipeline
//!
//! Turns the planner into an image, hosts it and emails the link:
//!
//! ```text
//! Idle -> Rendering -> Uploading -> Sending -> Done
//!              \            \           \
//!               +------------+-----------+--> Failed
//! ```
//!
//! An upload failure is not fatal: the email goes out without an image link
//! and the locally encoded image is kept in the [`ExportReport`]. Only one
//! export runs at a time per pipeline; a second submission is rejected
//! while the first is in flight.

mod cancellation;
mod upload;

pub use cancellation::CancellationToken;
pub use upload::{HttpUploader, UploadError, Uploader, UPLOAD_FIELD};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::document::Document;
use crate::feedback::Feedback;
use crate::fields::PlannerFields;
use crate::notify::{EmailPayload, NotificationDispatcher, NotifyError};
use crate::render::{render_planner, Rasterizer, RenderError};

/// Loading indicator message
pub const LOADING_MESSAGE: &str = "Sending your planner...";
/// Toast shown after a successful export
pub const SUCCESS_MESSAGE: &str = "Planner sent successfully!";
/// Alert shown when the planner has no recipient
pub const MISSING_RECIPIENT_MESSAGE: &str = "Please enter an email.";
/// Alert shown when the recipient address is malformed
pub const INVALID_RECIPIENT_MESSAGE: &str = "Please enter a valid email address.";
/// Alert shown when the image could not be hosted
pub const UPLOAD_FAILED_MESSAGE: &str = "Image upload failed. Your planner will be sent without the image link.";
/// Alert shown when rendering fails
pub const RENDER_FAILED_MESSAGE: &str = "Could not capture your planner.";
/// Alert shown when the email could not be sent
pub const SEND_FAILED_MESSAGE: &str = "Failed to send your planner. Please try again.";
/// Alert shown when no email backend is configured
pub const EMAIL_NOT_CONFIGURED_MESSAGE: &str = "Email delivery is not configured.";

/// Errors that end an export
#[derive(Debug, Error)]
pub enum ExportError {
    /// Another export is still running
    #[error("an export is already in progress")]
    AlreadyInFlight,

    /// The export was cancelled
    #[error("export cancelled")]
    Cancelled,

    /// The planner could not be rendered
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The email could not be composed or sent
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Step an export is at
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportState {
    /// Nothing running
    #[default]
    Idle,
    /// Cloning and rasterizing the planner
    Rendering,
    /// Hosting the image
    Uploading,
    /// Sending the email
    Sending,
    /// Email sent
    Done,
    /// Export ended with an error
    Failed {
        /// Error description
        error: String,
    },
}

impl ExportState {
    /// Whether an export is between start and finish
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Rendering | Self::Uploading | Self::Sending)
    }
}

/// Where the exported image ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResult {
    /// Hosted at a public URL
    Hosted(String),
    /// Hosting failed; the image is only available locally
    Fallback {
        /// `data:image/png;base64,...` URL of the image
        data_url: String,
        /// Upload error description
        error: String,
    },
}

impl UploadResult {
    /// Public URL, if the image was hosted
    #[must_use]
    pub fn hosted_url(&self) -> Option<&str> {
        match self {
            Self::Hosted(url) => Some(url),
            Self::Fallback { .. } => None,
        }
    }
}

/// Outcome of a completed export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Upload outcome
    pub upload: UploadResult,
    /// Variables of the email that was sent
    pub email: EmailPayload,
}

/// Releases the in-flight flag on drop
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Render, upload and email orchestration
pub struct ExportPipeline {
    rasterizer: Arc<dyn Rasterizer>,
    uploader: Arc<dyn Uploader>,
    dispatcher: NotificationDispatcher,
    feedback: Arc<dyn Feedback>,
    state: watch::Sender<ExportState>,
    in_flight: AtomicBool,
}

impl ExportPipeline {
    /// Create a pipeline from its collaborators
    #[must_use]
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        uploader: Arc<dyn Uploader>,
        dispatcher: NotificationDispatcher,
        feedback: Arc<dyn Feedback>,
    ) -> Self {
        Self {
            rasterizer,
            uploader,
            dispatcher,
            feedback,
            state: watch::Sender::new(ExportState::Idle),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> ExportState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ExportState> {
        self.state.subscribe()
    }

    /// Whether an export is currently running
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn transition(&self, next: ExportState) {
        debug!(state = ?next, "Export state changed");
        self.state.send_replace(next);
    }

    /// End the export with `error`, alerting the user with `message`
    fn fail(&self, error: ExportError, message: Option<&str>) -> ExportError {
        warn!(error = %error, "Export failed");
        self.transition(ExportState::Failed {
            error: error.to_string(),
        });
        self.feedback.hide_loading();
        if let Some(message) = message {
            self.feedback.alert(message);
        }
        error
    }

    /// Export the planner and email the result
    ///
    /// `fields` are the stored planner values the email is composed from.
    /// The live planner in `document` is left untouched.
    ///
    /// # Errors
    ///
    /// - `ExportError::AlreadyInFlight` if another export is running; the
    ///   running export, state and feedback are not touched
    /// - `ExportError::Notify` if the recipient is missing or invalid
    ///   (checked before anything is rendered) or the email cannot be sent
    /// - `ExportError::Render` if the planner cannot be rasterized
    /// - `ExportError::Cancelled` if `cancel` fires before the email is sent
    pub async fn export_and_send(
        &self,
        document: &mut Document,
        fields: &PlannerFields,
        cancel: &CancellationToken,
    ) -> Result<ExportReport, ExportError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("Export rejected, another one is in flight");
            return Err(ExportError::AlreadyInFlight);
        };

        if let Err(e) = self.dispatcher.compose(fields, None) {
            let message = match e {
                NotifyError::InvalidRecipient(_) => INVALID_RECIPIENT_MESSAGE,
                _ => MISSING_RECIPIENT_MESSAGE,
            };
            self.transition(ExportState::Failed { error: e.to_string() });
            self.feedback.alert(message);
            return Err(e.into());
        }

        self.feedback.show_loading(LOADING_MESSAGE);

        if cancel.is_cancelled() {
            return Err(self.fail(ExportError::Cancelled, None));
        }
        self.transition(ExportState::Rendering);
        let artifact = match render_planner(document, self.rasterizer.as_ref()) {
            Ok(artifact) => artifact,
            Err(e) => return Err(self.fail(e.into(), Some(RENDER_FAILED_MESSAGE))),
        };

        self.transition(ExportState::Uploading);
        let upload = match cancel.run_until_cancelled(self.uploader.upload(&artifact)).await {
            None => return Err(self.fail(ExportError::Cancelled, None)),
            Some(Ok(url)) => {
                info!(url = %url, "Planner image uploaded");
                UploadResult::Hosted(url)
            }
            Some(Err(e)) => {
                warn!(error = %e, "Upload failed, continuing without image link");
                self.feedback.alert(UPLOAD_FAILED_MESSAGE);
                UploadResult::Fallback {
                    data_url: artifact.to_data_url(),
                    error: e.to_string(),
                }
            }
        };

        self.transition(ExportState::Sending);
        let image_url = upload.hosted_url().map(str::to_string);
        let email = match cancel
            .run_until_cancelled(self.dispatcher.dispatch(fields, image_url))
            .await
        {
            None => return Err(self.fail(ExportError::Cancelled, None)),
            Some(Ok(email)) => email,
            Some(Err(e)) => return Err(self.fail(e.into(), Some(SEND_FAILED_MESSAGE))),
        };

        self.transition(ExportState::Done);
        self.feedback.hide_loading();
        self.feedback.toast(SUCCESS_MESSAGE);

        Ok(ExportReport { upload, email })
    }
}
