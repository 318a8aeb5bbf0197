//! User-facing feedback
//!
//! Loading indicator, toasts, blocking alerts and confirmations are routed
//! through [`Feedback`] so the planner components stay independent of the
//! surface that shows them.

use parking_lot::Mutex;

/// Surface that shows progress and messages to the user
#[cfg_attr(test, mockall::automock)]
pub trait Feedback: Send + Sync {
    /// Show the loading indicator
    fn show_loading(&self, message: &str);

    /// Hide the loading indicator
    fn hide_loading(&self);

    /// Show a transient success message
    fn toast(&self, message: &str);

    /// Show a blocking error message
    fn alert(&self, message: &str);

    /// Ask the user to confirm an action
    fn confirm(&self, prompt: &str) -> bool;
}

/// Something shown through [`MemoryFeedback`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackEvent {
    /// Loading indicator shown
    LoadingShown(String),
    /// Loading indicator hidden
    LoadingHidden,
    /// Toast displayed
    Toast(String),
    /// Alert displayed
    Alert(String),
    /// Confirmation requested
    Confirm(String),
}

/// Feedback that records every event and answers confirmations with a
/// fixed reply
///
/// Used for headless runs and tests.
#[derive(Debug)]
pub struct MemoryFeedback {
    events: Mutex<Vec<FeedbackEvent>>,
    confirm_reply: bool,
}

impl MemoryFeedback {
    /// Create a recorder that answers confirmations with `confirm_reply`
    #[must_use]
    pub const fn new(confirm_reply: bool) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            confirm_reply,
        }
    }

    /// Recorded events, oldest first
    #[must_use]
    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.events.lock().clone()
    }

    /// Recorded alert messages
    #[must_use]
    pub fn alerts(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                FeedbackEvent::Alert(msg) => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }

    /// Recorded toast messages
    #[must_use]
    pub fn toasts(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                FeedbackEvent::Toast(msg) => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: FeedbackEvent) {
        self.events.lock().push(event);
    }
}

impl Default for MemoryFeedback {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Feedback for MemoryFeedback {
    fn show_loading(&self, message: &str) {
        self.record(FeedbackEvent::LoadingShown(message.to_string()));
    }

    fn hide_loading(&self) {
        self.record(FeedbackEvent::LoadingHidden);
    }

    fn toast(&self, message: &str) {
        self.record(FeedbackEvent::Toast(message.to_string()));
    }

    fn alert(&self, message: &str) {
        self.record(FeedbackEvent::Alert(message.to_string()));
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.record(FeedbackEvent::Confirm(prompt.to_string()));
        self.confirm_reply
    }
}
