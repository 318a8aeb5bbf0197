//! Terminal feedback
//!
//! Spinner while an export runs, styled one-line messages, and yes/no
//! prompts.

use console::{style, Emoji};
use daily_planner::feedback::Feedback;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::time::Duration;

static SUCCESS: Emoji = Emoji("✓ ", "√ ");
static FAILURE: Emoji = Emoji("✗ ", "x ");

/// [`Feedback`] rendered on the terminal
pub struct TerminalFeedback {
    spinner: Mutex<Option<ProgressBar>>,
    assume_yes: bool,
}

impl TerminalFeedback {
    /// Create terminal feedback
    ///
    /// With `assume_yes` every confirmation is answered yes without
    /// prompting.
    #[must_use]
    pub const fn new(assume_yes: bool) -> Self {
        Self {
            spinner: Mutex::new(None),
            assume_yes,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn suspend(&self, f: impl FnOnce()) {
        match self.spinner.lock().as_ref() {
            Some(spinner) => spinner.suspend(f),
            None => f(),
        }
    }
}

impl Feedback for TerminalFeedback {
    fn show_loading(&self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(Self::spinner_style());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner.set_message(message.to_string());

        if let Some(previous) = self.spinner.lock().replace(spinner) {
            previous.finish_and_clear();
        }
    }

    fn hide_loading(&self) {
        if let Some(spinner) = self.spinner.lock().take() {
            spinner.finish_and_clear();
        }
    }

    fn toast(&self, message: &str) {
        self.suspend(|| println!("{}", style(format!("{SUCCESS}{message}")).green().bold()));
    }

    fn alert(&self, message: &str) {
        self.suspend(|| eprintln!("{}", style(format!("{FAILURE}{message}")).red().bold()));
    }

    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let mut answer = false;
        self.suspend(|| {
            answer = Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact()
                .unwrap_or(false);
        });
        answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assume_yes_skips_prompt() {
        assert!(TerminalFeedback::new(true).confirm("Clear everything?"));
    }

    #[test]
    fn test_loading_is_replaced_and_hidden() {
        let feedback = TerminalFeedback::new(true);
        feedback.show_loading("first");
        feedback.show_loading("second");
        assert_eq!(
            feedback.spinner.lock().as_ref().map(ProgressBar::message),
            Some("second".to_string())
        );

        feedback.hide_loading();
        assert!(feedback.spinner.lock().is_none());
        // hiding twice is harmless
        feedback.hide_loading();
    }
}
