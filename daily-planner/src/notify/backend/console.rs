//! Console backend for development
//!
//! Logs template emails instead of sending them.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::notify::{EmailSender, NotifyError, TemplateEmail};

/// Console email backend for development
///
/// Useful for running the planner without email service credentials.
#[derive(Debug, Clone, Default)]
pub struct ConsoleBackend {
    /// Whether to log every template variable
    verbose: bool,
}

impl ConsoleBackend {
    /// Create a new console backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a console backend that logs every template variable
    #[must_use]
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }
}

#[async_trait]
impl EmailSender for ConsoleBackend {
    async fn send(&self, email: TemplateEmail) -> Result<(), NotifyError> {
        info!(
            service_id = %email.service_id,
            template_id = %email.template_id,
            to = %email.params.to_email,
            image_url = email.params.image_url.as_deref().unwrap_or("<none>"),
            "Console email sent"
        );

        if self.verbose {
            debug!(
                user_name = %email.params.user_name,
                planner_date = %email.params.planner_date,
                company_email = %email.params.company_email,
                "Email details"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::EmailPayload;

    #[tokio::test]
    async fn test_verbose_backend_sends() {
        let email = TemplateEmail {
            service_id: "service".to_string(),
            template_id: "template".to_string(),
            params: EmailPayload {
                to_email: "ada@example.com".to_string(),
                user_name: "User".to_string(),
                planner_date: "2026-10-16".to_string(),
                image_url: Some("http://localhost:3000/uploads/1.png".to_string()),
                company_email: "support@dailyplanner.com".to_string(),
            },
        };
        assert!(ConsoleBackend::verbose().send(email).await.is_ok());
    }
}
