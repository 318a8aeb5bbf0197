//! Notification dispatch
//!
//! Composes the planner email from the stored fields and the exported image
//! link, then hands it to an [`EmailSender`]. Templates live with the email
//! service; only their variables are sent from here.

mod backend;

pub use backend::{sender_from_settings, ConsoleBackend, EmailJsBackend};

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use validator::Validate;

use crate::config::EmailSettings;
use crate::fields::{FieldName, PlannerFields};

/// Name used when the planner has no name filled in
pub const DEFAULT_USER_NAME: &str = "User";

/// Errors raised while sending the planner email
#[derive(Debug, Error)]
pub enum NotifyError {
    /// No recipient address in the planner
    #[error("no recipient email address")]
    MissingRecipient,

    /// Recipient address is not a valid email address
    #[error("invalid recipient email address: {0}")]
    InvalidRecipient(String),

    /// Email service rejected the request
    #[error("email service returned status {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// EmailJS backend selected without its public key, service id or
    /// template id
    #[error("email service is not configured")]
    NotConfigured,

    /// Request to the email service failed
    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Variables passed to the email template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct EmailPayload {
    /// Recipient address
    #[validate(email)]
    pub to_email: String,
    /// Planner owner's name
    pub user_name: String,
    /// Planner date
    pub planner_date: String,
    /// Link to the exported planner image, if the upload succeeded
    pub image_url: Option<String>,
    /// Support address
    pub company_email: String,
}

/// A templated email ready for sending
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateEmail {
    /// Email service identifier
    pub service_id: String,
    /// Template identifier
    pub template_id: String,
    /// Template variables
    pub params: EmailPayload,
}

/// Trait for sending templated emails
///
/// Implemented by every email backend (EmailJS, console).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send an email
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if the email service cannot be reached or
    /// rejects the request
    async fn send(&self, email: TemplateEmail) -> Result<(), NotifyError>;
}

/// Recipient address of the planner
///
/// # Errors
///
/// Returns `NotifyError::MissingRecipient` if the email field is absent or
/// blank
pub fn recipient(fields: &PlannerFields) -> Result<&str, NotifyError> {
    fields
        .non_blank(FieldName::Email)
        .map(str::trim)
        .ok_or(NotifyError::MissingRecipient)
}

/// Builds and sends the planner email
#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: Arc<dyn EmailSender>,
    service_id: String,
    template_id: String,
    company_email: String,
}

impl NotificationDispatcher {
    /// Create a dispatcher with explicit identifiers
    #[must_use]
    pub fn new(
        sender: Arc<dyn EmailSender>,
        service_id: impl Into<String>,
        template_id: impl Into<String>,
        company_email: impl Into<String>,
    ) -> Self {
        Self {
            sender,
            service_id: service_id.into(),
            template_id: template_id.into(),
            company_email: company_email.into(),
        }
    }

    /// Create a dispatcher using identifiers from configuration
    #[must_use]
    pub fn from_settings(settings: &EmailSettings, sender: Arc<dyn EmailSender>) -> Self {
        Self::new(
            sender,
            &settings.service_id,
            &settings.template_id,
            &settings.company_email,
        )
    }

    /// Build the template variables
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::MissingRecipient` for a blank email field and
    /// `NotifyError::InvalidRecipient` for a malformed one
    pub fn compose(
        &self,
        fields: &PlannerFields,
        image_url: Option<String>,
    ) -> Result<EmailPayload, NotifyError> {
        let to_email = recipient(fields)?.to_string();
        let payload = EmailPayload {
            user_name: fields
                .non_blank(FieldName::Name)
                .unwrap_or(DEFAULT_USER_NAME)
                .to_string(),
            planner_date: fields.get(FieldName::Date).to_string(),
            image_url,
            company_email: self.company_email.clone(),
            to_email,
        };
        payload
            .validate()
            .map_err(|_| NotifyError::InvalidRecipient(payload.to_email.clone()))?;
        Ok(payload)
    }

    /// Compose and send the planner email
    ///
    /// Exactly one send is attempted. Returns the variables that were sent.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` if composing fails or the backend rejects the
    /// email
    pub async fn dispatch(
        &self,
        fields: &PlannerFields,
        image_url: Option<String>,
    ) -> Result<EmailPayload, NotifyError> {
        let params = self.compose(fields, image_url)?;
        debug!(
            to = %params.to_email,
            has_image = params.image_url.is_some(),
            "Dispatching planner email"
        );

        self.sender
            .send(TemplateEmail {
                service_id: self.service_id.clone(),
                template_id: self.template_id.clone(),
                params: params.clone(),
            })
            .await?;

        info!(to = %params.to_email, "Planner email sent");
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::function;

    fn fields() -> PlannerFields {
        PlannerFields::new()
            .with(FieldName::Email, "ada@example.com")
            .with(FieldName::Name, "Ada")
            .with(FieldName::Date, "2026-10-16")
    }

    fn dispatcher(sender: MockEmailSender) -> NotificationDispatcher {
        NotificationDispatcher::new(
            Arc::new(sender),
            "service_x",
            "template_y",
            "support@dailyplanner.com",
        )
    }

    #[test]
    fn test_compose_defaults() {
        let fields = PlannerFields::new().with(FieldName::Email, " bob@example.com ");
        let payload = dispatcher(MockEmailSender::new()).compose(&fields, None).unwrap();
        assert_eq!(payload.to_email, "bob@example.com");
        assert_eq!(payload.user_name, "User");
        assert_eq!(payload.planner_date, "");
        assert_eq!(payload.image_url, None);
        assert_eq!(payload.company_email, "support@dailyplanner.com");
    }

    #[test]
    fn test_payload_serializes_null_image() {
        let payload = dispatcher(MockEmailSender::new()).compose(&fields(), None).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["image_url"].is_null());
        assert_eq!(json["user_name"], "Ada");
        assert_eq!(json["planner_date"], "2026-10-16");
    }

    #[test]
    fn test_blank_recipient() {
        let fields = PlannerFields::new().with(FieldName::Email, "  ");
        let result = dispatcher(MockEmailSender::new()).compose(&fields, None);
        assert!(matches!(result, Err(NotifyError::MissingRecipient)));
    }

    #[test]
    fn test_invalid_recipient() {
        let fields = PlannerFields::new().with(FieldName::Email, "not-an-address");
        let result = dispatcher(MockEmailSender::new()).compose(&fields, None);
        assert!(matches!(result, Err(NotifyError::InvalidRecipient(addr)) if addr == "not-an-address"));
    }

    #[tokio::test]
    async fn test_dispatch_sends_once() {
        let mut sender = MockEmailSender::new();
        sender
            .expect_send()
            .with(function(|email: &TemplateEmail| {
                email.service_id == "service_x"
                    && email.template_id == "template_y"
                    && email.params.image_url.as_deref() == Some("http://host/x.png")
            }))
            .times(1)
            .returning(|_| Ok(()));

        let payload = dispatcher(sender)
            .dispatch(&fields(), Some("http://host/x.png".to_string()))
            .await
            .unwrap();
        assert_eq!(payload.to_email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_missing_recipient_never_sends() {
        let mut sender = MockEmailSender::new();
        sender.expect_send().never();

        let result = dispatcher(sender).dispatch(&PlannerFields::new(), None).await;
        assert!(matches!(result, Err(NotifyError::MissingRecipient)));
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let mut sender = MockEmailSender::new();
        sender.expect_send().returning(|_| {
            Err(NotifyError::Rejected {
                status: 400,
                body: "The template ID is invalid".to_string(),
            })
        });

        let result = dispatcher(sender).dispatch(&fields(), None).await;
        assert!(matches!(result, Err(NotifyError::Rejected { status: 400, .. })));
    }
}
