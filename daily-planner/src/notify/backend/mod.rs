//! Email backends

mod console;
mod emailjs;

pub use console::ConsoleBackend;
pub use emailjs::EmailJsBackend;

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::{EmailSender, NotifyError};
use crate::config::{EmailBackend, EmailSettings};

/// Build the backend selected in configuration
///
/// The console backend is only used when asked for explicitly.
///
/// # Errors
///
/// Returns `NotifyError::NotConfigured` if EmailJS is selected without a
/// public key, service id and template id, or an error if the HTTP client
/// cannot be built
pub fn sender_from_settings(
    settings: &EmailSettings,
    timeout: Option<Duration>,
) -> Result<Arc<dyn EmailSender>, NotifyError> {
    match settings.backend {
        EmailBackend::Console => {
            info!("Console email backend selected, emails are logged instead of sent");
            Ok(Arc::new(ConsoleBackend::new()))
        }
        EmailBackend::EmailJs => {
            let configured = [&settings.public_key, &settings.service_id, &settings.template_id]
                .iter()
                .all(|value| !value.trim().is_empty());
            if !configured {
                warn!("EmailJS public key, service id or template id missing");
                return Err(NotifyError::NotConfigured);
            }
            Ok(Arc::new(EmailJsBackend::from_settings(settings, timeout)?))
        }
    }
}
