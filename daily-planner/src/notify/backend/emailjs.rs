//! EmailJS REST backend

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::config::EmailSettings;
use crate::notify::{EmailPayload, EmailSender, NotifyError, TemplateEmail};

/// Request body of the EmailJS send API
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: &'a EmailPayload,
}

/// Sends template emails through the EmailJS REST API
#[derive(Debug, Clone)]
pub struct EmailJsBackend {
    client: reqwest::Client,
    endpoint: String,
    public_key: String,
    private_key: Option<String>,
}

impl EmailJsBackend {
    /// Create a backend for an endpoint and account keys
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        public_key: impl Into<String>,
        private_key: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            public_key: public_key.into(),
            private_key,
        }
    }

    /// Create a backend from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn from_settings(settings: &EmailSettings, timeout: Option<Duration>) -> Result<Self, NotifyError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(
            builder.build()?,
            &settings.endpoint,
            &settings.public_key,
            settings.private_key.clone().filter(|key| !key.is_empty()),
        ))
    }
}

#[async_trait]
impl EmailSender for EmailJsBackend {
    async fn send(&self, email: TemplateEmail) -> Result<(), NotifyError> {
        let request = SendRequest {
            service_id: &email.service_id,
            template_id: &email.template_id,
            user_id: &self.public_key,
            access_token: self.private_key.as_deref(),
            template_params: &email.params,
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
