//! HTTP quotes API client

use async_trait::async_trait;
use std::time::Duration;

use super::{QuoteEntry, QuoteError, QuoteProvider, QuoteRecord};
use crate::config::QuoteSettings;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Quotes API reached over HTTP
///
/// Expects the endpoint to answer `GET` with a JSON array of
/// `{"quote": ..., "author": ...}` objects and uses the first one.
#[derive(Debug, Clone)]
pub struct HttpQuoteProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpQuoteProvider {
    /// Create a provider for an endpoint
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// Create a provider from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn from_settings(settings: &QuoteSettings, timeout: Option<Duration>) -> Result<Self, QuoteError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(builder.build()?, &settings.endpoint, &settings.api_key))
    }
}

#[async_trait]
impl QuoteProvider for HttpQuoteProvider {
    async fn fetch(&self) -> Result<QuoteRecord, QuoteError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Status(status.as_u16()));
        }

        let entries: Vec<QuoteEntry> = response
            .json()
            .await
            .map_err(|e| QuoteError::Malformed(e.to_string()))?;

        entries
            .into_iter()
            .next()
            .map(QuoteRecord::from)
            .ok_or_else(|| QuoteError::Malformed("empty quote list".to_string()))
    }
}
