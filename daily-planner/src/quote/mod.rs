//! Quote of the day
//!
//! On load the planner fills the quote field once from an external quotes
//! API. A quote already in the store always wins, so user edits survive
//! reloads.

mod provider;

pub use provider::HttpQuoteProvider;

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::document::Document;
use crate::fields::FieldName;
use crate::store::KeyValueStore;

/// Errors raised while fetching a quote
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Request could not be completed
    #[error("quote request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("quote provider returned status {0}")]
    Status(u16),

    /// Response body did not contain a quote
    #[error("malformed quote response: {0}")]
    Malformed(String),
}

/// One entry as returned by the quotes API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuoteEntry {
    /// Quote text
    pub quote: String,
    /// Quote author
    pub author: String,
}

/// A formatted quote, `"<text> — <author>"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRecord(String);

impl QuoteRecord {
    /// Format a quote and its author
    #[must_use]
    pub fn new(text: &str, author: &str) -> Self {
        Self(format!("{} — {}", text.trim(), author.trim()))
    }

    /// Formatted text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<QuoteEntry> for QuoteRecord {
    fn from(entry: QuoteEntry) -> Self {
        Self::new(&entry.quote, &entry.author)
    }
}

impl fmt::Display for QuoteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of motivational quotes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch a single quote
    ///
    /// # Errors
    ///
    /// Returns `QuoteError` if the provider cannot be reached or answers
    /// with something other than a non-empty list of quotes
    async fn fetch(&self) -> Result<QuoteRecord, QuoteError>;
}

/// Fills the quote field on page load
pub struct QuoteFetcher<P> {
    provider: P,
}

impl<P: QuoteProvider> QuoteFetcher<P> {
    /// Create a fetcher around a provider
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Fill the quote field unless a quote is already stored
    ///
    /// Returns the quote that was written, or `None` when nothing changed.
    /// Failures are logged and never propagated.
    pub async fn populate(
        &self,
        store: &dyn KeyValueStore,
        document: &mut Document,
    ) -> Option<QuoteRecord> {
        let key = FieldName::Quote.key();
        match store.get(key) {
            Ok(Some(existing)) if !existing.is_empty() => {
                debug!("Quote already stored, skipping fetch");
                return None;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Failed to read stored quote, skipping fetch");
                return None;
            }
        }

        self.fetch_into(store, document).await
    }

    /// Replace the stored quote with a freshly fetched one
    ///
    /// The current quote is kept when the fetch fails.
    pub async fn refresh(
        &self,
        store: &dyn KeyValueStore,
        document: &mut Document,
    ) -> Option<QuoteRecord> {
        self.fetch_into(store, document).await
    }

    async fn fetch_into(
        &self,
        store: &dyn KeyValueStore,
        document: &mut Document,
    ) -> Option<QuoteRecord> {
        let key = FieldName::Quote.key();
        let quote = match self.provider.fetch().await {
            Ok(quote) => quote,
            Err(e) => {
                warn!(error = %e, "Failed to fetch quote");
                return None;
            }
        };

        if let Some(element) = document.element_mut(key) {
            element.set_display_text(quote.as_str());
        }
        if let Err(e) = store.set(key, quote.as_str()) {
            warn!(error = %e, "Failed to persist quote");
        }

        info!(quote = %quote, "Quote of the day loaded");
        Some(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_record_format() {
        let record = QuoteRecord::new("Well begun is half done. ", "Aristotle");
        assert_eq!(record.as_str(), "Well begun is half done. — Aristotle");
    }

    #[tokio::test]
    async fn test_stored_quote_skips_fetch() {
        let mut provider = MockQuoteProvider::new();
        provider.expect_fetch().never();

        let store = MemoryStore::with_entries([("quote", "Mine — Me")]);
        let mut doc = Document::daily_planner();
        doc.element_mut("quote").unwrap().set_display_text("Mine — Me");

        let fetcher = QuoteFetcher::new(provider);
        assert!(fetcher.populate(&store, &mut doc).await.is_none());
        assert_eq!(doc.element("quote").unwrap().display_text(), "Mine — Me");
        assert_eq!(store.get("quote").unwrap().as_deref(), Some("Mine — Me"));
    }

    #[tokio::test]
    async fn test_fetch_fills_field_and_store() {
        let mut provider = MockQuoteProvider::new();
        provider
            .expect_fetch()
            .times(1)
            .returning(|| Ok(QuoteRecord::new("Act.", "Anon")));

        let store = MemoryStore::new();
        let mut doc = Document::daily_planner();

        let fetcher = QuoteFetcher::new(provider);
        let quote = fetcher.populate(&store, &mut doc).await.unwrap();
        assert_eq!(quote.as_str(), "Act. — Anon");
        assert_eq!(doc.element("quote").unwrap().display_text(), "Act. — Anon");
        assert_eq!(store.get("quote").unwrap().as_deref(), Some("Act. — Anon"));
    }

    #[tokio::test]
    async fn test_failure_leaves_field_untouched() {
        let mut provider = MockQuoteProvider::new();
        provider
            .expect_fetch()
            .returning(|| Err(QuoteError::Malformed("empty list".into())));

        let store = MemoryStore::new();
        let mut doc = Document::daily_planner();

        let fetcher = QuoteFetcher::new(provider);
        assert!(fetcher.populate(&store, &mut doc).await.is_none());
        assert_eq!(doc.element("quote").unwrap().display_text(), "");
        assert_eq!(store.get("quote").unwrap(), None);
    }

    #[tokio::test]
    async fn test_refresh_replaces_stored_quote() {
        let mut provider = MockQuoteProvider::new();
        provider
            .expect_fetch()
            .times(1)
            .returning(|| Ok(QuoteRecord::new("Act.", "Anon")));

        let store = MemoryStore::with_entries([("quote", "Mine — Me")]);
        let mut doc = Document::daily_planner();

        let fetcher = QuoteFetcher::new(provider);
        assert!(fetcher.refresh(&store, &mut doc).await.is_some());
        assert_eq!(doc.element("quote").unwrap().display_text(), "Act. — Anon");
        assert_eq!(store.get("quote").unwrap().as_deref(), Some("Act. — Anon"));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_stored_quote() {
        let mut provider = MockQuoteProvider::new();
        provider
            .expect_fetch()
            .returning(|| Err(QuoteError::Status(503)));

        let store = MemoryStore::with_entries([("quote", "Mine — Me")]);
        let mut doc = Document::daily_planner();
        doc.element_mut("quote").unwrap().set_display_text("Mine — Me");

        let fetcher = QuoteFetcher::new(provider);
        assert!(fetcher.refresh(&store, &mut doc).await.is_none());
        assert_eq!(doc.element("quote").unwrap().display_text(), "Mine — Me");
        assert_eq!(store.get("quote").unwrap().as_deref(), Some("Mine — Me"));
    }
}
