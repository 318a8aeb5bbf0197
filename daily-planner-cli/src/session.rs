//! Planner page load
//!
//! Every planner command starts the same way: open the persisted fields,
//! restore them into a fresh planner page and, when a quotes API key is
//! configured, fill in the quote of the day.

use anyhow::{Context, Result};
use daily_planner::config::PlannerConfig;
use daily_planner::document::Document;
use daily_planner::fields::{FieldStore, PlannerFields};
use daily_planner::quote::{HttpQuoteProvider, QuoteFetcher, QuoteProvider, QuoteRecord};
use daily_planner::store::JsonFileStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// An opened planner: configuration, persisted fields and the page
pub struct PlannerSession {
    /// Loaded configuration
    pub config: PlannerConfig,
    /// Persisted fields
    pub fields: FieldStore,
    /// Planner page with every field restored
    pub page: Document,
}

impl PlannerSession {
    /// Open the planner store and restore the page without fetching a quote
    ///
    /// # Errors
    ///
    /// Returns an error if the store file cannot be read or parsed
    pub fn open(config: PlannerConfig) -> Result<Self> {
        let path = &config.client.store_path;
        let store = JsonFileStore::open(path)
            .with_context(|| format!("Failed to open planner store: {}", path.display()))?;

        let fields = FieldStore::new(Arc::new(store));
        let mut page = Document::daily_planner();
        fields.restore(&mut page);

        Ok(Self {
            config,
            fields,
            page,
        })
    }

    /// Open the planner and run the quote of the day
    ///
    /// # Errors
    ///
    /// Returns an error if the store file cannot be read or parsed
    pub async fn load(config: PlannerConfig) -> Result<Self> {
        let mut session = Self::open(config)?;
        session.fetch_quote().await;
        Ok(session)
    }

    /// Fill the quote field from the configured quotes API
    ///
    /// Skipped without an API key. Failures are logged.
    pub async fn fetch_quote(&mut self) -> Option<QuoteRecord> {
        let provider = self.quote_provider()?;
        self.fetch_quote_with(provider).await
    }

    /// Replace the stored quote from the configured quotes API
    ///
    /// The stored quote is kept when no API key is set or the fetch fails.
    pub async fn refresh_quote(&mut self) -> Option<QuoteRecord> {
        let provider = self.quote_provider()?;
        self.refresh_quote_with(provider).await
    }

    fn quote_provider(&self) -> Option<HttpQuoteProvider> {
        if self.config.quotes.api_key.trim().is_empty() {
            debug!("No quotes API key configured, skipping quote of the day");
            return None;
        }

        let timeout = self.config.client.request_timeout();
        HttpQuoteProvider::from_settings(&self.config.quotes, timeout)
            .map_err(|e| warn!(error = %e, "Failed to build quotes client"))
            .ok()
    }

    /// Fill the quote field from an explicit provider
    pub async fn fetch_quote_with<P: QuoteProvider>(&mut self, provider: P) -> Option<QuoteRecord> {
        QuoteFetcher::new(provider)
            .populate(self.fields.store(), &mut self.page)
            .await
    }

    /// Replace the quote field from an explicit provider
    pub async fn refresh_quote_with<P: QuoteProvider>(
        &mut self,
        provider: P,
    ) -> Option<QuoteRecord> {
        QuoteFetcher::new(provider)
            .refresh(self.fields.store(), &mut self.page)
            .await
    }

    /// Values currently persisted
    #[must_use]
    pub fn snapshot(&self) -> PlannerFields {
        self.fields.snapshot()
    }
}
