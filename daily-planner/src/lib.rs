//! daily-planner: a daily planner with persistent fields, image export and
//! email delivery
//!
//! The crate has two halves:
//!
//! - **Planner client**: the planner page model ([`document`]), fields
//!   persisted in a key-value store ([`fields`], [`store`]), the quote of
//!   the day ([`quote`]), and the export pipeline that renders the planner
//!   to a PNG, uploads it and emails a link ([`render`], [`export`],
//!   [`notify`]).
//! - **Upload server**: an axum service accepting one image per request
//!   and answering with its public URL ([`server`], [`storage`]).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use daily_planner::{config::PlannerConfig, observability, server, state::AppState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     observability::init()?;
//!
//!     let config = PlannerConfig::load()?;
//!     let state = AppState::from_config(config)?;
//!
//!     // Serves POST /upload until Ctrl+C
//!     server::serve(state).await
//! }
//! ```
//!
//! # Exporting a planner
//!
//! ```rust,no_run
//! use daily_planner::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = PlannerConfig::load()?;
//! let fields = FieldStore::new(Arc::new(JsonFileStore::open(&config.client.store_path)?));
//!
//! let mut page = Document::daily_planner();
//! fields.restore(&mut page);
//!
//! let sender = sender_from_settings(&config.email, config.client.request_timeout())?;
//! let pipeline = ExportPipeline::new(
//!     Arc::new(BlockRasterizer::default()),
//!     Arc::new(HttpUploader::from_settings(&config.client)?),
//!     NotificationDispatcher::from_settings(&config.email, sender),
//!     Arc::new(MemoryFeedback::default()),
//! );
//!
//! let report = pipeline
//!     .export_and_send(&mut page, &fields.snapshot(), &CancellationToken::new())
//!     .await?;
//! println!("sent to {}", report.email.to_email);
//! # Ok(())
//! # }
//! ```

#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod feedback;
pub mod fields;
pub mod notify;
pub mod observability;
pub mod quote;
pub mod render;
pub mod server;
pub mod state;
pub mod storage;
pub mod store;

/// Prelude module for convenient imports
///
/// ```rust
/// use daily_planner::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{
        ClientSettings, EmailBackend, EmailSettings, PlannerConfig, QuoteSettings, ServerSettings,
        UploadBackend, UploadSettings,
    };
    pub use crate::document::{Document, Element};
    pub use crate::error::ServerError;
    pub use crate::export::{
        CancellationToken, ExportError, ExportPipeline, ExportReport, ExportState, HttpUploader,
        UploadResult, Uploader,
    };
    pub use crate::feedback::{Feedback, MemoryFeedback};
    pub use crate::fields::{FieldName, FieldStore, PlannerFields};
    pub use crate::notify::{
        sender_from_settings, EmailPayload, EmailSender, NotificationDispatcher, NotifyError,
    };
    pub use crate::quote::{HttpQuoteProvider, QuoteFetcher, QuoteProvider, QuoteRecord};
    pub use crate::render::{BlockRasterizer, ExportArtifact, Rasterizer};
    pub use crate::state::AppState;
    pub use crate::storage::{HostedImage, ImageHost, StorageError, UploadedFile};
    pub use crate::store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
}
