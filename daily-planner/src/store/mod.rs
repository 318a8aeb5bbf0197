//! Key-value persistence for planner state
//!
//! The planner keeps every field under a plain string key. Components take a
//! [`KeyValueStore`] explicitly, so they run against the in-memory store in
//! tests and against the JSON file store in the CLI.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Errors raised by a key-value store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be parsed or written
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistent string key-value store
///
/// Mirrors the small surface a browser's local storage offers: read a key,
/// write a key, wipe everything.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove every stored key
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written
    fn clear(&self) -> StoreResult<()>;

    /// List every stored key
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read
    fn keys(&self) -> StoreResult<Vec<String>>;
}
