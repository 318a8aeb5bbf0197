//! Planner fields and their binding to persistent storage
//!
//! The planner has a fixed set of named fields. Each one is stored under its
//! own key in a [`KeyValueStore`](crate::store::KeyValueStore) and rendered by
//! the document element carrying the same id.

mod binding;

pub use binding::FieldStore;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::store::KeyValueStore;

/// A recognized planner field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldName {
    /// Planner owner's name
    Name,
    /// Recipient address for the exported planner
    Email,
    /// Planner date
    Date,
    /// Top priorities of the day
    Priorities,
    /// To-do list
    Todo,
    /// Free notes
    Notes,
    /// Motivational quote
    Quote,
}

impl FieldName {
    /// Every recognized field, in display order
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::Email,
        Self::Date,
        Self::Priorities,
        Self::Todo,
        Self::Notes,
        Self::Quote,
    ];

    /// Storage key (and element id) for this field
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Date => "date",
            Self::Priorities => "priorities",
            Self::Todo => "todo",
            Self::Notes => "notes",
            Self::Quote => "quote",
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Date => "Date",
            Self::Priorities => "Top priorities",
            Self::Todo => "To do",
            Self::Notes => "Notes",
            Self::Quote => "Quote of the day",
        }
    }

    /// Whether the field holds multi-line text
    #[must_use]
    pub const fn is_multiline(self) -> bool {
        matches!(self, Self::Priorities | Self::Todo | Self::Notes | Self::Quote)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Error returned when parsing an unknown field name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown planner field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for FieldName {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Snapshot of every planner field value
///
/// Missing values read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlannerFields {
    values: BTreeMap<FieldName, String>,
}

impl PlannerFields {
    /// Create an empty snapshot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every recognized field from a store
    ///
    /// Read failures are logged and treated as absent values.
    #[must_use]
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut fields = Self::new();
        for field in FieldName::ALL {
            match store.get(field.key()) {
                Ok(Some(value)) => fields.set(field, value),
                Ok(None) => {}
                Err(e) => tracing::warn!(field = %field, error = %e, "Failed to read planner field"),
            }
        }
        fields
    }

    /// Current value of a field
    #[must_use]
    pub fn get(&self, field: FieldName) -> &str {
        self.values.get(&field).map_or("", String::as_str)
    }

    /// Non-blank value of a field
    #[must_use]
    pub fn non_blank(&self, field: FieldName) -> Option<&str> {
        let value = self.get(field).trim();
        (!value.is_empty()).then_some(value)
    }

    /// Set a field value
    pub fn set(&mut self, field: FieldName, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Builder-style setter
    #[must_use]
    pub fn with(mut self, field: FieldName, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Iterate over every recognized field and its value
    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> {
        FieldName::ALL.into_iter().map(|field| (field, self.get(field)))
    }
}
