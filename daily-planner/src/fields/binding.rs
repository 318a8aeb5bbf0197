//! Binding between document controls and the key-value store

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{FieldName, PlannerFields};
use crate::document::Document;
use crate::feedback::Feedback;
use crate::store::KeyValueStore;

/// Prompt shown before wiping the planner
pub const RESET_PROMPT: &str = "Are you sure you want to clear everything?";

/// Keeps planner controls and persisted values in sync
///
/// # Examples
///
/// ```rust
/// use daily_planner::document::Document;
/// use daily_planner::fields::{FieldName, FieldStore};
/// use daily_planner::store::MemoryStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(MemoryStore::with_entries([("name", "Ada")]));
/// let fields = FieldStore::new(store);
///
/// let mut page = Document::daily_planner();
/// fields.restore(&mut page);
/// assert_eq!(page.element("name").unwrap().display_text(), "Ada");
///
/// fields.record_input(&mut page, FieldName::Todo, "Ship it");
/// assert_eq!(fields.snapshot().get(FieldName::Todo), "Ship it");
/// ```
#[derive(Clone)]
pub struct FieldStore {
    store: Arc<dyn KeyValueStore>,
}

impl FieldStore {
    /// Bind to a store
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Underlying store
    #[must_use]
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Populate every bound control from the store
    ///
    /// Absent values become empty strings. Controls missing from the
    /// document are skipped. Returns the number of controls populated.
    pub fn restore(&self, document: &mut Document) -> usize {
        let values = PlannerFields::load(self.store.as_ref());
        let mut bound = 0;
        for (field, value) in values.iter() {
            let Some(element) = document.element_mut(field.key()) else {
                debug!(field = %field, "No control for field, skipping");
                continue;
            };
            element.set_display_text(value);
            bound += 1;
        }
        debug!(bound, "Restored planner fields");
        bound
    }

    /// Apply a user edit to a control and persist it
    ///
    /// Returns `false` when the document has no control for the field, in
    /// which case nothing is persisted. A failed write is logged; the edit
    /// stays visible.
    pub fn record_input(&self, document: &mut Document, field: FieldName, value: &str) -> bool {
        let Some(element) = document.element_mut(field.key()) else {
            return false;
        };
        element.set_display_text(value);

        if let Err(e) = self.store.set(field.key(), value) {
            warn!(field = %field, error = %e, "Failed to persist planner field");
        }
        true
    }

    /// Values currently persisted
    #[must_use]
    pub fn snapshot(&self) -> PlannerFields {
        PlannerFields::load(self.store.as_ref())
    }

    /// Wipe the planner after asking the user
    ///
    /// Clears the store, blanks every bound control and every
    /// `contenteditable` region. Returns `false` if the user declined.
    pub fn reset(&self, document: &mut Document, feedback: &dyn Feedback) -> bool {
        if !feedback.confirm(RESET_PROMPT) {
            return false;
        }

        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear planner store");
        }

        for field in FieldName::ALL {
            if let Some(element) = document.element_mut(field.key()) {
                element.set_display_text("");
            }
        }

        document.body.walk_mut(&mut |element| {
            if element.is_content_editable() {
                element.text.clear();
            }
        });

        info!("All fields cleared");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Element;
    use crate::feedback::MemoryFeedback;
    use crate::store::{MemoryStore, MockKeyValueStore, StoreError};

    fn page() -> Document {
        Document::daily_planner()
    }

    #[test]
    fn test_restore_fills_absent_with_empty() {
        let store = Arc::new(MemoryStore::with_entries([("email", "ada@example.com")]));
        let fields = FieldStore::new(store);

        let mut doc = page();
        doc.element_mut("notes").unwrap().set_display_text("stale");

        assert_eq!(fields.restore(&mut doc), FieldName::ALL.len());
        assert_eq!(doc.element("email").unwrap().display_text(), "ada@example.com");
        assert_eq!(doc.element("notes").unwrap().display_text(), "");
    }

    #[test]
    fn test_missing_controls_are_skipped() {
        let store = Arc::new(MemoryStore::with_entries([("name", "Ada")]));
        let fields = FieldStore::new(store.clone());

        let mut doc = Document::new(
            Element::new("body").with_child(Element::new("input").with_id("name")),
        );
        assert_eq!(fields.restore(&mut doc), 1);
        assert!(!fields.record_input(&mut doc, FieldName::Notes, "lost"));
        assert_eq!(store.get("notes").unwrap(), None);
    }

    #[test]
    fn test_reset_declined_keeps_everything() {
        let store = Arc::new(MemoryStore::with_entries([("name", "Ada")]));
        let fields = FieldStore::new(store.clone());
        let mut doc = page();
        fields.restore(&mut doc);

        let feedback = MemoryFeedback::new(false);
        assert!(!fields.reset(&mut doc, &feedback));
        assert_eq!(store.get("name").unwrap().as_deref(), Some("Ada"));
        assert_eq!(doc.element("name").unwrap().display_text(), "Ada");
    }

    #[test]
    fn test_reset_clears_editable_cells() {
        let store = Arc::new(MemoryStore::new());
        let fields = FieldStore::new(store);
        let mut doc = page();
        doc.element_mut("schedule-09").unwrap().set_display_text("standup");

        assert!(fields.reset(&mut doc, &MemoryFeedback::new(true)));
        assert_eq!(doc.element("schedule-09").unwrap().display_text(), "");
    }

    #[test]
    fn test_write_failure_keeps_edit_visible() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set()
            .returning(|_, _| Err(StoreError::Io(std::io::Error::other("disk full"))));

        let fields = FieldStore::new(Arc::new(store));
        let mut doc = page();
        assert!(fields.record_input(&mut doc, FieldName::Todo, "laundry"));
        assert_eq!(doc.element("todo").unwrap().display_text(), "laundry");
    }
}
