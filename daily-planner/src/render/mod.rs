//! Export rendering
//!
//! The live planner is never rasterized directly. A detached deep copy is
//! made in which every free-text area is replaced by a static text block,
//! mounted off-screen for the duration of rasterization and detached again.

mod raster;

pub use raster::{BlockRasterizer, ExportArtifact, Rasterizer};

#[cfg(test)]
pub use raster::MockRasterizer;

use thiserror::Error;
use tracing::debug;

use crate::document::{Border, Color, Document, Element, MountId, Position, WhiteSpace, PLANNER_ID};

/// Minimum height of an exported text block, in pixels
pub const EXPORT_BLOCK_MIN_HEIGHT: u32 = 80;

/// Padding of an exported text block, in pixels
pub const EXPORT_BLOCK_PADDING: u32 = 8;

/// Horizontal offset that keeps mounted clones outside the viewport
pub const OFFSCREEN_LEFT: i32 = -10_000;

/// Errors raised while rendering the planner
#[derive(Debug, Error)]
pub enum RenderError {
    /// The document has no planner surface
    #[error("planner surface '{0}' not found")]
    MissingSurface(String),

    /// The rendered page would exceed the maximum canvas size
    #[error("rendered planner is {height}px tall, maximum is {max}px")]
    TooLarge {
        /// Required height
        height: u32,
        /// Maximum supported height
        max: u32,
    },

    /// PNG encoding failed
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Static block standing in for an editable text area
fn static_block(editable: &Element) -> Element {
    let mut block = Element::new("div")
        .with_attr("data-export-source", editable.tag.clone())
        .with_text(text_content(editable))
        .styled(|s| {
            s.min_height = Some(EXPORT_BLOCK_MIN_HEIGHT);
            s.padding = EXPORT_BLOCK_PADDING;
            s.border = Some(Border {
                width: 1,
                color: Color::BORDER,
            });
            s.background = Some(Color::WHITE);
            s.white_space = WhiteSpace::PreWrap;
            s.break_words = true;
            s.pointer_events = false;
        });
    block.id.clone_from(&editable.id);
    block
}

/// Text shown by an element and its descendants
fn text_content(element: &Element) -> String {
    let mut text = element.display_text().to_string();
    for child in &element.children {
        let nested = text_content(child);
        if !nested.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&nested);
        }
    }
    text
}

/// Deep copy of `live` prepared for rasterization
///
/// Text areas and `contenteditable` regions become static, non-interactive
/// blocks with the same text. `live` itself is untouched.
#[must_use]
pub fn clone_for_export(live: &Element) -> Element {
    let mut clone = live.clone();
    clone.walk_mut(&mut |element| {
        if element.is_free_text_area() {
            *element = static_block(element);
        }
    });
    clone
}

/// A clone attached to the document outside the viewport
///
/// The element is detached when the guard is dropped.
pub struct OffscreenMount<'a> {
    document: &'a mut Document,
    id: MountId,
}

impl<'a> OffscreenMount<'a> {
    /// Attach `element` off-screen
    pub fn attach(document: &'a mut Document, mut element: Element) -> Self {
        element.style.position = Position::Absolute {
            left: OFFSCREEN_LEFT,
            top: 0,
        };
        element.style.pointer_events = false;
        let id = document.mount(element);
        Self { document, id }
    }

    /// The mounted element
    #[must_use]
    pub fn element(&self) -> Option<&Element> {
        self.document.mounted(self.id)
    }
}

impl Drop for OffscreenMount<'_> {
    fn drop(&mut self) {
        self.document.unmount(self.id);
    }
}

/// Render the document's planner surface to an image
///
/// # Errors
///
/// Returns `RenderError::MissingSurface` if the document has no planner, or
/// any error raised by the rasterizer
pub fn render_planner(
    document: &mut Document,
    rasterizer: &dyn Rasterizer,
) -> Result<ExportArtifact, RenderError> {
    let live = document
        .element(PLANNER_ID)
        .ok_or_else(|| RenderError::MissingSurface(PLANNER_ID.to_string()))?;
    let clone = clone_for_export(live);

    let mount = OffscreenMount::attach(document, clone);
    let artifact = match mount.element() {
        Some(element) => rasterizer.rasterize(element)?,
        None => return Err(RenderError::MissingSurface(PLANNER_ID.to_string())),
    };
    drop(mount);

    debug!(
        width = artifact.width,
        height = artifact.height,
        bytes = artifact.len(),
        "Rendered planner"
    );
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner_with_content() -> Document {
        let mut doc = Document::daily_planner();
        doc.element_mut("todo").unwrap().set_display_text("buy milk\ncall mom");
        doc.element_mut("schedule-08").unwrap().set_display_text("gym");
        doc.element_mut("name").unwrap().set_display_text("Ada");
        doc
    }

    #[test]
    fn test_clone_replaces_free_text_areas() {
        let doc = planner_with_content();
        let clone = clone_for_export(doc.element(PLANNER_ID).unwrap());

        let todo = clone.find("todo").unwrap();
        assert_eq!(todo.tag, "div");
        assert_eq!(todo.text, "buy milk\ncall mom");
        assert_eq!(todo.style.min_height, Some(EXPORT_BLOCK_MIN_HEIGHT));
        assert_eq!(todo.style.white_space, WhiteSpace::PreWrap);
        assert!(!todo.style.pointer_events);
        assert_eq!(
            todo.attributes.get("data-export-source").map(String::as_str),
            Some("textarea")
        );

        let cell = clone.find("schedule-08").unwrap();
        assert_eq!(cell.tag, "div");
        assert_eq!(cell.text, "gym");
        assert!(!cell.is_content_editable());

        // single-line inputs are kept as they are
        assert_eq!(clone.find("name").unwrap().tag, "input");

        let mut remaining = 0;
        clone.walk(&mut |e| {
            if e.is_free_text_area() {
                remaining += 1;
            }
        });
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_clone_leaves_live_untouched() {
        let doc = planner_with_content();
        let before = doc.clone();
        let _clone = clone_for_export(doc.element(PLANNER_ID).unwrap());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_nested_editable_text_is_flattened() {
        let cell = Element::new("td")
            .with_attr("contenteditable", "true")
            .with_text("Morning")
            .with_child(Element::new("b").with_text("run"));
        let clone = clone_for_export(&cell);
        assert_eq!(clone.text, "Morning\nrun");
        assert!(clone.children.is_empty());
    }

    #[test]
    fn test_render_unmounts_clone() {
        let mut doc = planner_with_content();
        let live_before = doc.body.clone();

        let artifact = render_planner(&mut doc, &BlockRasterizer::default()).unwrap();
        assert!(artifact.width > 0 && artifact.height > 0);
        assert_eq!(doc.mounted_count(), 0);
        assert_eq!(doc.body, live_before);
    }

    #[test]
    fn test_failed_rasterization_still_unmounts() {
        let mut rasterizer = MockRasterizer::new();
        rasterizer.expect_rasterize().returning(|element| {
            assert!(matches!(element.style.position, Position::Absolute { left, .. } if left == OFFSCREEN_LEFT));
            Err(RenderError::TooLarge { height: 1, max: 0 })
        });

        let mut doc = planner_with_content();
        let result = render_planner(&mut doc, &rasterizer);
        assert!(matches!(result, Err(RenderError::TooLarge { .. })));
        assert_eq!(doc.mounted_count(), 0);
    }

    #[test]
    fn test_missing_surface() {
        let mut doc = Document::new(Element::new("body"));
        let result = render_planner(&mut doc, &BlockRasterizer::default());
        assert!(matches!(result, Err(RenderError::MissingSurface(_))));
    }
}
