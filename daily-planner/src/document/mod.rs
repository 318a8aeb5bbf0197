//! In-memory planner document
//!
//! A small element tree standing in for the page the planner lives on.
//! Components never look elements up globally: they receive the document
//! (or the element they work on) as an argument.

mod planner;

pub use planner::{PLANNER_ID, PLANNER_FORM_ID, SCHEDULE_HOURS};

use std::collections::BTreeMap;

/// RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Pure white
    pub const WHITE: Self = Self(255, 255, 255);
    /// Near-black used for text
    pub const INK: Self = Self(33, 37, 41);
    /// Light grey used for borders
    pub const BORDER: Self = Self(206, 212, 218);
}

/// Element border
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    /// Border width in pixels
    pub width: u32,
    /// Border color
    pub color: Color,
}

/// How whitespace in text content is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhiteSpace {
    /// Collapse runs of whitespace, including newlines
    #[default]
    Normal,
    /// Keep newlines, wrap long lines
    PreWrap,
}

/// Layout positioning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// Participates in normal flow
    #[default]
    Static,
    /// Taken out of flow and placed at absolute page coordinates
    Absolute {
        /// Horizontal offset in pixels
        left: i32,
        /// Vertical offset in pixels
        top: i32,
    },
}

/// Element visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Rendered normally
    #[default]
    Visible,
    /// Laid out but not painted on the page
    Hidden,
}

/// Visual style of an element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Style {
    /// Minimum box height in pixels
    pub min_height: Option<u32>,
    /// Inner padding in pixels on every side
    pub padding: u32,
    /// Optional border
    pub border: Option<Border>,
    /// Optional background fill
    pub background: Option<Color>,
    /// Whitespace handling for text content
    pub white_space: WhiteSpace,
    /// Break words that do not fit on a line
    pub break_words: bool,
    /// Positioning
    pub position: Position,
    /// Visibility
    pub visibility: Visibility,
    /// Whether the element may intercept pointer input
    pub pointer_events: bool,
}

/// A node of the planner document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name (`div`, `input`, `textarea`, ...)
    pub tag: String,
    /// Element id
    pub id: Option<String>,
    /// Remaining attributes
    pub attributes: BTreeMap<String, String>,
    /// Visual style
    pub style: Style,
    /// Text content for non-form elements
    pub text: String,
    /// Current value of a form control
    pub value: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
}

impl Element {
    /// Create an element with the given tag
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let value = matches!(tag.as_str(), "input" | "textarea").then(String::new);
        Self {
            tag,
            id: None,
            attributes: BTreeMap::new(),
            style: Style {
                pointer_events: true,
                ..Style::default()
            },
            text: String::new(),
            value,
            children: Vec::new(),
        }
    }

    /// Set the element id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set the text content
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Append a child element
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append several child elements
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Adjust the style in place
    #[must_use]
    pub fn styled(mut self, f: impl FnOnce(&mut Style)) -> Self {
        f(&mut self.style);
        self
    }

    /// Whether this is an `input` or `textarea`
    #[must_use]
    pub fn is_form_control(&self) -> bool {
        self.value.is_some()
    }

    /// Whether the element is a user-editable region (`contenteditable`)
    #[must_use]
    pub fn is_content_editable(&self) -> bool {
        self.attributes
            .get("contenteditable")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Whether the element is a free-text editable area
    ///
    /// Text areas and `contenteditable` regions qualify; single-line inputs
    /// do not.
    #[must_use]
    pub fn is_free_text_area(&self) -> bool {
        self.tag == "textarea" || self.is_content_editable()
    }

    /// Text the element displays
    #[must_use]
    pub fn display_text(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.text)
    }

    /// Replace the displayed text, as a user edit would
    pub fn set_display_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        match &mut self.value {
            Some(value) => *value = text,
            None => self.text = text,
        }
    }

    /// Find a descendant (or this element) by id
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Self> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Find a descendant (or this element) by id, mutably
    pub fn find_mut(&mut self, id: &str) -> Option<&mut Self> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Visit this element and every descendant, depth first
    pub fn walk(&self, f: &mut impl FnMut(&Self)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Visit this element and every descendant mutably, depth first
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Self)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }
}

/// Handle to an element mounted outside the page flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountId(u64);

/// The page: a body element plus any detached elements mounted on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Page body
    pub body: Element,
    mounted: Vec<(MountId, Element)>,
    next_mount: u64,
}

impl Document {
    /// Create a document around a body element
    #[must_use]
    pub const fn new(body: Element) -> Self {
        Self {
            body,
            mounted: Vec::new(),
            next_mount: 0,
        }
    }

    /// Find an element of the page by id
    #[must_use]
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.body.find(id)
    }

    /// Find an element of the page by id, mutably
    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.body.find_mut(id)
    }

    /// Attach an element to the page outside the body flow
    pub fn mount(&mut self, element: Element) -> MountId {
        let id = MountId(self.next_mount);
        self.next_mount += 1;
        self.mounted.push((id, element));
        id
    }

    /// Mounted element for a handle
    #[must_use]
    pub fn mounted(&self, id: MountId) -> Option<&Element> {
        self.mounted
            .iter()
            .find(|(mount, _)| *mount == id)
            .map(|(_, element)| element)
    }

    /// Detach a mounted element, returning it
    pub fn unmount(&mut self, id: MountId) -> Option<Element> {
        let index = self.mounted.iter().position(|(mount, _)| *mount == id)?;
        Some(self.mounted.remove(index).1)
    }

    /// Number of currently mounted elements
    #[must_use]
    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }
}
