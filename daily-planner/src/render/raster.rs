//! Rasterization of rendered elements
//!
//! [`BlockRasterizer`] is a deliberately simple block layout engine: elements
//! stack vertically (table rows lay their cells out side by side), text is
//! wrapped on a fixed character grid and drawn as ink bars. It is enough to
//! produce a faithful picture of the planner's structure and fill level.

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

use super::RenderError;
use crate::document::{Color, Element, Visibility, WhiteSpace};

/// MIME type of exported images
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Turns an element subtree into an image
#[cfg_attr(test, mockall::automock)]
pub trait Rasterizer: Send + Sync {
    /// Rasterize `element` and everything below it
    ///
    /// # Errors
    ///
    /// Returns `RenderError` if the image cannot be produced
    fn rasterize(&self, element: &Element) -> Result<ExportArtifact, RenderError>;
}

/// A rendered planner image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Encoded PNG bytes
    pub png: Bytes,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ExportArtifact {
    /// Wrap already encoded PNG data
    #[must_use]
    pub const fn new(png: Bytes, width: u32, height: u32) -> Self {
        Self { png, width, height }
    }

    /// MIME type of the image
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        PNG_CONTENT_TYPE
    }

    /// File name used when uploading the image
    #[must_use]
    pub const fn file_name(&self) -> &'static str {
        "planner.png"
    }

    /// Encoded size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.png.len()
    }

    /// Whether the artifact holds no data
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.png.is_empty()
    }

    /// The image as a `data:image/png;base64,...` URL
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{PNG_CONTENT_TYPE};base64,{}", STANDARD.encode(&self.png))
    }
}

/// One drawing command
#[derive(Debug, Clone, Copy)]
struct Fill {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    color: Color,
}

/// Fixed-grid block layout rasterizer
#[derive(Debug, Clone)]
pub struct BlockRasterizer {
    /// Page width in pixels
    pub width: u32,
    /// Horizontal advance of one character
    pub char_width: u32,
    /// Height of one text line
    pub line_height: u32,
    /// Height of the ink bar drawn for text
    pub glyph_height: u32,
    /// Maximum page height
    pub max_height: u32,
}

impl Default for BlockRasterizer {
    fn default() -> Self {
        Self {
            width: 800,
            char_width: 7,
            line_height: 18,
            glyph_height: 10,
            max_height: 16_384,
        }
    }
}

impl BlockRasterizer {
    /// Lay out `element` at (`x`, `y`) with the given width
    ///
    /// Pushes drawing commands to `out` and returns the element height.
    fn layout(&self, element: &Element, x: u32, y: u32, width: u32, out: &mut Vec<Fill>) -> u32 {
        let style = &element.style;
        let border = style.border.map_or(0, |b| b.width);
        let inset = border + style.padding;
        let inner_x = x + inset;
        let inner_width = width.saturating_sub(inset * 2).max(1);

        let mut content = Vec::new();
        let mut cursor = y + inset;

        for line in self.wrap(element.display_text(), style.white_space, style.break_words, inner_width) {
            for (column, len) in line {
                let bar_x = inner_x + column * self.char_width;
                let bar_width = (len * self.char_width).min((inner_x + inner_width).saturating_sub(bar_x));
                content.push(Fill {
                    x: bar_x,
                    y: cursor + self.line_height.saturating_sub(self.glyph_height) / 2,
                    width: bar_width,
                    height: self.glyph_height,
                    color: Color::INK,
                });
            }
            cursor += self.line_height;
        }

        if element.tag == "tr" && !element.children.is_empty() {
            let count = u32::try_from(element.children.len()).unwrap_or(u32::MAX);
            let cell_width = (inner_width / count).max(1);
            let mut row_height = 0;
            for (i, child) in (0..count).zip(&element.children) {
                let h = self.layout(child, inner_x + i * cell_width, cursor, cell_width, &mut content);
                row_height = row_height.max(h);
            }
            cursor += row_height;
        } else {
            for child in &element.children {
                cursor += self.layout(child, inner_x, cursor, inner_width, &mut content);
            }
        }

        let mut height = cursor - y + inset;
        if let Some(min) = style.min_height {
            height = height.max(min);
        }

        if style.visibility == Visibility::Hidden {
            return height;
        }
        if let Some(color) = style.background {
            out.push(Fill { x, y, width, height, color });
        }
        if let Some(border) = style.border.filter(|b| b.width > 0) {
            let w = border.width;
            let color = border.color;
            out.push(Fill { x, y, width, height: w, color });
            out.push(Fill { x, y: (y + height).saturating_sub(w), width, height: w, color });
            out.push(Fill { x, y, width: w, height, color });
            out.push(Fill { x: (x + width).saturating_sub(w), y, width: w, height, color });
        }
        out.extend(content);
        height
    }

    /// Break text into lines of `(column, length)` word spans
    fn wrap(&self, text: &str, white_space: WhiteSpace, break_words: bool, width: u32) -> Vec<Vec<(u32, u32)>> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let columns = (width / self.char_width).max(1);

        let paragraphs: Vec<&str> = match white_space {
            WhiteSpace::Normal => vec![text],
            WhiteSpace::PreWrap => text.split('\n').collect(),
        };

        let mut lines = Vec::new();
        for paragraph in paragraphs {
            let mut line: Vec<(u32, u32)> = Vec::new();
            let mut column = 0;
            for word in paragraph.split_whitespace() {
                let mut len = u32::try_from(word.chars().count()).unwrap_or(u32::MAX);
                if column > 0 {
                    if column + 1 + len <= columns {
                        column += 1;
                    } else {
                        lines.push(std::mem::take(&mut line));
                        column = 0;
                    }
                }
                if break_words {
                    while column + len > columns {
                        let room = columns - column;
                        line.push((column, room));
                        lines.push(std::mem::take(&mut line));
                        column = 0;
                        len -= room;
                    }
                }
                line.push((column, len));
                column += len;
            }
            lines.push(line);
        }
        lines
    }
}

fn fill(canvas: &mut RgbImage, rect: Fill) {
    let Color(r, g, b) = rect.color;
    let x_end = (rect.x + rect.width).min(canvas.width());
    let y_end = (rect.y + rect.height).min(canvas.height());
    for py in rect.y..y_end {
        for px in rect.x..x_end {
            canvas.put_pixel(px, py, Rgb([r, g, b]));
        }
    }
}

impl Rasterizer for BlockRasterizer {
    fn rasterize(&self, element: &Element) -> Result<ExportArtifact, RenderError> {
        let mut commands = Vec::new();
        let height = self.layout(element, 0, 0, self.width, &mut commands).max(1);
        if height > self.max_height {
            return Err(RenderError::TooLarge {
                height,
                max: self.max_height,
            });
        }

        let Color(r, g, b) = Color::WHITE;
        let mut canvas = RgbImage::from_pixel(self.width, height, Rgb([r, g, b]));
        for command in commands {
            fill(&mut canvas, command);
        }

        let mut png = Vec::new();
        canvas.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(ExportArtifact::new(Bytes::from(png), self.width, height))
    }
}
