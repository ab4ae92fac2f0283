use std::collections::BTreeSet;
use std::fmt::Write;

use crate::error::{PdfError, Result};
use crate::resources::FontId;
use crate::text::escape_text;

/// Text rendering modes for the `Tr` operator.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(u8)]
pub enum TextRenderMode {
    Fill = 0,
    Stroke = 1,
    FillStroke = 2,
    Invisible = 3,
    FillClip = 4,
    StrokeClip = 5,
    FillStrokeClip = 6,
    Clip = 7,
}

/// A sequence of text positioning and show operators, built independently of
/// any page.
///
/// The object is replayed into a page with
/// [`DrawingContext::render_text_object`](crate::graphics::DrawingContext::render_text_object),
/// which wraps it in `BT`/`ET`. Because `BT` resets the text matrix, the
/// first [`move_to`](Self::move_to) is relative to the page origin; every
/// later call moves relative to the previous text-line origin. An object can
/// be replayed into any number of pages.
#[derive(Debug, Clone, Default)]
pub struct TextObject {
    operations: String,
    current_font: Option<(FontId, f64)>,
    used_fonts: BTreeSet<u32>,
}

impl TextObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the font and size for subsequent [`show_text`](Self::show_text).
    pub fn set_font(&mut self, font: FontId, size: f64) -> &mut Self {
        writeln!(&mut self.operations, "/F{} {} Tf", font.index(), size).unwrap();
        self.used_fonts.insert(font.index());
        self.current_font = Some((font, size));
        self
    }

    /// Move the text-line origin by (dx, dy) relative to the previous line
    /// origin.
    pub fn move_to(&mut self, dx: f64, dy: f64) -> &mut Self {
        writeln!(&mut self.operations, "{dx:.2} {dy:.2} Td").unwrap();
        self
    }

    /// Show a text string in the currently selected font.
    pub fn show_text(&mut self, text: &str) -> Result<&mut Self> {
        if self.current_font.is_none() {
            return Err(PdfError::NoFontSelected);
        }
        self.operations.push('(');
        escape_text(text, &mut self.operations);
        self.operations.push_str(") Tj\n");
        Ok(self)
    }

    /// Set the leading used by [`next_line`](Self::next_line).
    pub fn set_leading(&mut self, leading: f64) -> &mut Self {
        writeln!(&mut self.operations, "{leading:.2} TL").unwrap();
        self
    }

    /// Move to the start of the next line, one leading down.
    pub fn next_line(&mut self) -> &mut Self {
        self.operations.push_str("T*\n");
        self
    }

    pub fn set_character_spacing(&mut self, spacing: f64) -> &mut Self {
        writeln!(&mut self.operations, "{spacing:.2} Tc").unwrap();
        self
    }

    pub fn set_word_spacing(&mut self, spacing: f64) -> &mut Self {
        writeln!(&mut self.operations, "{spacing:.2} Tw").unwrap();
        self
    }

    pub fn set_render_mode(&mut self, mode: TextRenderMode) -> &mut Self {
        writeln!(&mut self.operations, "{} Tr", mode as u8).unwrap();
        self
    }

    pub(crate) fn operations(&self) -> &str {
        &self.operations
    }

    pub(crate) fn used_fonts(&self) -> &BTreeSet<u32> {
        &self.used_fonts
    }
}
