//! Glyph metrics extracted from loaded font files.
//!
//! Font files are opaque to the engine; only the metrics needed for text
//! measurement and the font dictionary are kept. Extraction is delegated to
//! `ttf-parser`.

use std::collections::HashMap;

use crate::error::{PdfError, Result};

/// Character advance widths for one loaded font, in font units.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    units_per_em: u16,
    advances: HashMap<char, u16>,
    default_advance: u16,
    ascent: i16,
    descent: i16,
    cap_height: i16,
}

impl FontMetrics {
    /// Extract metrics from a TrueType/OpenType font file.
    pub(crate) fn from_bytes(data: &[u8]) -> Result<Self> {
        let face = ttf_parser::Face::parse(data, 0)
            .map_err(|e| PdfError::Resource(format!("unsupported font file: {e}")))?;

        let mut advances = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|cp| {
                    let Some(ch) = char::from_u32(cp) else { return };
                    if advances.contains_key(&ch) {
                        return;
                    }
                    if let Some(advance) = subtable
                        .glyph_index(cp)
                        .and_then(|gid| face.glyph_hor_advance(gid))
                    {
                        advances.insert(ch, advance);
                    }
                });
            }
        }
        if advances.is_empty() {
            return Err(PdfError::Resource(
                "font has no usable unicode character map".to_string(),
            ));
        }

        let units_per_em = face.units_per_em();
        let default_advance = advances
            .get(&' ')
            .copied()
            .unwrap_or_else(|| units_per_em / 2);
        let ascent = face.ascender();

        Ok(Self {
            units_per_em,
            advances,
            default_advance,
            ascent,
            descent: face.descender(),
            cap_height: face.capital_height().unwrap_or(ascent),
        })
    }

    /// Build metrics from raw parts. Test seam for layout code.
    #[cfg(test)]
    pub(crate) fn from_parts(
        units_per_em: u16,
        advances: HashMap<char, u16>,
        default_advance: u16,
    ) -> Self {
        Self {
            units_per_em,
            advances,
            default_advance,
            ascent: 800,
            descent: -200,
            cap_height: 700,
        }
    }

    /// Advance width of one character in font units.
    pub fn char_advance(&self, ch: char) -> u16 {
        self.advances
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance)
    }

    /// Width of a string at the given point size.
    ///
    /// The width is the sum of per-glyph advances. Concatenation is not
    /// guaranteed to be additive once shaping features such as kerning enter
    /// the picture, so callers must not assume
    /// `width_of(a + b) == width_of(a) + width_of(b)`.
    pub fn width_of(&self, text: &str, size: f64) -> f64 {
        let units: u64 = text.chars().map(|ch| self.char_advance(ch) as u64).sum();
        units as f64 / self.units_per_em as f64 * size
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Ascent scaled to 1000 units per em, as font descriptors expect.
    pub(crate) fn ascent_1000(&self) -> i32 {
        self.scale_1000(self.ascent)
    }

    pub(crate) fn descent_1000(&self) -> i32 {
        self.scale_1000(self.descent)
    }

    pub(crate) fn cap_height_1000(&self) -> i32 {
        self.scale_1000(self.cap_height)
    }

    /// Advance of `ch` scaled to 1000 units per em.
    pub(crate) fn advance_1000(&self, ch: char) -> i32 {
        (self.char_advance(ch) as f64 * 1000.0 / self.units_per_em as f64).round() as i32
    }

    fn scale_1000(&self, value: i16) -> i32 {
        (value as f64 * 1000.0 / self.units_per_em as f64).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_metrics() -> FontMetrics {
        let mut advances = HashMap::new();
        advances.insert(' ', 250);
        advances.insert('i', 250);
        advances.insert('m', 1000);
        FontMetrics::from_parts(1000, advances, 500)
    }

    #[test]
    fn test_char_advance_lookup_and_default() {
        let metrics = fixed_metrics();
        assert_eq!(metrics.char_advance('m'), 1000);
        assert_eq!(metrics.char_advance('i'), 250);
        // Unmapped characters fall back to the default advance
        assert_eq!(metrics.char_advance('x'), 500);
    }

    #[test]
    fn test_width_scales_with_size() {
        let metrics = fixed_metrics();
        assert_eq!(metrics.width_of("m", 10.0), 10.0);
        assert_eq!(metrics.width_of("m", 20.0), 20.0);
        assert_eq!(metrics.width_of("im", 10.0), 12.5);
    }

    #[test]
    fn test_width_of_empty_string() {
        let metrics = fixed_metrics();
        assert_eq!(metrics.width_of("", 12.0), 0.0);
    }

    #[test]
    fn test_advance_1000_scaling() {
        let mut advances = HashMap::new();
        advances.insert('a', 1024);
        let metrics = FontMetrics::from_parts(2048, advances, 1024);
        assert_eq!(metrics.advance_1000('a'), 500);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let err = FontMetrics::from_bytes(b"not a font").unwrap_err();
        assert!(matches!(err, PdfError::Resource(_)));
    }
}
