//! Text measurement, wrapping and text objects.

mod font;
mod layout;
mod text_object;

pub use font::FontMetrics;
pub use layout::{measure_text, wrap_text};
pub use text_object::{TextObject, TextRenderMode};

/// Escape a string for a PDF literal string `( ... )`.
pub(crate) fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        let mut out = String::new();
        escape_text("(a)\\b\nc", &mut out);
        assert_eq!(out, "\\(a\\)\\\\b\\nc");
    }
}
