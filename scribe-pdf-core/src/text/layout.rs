//! Greedy word wrapping against measured text widths.

use crate::text::FontMetrics;

/// Width of `text` at `size` points.
pub fn measure_text(metrics: &FontMetrics, text: &str, size: f64) -> f64 {
    metrics.width_of(text, size)
}

/// Wrap `text` into lines no wider than `max_width` points.
///
/// The input is split on single spaces and words are packed greedily: a word
/// whose trial width (current line + one space + word) reaches `max_width`
/// starts a new line. Ties break, matching the greater-or-equal threshold.
/// Words are never split; a single word wider than `max_width` gets a line of
/// its own and the overflow is accepted. Empty input yields no lines.
pub fn wrap_text(metrics: &FontMetrics, text: &str, size: f64, max_width: f64) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let space_width = metrics.width_of(" ", size);
    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_width = 0.0;

    for word in text.split(' ') {
        let word_width = metrics.width_of(word, size);
        if current.is_empty() {
            current.push(word);
            current_width = word_width;
            continue;
        }
        let trial_width = current_width + space_width + word_width;
        if trial_width >= max_width {
            lines.push(current.join(" "));
            current = vec![word];
            current_width = word_width;
        } else {
            current.push(word);
            current_width = trial_width;
        }
    }

    if !current.is_empty() {
        lines.push(current.join(" "));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Metrics where every character, including the space, is 500/1000 em:
    /// at size 10 each character is 5 points wide.
    fn monospace() -> FontMetrics {
        FontMetrics::from_parts(1000, HashMap::new(), 500)
    }

    #[test]
    fn test_empty_input_yields_no_lines() {
        assert!(wrap_text(&monospace(), "", 10.0, 100.0).is_empty());
    }

    #[test]
    fn test_single_short_word() {
        let lines = wrap_text(&monospace(), "hello", 10.0, 100.0);
        assert_eq!(lines, ["hello"]);
    }

    #[test]
    fn test_wraps_at_limit() {
        // "aaaa bbbb" at 5pt/char: line "aaaa" is 20pt; trial for "bbbb" is
        // 20 + 5 + 20 = 45 >= 40, so it wraps.
        let lines = wrap_text(&monospace(), "aaaa bbbb", 10.0, 40.0);
        assert_eq!(lines, ["aaaa", "bbbb"]);
    }

    #[test]
    fn test_packs_words_that_fit() {
        let lines = wrap_text(&monospace(), "aa bb cc", 10.0, 100.0);
        assert_eq!(lines, ["aa bb cc"]);
    }

    #[test]
    fn test_tie_breaks_before_word() {
        // trial width for "bb" is 10 + 5 + 10 = 25, exactly the limit
        let lines = wrap_text(&monospace(), "aa bb", 10.0, 25.0);
        assert_eq!(lines, ["aa", "bb"]);
        // One point more and it fits
        let lines = wrap_text(&monospace(), "aa bb", 10.0, 26.0);
        assert_eq!(lines, ["aa bb"]);
    }

    #[test]
    fn test_oversized_word_overflows_alone() {
        // 12 chars = 60pt against a 40pt limit: kept whole on its own line
        let lines = wrap_text(&monospace(), "bb incomprehensible cc", 10.0, 40.0);
        assert_eq!(lines, ["bb", "incomprehensible", "cc"]);
    }

    #[test]
    fn test_never_reorders_or_drops_words() {
        let text = "the quick brown fox jumps over the lazy dog";
        let lines = wrap_text(&monospace(), text, 10.0, 60.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_long_entry_takes_two_lines() {
        let metrics = monospace();
        let text = "The third entry is so long that it overflows and takes two lines.";
        let size = 32.0;
        // Total width is well over one line at this limit, but under two.
        let max_width = measure_text(&metrics, text, size) * 0.6;
        let lines = wrap_text(&metrics, text, size, max_width);
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert!(measure_text(&metrics, line, size) < max_width);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_measure_matches_metrics() {
        let metrics = monospace();
        assert_eq!(measure_text(&metrics, "abcd", 10.0), 20.0);
    }
}
