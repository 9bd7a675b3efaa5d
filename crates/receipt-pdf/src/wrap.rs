//! Greedy word wrapping against an estimated character width.
//!
//! No glyph metrics are consulted: every character is assumed to be half the
//! font size wide. Output must stay byte-identical across versions, so the
//! estimate is not to be replaced in place; a metrics-based mode would need
//! its own entry point.

use crate::sanitize::{sanitize, PLACEHOLDER};

/// Fraction of the font size taken as the width of one character
pub const CHAR_WIDTH_RATIO: f64 = 0.5;

/// Lower bound on characters per line, however narrow the box
pub const MIN_CHARS_PER_LINE: usize = 12;

/// Characters that fit on one line of `max_width` points at `font_size`
pub fn max_chars(max_width: f64, font_size: f64) -> usize {
    let approx_char_width = font_size * CHAR_WIDTH_RATIO;
    let fitted = (max_width / approx_char_width).floor();
    // NaN and negative widths saturate to 0 on the cast
    (fitted as usize).max(MIN_CHARS_PER_LINE)
}

/// Split `text` into lines no wider than `max_width` points.
///
/// The text is sanitized first. Words longer than a line are kept whole on
/// a line of their own. Always returns at least one line; blank input yields
/// a single [`PLACEHOLDER`] line.
pub fn wrap(text: &str, max_width: f64, font_size: f64) -> Vec<String> {
    let clean = sanitize(text);
    let limit = max_chars(max_width, font_size);

    let mut lines = Vec::new();
    let mut current = String::new();

    for word in clean.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= limit {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(PLACEHOLDER.to_string());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_max_chars() {
        assert_eq!(max_chars(100.0, 10.0), 20);
        assert_eq!(max_chars(499.28, 10.0), 99);
        // Clamped to the minimum
        assert_eq!(max_chars(10.0, 10.0), MIN_CHARS_PER_LINE);
        assert_eq!(max_chars(0.0, 10.0), MIN_CHARS_PER_LINE);
    }

    #[test]
    fn test_empty_input_yields_placeholder() {
        assert_eq!(wrap("", 200.0, 10.0), vec!["--"]);
        assert_eq!(wrap("   \t ", 200.0, 10.0), vec!["--"]);
        assert_eq!(wrap("🎉🎉", 200.0, 10.0), vec!["--"]);
    }

    #[test]
    fn test_short_text_single_line() {
        assert_eq!(wrap("Bank ****4567", 499.28, 10.0), vec!["Bank ****4567"]);
    }

    #[test]
    fn test_greedy_packing() {
        // 12 chars per line
        let lines = wrap("aaaa bbbb cccc dddd eeeeeeeeeeee", 60.0, 10.0);
        assert_eq!(lines, vec!["aaaa bbbb", "cccc dddd", "eeeeeeeeeeee"]);
    }

    #[test]
    fn test_line_exactly_at_limit() {
        let lines = wrap("aaaaa bbbbbb cc", 60.0, 10.0);
        assert_eq!(lines, vec!["aaaaa bbbbbb", "cc"]);
    }

    #[test]
    fn test_overlong_word_kept_whole() {
        let long = "x".repeat(40);
        let text = format!("start {} end", long);
        let lines = wrap(&text, 60.0, 10.0);
        assert_eq!(lines, vec!["start".to_string(), long, "end".to_string()]);
    }

    #[test]
    fn test_collapses_whitespace_runs() {
        assert_eq!(wrap("a   b\n\nc", 200.0, 10.0), vec!["a b c"]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn wrap_never_empty(text in any::<String>(), width in 0.0f64..800.0, size in 1.0f64..30.0) {
            prop_assert!(!wrap(&text, width, size).is_empty());
        }

        #[test]
        fn wrap_preserves_words_in_order(text in any::<String>(), width in 0.0f64..800.0, size in 1.0f64..30.0) {
            let lines = wrap(&text, width, size);
            let clean = sanitize(&text);
            let expected: Vec<&str> = clean.split_whitespace().collect();
            let joined = lines.join(" ");
            let actual: Vec<&str> = joined.split_whitespace().collect();
            if expected.is_empty() {
                prop_assert_eq!(lines, vec![PLACEHOLDER.to_string()]);
            } else {
                prop_assert_eq!(actual, expected);
            }
        }

        #[test]
        fn wrap_respects_limit(text in "[a-z ]{0,300}", width in 0.0f64..800.0, size in 1.0f64..30.0) {
            let limit = max_chars(width, size);
            for line in wrap(&text, width, size) {
                prop_assert!(line.len() <= limit || !line.contains(' '));
            }
        }
    }
}
