//! Reduction of arbitrary text to printable ASCII, and escaping for PDF
//! literal strings.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Shown wherever a displayed value sanitizes to nothing
pub const PLACEHOLDER: &str = "--";

/// Reduce `input` to printable ASCII (0x20..=0x7E).
///
/// Accented letters are decomposed (NFD) and their combining marks dropped,
/// so "á" becomes "a". Anything still outside the printable range is removed.
pub fn sanitize(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| is_printable_ascii(*c))
        .collect()
}

/// Sanitize, substituting [`PLACEHOLDER`] for an empty result
pub fn sanitize_or_placeholder(input: &str) -> String {
    let clean = sanitize(input);
    if clean.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        clean
    }
}

/// Escape sanitized text for use inside a `( ... )` string token.
///
/// Backslashes go first so the parenthesis escapes are not doubled.
pub fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

#[inline]
fn is_printable_ascii(c: char) -> bool {
    matches!(c, ' '..='~')
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn sanitize_is_idempotent(input in any::<String>()) {
            let once = sanitize(&input);
            prop_assert_eq!(sanitize(&once), once);
        }

        #[test]
        fn sanitize_output_is_printable_ascii(input in any::<String>()) {
            prop_assert!(sanitize(&input).chars().all(|c| (' '..='~').contains(&c)));
        }

        #[test]
        fn escaped_text_has_no_bare_parens(input in "[ -~]{0,64}") {
            let escaped = escape(&input);
            let bytes = escaped.as_bytes();
            let mut i = 0;
            while i < bytes.len() {
                if bytes[i] == b'\\' {
                    prop_assert!(i + 1 < bytes.len());
                    prop_assert!(matches!(bytes[i + 1], b'\\' | b'(' | b')'));
                    i += 2;
                } else {
                    prop_assert!(bytes[i] != b'(' && bytes[i] != b')');
                    i += 1;
                }
            }
        }
    }
}
