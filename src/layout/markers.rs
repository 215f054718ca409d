//! List marker recognition.

use regex::Regex;
use std::sync::LazyLock;

/// Glyph bullets that may be glued to the item text.
const GLYPH_BULLETS: &[char] = &[
    '•', '·', '◦', '▪', '▫', '■', '□', '○', '●', '‣', '►', '▸', '▹', '▶', '▷', '◆', '◇', '❖',
    '➤', '➜', '✓', '✔', '☞', '※',
];

/// Bullets that need a following space; otherwise they read as punctuation.
const SPACED_BULLETS: &[char] = &['-', '*', '+', '–', '—'];

static RE_ORDINAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,3}[.)]|[A-Za-z][.)]|[ivxlcIVXLC]{1,6}[.)]|\((?:\d{1,3}|[A-Za-z]|[ivxlcIVXLC]{1,6})\))\s+(\S.*)$")
        .expect("valid ordinal marker regex")
});

/// A list marker found at the start of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMarker {
    /// Marker as written ("•", "3.", "(a)")
    pub marker: String,
    /// Whether the marker is an ordinal
    pub ordered: bool,
    /// Text after the marker
    pub rest: String,
}

/// Parse a leading list marker from line text.
///
/// Returns `None` when the line does not start with a marker or nothing
/// follows the marker.
pub fn parse_list_marker(text: &str) -> Option<ListMarker> {
    let text = text.trim_start();
    let first = text.chars().next()?;

    if GLYPH_BULLETS.contains(&first) || SPACED_BULLETS.contains(&first) {
        let after = &text[first.len_utf8()..];
        let glued_ok = GLYPH_BULLETS.contains(&first);
        if !glued_ok && !after.starts_with(char::is_whitespace) {
            return None;
        }
        let rest = after.trim();
        if rest.is_empty() {
            return None;
        }
        return Some(ListMarker {
            marker: first.to_string(),
            ordered: false,
            rest: rest.to_string(),
        });
    }

    let caps = RE_ORDINAL.captures(text)?;
    Some(ListMarker {
        marker: caps[1].to_string(),
        ordered: true,
        rest: caps[2].trim_end().to_string(),
    })
}

/// Whether the line text starts with a list marker.
pub fn starts_with_marker(text: &str) -> bool {
    parse_list_marker(text).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullet_markers() {
        let m = parse_list_marker("• First item").unwrap();
        assert_eq!(m.marker, "•");
        assert!(!m.ordered);
        assert_eq!(m.rest, "First item");

        let m = parse_list_marker("- dash item").unwrap();
        assert_eq!(m.marker, "-");
        assert_eq!(m.rest, "dash item");

        // Glyph bullets may be glued
        assert_eq!(parse_list_marker("▪glued").unwrap().rest, "glued");
    }

    #[test]
    fn test_ascii_bullets_need_space() {
        assert!(parse_list_marker("-5 degrees").is_none());
        assert!(parse_list_marker("*emphasis*").is_none());
        assert!(parse_list_marker("-").is_none());
        assert!(parse_list_marker("• ").is_none());
    }

    #[test]
    fn test_ordinal_markers() {
        for (text, marker) in [
            ("1. One", "1."),
            ("12) Twelve", "12)"),
            ("a. Alpha", "a."),
            ("B) Beta", "B)"),
            ("iv. Four", "iv."),
            ("(1) Paren", "(1)"),
            ("(a) Paren", "(a)"),
            ("(iv) Paren", "(iv)"),
        ] {
            let m = parse_list_marker(text).unwrap();
            assert_eq!(m.marker, marker, "{}", text);
            assert!(m.ordered);
        }
    }

    #[test]
    fn test_non_markers() {
        assert!(!starts_with_marker("3.14 is pi"));
        assert!(!starts_with_marker("2020. A year"));
        assert!(!starts_with_marker("e.g. this"));
        assert!(!starts_with_marker("Plain text"));
        assert!(!starts_with_marker(""));
    }
}
