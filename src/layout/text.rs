//! Token text cleanup and line-joining helpers.

use unicode_normalization::UnicodeNormalization;

/// Typographic ligatures that extractors commonly emit as single glyphs.
const LIGATURES: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Clean raw token text: NFC normalization, ligature expansion, and removal
/// of private-use and replacement characters.
pub fn clean_token_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.nfc() {
        if let Some((_, expanded)) = LIGATURES.iter().find(|(lig, _)| *lig == c) {
            result.push_str(expanded);
        } else if !is_private_use(c) && c != '\u{FFFD}' {
            result.push(c);
        }
    }
    result
}

fn is_private_use(c: char) -> bool {
    let code = c as u32;
    (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Whether a separator is needed between two adjacent text pieces.
fn needs_space(prev: &str, next: &str) -> bool {
    let prev_last = prev.chars().last();
    let next_first = next.chars().next();
    match (prev_last, next_first) {
        (Some(a), Some(b)) => {
            !(a.is_whitespace()
                || b.is_whitespace()
                || (is_spaceless_script_char(a) && is_spaceless_script_char(b)))
        }
        _ => false,
    }
}

/// Append `next` to `out` with a single space when the pieces need one.
pub fn push_with_space(out: &mut String, next: &str) {
    if needs_space(out, next) {
        out.push(' ');
    }
    out.push_str(next);
}

/// Join wrapped lines into running text.
///
/// A line ending in a hyphen after a letter, followed by a line starting
/// with a lowercase letter, is joined without the hyphen. Other lines are
/// joined with a single space.
pub fn join_wrapped_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if out.is_empty() {
            out.push_str(line);
            continue;
        }
        if ends_with_soft_hyphen(&out) && starts_lowercase(line) {
            out.pop();
            out.push_str(line);
        } else {
            push_with_space(&mut out, line);
        }
    }
    out
}

fn ends_with_soft_hyphen(text: &str) -> bool {
    let mut rev = text.chars().rev();
    matches!(rev.next(), Some('-')) && rev.next().is_some_and(char::is_alphabetic)
}

fn starts_lowercase(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_lowercase)
}

/// Count whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
