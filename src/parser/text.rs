//! Text heuristics shared by layout analysis and table detection.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Numerals accepted inside a hierarchical number: ASCII digits and the
/// Chinese numerals used for section numbering.
const NUMERAL: &str = "[0-9一二三四五六七八九十百千零〇]+";

fn hierarchical_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let n = NUMERAL;
        let pattern = format!(
            r"^(?:{n}(?:\.{n})+|{n}(?:\.{n})*[.、]|[(（]{n}(?:\.{n})*[)）]|\[{n}(?:\.{n})*\]|【{n}(?:\.{n})*】)"
        );
        Regex::new(&pattern).expect("hierarchical number pattern is valid")
    })
}

fn sentence_end_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[:：.?!。？！…]\s*$").expect("sentence end pattern is valid"))
}

fn numbered_end_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d\.$").expect("numbered end pattern is valid"))
}

/// Check whether `text` starts with a section number such as `1.`, `1.2`,
/// `2.10.3、`, `一、`, `(1)`, `（一）`, `[1.1]` or `【3】`.
///
/// Surrounding whitespace is ignored. A bare numeral (`1`, `一`) is not a
/// section number: it needs a separator, a trailing mark or brackets.
pub fn is_hierarchical_number(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && hierarchical_number_regex().is_match(trimmed)
}

/// Whether a line ends with sentence punctuation.
///
/// A trailing `digit.` (as in a list number `3.`) does not count.
pub fn ends_sentence(text: &str) -> bool {
    let text = text.trim_end();
    sentence_end_regex().is_match(text) && !numbered_end_regex().is_match(text)
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
    // Fullwidth forms (，：（）)
    || (0xFF00..=0xFF60).contains(&code)
}

/// Separator to put between two text fragments joined on one line.
///
/// Empty when either side already carries whitespace or when both sides
/// are from a spaceless script.
pub fn join_separator(prev: &str, next: &str) -> &'static str {
    let prev_last = prev.chars().last();
    let next_first = next.chars().next();
    match (prev_last, next_first) {
        (None, _) | (_, None) => "",
        (Some(a), Some(b)) if a.is_whitespace() || b.is_whitespace() => "",
        (Some(a), Some(b)) if is_spaceless_script_char(a) && is_spaceless_script_char(b) => "",
        _ => " ",
    }
}

fn expand_ligature(c: char) -> Option<&'static str> {
    match c {
        '\u{FB00}' => Some("ff"),
        '\u{FB01}' => Some("fi"),
        '\u{FB02}' => Some("fl"),
        '\u{FB03}' => Some("ffi"),
        '\u{FB04}' => Some("ffl"),
        '\u{FB05}' | '\u{FB06}' => Some("st"),
        _ => None,
    }
}

fn is_private_use(c: char) -> bool {
    let code = c as u32;
    (0xE000..=0xF8FF).contains(&code)
        || (0xF0000..=0xFFFFD).contains(&code)
        || (0x100000..=0x10FFFD).contains(&code)
}

/// Normalize text decoded from a content stream.
///
/// Applies NFC, expands Latin ligatures and drops replacement and
/// private-use characters that fonts emit for unmapped glyphs.
pub fn normalize_span_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfc() {
        if c == '\u{FFFD}' || is_private_use(c) || (c.is_control() && c != '\t') {
            continue;
        }
        match expand_ligature(c) {
            Some(expanded) => out.push_str(expanded),
            None => out.push(c),
        }
    }
    out
}
