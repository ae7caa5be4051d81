//! Position resolver: anchors findings to ranges that lie inside the text.
//!
//! Character offsets are UTF-16 code units, the LSP default encoding.

use lsp_types::{Position, Range};
use regex::Regex;

/// Lines of `text` split on `\n` with a trailing `\r` stripped.
/// A trailing newline yields a final empty line, as editors count it.
pub fn lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect()
}

fn utf16_len(line: &str) -> u32 {
    line.encode_utf16().count() as u32
}

/// The zero-width range at the document origin.
pub fn origin() -> Range {
    Range::new(Position::new(0, 0), Position::new(0, 0))
}

/// One-character range at a parser-reported position, clamped into the text.
/// `column` counts Unicode scalar values, as libyaml reports it.
pub fn direct(text: &str, line: u32, column: u32) -> Range {
    let lines = lines(text);
    let last = lines.len().saturating_sub(1) as u32;
    let line = line.min(last);
    let src = lines.get(line as usize).copied().unwrap_or("");
    let mut chars = src.chars();
    let start: u32 = chars
        .by_ref()
        .take(column as usize)
        .map(|c| c.len_utf16() as u32)
        .sum();
    let end = start + chars.next().map_or(0, |c| c.len_utf16() as u32);
    Range::new(Position::new(line, start), Position::new(line, end))
}

/// Anchored pattern for a top-level key: `^<key>\s*:`.
fn key_pattern(key: &str) -> Option<Regex> {
    Regex::new(&format!(r"^{}\s*:", regex::escape(key))).ok()
}

/// First line whose start matches `<key>\s*:`. Indented, commented and
/// nested occurrences do not count.
pub fn find_key_line(text: &str, key: &str) -> Option<u32> {
    let pattern = key_pattern(key)?;
    lines(text)
        .iter()
        .position(|l| pattern.is_match(l))
        .map(|i| i as u32)
}

/// Full-line range of the first line declaring `key`; origin if none does.
pub fn key_line(text: &str, key: &str) -> Range {
    let Some(line) = find_key_line(text, key) else {
        return origin();
    };
    let len = lines(text).get(line as usize).map_or(0, |l| utf16_len(l));
    Range::new(Position::new(line, 0), Position::new(line, len))
}
