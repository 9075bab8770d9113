//! Character-indexed string helpers
//!
//! Hosts report text positions in characters, so every offset handled by the
//! mention core is a `char` index. These helpers translate to byte offsets at
//! the last moment and clamp out-of-range indices instead of panicking.

/// Number of characters in `text`
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of the character at `char_idx`, or `text.len()` past the end
pub fn byte_offset(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Character at `char_idx`, if any
pub fn char_at(text: &str, char_idx: usize) -> Option<char> {
    text.chars().nth(char_idx)
}

/// Character immediately left of a caret at `caret`
pub fn char_before(text: &str, caret: usize) -> Option<char> {
    caret.checked_sub(1).and_then(|idx| char_at(text, idx))
}

/// Substring between two character offsets (clamped, empty if reversed)
pub fn slice_chars(text: &str, start: usize, end: usize) -> &str {
    if end <= start {
        return "";
    }
    let from = byte_offset(text, start);
    let to = byte_offset(text, end);
    &text[from..to]
}

/// Substring from a character offset to the end of `text`
pub fn slice_from(text: &str, start: usize) -> &str {
    &text[byte_offset(text, start)..]
}

/// Substring from the start of `text` up to a character offset
pub fn slice_to(text: &str, end: usize) -> &str {
    &text[..byte_offset(text, end)]
}

/// Longest run of non-whitespace characters starting at `start`
pub fn word_at(text: &str, start: usize) -> &str {
    let rest = slice_from(text, start);
    let end = rest
        .char_indices()
        .find(|(_, ch)| ch.is_whitespace())
        .map(|(byte, _)| byte)
        .unwrap_or(rest.len());
    &rest[..end]
}
