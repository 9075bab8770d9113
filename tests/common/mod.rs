//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use complete_mentions::config::DEFAULT_PATTERN;
use complete_mentions::input::{MentionInput, Synced, TagSpec};
use complete_mentions::mentions::Mention;
use complete_mentions::selection::Selection;
use complete_mentions::sync::HostPlatform;
use complete_mentions::util::text::{char_len, slice_from, slice_to};

pub const PLATFORMS: [HostPlatform; 2] = [HostPlatform::Android, HostPlatform::Ios];

/// `[name]` when rendered
pub fn render_bracketed(mention: &Mention) -> String {
    format!("[{}]", mention.name)
}

/// `@[value](id:id)` when extracted, which `DEFAULT_PATTERN` reads back
pub fn extract_markdown(mention: &Mention) -> String {
    format!("@[{}](id:{})", mention.value, mention.id)
}

/// The `@` tag with bracket rendering and markdown extraction
pub fn at_tag() -> TagSpec<String> {
    TagSpec::new('@', render_bracketed, extract_markdown).with_pattern(DEFAULT_PATTERN)
}

/// An input with the `@` tag enabled over `text`
pub fn test_input(text: &str, platform: HostPlatform) -> MentionInput<String> {
    let mut input = MentionInput::new(text, platform, 10);
    input.add_tag(at_tag());
    input
}

/// Deliver one keystroke's text and selection updates in platform order
pub fn keystroke(
    input: &mut MentionInput<String>,
    text: String,
    selection: Selection,
) -> Vec<Synced<String>> {
    let order = input.platform().pairing_order();
    order
        .deliver(text, selection)
        .into_iter()
        .filter_map(|update| input.apply(update))
        .collect()
}

/// Type `chars` at the caret one character at a time
pub fn type_str(input: &mut MentionInput<String>, chars: &str) -> Vec<Synced<String>> {
    let mut synced = Vec::new();
    for ch in chars.chars() {
        let selection = input.selection().clamped(char_len(input.text()));
        let mut text = slice_to(input.text(), selection.start).to_string();
        text.push(ch);
        text.push_str(slice_from(input.text(), selection.end));
        synced.extend(keystroke(input, text, Selection::caret(selection.start + 1)));
    }
    synced
}

/// Delete the character before the caret (or the selected range)
pub fn backspace(input: &mut MentionInput<String>) -> Vec<Synced<String>> {
    let selection = input.selection().clamped(char_len(input.text()));
    let start = if selection.is_ranged() {
        selection.start
    } else if selection.start == 0 {
        return Vec::new();
    } else {
        selection.start - 1
    };
    let mut text = slice_to(input.text(), start).to_string();
    text.push_str(slice_from(input.text(), selection.end));
    keystroke(input, text, Selection::caret(start))
}

/// Replace the selection, or insert at the caret, with `chars` in one edit
pub fn paste(input: &mut MentionInput<String>, chars: &str) -> Vec<Synced<String>> {
    let selection = input.selection().clamped(char_len(input.text()));
    let mut text = slice_to(input.text(), selection.start).to_string();
    text.push_str(chars);
    text.push_str(slice_from(input.text(), selection.end));
    keystroke(
        input,
        text,
        Selection::caret(selection.start + char_len(chars)),
    )
}

/// Delete back to the start of the previous word in one edit
pub fn delete_word_backward(input: &mut MentionInput<String>) -> Vec<Synced<String>> {
    let selection = input.selection().clamped(char_len(input.text()));
    if selection.is_ranged() {
        return backspace(input);
    }
    let caret = selection.start;
    let before: Vec<char> = slice_to(input.text(), caret).chars().collect();
    let mut start = caret;
    while start > 0 && before[start - 1].is_whitespace() {
        start -= 1;
    }
    while start > 0 && !before[start - 1].is_whitespace() {
        start -= 1;
    }
    if start == caret {
        return Vec::new();
    }
    let mut text = slice_to(input.text(), start).to_string();
    text.push_str(slice_from(input.text(), caret));
    keystroke(input, text, Selection::caret(start))
}

/// Select `start..end` (in either order) without editing
pub fn select(input: &mut MentionInput<String>, start: usize, end: usize) {
    let selection = Selection::new(start.min(end), start.max(end));
    input.update_selection(selection.clamped(char_len(input.text())));
}

/// Move the caret without editing
pub fn move_caret(input: &mut MentionInput<String>, caret: usize) {
    input.update_selection(Selection::caret(caret));
}

/// Collect everything published to a subscription
pub fn recorder<T>() -> (Rc<RefCell<Vec<T>>>, impl FnMut(&T) + 'static)
where
    T: Clone + 'static,
{
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    (log, move |item: &T| sink.borrow_mut().push(item.clone()))
}

/// `(start, end)` of every registered mention
pub fn spans(input: &MentionInput<String>) -> Vec<(usize, usize)> {
    input.mentions().iter().map(|m| (m.start, m.end)).collect()
}
