//! Mentions registry
//!
//! The registry is the single source of truth for where committed mentions
//! sit in the current text. It never rescans the text: every synced edit
//! first drops the mentions the edit touched, then shifts the survivors that
//! lie after the edit point. Rendering and extraction walk the sorted list
//! once, interleaving plain text with per-tag output.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::events::Subscribers;
use crate::selection::Selection;
use crate::sync::EditEvent;
use crate::util::text::{char_len, slice_chars, slice_from};

/// A committed mention and the span its display text occupies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// Stable identity assigned on registration; not an ordering key
    pub unique_id: u64,
    /// Trigger character that produced this mention
    pub tag: char,
    pub id: String,
    /// Raw name the mention was committed with
    pub value: String,
    /// Display name as it appears in the text
    pub name: String,
    pub start: usize,
    pub end: usize,
}

impl Mention {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn overlaps(&self, start: usize, end: usize) -> bool {
        start < self.end && self.start < end
    }
}

/// A mention waiting for registration (no `unique_id` yet)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMention {
    pub tag: char,
    pub id: String,
    pub value: String,
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// One piece of rendered text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment<N> {
    /// Text outside any mention
    Plain(String),
    /// A mention span rendered by its tag's renderer
    Mention { start: usize, end: usize, node: N },
}

/// Result of one render + extract pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderOutput<N> {
    pub segments: Vec<Segment<N>>,
    pub extracted: String,
}

pub type Renderer<N> = Box<dyn Fn(&Mention) -> N>;
pub type Extractor = Box<dyn Fn(&Mention) -> String>;

/// Owns the committed mentions of one input
pub struct MentionsRegistry<N = String> {
    renderers: HashMap<char, Renderer<N>>,
    extractors: HashMap<char, Extractor>,
    next_id: u64,
    mentions: Vec<Mention>,
    render_subs: Subscribers<[Segment<N>]>,
    extract_subs: Subscribers<str>,
}

impl<N> MentionsRegistry<N> {
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
            extractors: HashMap::new(),
            next_id: 0,
            mentions: Vec::new(),
            render_subs: Subscribers::new(),
            extract_subs: Subscribers::new(),
        }
    }

    /// Register (or replace) the renderer for a tag
    pub fn add_renderer(&mut self, tag: char, renderer: impl Fn(&Mention) -> N + 'static) {
        self.renderers.insert(tag, Box::new(renderer));
    }

    /// Register (or replace) the extractor for a tag
    pub fn add_extractor(&mut self, tag: char, extractor: impl Fn(&Mention) -> String + 'static) {
        self.extractors.insert(tag, Box::new(extractor));
    }

    pub fn on_render(&mut self, sub: impl FnMut(&[Segment<N>]) + 'static) {
        self.render_subs.subscribe(sub);
    }

    pub fn on_extract(&mut self, sub: impl FnMut(&str) + 'static) {
        self.extract_subs.subscribe(sub);
    }

    /// Mentions sorted by `start`, pairwise non-overlapping
    pub fn mentions(&self) -> &[Mention] {
        &self.mentions
    }

    pub fn len(&self) -> usize {
        self.mentions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    /// Drop every mention
    pub fn clear(&mut self) {
        self.mentions.clear();
    }

    /// Register a mention and return its unique id.
    ///
    /// Empty spans and spans overlapping an existing mention are rejected.
    pub fn add_mention(&mut self, mention: NewMention) -> Option<u64> {
        if mention.start >= mention.end {
            tracing::warn!(
                "Rejected empty mention '{}' at {}",
                mention.name,
                mention.start
            );
            return None;
        }
        if let Some(existing) = self
            .mentions
            .iter()
            .find(|m| m.overlaps(mention.start, mention.end))
        {
            tracing::warn!(
                "Rejected mention '{}' {}..{}: overlaps '{}' {}..{}",
                mention.name,
                mention.start,
                mention.end,
                existing.name,
                existing.start,
                existing.end
            );
            return None;
        }

        let unique_id = self.next_id;
        self.next_id += 1;
        self.mentions.push(Mention {
            unique_id,
            tag: mention.tag,
            id: mention.id,
            value: mention.value,
            name: mention.name,
            start: mention.start,
            end: mention.end,
        });
        self.mentions.sort_by_key(|m| m.start);
        Some(unique_id)
    }

    /// Bring mention spans in line with a synced edit, then render and extract
    pub fn update_mentions(&mut self, event: &EditEvent) -> RenderOutput<N> {
        self.remove_touched(event);
        self.shift_after_edit(event);
        RenderOutput {
            segments: self.rerender(event.text()),
            extracted: self.extract(event.text()),
        }
    }

    /// Segment `text` into plain runs and rendered mentions, and publish it
    pub fn rerender(&mut self, text: &str) -> Vec<Segment<N>> {
        let mut segments = Vec::with_capacity(self.mentions.len() * 2 + 1);
        if self.mentions.is_empty() {
            segments.push(Segment::Plain(text.to_string()));
        } else {
            let mut prev_end = 0;
            for mention in &self.mentions {
                let left = slice_chars(text, prev_end, mention.start);
                if !left.is_empty() {
                    segments.push(Segment::Plain(left.to_string()));
                }
                match self.renderers.get(&mention.tag) {
                    Some(renderer) => segments.push(Segment::Mention {
                        start: mention.start,
                        end: mention.end,
                        node: renderer(mention),
                    }),
                    None => {
                        tracing::warn!(
                            "No renderer registered for tag '{}', rendering '{}' as plain text",
                            mention.tag,
                            mention.name
                        );
                        let literal = slice_chars(text, mention.start, mention.end);
                        if !literal.is_empty() {
                            segments.push(Segment::Plain(literal.to_string()));
                        }
                    }
                }
                prev_end = mention.end;
            }
            let right = slice_from(text, prev_end);
            if !right.is_empty() {
                segments.push(Segment::Plain(right.to_string()));
            }
        }

        self.render_subs.emit(&segments);
        segments
    }

    /// Serialize `text` with every mention replaced by its extractor output
    pub fn extract(&mut self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        if self.mentions.is_empty() {
            result.push_str(text);
        } else {
            let mut prev_end = 0;
            for mention in &self.mentions {
                result.push_str(slice_chars(text, prev_end, mention.start));
                match self.extractors.get(&mention.tag) {
                    Some(extractor) => result.push_str(&extractor(mention)),
                    None => {
                        tracing::warn!(
                            "No extractor registered for tag '{}', extracting '{}' verbatim",
                            mention.tag,
                            mention.name
                        );
                        result.push_str(slice_chars(text, mention.start, mention.end));
                    }
                }
                prev_end = mention.end;
            }
            result.push_str(slice_from(text, prev_end));
        }

        self.extract_subs.emit(&result);
        result
    }

    fn remove_touched(&mut self, event: &EditEvent) {
        let selection = event.selection();
        let prev = event.prev_selection();
        let ranged = prev.is_ranged();
        let batch = selection.start.abs_diff(prev.start) > 1;
        // A caret that jumped back deleted `selection.start..prev.start` of the previous text
        let deleted_back = selection.start < prev.start;
        let before = self.mentions.len();

        if ranged || batch {
            // Bulk edits (selection replace, paste, autocomplete) drop anything
            // the affected range touches.
            let batched = Selection::new(
                selection.start.min(prev.start),
                selection.end.max(prev.start),
            );
            self.mentions.retain(|m| {
                if ranged {
                    let intersect_start = prev.start < m.start && prev.end > m.start;
                    let intersect_end = prev.start < m.end && prev.end > m.end;
                    let inside = prev.start >= m.start && prev.end <= m.end;
                    !(intersect_start || intersect_end || inside)
                } else {
                    let intersect_start =
                        deleted_back && batched.start < m.start && batched.end > m.start;
                    let intersect_end = batched.start <= m.end && batched.end >= m.end;
                    let inside = batched.start >= m.start && batched.end <= m.end;
                    !(intersect_start || intersect_end || inside)
                }
            });
        } else if char_len(event.text()) < char_len(event.prev_text()) {
            // Deleting the last character of a mention destroys it.
            self.mentions
                .retain(|m| !(prev.start > m.start && prev.end <= m.end));
        } else {
            // Typing at either boundary keeps the mention intact.
            self.mentions
                .retain(|m| !(prev.start > m.start && prev.end < m.end));
        }

        let removed = before - self.mentions.len();
        if removed > 0 {
            tracing::debug!(
                "Removed {} mention(s) touched by edit at {}",
                removed,
                prev
            );
        }
    }

    fn shift_after_edit(&mut self, event: &EditEvent) {
        let diff = char_len(event.text()) as isize - char_len(event.prev_text()) as isize;
        self.shift_from(event.prev_selection().start, diff);
    }

    /// Move every mention starting at or after `edit_point` by `delta`
    pub(crate) fn shift_from(&mut self, edit_point: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        for mention in self.mentions.iter_mut().filter(|m| edit_point <= m.start) {
            mention.start = mention.start.saturating_add_signed(delta);
            mention.end = mention.end.saturating_add_signed(delta);
        }
    }
}

impl<N> Default for MentionsRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> std::fmt::Debug for MentionsRegistry<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut renderer_tags: Vec<&char> = self.renderers.keys().collect();
        renderer_tags.sort();
        f.debug_struct("MentionsRegistry")
            .field("mentions", &self.mentions)
            .field("renderer_tags", &renderer_tags)
            .field("next_id", &self.next_id)
            .finish()
    }
}
