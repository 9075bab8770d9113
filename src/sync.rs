//! Text/selection synchronizer
//!
//! Hosts deliver "text changed" and "selection changed" as two independent
//! callbacks whose relative order depends on the platform. The [`Synchronizer`]
//! keeps a bounded history of both streams plus the order in which they
//! arrived, and publishes a single [`EditEvent`] once a text update and a
//! selection update have been paired in the platform's delivery order.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::events::Subscribers;
use crate::selection::Selection;

/// Default history depth for text and selection
pub const DEFAULT_BUFFER: usize = 10;

/// Capacity of the update-order queue
const QUEUE_CAP: usize = 10;

/// Which of the two host streams produced an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Text,
    Selection,
}

/// Host platform, which decides the callback delivery order for a keystroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPlatform {
    /// Delivers the text change first, then the selection change
    Android,
    /// Delivers the selection change first, then the text change
    Ios,
}

impl HostPlatform {
    /// Platform of the running target
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            HostPlatform::Android
        } else {
            HostPlatform::Ios
        }
    }

    pub fn pairing_order(self) -> PairingOrder {
        match self {
            HostPlatform::Android => PairingOrder::TextThenSelection,
            HostPlatform::Ios => PairingOrder::SelectionThenText,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HostPlatform::Android => "android",
            HostPlatform::Ios => "ios",
        }
    }
}

impl Default for HostPlatform {
    fn default() -> Self {
        Self::current()
    }
}

impl std::str::FromStr for HostPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "android" => Ok(HostPlatform::Android),
            "ios" => Ok(HostPlatform::Ios),
            other => Err(format!("Unknown platform: {}", other)),
        }
    }
}

/// Order in which a text update and a selection update complete a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingOrder {
    TextThenSelection,
    SelectionThenText,
}

impl PairingOrder {
    /// Check whether the two most recent updates complete a pair
    pub fn completes(self, latest: Option<UpdateKind>, previous: Option<UpdateKind>) -> bool {
        match self {
            PairingOrder::TextThenSelection => {
                latest == Some(UpdateKind::Selection) && previous == Some(UpdateKind::Text)
            }
            PairingOrder::SelectionThenText => {
                latest == Some(UpdateKind::Text) && previous == Some(UpdateKind::Selection)
            }
        }
    }

    /// Host updates for one keystroke, in the order this platform delivers them
    pub fn deliver(self, text: impl Into<String>, selection: Selection) -> [HostUpdate; 2] {
        let text = HostUpdate::Text(text.into());
        let selection = HostUpdate::Selection(selection);
        match self {
            PairingOrder::TextThenSelection => [text, selection],
            PairingOrder::SelectionThenText => [selection, text],
        }
    }
}

/// A single raw host notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostUpdate {
    Text(String),
    Selection(Selection),
}

/// A reconciled (text, selection) edit, most recent values first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditEvent {
    text_history: Vec<String>,
    selection_history: Vec<Selection>,
}

impl EditEvent {
    /// Build an event from a single before/after pair
    pub fn new(
        text: impl Into<String>,
        prev_text: impl Into<String>,
        selection: Selection,
        prev_selection: Selection,
    ) -> Self {
        Self {
            text_history: vec![text.into(), prev_text.into()],
            selection_history: vec![selection, prev_selection],
        }
    }

    /// Build an event from full histories (most recent first)
    pub fn from_history(text_history: Vec<String>, selection_history: Vec<Selection>) -> Self {
        Self {
            text_history,
            selection_history,
        }
    }

    pub fn text(&self) -> &str {
        self.text_history.first().map(String::as_str).unwrap_or("")
    }

    /// Text before this edit (the current text if no history exists)
    pub fn prev_text(&self) -> &str {
        self.text_history
            .get(1)
            .map(String::as_str)
            .unwrap_or_else(|| self.text())
    }

    pub fn selection(&self) -> Selection {
        self.selection_history.first().copied().unwrap_or_default()
    }

    /// Selection before this edit (the current selection if no history exists)
    pub fn prev_selection(&self) -> Selection {
        self.selection_history
            .get(1)
            .copied()
            .unwrap_or_else(|| self.selection())
    }

    pub fn text_history(&self) -> &[String] {
        &self.text_history
    }

    pub fn selection_history(&self) -> &[Selection] {
        &self.selection_history
    }
}

/// Reconciles independently delivered text and selection updates
#[derive(Debug)]
pub struct Synchronizer {
    order: PairingOrder,
    buffer: usize,
    texts: VecDeque<String>,
    selections: VecDeque<Selection>,
    queue: VecDeque<UpdateKind>,
    sync_subs: Subscribers<EditEvent>,
}

impl Synchronizer {
    /// Create a synchronizer seeded with the host's initial state.
    ///
    /// `buffer` is clamped to at least 2 so an edit always has a previous value.
    pub fn new(
        initial_text: impl Into<String>,
        initial_selection: Selection,
        buffer: usize,
        order: PairingOrder,
    ) -> Self {
        let buffer = buffer.max(2);
        let mut texts = VecDeque::with_capacity(buffer);
        texts.push_front(initial_text.into());
        let mut selections = VecDeque::with_capacity(buffer);
        selections.push_front(initial_selection);

        Self {
            order,
            buffer,
            texts,
            selections,
            queue: VecDeque::with_capacity(QUEUE_CAP),
            sync_subs: Subscribers::new(),
        }
    }

    pub fn for_platform(initial_text: impl Into<String>, platform: HostPlatform) -> Self {
        Self::new(
            initial_text,
            Selection::caret(0),
            DEFAULT_BUFFER,
            platform.pairing_order(),
        )
    }

    /// Subscribe to paired edit events
    pub fn on_sync(&mut self, sub: impl FnMut(&EditEvent) + 'static) {
        self.sync_subs.subscribe(sub);
    }

    /// Record a text update; returns the edit event if this completed a pair
    pub fn update_text(&mut self, text: impl Into<String>) -> Option<EditEvent> {
        self.texts.push_front(text.into());
        self.texts.truncate(self.buffer);
        self.enqueue(UpdateKind::Text);
        self.check()
    }

    /// Record a selection update; identical consecutive selections are ignored
    pub fn update_selection(&mut self, selection: Selection) -> Option<EditEvent> {
        if self.selections.front() == Some(&selection) {
            tracing::trace!("Ignoring repeated selection {}", selection);
            return None;
        }
        self.selections.push_front(selection);
        self.selections.truncate(self.buffer);
        self.enqueue(UpdateKind::Selection);
        self.check()
    }

    /// Route a raw host update to the matching stream
    pub fn apply(&mut self, update: HostUpdate) -> Option<EditEvent> {
        match update {
            HostUpdate::Text(text) => self.update_text(text),
            HostUpdate::Selection(selection) => self.update_selection(selection),
        }
    }

    /// Replace the baseline state without producing an edit event
    pub fn reset(&mut self, text: impl Into<String>, selection: Selection) {
        self.texts.clear();
        self.texts.push_front(text.into());
        self.selections.clear();
        self.selections.push_front(selection);
        self.queue.clear();
    }

    /// Most recent text
    pub fn text(&self) -> &str {
        self.texts.front().map(String::as_str).unwrap_or("")
    }

    /// Most recent selection
    pub fn selection(&self) -> Selection {
        self.selections.front().copied().unwrap_or_default()
    }

    pub fn text_history(&self) -> impl Iterator<Item = &str> {
        self.texts.iter().map(String::as_str)
    }

    pub fn selection_history(&self) -> impl Iterator<Item = Selection> + '_ {
        self.selections.iter().copied()
    }

    pub fn pairing_order(&self) -> PairingOrder {
        self.order
    }

    pub fn buffer(&self) -> usize {
        self.buffer
    }

    fn enqueue(&mut self, kind: UpdateKind) {
        self.queue.push_front(kind);
        self.queue.truncate(QUEUE_CAP);
    }

    fn check(&mut self) -> Option<EditEvent> {
        let latest = self.queue.front().copied();
        let previous = self.queue.get(1).copied();
        if !self.order.completes(latest, previous) {
            return None;
        }

        let event = EditEvent::from_history(
            self.texts.iter().cloned().collect(),
            self.selections.iter().copied().collect(),
        );
        tracing::debug!(
            "Synced edit: {:?} {} -> {:?} {}",
            event.prev_text(),
            event.prev_selection(),
            event.text(),
            event.selection()
        );
        self.sync_subs.emit(&event);
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn android(text: &str) -> Synchronizer {
        Synchronizer::for_platform(text, HostPlatform::Android)
    }

    fn ios(text: &str) -> Synchronizer {
        Synchronizer::for_platform(text, HostPlatform::Ios)
    }

    #[test]
    fn test_text_then_selection_pairs_on_android() {
        let mut sync = android("");
        assert!(sync.update_text("a").is_none());
        let event = sync.update_selection(Selection::caret(1)).unwrap();

        assert_eq!(event.text(), "a");
        assert_eq!(event.prev_text(), "");
        assert_eq!(event.selection(), Selection::caret(1));
        assert_eq!(event.prev_selection(), Selection::caret(0));
    }

    #[test]
    fn test_selection_then_text_does_not_pair_on_android() {
        let mut sync = android("");
        assert!(sync.update_selection(Selection::caret(1)).is_none());
        // [text, selection] is now the newest pair: selection came first
        assert!(sync.update_text("a").is_none());
    }

    #[test]
    fn test_selection_then_text_pairs_on_ios() {
        let mut sync = ios("");
        assert!(sync.update_selection(Selection::caret(1)).is_none());
        let event = sync.update_text("a").unwrap();
        assert_eq!(event.text(), "a");
        assert_eq!(event.selection(), Selection::caret(1));
    }

    #[test]
    fn test_repeated_selection_is_ignored() {
        let fired = Rc::new(RefCell::new(0));
        let mut sync = android("");
        let counter = Rc::clone(&fired);
        sync.on_sync(move |_| *counter.borrow_mut() += 1);

        sync.update_text("a");
        sync.update_selection(Selection::caret(1));
        assert!(sync.update_selection(Selection::caret(1)).is_none());

        assert_eq!(*fired.borrow(), 1);
    }

    #[test]
    fn test_history_is_bounded_and_most_recent_first() {
        let mut sync = Synchronizer::new("", Selection::caret(0), 3, PairingOrder::TextThenSelection);
        for (i, text) in ["a", "ab", "abc", "abcd"].iter().enumerate() {
            sync.update_text(*text);
            sync.update_selection(Selection::caret(i + 1));
        }

        let texts: Vec<&str> = sync.text_history().collect();
        assert_eq!(texts, vec!["abcd", "abc", "ab"]);
        let selections: Vec<Selection> = sync.selection_history().collect();
        assert_eq!(
            selections,
            vec![Selection::caret(4), Selection::caret(3), Selection::caret(2)]
        );
    }

    #[test]
    fn test_buffer_clamped_to_two() {
        let sync = Synchronizer::new("", Selection::caret(0), 0, PairingOrder::TextThenSelection);
        assert_eq!(sync.buffer(), 2);
    }

    #[test]
    fn test_deliver_order_matches_pairing() {
        for platform in [HostPlatform::Android, HostPlatform::Ios] {
            let mut sync = Synchronizer::for_platform("", platform);
            let [first, second] = platform.pairing_order().deliver("x", Selection::caret(1));
            assert!(sync.apply(first).is_none());
            assert!(sync.apply(second).is_some(), "{:?} should pair", platform);
        }
    }

    #[test]
    fn test_reset_starts_new_baseline() {
        let mut sync = android("old");
        sync.update_text("old!");
        sync.reset("new", Selection::caret(3));

        assert_eq!(sync.text(), "new");
        assert_eq!(sync.text_history().count(), 1);
        // A pending text update from before the reset must not pair
        assert!(sync.update_selection(Selection::caret(1)).is_none());
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!("Android".parse::<HostPlatform>(), Ok(HostPlatform::Android));
        assert_eq!("ios".parse::<HostPlatform>(), Ok(HostPlatform::Ios));
        assert!("symbian".parse::<HostPlatform>().is_err());
    }

    #[test]
    fn test_edit_event_falls_back_without_history() {
        let event = EditEvent::from_history(vec!["x".into()], vec![Selection::caret(1)]);
        assert_eq!(event.prev_text(), "x");
        assert_eq!(event.prev_selection(), Selection::caret(1));
    }
}
