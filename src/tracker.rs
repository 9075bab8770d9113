//! Per-trigger mention tracking
//!
//! A [`Tracker`] watches synced edit events for one trigger character. When the
//! caret sits right after the trigger it starts tracking, keeps the live keyword
//! up to date while the user types, and stops when the caret leaves the word.
//! Committing a tracked keyword produces a [`Commitment`]: the text splice that
//! replaces the keyword with the chosen name.

use std::collections::VecDeque;

use serde::Serialize;

use crate::events::Subscribers;
use crate::selection::Selection;
use crate::sync::EditEvent;
use crate::util::text::{char_before, char_len, slice_from, slice_to, word_at};

/// Capacity of the tracking-state history used to debounce transitions
const STATE_HISTORY_CAP: usize = 10;

/// Notification emitted by a [`Tracker`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum TrackerEvent {
    StartTracking,
    StopTracking,
    /// Live keyword without its leading trigger character
    KeywordChange(String),
    Commit(Commitment),
}

/// Result of committing a tracked keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commitment {
    /// Full buffer with the keyword replaced by the display name
    pub text: String,
    /// Index of the trigger character; where the display name begins
    pub start: usize,
    /// End of the display name in `text`
    pub end: usize,
    /// Keyword that was replaced, including the trigger character
    pub keyword: String,
    /// Buffer with the keyword removed, bridged by a single space
    pub sliced_text: String,
    /// Name as supplied by the caller
    pub name: String,
    /// Display name inserted into the buffer (`format_text(name)` or `name`)
    pub display_name: String,
    pub id: String,
}

/// Arguments for [`Tracker::commit`]
pub struct CommitParams<'a> {
    pub text: &'a str,
    pub name: &'a str,
    pub id: &'a str,
    pub format_text: Option<&'a dyn Fn(&str) -> String>,
}

impl<'a> CommitParams<'a> {
    pub fn new(text: &'a str, name: &'a str, id: &'a str) -> Self {
        Self {
            text,
            name,
            id,
            format_text: None,
        }
    }

    pub fn with_format(mut self, format_text: &'a dyn Fn(&str) -> String) -> Self {
        self.format_text = Some(format_text);
        self
    }
}

/// Tracking state machine for one trigger character
#[derive(Debug)]
pub struct Tracker {
    trigger: char,
    /// Tracking flags, most recent first
    states: VecDeque<bool>,
    position: Option<usize>,
    keyword: String,
    subs: Subscribers<TrackerEvent>,
}

impl Tracker {
    pub fn new(trigger: char) -> Self {
        let mut states = VecDeque::with_capacity(STATE_HISTORY_CAP + 1);
        states.push_front(false);
        Self {
            trigger,
            states,
            position: None,
            keyword: String::new(),
            subs: Subscribers::new(),
        }
    }

    pub fn trigger(&self) -> char {
        self.trigger
    }

    pub fn is_tracking(&self) -> bool {
        self.position.is_some()
    }

    /// Index of the trigger character while tracking
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Live keyword including the trigger character (empty when idle)
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Live keyword without the trigger character
    pub fn query(&self) -> &str {
        self.keyword
            .strip_prefix(self.trigger)
            .unwrap_or(&self.keyword)
    }

    /// Subscribe to every tracker notification
    pub fn subscribe(&mut self, sub: impl FnMut(&TrackerEvent) + 'static) {
        self.subs.subscribe(sub);
    }

    pub fn on_start_tracking(&mut self, mut sub: impl FnMut() + 'static) {
        self.subs.subscribe(move |event| {
            if matches!(event, TrackerEvent::StartTracking) {
                sub();
            }
        });
    }

    pub fn on_stop_tracking(&mut self, mut sub: impl FnMut() + 'static) {
        self.subs.subscribe(move |event| {
            if matches!(event, TrackerEvent::StopTracking) {
                sub();
            }
        });
    }

    pub fn on_keyword_change(&mut self, mut sub: impl FnMut(&str) + 'static) {
        self.subs.subscribe(move |event| {
            if let TrackerEvent::KeywordChange(keyword) = event {
                sub(keyword);
            }
        });
    }

    pub fn on_commit(&mut self, mut sub: impl FnMut(&Commitment) + 'static) {
        self.subs.subscribe(move |event| {
            if let TrackerEvent::Commit(commitment) = event {
                sub(commitment);
            }
        });
    }

    /// Feed a synced edit; returns the notifications it produced, in order
    pub fn update(&mut self, event: &EditEvent) -> Vec<TrackerEvent> {
        let mut events = Vec::new();

        self.pre_check(event.text(), event.selection(), event.prev_selection());
        if self.refresh_keyword(event.text()) {
            events.push(TrackerEvent::KeywordChange(self.query().to_string()));
        }
        self.post_check(event.selection());
        events.extend(self.transition());

        for event in &events {
            self.subs.emit(event);
        }
        events
    }

    /// Replace the tracked keyword in `params.text` with the display name.
    ///
    /// Only meaningful while tracking and with a non-empty display name;
    /// otherwise nothing happens and `None` is returned. A successful commit
    /// always stops tracking.
    pub fn commit(&mut self, params: CommitParams<'_>) -> Option<Commitment> {
        let Some(position) = self.position else {
            tracing::warn!(
                "Commit for '{}' ignored: tracker is not tracking",
                self.trigger
            );
            return None;
        };

        let display_name = match params.format_text {
            Some(format_text) => format_text(params.name),
            None => params.name.to_string(),
        };
        if display_name.is_empty() {
            tracing::warn!(
                "Commit for '{}' ignored: display name for {:?} is empty",
                self.trigger,
                params.name
            );
            return None;
        }
        let left = slice_to(params.text, position);
        let right = slice_from(params.text, position + char_len(&self.keyword));

        let commitment = Commitment {
            text: format!("{}{}{}", left, display_name, right),
            start: position,
            end: position + char_len(&display_name),
            keyword: self.keyword.clone(),
            sliced_text: format!("{} {}", left, right),
            name: params.name.to_string(),
            display_name,
            id: params.id.to_string(),
        };
        tracing::debug!(
            "Committed '{}' over keyword {:?} at {}",
            commitment.display_name,
            commitment.keyword,
            commitment.start
        );

        self.stop_tracking();
        let mut events: Vec<TrackerEvent> = self.transition().into_iter().collect();
        events.push(TrackerEvent::Commit(commitment.clone()));
        for event in &events {
            self.subs.emit(event);
        }

        Some(commitment)
    }

    fn stop_tracking(&mut self) {
        self.position = None;
        self.keyword.clear();
        self.states.push_front(false);
    }

    fn current_state(&self) -> bool {
        self.states.front().copied().unwrap_or(false)
    }

    fn pre_check(&mut self, text: &str, selection: Selection, prev_selection: Selection) {
        let caret = selection.start;
        let last_char = char_before(text, caret);
        let tracking = self.current_state();

        match self.position {
            None if last_char == Some(self.trigger) => {
                self.position = Some(caret - 1);
                self.states.push_front(true);
            }
            None => {}
            Some(position) => {
                if prev_selection.is_ranged() {
                    tracing::trace!("Stop tracking '{}': ranged edit", self.trigger);
                    self.stop_tracking();
                } else if last_char.is_some_and(char::is_whitespace) {
                    tracing::trace!("Stop tracking '{}': whitespace typed", self.trigger);
                    self.stop_tracking();
                } else if caret <= position {
                    tracing::trace!("Stop tracking '{}': caret left the trigger", self.trigger);
                    self.stop_tracking();
                }
            }
        }

        if tracking == self.current_state() {
            self.states.push_front(tracking);
        }
    }

    /// Recompute the keyword; true if tracking
    fn refresh_keyword(&mut self, text: &str) -> bool {
        let Some(position) = self.position else {
            return false;
        };
        let word = word_at(text, position);
        self.keyword = if word.is_empty() {
            self.trigger.to_string()
        } else {
            word.to_string()
        };
        true
    }

    fn post_check(&mut self, selection: Selection) {
        if let Some(position) = self.position {
            if selection.start > position + char_len(&self.keyword) + 1 {
                tracing::trace!("Stop tracking '{}': caret jumped past keyword", self.trigger);
                self.stop_tracking();
            }
        }
    }

    /// Debounced start/stop notification for the latest state flip
    fn transition(&mut self) -> Option<TrackerEvent> {
        self.states.truncate(STATE_HISTORY_CAP);
        let current = self.current_state();
        let previous = self.states.get(1).copied().unwrap_or(false);
        match (previous, current) {
            (false, true) => {
                tracing::debug!("Start tracking '{}'", self.trigger);
                Some(TrackerEvent::StartTracking)
            }
            (true, false) => {
                tracing::debug!("Stop tracking '{}'", self.trigger);
                Some(TrackerEvent::StopTracking)
            }
            _ => None,
        }
    }
}
