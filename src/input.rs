//! Mention input composition
//!
//! [`MentionInput`] wires one synchronizer, one mentions registry and one
//! tracker per trigger tag together for a single mounted text input. Host
//! callbacks go in through [`MentionInput::update_text`] and
//! [`MentionInput::update_selection`]; every paired edit runs the registry and
//! then every tracker to completion before the call returns.

use serde::Serialize;

use crate::events::Subscribers;
use crate::mentions::{
    Extractor, Mention, MentionsRegistry, NewMention, RenderOutput, Renderer, Segment,
};
use crate::prepopulate;
use crate::selection::Selection;
use crate::sync::{EditEvent, HostPlatform, HostUpdate, PairingOrder, Synchronizer};
use crate::tracker::{CommitParams, Commitment, Tracker, TrackerEvent};
use crate::util::text::char_len;

type FormatText = Box<dyn Fn(&str) -> String>;

/// Everything needed to enable one trigger tag on an input
pub struct TagSpec<N> {
    pub trigger: char,
    pub renderer: Renderer<N>,
    pub extractor: Extractor,
    pub format_text: Option<FormatText>,
    /// Pre-population pattern applied to the current text when the tag is added
    pub pattern: Option<String>,
}

impl<N> TagSpec<N> {
    pub fn new(
        trigger: char,
        renderer: impl Fn(&Mention) -> N + 'static,
        extractor: impl Fn(&Mention) -> String + 'static,
    ) -> Self {
        Self {
            trigger,
            renderer: Box::new(renderer),
            extractor: Box::new(extractor),
            format_text: None,
            pattern: None,
        }
    }

    pub fn with_format(mut self, format_text: impl Fn(&str) -> String + 'static) -> Self {
        self.format_text = Some(Box::new(format_text));
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

/// State handed to the host's suggestion provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionQuery {
    pub tag: char,
    pub tracking: bool,
    /// Keyword without the trigger character
    pub keyword: String,
}

/// Outcome of a host update that completed a sync pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Synced<N> {
    pub text: String,
    pub selection: Selection,
    pub tracker_events: Vec<(char, TrackerEvent)>,
    pub output: RenderOutput<N>,
}

/// Outcome of committing a suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Committed<N> {
    pub commitment: Commitment,
    /// Registry id of the new mention, `None` if it was rejected
    pub unique_id: Option<u64>,
    pub output: RenderOutput<N>,
}

struct TagSlot {
    tracker: Tracker,
    format_text: Option<FormatText>,
}

impl TagSlot {
    fn format(&self, name: &str) -> String {
        match &self.format_text {
            Some(format_text) => format_text(name),
            None => name.to_string(),
        }
    }
}

/// One mounted mention-aware text input
pub struct MentionInput<N = String> {
    platform: HostPlatform,
    sync: Synchronizer,
    registry: MentionsRegistry<N>,
    tags: Vec<TagSlot>,
    suggestion_subs: Subscribers<SuggestionQuery>,
}

impl<N: 'static> MentionInput<N> {
    pub fn new(initial_text: impl Into<String>, platform: HostPlatform, buffer: usize) -> Self {
        Self {
            platform,
            sync: Synchronizer::new(
                initial_text,
                Selection::caret(0),
                buffer,
                platform.pairing_order(),
            ),
            registry: MentionsRegistry::new(),
            tags: Vec::new(),
            suggestion_subs: Subscribers::new(),
        }
    }

    /// Enable a trigger tag.
    ///
    /// Registers its renderer and extractor, creates its tracker, applies its
    /// pre-population pattern to the current text, then renders once.
    pub fn add_tag(&mut self, spec: TagSpec<N>) -> RenderOutput<N> {
        let TagSpec {
            trigger,
            renderer,
            extractor,
            format_text,
            pattern,
        } = spec;

        if self.tags.iter().any(|slot| slot.tracker.trigger() == trigger) {
            tracing::warn!("Tag '{}' added twice, replacing previous configuration", trigger);
            self.tags.retain(|slot| slot.tracker.trigger() != trigger);
        }
        self.registry.add_renderer(trigger, renderer);
        self.registry.add_extractor(trigger, extractor);
        self.tags.push(TagSlot {
            tracker: Tracker::new(trigger),
            format_text,
        });

        if let Some(pattern) = pattern {
            self.prepopulate(trigger, &pattern);
        }
        self.refresh()
    }

    fn prepopulate(&mut self, trigger: char, pattern: &str) {
        let slot = self
            .tags
            .iter()
            .find(|slot| slot.tracker.trigger() == trigger);
        let format = |name: &str| match slot {
            Some(slot) => slot.format(name),
            None => name.to_string(),
        };
        let result = prepopulate::scan(self.sync.text(), pattern, trigger, Some(&format));
        if result.mentions.is_empty() {
            return;
        }

        for splice in &result.splices {
            self.registry.shift_from(splice.at, splice.delta);
        }
        for mention in result.mentions {
            self.registry.add_mention(mention);
        }
        let selection = self.sync.selection().clamped(char_len(&result.text));
        self.sync.reset(result.text, selection);
    }

    /// Subscribe to tracking/keyword changes for every tag
    pub fn on_suggestions(&mut self, sub: impl FnMut(&SuggestionQuery) + 'static) {
        self.suggestion_subs.subscribe(sub);
    }

    pub fn on_render(&mut self, sub: impl FnMut(&[Segment<N>]) + 'static) {
        self.registry.on_render(sub);
    }

    pub fn on_extract(&mut self, sub: impl FnMut(&str) + 'static) {
        self.registry.on_extract(sub);
    }

    /// Subscribe to one tag's tracker notifications
    pub fn on_tracker_event(&mut self, trigger: char, sub: impl FnMut(&TrackerEvent) + 'static) {
        match self.slot_mut(trigger) {
            Some(slot) => slot.tracker.subscribe(sub),
            None => tracing::warn!("No tag '{}' registered to subscribe to", trigger),
        }
    }

    /// Host callback: the input's text changed
    pub fn update_text(&mut self, text: impl Into<String>) -> Option<Synced<N>> {
        let event = self.sync.update_text(text)?;
        Some(self.dispatch(&event))
    }

    /// Host callback: the input's selection changed
    pub fn update_selection(&mut self, selection: Selection) -> Option<Synced<N>> {
        let event = self.sync.update_selection(selection)?;
        Some(self.dispatch(&event))
    }

    pub fn apply(&mut self, update: HostUpdate) -> Option<Synced<N>> {
        let event = self.sync.apply(update)?;
        Some(self.dispatch(&event))
    }

    /// Commit `name`/`id` over the keyword currently tracked for `trigger`.
    ///
    /// Returns `None` when the tag is unknown, not tracking, or `name` is empty.
    pub fn commit(&mut self, trigger: char, name: &str, id: &str) -> Option<Committed<N>> {
        if name.is_empty() {
            tracing::warn!("Refusing to commit an empty name for '{}'", trigger);
            return None;
        }
        let text = self.sync.text().to_string();
        let Some(slot) = self.slot_mut(trigger) else {
            tracing::warn!("Commit for unknown tag '{}'", trigger);
            return None;
        };
        let format_text = &slot.format_text;
        let format = |name: &str| match format_text {
            Some(format_text) => format_text(name),
            None => name.to_string(),
        };
        let params = CommitParams::new(&text, name, id).with_format(&format);
        let commitment = slot.tracker.commit(params)?;

        self.suggestion_subs.emit(&SuggestionQuery {
            tag: trigger,
            tracking: false,
            keyword: String::new(),
        });

        for update in commit_replay(self.sync.pairing_order(), &commitment) {
            self.apply(update);
        }

        let unique_id = self.registry.add_mention(NewMention {
            tag: trigger,
            id: commitment.id.clone(),
            value: commitment.name.clone(),
            name: commitment.display_name.clone(),
            start: commitment.start,
            end: commitment.end,
        });
        let output = RenderOutput {
            segments: self.registry.rerender(&commitment.text),
            extracted: self.registry.extract(&commitment.text),
        };

        Some(Committed {
            commitment,
            unique_id,
            output,
        })
    }

    /// Empty the input, dropping every mention
    pub fn clear(&mut self) -> RenderOutput<N> {
        let len = char_len(self.sync.text());
        if len > 0 {
            for update in clear_replay(self.sync.pairing_order(), len) {
                self.apply(update);
            }
        }
        if !self.registry.is_empty() {
            tracing::debug!("Dropping {} mention(s) left after clear", self.registry.len());
            self.registry.clear();
        }
        self.refresh()
    }

    /// Render and extract the current text without an edit
    pub fn refresh(&mut self) -> RenderOutput<N> {
        let text = self.sync.text().to_string();
        RenderOutput {
            segments: self.registry.rerender(&text),
            extracted: self.registry.extract(&text),
        }
    }

    pub fn text(&self) -> &str {
        self.sync.text()
    }

    pub fn selection(&self) -> Selection {
        self.sync.selection()
    }

    pub fn platform(&self) -> HostPlatform {
        self.platform
    }

    pub fn mentions(&self) -> &[Mention] {
        self.registry.mentions()
    }

    pub fn registry(&self) -> &MentionsRegistry<N> {
        &self.registry
    }

    pub fn tracker(&self, trigger: char) -> Option<&Tracker> {
        self.tags
            .iter()
            .map(|slot| &slot.tracker)
            .find(|tracker| tracker.trigger() == trigger)
    }

    pub fn triggers(&self) -> impl Iterator<Item = char> + '_ {
        self.tags.iter().map(|slot| slot.tracker.trigger())
    }

    /// Current suggestion state for a tag
    pub fn suggestion(&self, trigger: char) -> Option<SuggestionQuery> {
        self.tracker(trigger).map(|tracker| SuggestionQuery {
            tag: trigger,
            tracking: tracker.is_tracking(),
            keyword: tracker.query().to_string(),
        })
    }

    fn slot_mut(&mut self, trigger: char) -> Option<&mut TagSlot> {
        self.tags
            .iter_mut()
            .find(|slot| slot.tracker.trigger() == trigger)
    }

    fn dispatch(&mut self, event: &EditEvent) -> Synced<N> {
        let output = self.registry.update_mentions(event);

        let mut tracker_events = Vec::new();
        for slot in &mut self.tags {
            let events = slot.tracker.update(event);
            if events.is_empty() {
                continue;
            }
            let trigger = slot.tracker.trigger();
            self.suggestion_subs.emit(&SuggestionQuery {
                tag: trigger,
                tracking: slot.tracker.is_tracking(),
                keyword: slot.tracker.query().to_string(),
            });
            tracker_events.extend(events.into_iter().map(|e| (trigger, e)));
        }

        Synced {
            text: event.text().to_string(),
            selection: event.selection(),
            tracker_events,
            output,
        }
    }
}

impl<N> std::fmt::Debug for MentionInput<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MentionInput")
            .field("platform", &self.platform)
            .field("sync", &self.sync)
            .field("registry", &self.registry)
            .field(
                "triggers",
                &self
                    .tags
                    .iter()
                    .map(|slot| slot.tracker.trigger())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Host updates that replay a commit so that exactly two pairs sync: the
/// keyword removal (as a ranged edit) and the name insertion.
fn commit_replay(order: PairingOrder, commitment: &Commitment) -> Vec<HostUpdate> {
    let keyword = Selection::new(
        commitment.start,
        commitment.start + char_len(&commitment.keyword),
    );
    let collapsed = Selection::caret(commitment.start);
    let after = Selection::caret(commitment.end);
    let sliced = HostUpdate::Text(commitment.sliced_text.clone());
    let full = HostUpdate::Text(commitment.text.clone());

    match order {
        PairingOrder::TextThenSelection => vec![
            HostUpdate::Selection(keyword),
            sliced,
            HostUpdate::Selection(collapsed),
            full,
            HostUpdate::Selection(after),
        ],
        PairingOrder::SelectionThenText => vec![
            HostUpdate::Selection(keyword),
            HostUpdate::Selection(collapsed),
            sliced,
            HostUpdate::Selection(after),
            full,
        ],
    }
}

/// Host updates for "select everything, then delete it"
fn clear_replay(order: PairingOrder, len: usize) -> Vec<HostUpdate> {
    let all = HostUpdate::Selection(Selection::new(0, len));
    let start = HostUpdate::Selection(Selection::caret(0));
    let empty = HostUpdate::Text(String::new());

    match order {
        PairingOrder::TextThenSelection => vec![all, empty, start],
        PairingOrder::SelectionThenText => vec![all, start, empty],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_commitment() -> Commitment {
        Commitment {
            text: "hi Bob".into(),
            start: 3,
            end: 6,
            keyword: "@bo".into(),
            sliced_text: "hi  ".into(),
            name: "Bob".into(),
            display_name: "Bob".into(),
            id: "1".into(),
        }
    }

    fn count_pairs(order: PairingOrder, updates: Vec<HostUpdate>) -> Vec<EditEvent> {
        // Seed as if a keystroke had just been paired
        let mut sync = Synchronizer::new("hi @bo", Selection::caret(5), 10, order);
        for update in order.deliver("hi @bo", Selection::caret(6)) {
            sync.apply(update);
        }
        updates
            .into_iter()
            .filter_map(|update| sync.apply(update))
            .collect()
    }

    #[test]
    fn test_commit_replay_pairs_twice_on_both_platforms() {
        for order in [PairingOrder::TextThenSelection, PairingOrder::SelectionThenText] {
            let events = count_pairs(order, commit_replay(order, &sample_commitment()));
            assert_eq!(events.len(), 2, "{:?}", order);

            assert_eq!(events[0].text(), "hi  ");
            assert_eq!(events[0].prev_selection(), Selection::new(3, 6));
            assert_eq!(events[0].selection(), Selection::caret(3));

            assert_eq!(events[1].text(), "hi Bob");
            assert_eq!(events[1].prev_text(), "hi  ");
            assert_eq!(events[1].selection(), Selection::caret(6));
        }
    }

    #[test]
    fn test_clear_replay_pairs_once() {
        for order in [PairingOrder::TextThenSelection, PairingOrder::SelectionThenText] {
            let events = count_pairs(order, clear_replay(order, 6));
            assert_eq!(events.len(), 1, "{:?}", order);
            assert_eq!(events[0].text(), "");
            assert_eq!(events[0].prev_selection(), Selection::new(0, 6));
        }
    }
}
