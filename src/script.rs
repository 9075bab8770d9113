//! Scripted host-event replay
//!
//! A script is a YAML (or JSON) document describing the initial text and a list
//! of steps a host would perform on the input:
//!
//! ```yaml
//! text: "hello "
//! steps:
//!   - move: 6
//!   - type: "@bo"
//!   - commit: { tag: "@", name: Bob, id: "42" }
//!   - type: " hi"
//!   - backspace: 3
//!   - clear
//! ```
//!
//! `type`, `backspace` and `clear` deliver text and selection updates in the
//! platform's order, like a real keyboard would. `text`, `selection` and `move`
//! send a single raw update.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::input::{MentionInput, Synced};
use crate::mentions::{Mention, RenderOutput, Segment};
use crate::selection::Selection;
use crate::sync::{HostPlatform, HostUpdate};
use crate::tracker::{Commitment, TrackerEvent};
use crate::util::text::{char_len, slice_from, slice_to};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Raw text update
    Text(String),
    /// Raw selection update
    Selection { start: usize, end: usize },
    /// Insert characters at the caret, replacing any ranged selection
    Type(String),
    /// Delete backwards `n` times
    Backspace(usize),
    /// Move the caret (selection update only)
    Move(usize),
    /// Commit a suggestion for the given tag
    Commit { tag: char, name: String, id: String },
    /// Empty the input
    Clear,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Text(text) => write!(f, "text {:?}", text),
            Step::Selection { start, end } => write!(f, "selection {}..{}", start, end),
            Step::Type(chars) => write!(f, "type {:?}", chars),
            Step::Backspace(count) => write!(f, "backspace {}", count),
            Step::Move(caret) => write!(f, "move {}", caret),
            Step::Commit { tag, name, id } => write!(f, "commit {}{} ({})", tag, name, id),
            Step::Clear => write!(f, "clear"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Text the input starts with, before pre-population
    #[serde(default)]
    pub text: String,
    /// Platform override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<HostPlatform>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// State after one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutput<N> {
    pub index: usize,
    pub step: Step,
    /// Number of sync pairs the step completed
    pub synced: usize,
    pub text: String,
    pub selection: Selection,
    pub tracker_events: Vec<(char, TrackerEvent)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commitment: Option<Commitment>,
    pub segments: Vec<Segment<N>>,
    pub extracted: String,
    pub mentions: Vec<Mention>,
}

impl Script {
    pub fn from_yaml(yaml: &str) -> Result<Self, ScriptError> {
        serde_yaml::from_str(yaml).map_err(|e| ScriptError::Parse(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        serde_json::from_str(json).map_err(|e| ScriptError::Parse(e.to_string()))
    }

    /// Load a script, choosing the format by file extension (`.json` or YAML)
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ScriptError::Io(e.to_string()))?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Run every step against `input`
    pub fn run<N: Clone + 'static>(&self, input: &mut MentionInput<N>) -> Vec<StepOutput<N>> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| run_step(input, index, step))
            .collect()
    }
}

fn run_step<N: Clone + 'static>(
    input: &mut MentionInput<N>,
    index: usize,
    step: &Step,
) -> StepOutput<N> {
    tracing::debug!("Step {}: {}", index, step);

    let mut synced: Vec<Synced<N>> = Vec::new();
    let mut commitment = None;
    let mut output: Option<RenderOutput<N>> = None;

    match step {
        Step::Text(text) => synced.extend(input.update_text(text.clone())),
        Step::Selection { start, end } => {
            synced.extend(input.update_selection(Selection::new(*start, *end)))
        }
        Step::Move(caret) => synced.extend(input.update_selection(Selection::caret(*caret))),
        Step::Type(chars) => {
            for ch in chars.chars() {
                let (text, selection) = insert_char(input.text(), input.selection(), ch);
                synced.extend(deliver(input, text, selection));
            }
        }
        Step::Backspace(count) => {
            for _ in 0..*count {
                match delete_backward(input.text(), input.selection()) {
                    Some((text, selection)) => synced.extend(deliver(input, text, selection)),
                    None => break,
                }
            }
        }
        Step::Commit { tag, name, id } => {
            if let Some(committed) = input.commit(*tag, name, id) {
                output = Some(committed.output);
                commitment = Some(committed.commitment);
            } else {
                tracing::warn!("Step {}: commit for '{}' did nothing", index, tag);
            }
        }
        Step::Clear => output = Some(input.clear()),
    }

    let output = output
        .or_else(|| synced.last().map(|s| s.output.clone()))
        .unwrap_or_else(|| input.refresh());

    StepOutput {
        index,
        step: step.clone(),
        synced: synced.len(),
        text: input.text().to_string(),
        selection: input.selection(),
        tracker_events: synced
            .into_iter()
            .flat_map(|s| s.tracker_events)
            .collect(),
        commitment,
        segments: output.segments,
        extracted: output.extracted,
        mentions: input.mentions().to_vec(),
    }
}

fn deliver<N: 'static>(
    input: &mut MentionInput<N>,
    text: String,
    selection: Selection,
) -> Vec<Synced<N>> {
    let order = input.platform().pairing_order();
    order
        .deliver(text, selection)
        .into_iter()
        .filter_map(|update: HostUpdate| input.apply(update))
        .collect()
}

/// Text and caret after typing `ch` over `selection`
fn insert_char(text: &str, selection: Selection, ch: char) -> (String, Selection) {
    let selection = selection.clamped(char_len(text));
    let mut next = slice_to(text, selection.start).to_string();
    next.push(ch);
    next.push_str(slice_from(text, selection.end));
    (next, Selection::caret(selection.start + 1))
}

/// Text and caret after one backspace, `None` at the start of the text
fn delete_backward(text: &str, selection: Selection) -> Option<(String, Selection)> {
    let selection = selection.clamped(char_len(text));
    let start = if selection.is_ranged() {
        selection.start
    } else {
        selection.start.checked_sub(1)?
    };
    let mut next = slice_to(text, start).to_string();
    next.push_str(slice_from(text, selection.end));
    Some((next, Selection::caret(start)))
}

/// Errors that can occur when loading a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptError::Io(e) => write!(f, "IO error: {}", e),
            ScriptError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ScriptError {}
