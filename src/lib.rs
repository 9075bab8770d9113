//! Complete Mentions - @mention text-editing core
//!
//! This crate reconciles independently delivered text and selection updates
//! from a host text input, tracks a live keyword after each trigger character,
//! and keeps committed mentions aligned with the text as it is edited.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod events;
pub mod input;
pub mod mentions;
pub mod prepopulate;
pub mod script;
pub mod selection;
pub mod sync;
pub mod template;
pub mod tracker;
pub mod tracing;
pub mod util;

// Re-export commonly used types
pub use config::InputConfig;
pub use input::{MentionInput, SuggestionQuery, TagSpec};
pub use mentions::{Mention, MentionsRegistry, NewMention, Segment};
pub use selection::Selection;
pub use sync::{EditEvent, HostPlatform, HostUpdate, PairingOrder, Synchronizer};
pub use template::Template;
pub use tracker::{Commitment, Tracker, TrackerEvent};
