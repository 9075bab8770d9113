//! Mention input configuration
//!
//! Stored as YAML in `~/.config/complete-mentions/config.yaml`:
//!
//! ```yaml
//! platform: android
//! buffer: 10
//! triggers:
//!   - tag: "@"
//!     format: "@{name}"
//!     render: "[{name}]"
//!     extract: "@[{name}](id:{id})"
//!     pattern: '@\[(?P<name>[^\]]+)\]\(id:(?P<id>[^)]+)\)'
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::input::{MentionInput, TagSpec};
use crate::sync::{HostPlatform, DEFAULT_BUFFER};
use crate::template::Template;

/// Serialized form used by the default trigger
pub const DEFAULT_EXTRACT: &str = "@[{name}](id:{id})";

/// Pattern that reads [`DEFAULT_EXTRACT`] output back in
pub const DEFAULT_PATTERN: &str = r"@\[(?P<name>[^\]]+)\]\(id:(?P<id>[^)]+)\)";

/// Configuration for one mention input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Host platform; decides the text/selection pairing order
    #[serde(default)]
    pub platform: HostPlatform,
    /// Text and selection history depth
    #[serde(default = "default_buffer")]
    pub buffer: usize,
    #[serde(default = "default_triggers")]
    pub triggers: Vec<TriggerConfig>,
}

/// Configuration for one trigger tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Trigger character, e.g. "@"
    pub tag: String,
    /// Display-name template applied on commit (`{name}`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Template>,
    #[serde(default)]
    pub render: Template,
    #[serde(default)]
    pub extract: Template,
    /// Pre-population regex with `name` and `id` groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

fn default_buffer() -> usize {
    DEFAULT_BUFFER
}

fn default_triggers() -> Vec<TriggerConfig> {
    vec![TriggerConfig::new('@')]
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            platform: HostPlatform::default(),
            buffer: default_buffer(),
            triggers: default_triggers(),
        }
    }
}

impl TriggerConfig {
    /// Trigger with the default extract format and matching pre-population pattern
    pub fn new(tag: char) -> Self {
        Self {
            tag: tag.to_string(),
            format: None,
            render: Template::default(),
            extract: Template::new(DEFAULT_EXTRACT),
            pattern: Some(DEFAULT_PATTERN.to_string()),
        }
    }

    /// The tag as a single character
    pub fn trigger(&self) -> Result<char, ConfigError> {
        let mut chars = self.tag.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if !ch.is_whitespace() => Ok(ch),
            _ => Err(ConfigError::InvalidTag(self.tag.clone())),
        }
    }

    /// Build the tag spec with template-driven renderer, extractor and format
    pub fn to_tag_spec(&self) -> Result<TagSpec<String>, ConfigError> {
        let trigger = self.trigger()?;
        let render = self.render.clone();
        let extract = self.extract.clone();
        let mut spec = TagSpec::new(
            trigger,
            move |mention| render.render(mention),
            move |mention| extract.render(mention),
        );
        if let Some(format) = self.format.clone() {
            spec = spec.with_format(move |name| format.format_name(name));
        }
        if let Some(pattern) = &self.pattern {
            spec = spec.with_pattern(pattern.clone());
        }
        Ok(spec)
    }
}

impl InputConfig {
    /// Load config from the default location, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load and validate config from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Parse and validate config from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: InputConfig =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        let content =
            serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))?;
        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.triggers.is_empty() {
            return Err(ConfigError::NoTriggers);
        }
        let mut seen = Vec::with_capacity(self.triggers.len());
        for trigger in &self.triggers {
            let ch = trigger.trigger()?;
            if seen.contains(&ch) {
                return Err(ConfigError::DuplicateTag(ch));
            }
            seen.push(ch);
        }
        Ok(())
    }

    /// Build a configured input over `initial_text`
    pub fn build_input(&self, initial_text: &str) -> Result<MentionInput<String>, ConfigError> {
        self.validate()?;
        let mut input = MentionInput::new(initial_text, self.platform, self.buffer);
        for trigger in &self.triggers {
            input.add_tag(trigger.to_tag_spec()?);
        }
        Ok(input)
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    NoTriggers,
    InvalidTag(String),
    DuplicateTag(char),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::NoTriggers => write!(f, "No triggers configured"),
            ConfigError::InvalidTag(t) => {
                write!(f, "Invalid tag {:?}: must be one non-space character", t)
            }
            ConfigError::DuplicateTag(t) => write!(f, "Duplicate tag '{}'", t),
        }
    }
}

impl std::error::Error for ConfigError {}
