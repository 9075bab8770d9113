//! Detection of mentions already serialized in the initial text
//!
//! A pre-population pattern must define the named groups `name` (display
//! name) and `id` (payload). Matches are spliced one at a time, left to right:
//! each match is replaced by its display name and the scan resumes right after
//! the inserted name. Bad patterns are reported and leave the text untouched.

use regex::Regex;

use crate::mentions::NewMention;
use crate::util::text::char_len;

/// One match replacement, in the coordinates of the text at the time it was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Splice {
    /// Character offset where the match began
    pub at: usize,
    /// Change in character length caused by the replacement
    pub delta: isize,
}

/// Text with serialized mentions replaced by display names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prepopulated {
    pub text: String,
    pub mentions: Vec<NewMention>,
    /// Replacements in the order they were applied
    pub splices: Vec<Splice>,
}

impl Prepopulated {
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }
}

/// Scan `text` for `pattern` and turn every match into a mention for `tag`
pub fn scan(
    text: &str,
    pattern: &str,
    tag: char,
    format_text: Option<&dyn Fn(&str) -> String>,
) -> Prepopulated {
    let regex = match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(e) => {
            tracing::error!("Invalid pre-population pattern for '{}': {}", tag, e);
            return Prepopulated::unchanged(text);
        }
    };
    let has_group = |group: &str| regex.capture_names().flatten().any(|n| n == group);
    if !has_group("name") || !has_group("id") {
        tracing::error!(
            "Pre-population pattern for '{}' must define named groups 'name' and 'id': {}",
            tag,
            pattern
        );
        return Prepopulated::unchanged(text);
    }

    let mut buffer = text.to_string();
    let mut mentions = Vec::new();
    let mut splices = Vec::new();
    let mut search_from = 0;

    while search_from <= buffer.len() {
        let Some(caps) = regex.captures_at(&buffer, search_from) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        let range = whole.range();
        if range.is_empty() {
            // Step over one character so empty matches cannot loop forever.
            search_from = buffer[range.end..]
                .chars()
                .next()
                .map(|ch| range.end + ch.len_utf8())
                .unwrap_or(buffer.len() + 1);
            continue;
        }

        let value = caps.name("name").map(|m| m.as_str()).unwrap_or("").to_string();
        let id = caps.name("id").map(|m| m.as_str()).unwrap_or("").to_string();
        let name = match format_text {
            Some(format_text) => format_text(&value),
            None => value.clone(),
        };

        let start = char_len(&buffer[..range.start]);
        let matched_len = char_len(&buffer[range.clone()]);
        buffer.replace_range(range.clone(), &name);
        splices.push(Splice {
            at: start,
            delta: char_len(&name) as isize - matched_len as isize,
        });
        search_from = range.start + name.len();

        tracing::debug!("Pre-populated '{}' (id {}) at {}", name, id, start);
        mentions.push(NewMention {
            tag,
            id,
            value,
            end: start + char_len(&name),
            name,
            start,
        });
    }

    Prepopulated {
        text: buffer,
        mentions,
        splices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATTERN: &str = r"@\[(?P<name>[^\]]+)\]\(id:(?P<id>[^)]+)\)";

    #[test]
    fn test_scan_replaces_matches_left_to_right() {
        let result = scan(
            "hi @[Bob](id:1) and @[Eve](id:2)!",
            PATTERN,
            '@',
            None,
        );
        assert_eq!(result.text, "hi Bob and Eve!");
        let spans: Vec<(usize, usize, &str)> = result
            .mentions
            .iter()
            .map(|m| (m.start, m.end, m.id.as_str()))
            .collect();
        assert_eq!(spans, vec![(3, 6, "1"), (11, 14, "2")]);
        assert_eq!(
            result.splices,
            vec![Splice { at: 3, delta: -9 }, Splice { at: 11, delta: -9 }]
        );
    }

    #[test]
    fn test_scan_adjacent_matches() {
        let result = scan("@[A](id:1)@[B](id:2)", PATTERN, '@', None);
        assert_eq!(result.text, "AB");
        assert_eq!(result.mentions.len(), 2);
        assert_eq!((result.mentions[1].start, result.mentions[1].end), (1, 2));
    }

    #[test]
    fn test_scan_applies_format() {
        let format = |name: &str| format!("@{}", name);
        let result = scan("x @[Bob](id:9)", PATTERN, '@', Some(&format));
        assert_eq!(result.text, "x @Bob");
        assert_eq!(result.mentions[0].name, "@Bob");
        assert_eq!(result.mentions[0].value, "Bob");
        assert_eq!((result.mentions[0].start, result.mentions[0].end), (2, 6));
    }

    #[test]
    fn test_scan_counts_chars_not_bytes() {
        let result = scan("héé @[Zoë](id:3)", PATTERN, '@', None);
        assert_eq!(result.text, "héé Zoë");
        assert_eq!((result.mentions[0].start, result.mentions[0].end), (4, 7));
    }

    #[test]
    fn test_malformed_pattern_leaves_text() {
        let result = scan("@[Bob](id:1)", "@[(", '@', None);
        assert_eq!(result.text, "@[Bob](id:1)");
        assert!(result.mentions.is_empty());
    }

    #[test]
    fn test_pattern_without_groups_leaves_text() {
        let result = scan("@bob", r"@(\w+)", '@', None);
        assert_eq!(result.text, "@bob");
        assert!(result.mentions.is_empty());
    }

    #[test]
    fn test_empty_matches_terminate() {
        let result = scan("abc", r"(?P<name>x*)(?P<id>y*)", '@', None);
        assert_eq!(result.text, "abc");
        assert!(result.mentions.is_empty());
    }
}
