//! Mentions found in the initial text

mod common;

use common::{at_tag, extract_markdown, render_bracketed, spans, test_input, type_str, PLATFORMS};
use complete_mentions::input::{MentionInput, TagSpec};
use complete_mentions::mentions::Segment;
use complete_mentions::selection::Selection;
use complete_mentions::sync::HostPlatform;

const SERIALIZED: &str = "hey @[Bob](id:1), meet @[Eve](id:2)";

#[test]
fn test_initial_text_is_prepopulated() {
    let mut input = test_input(SERIALIZED, HostPlatform::Android);

    assert_eq!(input.text(), "hey Bob, meet Eve");
    assert_eq!(spans(&input), vec![(4, 7), (14, 17)]);
    assert_eq!(input.mentions()[1].id, "2");

    let output = input.refresh();
    assert_eq!(output.extracted, SERIALIZED);
    assert_eq!(
        output.segments,
        vec![
            Segment::Plain("hey ".into()),
            Segment::Mention {
                start: 4,
                end: 7,
                node: "[Bob]".into()
            },
            Segment::Plain(", meet ".into()),
            Segment::Mention {
                start: 14,
                end: 17,
                node: "[Eve]".into()
            },
        ]
    );
}

#[test]
fn test_add_tag_returns_initial_render() {
    let mut input = MentionInput::new("@[Bob](id:1)", HostPlatform::Ios, 10);
    let output = input.add_tag(at_tag());
    assert_eq!(
        output.segments,
        vec![Segment::Mention {
            start: 0,
            end: 3,
            node: "[Bob]".into()
        }]
    );
    assert_eq!(output.extracted, "@[Bob](id:1)");
}

#[test]
fn test_prepopulated_mentions_follow_edits() {
    for platform in PLATFORMS {
        let mut input = test_input(SERIALIZED, platform);
        input.update_selection(Selection::caret(17));
        type_str(&mut input, "!");
        assert_eq!(input.text(), "hey Bob, meet Eve!");

        input.update_selection(Selection::caret(0));
        type_str(&mut input, "Oh ");
        assert_eq!(spans(&input), vec![(7, 10), (17, 20)]);
        assert_eq!(
            input.refresh().extracted,
            "Oh hey @[Bob](id:1), meet @[Eve](id:2)!"
        );
    }
}

#[test]
fn test_malformed_pattern_leaves_text() {
    let mut input = MentionInput::new(SERIALIZED, HostPlatform::Android, 10);
    input.add_tag(TagSpec::new('@', render_bracketed, extract_markdown).with_pattern("@[("));
    assert_eq!(input.text(), SERIALIZED);
    assert!(input.mentions().is_empty());
}

#[test]
fn test_pattern_without_groups_leaves_text() {
    let mut input = MentionInput::new(SERIALIZED, HostPlatform::Android, 10);
    input.add_tag(
        TagSpec::new('@', render_bracketed, extract_markdown).with_pattern(r"@\[\w+\]"),
    );
    assert_eq!(input.text(), SERIALIZED);
    assert!(input.mentions().is_empty());
}

#[test]
fn test_prepopulation_with_format() {
    let mut input = MentionInput::new("cc @[Bob](id:1)", HostPlatform::Android, 10);
    input.add_tag(at_tag().with_format(|name| format!("@{}", name)));

    assert_eq!(input.text(), "cc @Bob");
    assert_eq!(input.mentions()[0].name, "@Bob");
    assert_eq!(input.mentions()[0].value, "Bob");
    assert_eq!(input.refresh().extracted, "cc @[Bob](id:1)");
}

#[test]
fn test_second_tag_shifts_first_tags_mentions() {
    let mut input = MentionInput::new("#[rust](id:r) @[Bob](id:1)", HostPlatform::Android, 10);
    input.add_tag(at_tag());
    assert_eq!(input.text(), "#[rust](id:r) Bob");
    assert_eq!(spans(&input), vec![(14, 17)]);

    input.add_tag(
        TagSpec::new(
            '#',
            |m| format!("<{}>", m.name),
            |m| format!("#[{}](id:{})", m.value, m.id),
        )
        .with_pattern(r"#\[(?P<name>[^\]]+)\]\(id:(?P<id>[^)]+)\)"),
    );

    assert_eq!(input.text(), "rust Bob");
    assert_eq!(spans(&input), vec![(0, 4), (5, 8)]);
    assert_eq!(input.mentions()[0].tag, '#');
    assert_eq!(input.refresh().extracted, "#[rust](id:r) @[Bob](id:1)");
}
