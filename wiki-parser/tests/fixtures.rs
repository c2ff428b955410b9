use pretty_assertions::assert_eq;

use wiki_parser::{extract_paragraphs, extract_text};

#[test]
fn fixtures_match_expected_output() {
    let cases = [
        (
            "lead-with-infobox",
            include_str!("fixtures/html/lead-with-infobox.html"),
            include_str!("fixtures/expected/lead-with-infobox.txt"),
        ),
        (
            "line-breaks",
            include_str!("fixtures/html/line-breaks.html"),
            include_str!("fixtures/expected/line-breaks.txt"),
        ),
        (
            "no-paragraphs",
            include_str!("fixtures/html/no-paragraphs.html"),
            include_str!("fixtures/expected/no-paragraphs.txt"),
        ),
        (
            "sections-and-math",
            include_str!("fixtures/html/sections-and-math.html"),
            include_str!("fixtures/expected/sections-and-math.txt"),
        ),
    ];

    for (name, html, expected) in cases {
        let actual = extract_text(html);
        assert_eq!(
            actual,
            expected.trim_end_matches('\n'),
            "fixture mismatch: {name}"
        );
    }
}

#[test]
fn fixture_paragraphs_never_carry_citations_or_double_spaces() {
    let html = include_str!("fixtures/html/lead-with-infobox.html");
    let paragraphs = extract_paragraphs(html);

    assert_eq!(paragraphs.len(), 2);
    for paragraph in paragraphs {
        assert!(!paragraph.contains("  "), "double space in {paragraph:?}");
        assert!(!paragraph.contains("[1]"), "citation left in {paragraph:?}");
    }
}

#[test]
fn line_breaks_never_fuse_words() {
    let text = extract_text(include_str!("fixtures/html/line-breaks.html"));

    assert!(text.starts_with("Albert Einstein (14 March 1879"), "{text:?}");
    assert!(!text.contains("Einstein("), "{text:?}");
    assert!(!text.contains(")was"), "{text:?}");
}
