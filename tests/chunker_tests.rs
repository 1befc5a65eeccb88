//! Reply chunking: size bound, reconstruction and line preservation.

use bocchi::chunker::{split_message, Boundary, Fragment, MessageChunker};
use rstest::rstest;

fn assert_bounded(fragments: &[Fragment], max: usize) {
    for fragment in fragments {
        assert!(
            fragment.text.chars().count() <= max,
            "fragment of {} chars exceeds {}",
            fragment.text.chars().count(),
            max
        );
    }
}

#[test]
fn test_many_short_lines() {
    let text = (0..5000)
        .map(|i| format!("line{:06}", i))
        .collect::<Vec<_>>()
        .join("\n");
    assert!(text.lines().all(|l| l.len() == 10));

    let chunker = MessageChunker::new(2000);
    let fragments = chunker.split(&text);

    assert!(fragments.len() > 1);
    assert_bounded(&fragments, 2000);
    assert_eq!(Fragment::rejoin(&fragments), text);
    // Every split happens between lines.
    assert!(fragments[..fragments.len() - 1]
        .iter()
        .all(|f| f.boundary == Boundary::Line));
    assert!(fragments
        .iter()
        .all(|f| f.text.split('\n').all(|l| l.len() == 10)));
}

#[test]
fn test_single_long_line() {
    let text = "x".repeat(5000);
    let chunker = MessageChunker::new(2000);
    let fragments = chunker.split(&text);

    let lengths: Vec<usize> = fragments.iter().map(|f| f.text.len()).collect();
    assert_eq!(lengths, vec![2000, 2000, 1000]);
    assert_eq!(fragments.concat_text(), text);
}

#[test]
fn test_text_within_limit_is_untouched() {
    let text = "short\nanswer";
    assert_eq!(split_message(text), vec![text.to_string()]);
}

#[test]
fn test_exactly_at_limit() {
    let text = "a".repeat(2000);
    assert_eq!(split_message(&text), vec![text]);
}

#[test]
fn test_default_limit_is_discord_limit() {
    let text = "b".repeat(2001);
    let parts = split_message(&text);
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].len(), 2000);
    assert_eq!(parts[1], "b");
}

#[rstest]
#[case("", 5)]
#[case("\n", 1)]
#[case("\n\n\n\n", 2)]
#[case("abc\ndef\nghi", 3)]
#[case("abc\ndef\nghi", 7)]
#[case("trailing newline\n", 4)]
#[case("\nleading newline", 4)]
#[case("mixed\n\nblank\n\n\nlines\n", 5)]
#[case("averyveryverylongline\nshort\nanotherverylongline", 6)]
#[case("日本語のテキスト\n改行あり\nとても長い行がここにあります", 4)]
fn test_rejoin_reproduces_input(#[case] text: &str, #[case] max: usize) {
    let fragments = MessageChunker::new(max).split(text);
    assert_bounded(&fragments, max);
    assert_eq!(Fragment::rejoin(&fragments), text);
}

#[test]
fn test_line_is_never_split_when_it_fits() {
    let text = "12345\n1234567890\n12";
    let chunker = MessageChunker::new(10);
    let parts = chunker.chunk(text);
    assert_eq!(parts, vec!["12345", "1234567890", "12"]);
}

#[test]
fn test_tail_of_hard_split_accumulates_following_lines() {
    let chunker = MessageChunker::new(5);
    let fragments = chunker.split("abcdefg\nh\ni");
    let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
    assert_eq!(texts, vec!["abcde", "fg\nh", "i"]);
    assert_eq!(fragments[0].boundary, Boundary::Hard);
    assert_eq!(fragments[1].boundary, Boundary::Line);
    assert_eq!(fragments[2].boundary, Boundary::End);
}

trait ConcatText {
    fn concat_text(&self) -> String;
}

impl ConcatText for Vec<Fragment> {
    fn concat_text(&self) -> String {
        self.iter().map(|f| f.text.as_str()).collect()
    }
}
