use std::time::Duration;

use speed_reader::{
    PunctuationMultipliers, punctuation_multiplier as pm, punctuation_multiplier_with, rewind_interval,
    word_interval,
};

#[test]
fn basic_punctuation() {
    assert_eq!(pm("hello."), 3.0);
    assert_eq!(pm("hello,"), 2.0);
    assert_eq!(pm("hello;"), 2.5);
    assert_eq!(pm("follows:"), 2.5);
    assert_eq!(pm("hello!"), 3.0);
    assert_eq!(pm("really?"), 3.0);
    assert_eq!(pm("hello"), 1.0);
    assert_eq!(pm("test123"), 1.0);
}

#[test]
fn trailing_quotes_and_brackets() {
    assert_eq!(pm("hello.\""), 3.0);
    assert_eq!(pm("said,'"), 2.0);
    assert_eq!(pm("why?\""), 3.0);
    assert_eq!(pm("hello.\u{2019}"), 3.0);
    assert_eq!(pm("said,\u{201D}"), 2.0);
    assert_eq!(pm("yes!)"), 3.0);
    assert_eq!(pm("said,]"), 2.0);
    assert_eq!(pm("hello.\")"), 3.0);
    assert_eq!(pm("said,\")]"), 2.0);
    assert_eq!(pm("\u{00AB}Oui.\u{00BB}"), 3.0);
}

#[test]
fn numeric_citations() {
    assert_eq!(pm("sentence.[1]"), 3.0);
    assert_eq!(pm("quote.[4567]"), 3.0);
    assert_eq!(pm("fact.(123)"), 3.0);
    assert_eq!(pm("however,[1]"), 2.0);
    assert_eq!(pm("listed;[1]"), 2.5);
    assert_eq!(pm("really?(4)"), 3.0);
    assert_eq!(pm("word[1]"), 1.0);
    assert_eq!(pm("word(2)"), 1.0);
}

#[test]
fn citations_followed_by_quotes() {
    assert_eq!(pm("sentence.[1]\""), 3.0);
    assert_eq!(pm("statement.(2)'"), 3.0);
    assert_eq!(pm("quote,[3]\""), 2.0);
    assert_eq!(pm("said.(4)\u{2019}"), 3.0);
}

#[test]
fn malformed_citation_tails() {
    assert_eq!(pm("word.[abc]"), 3.0);
    assert_eq!(pm("word.[]"), 3.0);
    assert_eq!(pm("word.[1)"), 3.0);
    assert_eq!(pm("word.(1]"), 3.0);
    assert_eq!(pm("study,(Smith)"), 2.0);
    // Not closed, or never opened: nothing to strip as a unit.
    assert_eq!(pm("word.[1"), 1.0);
    assert_eq!(pm("word.1]"), 1.0);
}

#[test]
fn stacked_citations() {
    assert_eq!(pm("word.[1][2]"), 3.0);
    assert_eq!(pm("word.,[1][2]"), 2.0);
    assert_eq!(pm("said.[1]\"),"), 2.0);
    assert_eq!(pm("however,[2]\"\u{2014}"), 2.0);
}

#[test]
fn dashes_and_ellipses() {
    assert_eq!(pm("word\u{2014}"), 1.0);
    assert_eq!(pm("word\u{2013}"), 1.0);
    assert_eq!(pm("word\u{2026}"), 1.0);
    assert_eq!(pm("sentence.\u{2014}"), 3.0);
    assert_eq!(pm("sentence.\u{2026}"), 3.0);
    assert_eq!(pm("well--"), 1.0);
}

#[test]
fn degenerate_words() {
    assert_eq!(pm(""), 1.0);
    assert_eq!(pm("\""), 1.0);
    assert_eq!(pm("\"\"\""), 1.0);
    assert_eq!(pm("]"), 1.0);
    assert_eq!(pm("}"), 1.0);
    assert_eq!(pm("[1]"), 1.0);
    assert_eq!(pm("."), 3.0);
}

#[test]
fn dialogue() {
    assert_eq!(pm("\"Hello.\""), 3.0);
    assert_eq!(pm("\"Yes,\""), 2.0);
    assert_eq!(pm("\"Really?\""), 3.0);
    assert_eq!(pm("\"Wow!\""), 3.0);
}

#[test]
fn custom_multipliers() {
    let custom = PunctuationMultipliers {
        period: 5.0,
        comma: 3.0,
        semicolon: 4.0,
        exclamation: 6.0,
    };
    assert_eq!(punctuation_multiplier_with("hello.", &custom), 5.0);
    assert_eq!(punctuation_multiplier_with("hello,", &custom), 3.0);
    assert_eq!(punctuation_multiplier_with("hello;", &custom), 4.0);
    assert_eq!(punctuation_multiplier_with("hello!", &custom), 6.0);
    assert_eq!(punctuation_multiplier_with("hello", &custom), 1.0);
}

#[test]
fn word_intervals() {
    let defaults = PunctuationMultipliers::default();
    assert_eq!(word_interval("plain", 60, &defaults), Duration::from_secs(1));
    assert_eq!(word_interval("stop.", 60, &defaults), Duration::from_secs(3));
    assert_eq!(word_interval("pause,", 250, &defaults), Duration::from_millis(480));
    // Very high rates are floored at 50ms per word.
    assert_eq!(word_interval("fast", 60_000, &defaults), Duration::from_millis(50));
    assert_eq!(word_interval("fast;", 60_000, &defaults), Duration::from_millis(125));
    assert_eq!(word_interval("zero", 0, &defaults), Duration::from_secs(60));
}

#[test]
fn rewind_intervals() {
    assert_eq!(rewind_interval(250), Duration::from_millis(120));
    assert_eq!(rewind_interval(300), Duration::from_millis(100));
    assert_eq!(rewind_interval(60_000), Duration::from_millis(75));
    assert_eq!(rewind_interval(u32::MAX), Duration::from_millis(75));
}
