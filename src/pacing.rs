use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Characters that may trail a sentence stop without ending the sentence
/// themselves: closing quotes and brackets, dashes and the ellipsis.
const TRAILING_SKIPPABLE: &[char] = &[
    '"', '\'', ')', ']', '}', '-',
    '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}',
    '\u{00AB}', '\u{00BB}', '\u{2039}', '\u{203A}',
    '\u{2010}', '\u{2013}', '\u{2014}', '\u{2026}',
];

/// A numeric citation (`[12]`, `(3)`) followed only by non-word characters.
static CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\[[0-9]+\]|\([0-9]+\))([^0-9A-Za-z_]*?)$").expect("valid citation pattern")
});

/// A bracketed tail that is shaped like a citation but is not one.
static CITATION_SHAPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\[[^\]]*[\])]|\([^)]*[)\]])$").expect("valid citation pattern")
});

static VALID_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\[[0-9]+\]|\([0-9]+\))$").expect("valid citation pattern"));

/// Delay factors applied to the base inter-word interval.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PunctuationMultipliers {
    pub period: f64,
    pub comma: f64,
    /// Semicolons and colons.
    pub semicolon: f64,
    /// Exclamation and question marks.
    pub exclamation: f64,
}

impl Default for PunctuationMultipliers {
    fn default() -> Self {
        Self {
            period: 3.0,
            comma: 2.0,
            semicolon: 2.5,
            exclamation: 3.0,
        }
    }
}

/// Strips citations, malformed citation tails and skippable trailing
/// characters until the word stops changing. Every step shortens the word,
/// so the loop ends.
fn strip_trailing_noise(word: &str) -> String {
    let mut word = word.to_string();
    loop {
        if let Some(citation) = CITATION.captures(&word).and_then(|c| c.get(1)).map(|m| m.range()) {
            // Whatever trailed the citation is examined on the next pass.
            word.replace_range(citation, "");
            continue;
        }

        if let Some(tail) = CITATION_SHAPED.find(&word)
            && !VALID_CITATION.is_match(tail.as_str())
        {
            let start = tail.start();
            word.truncate(start);
            continue;
        }

        let kept = word.trim_end_matches(TRAILING_SKIPPABLE).len();
        if kept == word.len() {
            return word;
        }
        word.truncate(kept);
    }
}

/// Multiplier for a word's trailing punctuation, using the default factors.
pub fn punctuation_multiplier(word: &str) -> f64 {
    punctuation_multiplier_with(word, &PunctuationMultipliers::default())
}

pub fn punctuation_multiplier_with(word: &str, multipliers: &PunctuationMultipliers) -> f64 {
    match strip_trailing_noise(word).chars().next_back() {
        Some('.') => multipliers.period,
        Some(',') => multipliers.comma,
        Some(';' | ':') => multipliers.semicolon,
        Some('!' | '?') => multipliers.exclamation,
        _ => 1.0,
    }
}

/// Shortest base interval between two words, whatever the rate.
pub const MIN_WORD_INTERVAL_MS: f64 = 50.0;
/// Rewinding runs at twice the reading rate, up to this many words per minute.
pub const MAX_REWIND_WPM: u32 = 800;
pub const MIN_REWIND_INTERVAL_MS: f64 = 25.0;

/// How long `word` stays on screen at the given rate.
pub fn word_interval(word: &str, words_per_minute: u32, multipliers: &PunctuationMultipliers) -> Duration {
    let base_ms = (60_000.0 / f64::from(words_per_minute.max(1))).max(MIN_WORD_INTERVAL_MS);
    millis(base_ms * punctuation_multiplier_with(word, multipliers))
}

/// Spacing of rewind ticks for the given forward reading rate.
pub fn rewind_interval(words_per_minute: u32) -> Duration {
    let rewind_wpm = words_per_minute.max(1).saturating_mul(2).min(MAX_REWIND_WPM);
    millis((60_000.0 / f64::from(rewind_wpm)).max(MIN_REWIND_INTERVAL_MS))
}

/// Rounds to whole microseconds so that intervals like 50ms stay exact.
fn millis(ms: f64) -> Duration {
    if !ms.is_finite() || ms <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_micros((ms * 1000.0).round() as u64)
}
