//! Word-by-word playback over a loaded book.
//!
//! The engine is a single-owner state machine driven by a virtual clock.
//! Nothing runs on its own: a driver calls [`PlaybackEngine::advance`] with
//! the time that has passed, and the engine fires whichever timers came due
//! in deadline order. At most one word timer and one rewind interval are
//! pending at any time, and every operation that changes direction or pace
//! cancels the pending timer before arming a new one, so a cancelled timer
//! never fires.
//!
//! A real-time driver sleeps for [`PlaybackEngine::time_until_next_event`]
//! and then advances by the time actually slept; tests advance by exact
//! amounts instead.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::{EpubDocument, TableOfContentsEntry};
use crate::pacing::{self, PunctuationMultipliers};

pub const DEFAULT_WORDS_PER_MINUTE: u32 = 250;

/// Reading pace, shared by the engine and whoever persists it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderSettings {
    pub words_per_minute: u32,
    pub multipliers: PunctuationMultipliers,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            multipliers: PunctuationMultipliers::default(),
        }
    }
}

/// Everything an observer may look at. Cloning is cheap: the word list and
/// the table of contents are shared.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackState {
    pub all_words: Arc<[String]>,
    pub table_of_contents: Arc<[TableOfContentsEntry]>,
    pub current_word_index: usize,
    pub current_chapter_index: usize,
    pub is_playing: bool,
    pub is_rewinding: bool,
    pub words_per_minute: u32,
    pub multipliers: PunctuationMultipliers,
}

impl PlaybackState {
    fn new(settings: ReaderSettings) -> Self {
        Self {
            all_words: Arc::from(Vec::new()),
            table_of_contents: Arc::from(Vec::new()),
            current_word_index: 0,
            current_chapter_index: 0,
            is_playing: false,
            is_rewinding: false,
            words_per_minute: settings.words_per_minute.max(1),
            multipliers: settings.multipliers,
        }
    }

    pub fn current_word(&self) -> Option<&str> {
        self.all_words.get(self.current_word_index).map(String::as_str)
    }

    pub fn current_chapter(&self) -> Option<&TableOfContentsEntry> {
        self.table_of_contents.get(self.current_chapter_index)
    }

    /// Fraction of the book already shown, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        match self.all_words.len() {
            0 | 1 => 0.0,
            n => self.current_word_index as f64 / (n - 1) as f64,
        }
    }

    pub fn settings(&self) -> ReaderSettings {
        ReaderSettings {
            words_per_minute: self.words_per_minute,
            multipliers: self.multipliers,
        }
    }
}

type UpdateObserver = Box<dyn FnMut(&PlaybackState)>;
type ChapterObserver = Box<dyn FnMut(usize)>;

/// Callbacks registered when the engine is built.
#[derive(Default)]
pub struct PlaybackObservers {
    on_update: Option<UpdateObserver>,
    on_chapter_change: Option<ChapterObserver>,
}

impl PlaybackObservers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the full state after every change.
    pub fn on_update(mut self, f: impl FnMut(&PlaybackState) + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    /// Called with the new chapter index when playback crosses into it.
    pub fn on_chapter_change(mut self, f: impl FnMut(usize) + 'static) -> Self {
        self.on_chapter_change = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for PlaybackObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackObservers")
            .field("on_update", &self.on_update.is_some())
            .field("on_chapter_change", &self.on_chapter_change.is_some())
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RewindTimer {
    due: Duration,
    period: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerKind {
    Word,
    Rewind,
}

#[derive(Debug)]
pub struct PlaybackEngine {
    state: PlaybackState,
    observers: PlaybackObservers,
    /// Virtual time since the engine was created.
    now: Duration,
    word_timer: Option<Duration>,
    rewind_timer: Option<RewindTimer>,
}

impl PlaybackEngine {
    pub fn new(observers: PlaybackObservers) -> Self {
        Self::with_settings(ReaderSettings::default(), observers)
    }

    pub fn with_settings(settings: ReaderSettings, observers: PlaybackObservers) -> Self {
        Self {
            state: PlaybackState::new(settings),
            observers,
            now: Duration::ZERO,
            word_timer: None,
            rewind_timer: None,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn load_book(&mut self, text: &str, table_of_contents: Vec<TableOfContentsEntry>) {
        self.state.all_words = text.split_whitespace().map(String::from).collect();
        self.state.table_of_contents = Arc::from(table_of_contents);
        self.state.current_word_index = 0;
        self.state.current_chapter_index = 0;
        self.state.is_playing = false;
        self.state.is_rewinding = false;
        self.clear_timers();
        log::debug!(
            "loaded {} words in {} chapters",
            self.state.all_words.len(),
            self.state.table_of_contents.len()
        );
        self.notify();
    }

    pub fn load_document(&mut self, document: &EpubDocument) {
        self.load_book(&document.all_text, document.table_of_contents.clone());
    }

    pub fn set_words_per_minute(&mut self, words_per_minute: u32) {
        self.state.words_per_minute = words_per_minute.max(1);
        if self.state.is_playing {
            self.reschedule();
        }
        self.notify();
    }

    pub fn set_punctuation_multipliers(&mut self, multipliers: PunctuationMultipliers) {
        self.state.multipliers = multipliers;
        if self.state.is_playing {
            self.reschedule();
        }
        self.notify();
    }

    pub fn start(&mut self) {
        if self.state.all_words.is_empty() || self.state.is_playing {
            return;
        }
        self.state.is_playing = true;
        self.reschedule();
        self.notify();
    }

    pub fn pause(&mut self) {
        if !self.state.is_playing {
            return;
        }
        self.state.is_playing = false;
        self.word_timer = None;
        self.notify();
    }

    pub fn toggle(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.start();
        }
    }

    pub fn reset(&mut self) {
        self.pause();
        self.stop_rewind();
        self.state.current_word_index = 0;
        self.state.current_chapter_index = 0;
        self.notify();
    }

    /// Moves the cursor, clamped to the word list. Active playback restarts
    /// from the new word with a fresh interval.
    pub fn navigate_to_word(&mut self, word_index: usize) {
        if self.state.all_words.is_empty() {
            return;
        }
        let was_playing = self.state.is_playing;
        if was_playing {
            self.pause();
        }

        let index = word_index.min(self.state.all_words.len() - 1);
        self.state.current_word_index = index;
        self.state.current_chapter_index = self.chapter_index(index);
        self.notify();

        if was_playing {
            self.start();
        }
    }

    pub fn navigate_to_chapter(&mut self, chapter_index: usize) {
        if let Some(entry) = self.state.table_of_contents.get(chapter_index) {
            let word_index = entry.word_start_index;
            self.navigate_to_word(word_index);
        }
    }

    pub fn start_rewind(&mut self) {
        if self.state.all_words.is_empty()
            || self.state.current_word_index == 0
            || self.state.is_rewinding
        {
            return;
        }
        if self.state.is_playing {
            self.pause();
        }

        self.state.is_rewinding = true;
        let period = pacing::rewind_interval(self.state.words_per_minute);
        self.rewind_timer = Some(RewindTimer {
            due: self.now.saturating_add(period),
            period,
        });
        self.notify();
    }

    pub fn stop_rewind(&mut self) {
        if !self.state.is_rewinding {
            return;
        }
        self.state.is_rewinding = false;
        self.rewind_timer = None;
        self.notify();
    }

    /// Drops pending timers without notifying anyone.
    pub fn shutdown(&mut self) {
        self.clear_timers();
    }

    /// Time left until the next pending timer, if any is armed.
    pub fn time_until_next_event(&self) -> Option<Duration> {
        self.next_timer()
            .map(|(due, _)| due.saturating_sub(self.now))
    }

    /// Lets `elapsed` of virtual time pass, firing every timer that comes
    /// due on the way. Timers armed by a firing timer are measured from
    /// its deadline, not from the end of the step.
    pub fn advance(&mut self, elapsed: Duration) {
        let target = self.now.saturating_add(elapsed);
        while let Some((due, kind)) = self.next_timer() {
            if due > target {
                break;
            }
            self.now = due;
            match kind {
                TimerKind::Word => {
                    self.word_timer = None;
                    self.on_word_timer();
                }
                TimerKind::Rewind => {
                    if let Some(timer) = self.rewind_timer.as_mut() {
                        timer.due = timer.due.saturating_add(timer.period);
                    }
                    self.on_rewind_tick();
                }
            }
        }
        self.now = target;
    }

    /// The earliest armed timer; the word timer wins a tie.
    fn next_timer(&self) -> Option<(Duration, TimerKind)> {
        let word = self.word_timer.map(|due| (due, TimerKind::Word));
        let rewind = self.rewind_timer.map(|t| (t.due, TimerKind::Rewind));
        match (word, rewind) {
            (Some(w), Some(r)) => Some(if r.0 < w.0 { r } else { w }),
            (w, r) => w.or(r),
        }
    }

    fn on_word_timer(&mut self) {
        if !self.state.is_playing {
            return;
        }
        self.state.current_word_index += 1;
        log::trace!("word {}", self.state.current_word_index);

        let chapter = self.chapter_index(self.state.current_word_index);
        if chapter != self.state.current_chapter_index {
            self.state.current_chapter_index = chapter;
            self.pause();
            log::debug!("reached chapter {chapter}, pausing");
            if let Some(on_chapter_change) = self.observers.on_chapter_change.as_mut() {
                on_chapter_change(chapter);
            }
            return;
        }

        self.notify();
        self.schedule_next_word();
    }

    fn on_rewind_tick(&mut self) {
        if self.state.current_word_index == 0 {
            self.stop_rewind();
            return;
        }
        self.state.current_word_index -= 1;
        self.state.current_chapter_index = self.chapter_index(self.state.current_word_index);
        if self.state.current_word_index == 0 {
            self.stop_rewind();
            return;
        }
        self.notify();
    }

    fn reschedule(&mut self) {
        self.word_timer = None;
        if self.state.is_playing {
            self.schedule_next_word();
        }
    }

    fn schedule_next_word(&mut self) {
        let index = self.state.current_word_index;
        if index + 1 >= self.state.all_words.len() {
            self.pause();
            return;
        }
        let interval = pacing::word_interval(
            &self.state.all_words[index],
            self.state.words_per_minute,
            &self.state.multipliers,
        );
        self.word_timer = Some(self.now.saturating_add(interval));
    }

    /// The last chapter starting at or before `word_index`.
    fn chapter_index(&self, word_index: usize) -> usize {
        self.state
            .table_of_contents
            .iter()
            .rposition(|entry| entry.word_start_index <= word_index)
            .unwrap_or(0)
    }

    fn clear_timers(&mut self) {
        self.word_timer = None;
        self.rewind_timer = None;
    }

    fn notify(&mut self) {
        if let Some(on_update) = self.observers.on_update.as_mut() {
            on_update(&self.state);
        }
    }
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new(PlaybackObservers::default())
    }
}
