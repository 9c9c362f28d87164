//! Pages of timed words and their playback windows.

use super::word::{Seconds, TimedWord};

/// Closed time interval `[start, end]` covered by a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: Seconds,
    pub end: Seconds,
}

impl TimeWindow {
    pub fn contains(&self, t: Seconds) -> bool {
        self.start <= t && t <= self.end
    }
}

/// A non-empty batch of words displayed together.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    words: Vec<TimedWord>,
}

impl Page {
    /// Returns `None` for an empty word list; a page always has a first word.
    pub fn new(words: Vec<TimedWord>) -> Option<Self> {
        if words.is_empty() {
            None
        } else {
            Some(Self { words })
        }
    }

    pub fn words(&self) -> &[TimedWord] {
        &self.words
    }

    pub fn word(&self, index: usize) -> Option<&TimedWord> {
        self.words.get(index)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false; kept so `len` has its conventional partner.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn first(&self) -> &TimedWord {
        &self.words[0]
    }

    pub fn last(&self) -> &TimedWord {
        &self.words[self.words.len() - 1]
    }

    /// `[first.start, last.end]`. Words inside may overlap.
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.first().start,
            end: self.last().end,
        }
    }

    /// Page text as displayed, words separated by single spaces.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn into_words(self) -> Vec<TimedWord> {
        self.words
    }
}
