//! Maps the playback position onto the word to emphasize.

use crate::book::{Page, Seconds};

/// Index of the word being spoken at `now`, if any.
///
/// Nothing is highlighted while paused. Word intervals are half-open
/// (`start <= now < end`) except for the page's last word, which stays lit up
/// to and including the page window's end. Overlapping words resolve to the
/// first match.
pub fn highlight_index(page: &Page, now: Seconds, is_playing: bool) -> Option<usize> {
    if !is_playing {
        return None;
    }
    let last = page.len() - 1;
    page.words().iter().enumerate().position(|(i, word)| {
        word.start <= now && (now < word.end || (i == last && now == word.end))
    })
}
