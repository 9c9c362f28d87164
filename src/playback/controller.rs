//! Navigation controller: the only writer of [`PlaybackState`].
//!
//! Every reader action and every clock event funnels through here. The
//! controller owns the loaded book, the bound audio resource (via the clock)
//! and the guard subscription, and keeps the three consistent with the state.

use super::clock::{ClockEvent, PlaybackClock};
use super::guard::{BoundaryGuard, GuardVerdict};
use super::highlight::highlight_index;
use super::primitive::{AudioPrimitive, PrimitiveEvent};
use super::state::{Phase, PlaybackState};
use crate::book::{Book, Page, Seconds};
use crate::error::{LoadError, PlaybackError};
use crossbeam_channel::Receiver;

pub struct NavigationController {
    clock: PlaybackClock,
    guard: BoundaryGuard,
    book: Option<Book>,
    state: PlaybackState,
    last_error: Option<PlaybackError>,
}

impl NavigationController {
    pub fn new(primitive: Box<dyn AudioPrimitive>) -> Self {
        Self {
            clock: PlaybackClock::new(primitive),
            guard: BoundaryGuard::new(),
            book: None,
            state: PlaybackState::default(),
            last_error: None,
        }
    }

    /// Load a book and bind its audio. `Idle | Ready -> Ready`.
    ///
    /// State resets to page 0, position 0, paused; the guard then rewinds to
    /// the first page's start. On failure the previous book is gone and the
    /// controller is `Idle`.
    pub fn load_book(&mut self, book: Book) -> Result<(), LoadError> {
        self.unload();

        if book.page_count() == 0 {
            return Err(LoadError::EmptyBook { book_id: book.id });
        }
        self.clock
            .load(book.audio())
            .map_err(|e| LoadError::AudioUnavailable {
                book_id: book.id.clone(),
                message: e.to_string(),
            })?;

        log::info!("loaded \"{}\" ({} pages)", book.title, book.page_count());
        self.book = Some(book);
        self.state = PlaybackState::default();
        self.rebind_guard();
        Ok(())
    }

    /// Drop the book and its audio. `Ready -> Idle`.
    pub fn unload(&mut self) {
        self.clock.unload();
        self.guard.unbind();
        self.book = None;
        self.state = PlaybackState::default();
        self.last_error = None;
    }

    /// Pause if playing, play otherwise. No-op while `Idle`.
    pub fn toggle_play_pause(&mut self) -> Result<(), PlaybackError> {
        if self.book.is_none() {
            return Ok(());
        }
        if self.state.is_playing {
            self.clock.pause();
            self.state.is_playing = false;
            Ok(())
        } else {
            self.start_playback()
        }
    }

    /// Move to the next page. Returns false (and changes nothing) at the last page.
    pub fn next_page(&mut self) -> bool {
        let target = self.state.active_page_index + 1;
        if target >= self.page_count() {
            return false;
        }
        self.turn_to(target)
    }

    /// Move to the previous page. Returns false (and changes nothing) at page 0.
    pub fn prev_page(&mut self) -> bool {
        match self.state.active_page_index.checked_sub(1) {
            Some(target) if target < self.page_count() => self.turn_to(target),
            _ => false,
        }
    }

    /// Jump to a word's start time and play from there.
    ///
    /// A start outside the active page is rewound to the page start and left
    /// paused. If playback cannot start the position stays at `start` so the
    /// reader can retry.
    pub fn seek_to_word(&mut self, start: Seconds) -> Result<(), PlaybackError> {
        if self.book.is_none() {
            return Ok(());
        }
        let start = start.max(0.0);
        self.clock.pause();
        self.clock.seek(start);
        self.state.position = start;
        self.state.is_playing = false;
        if self.run_guard() {
            return Ok(());
        }
        self.start_playback()
    }

    /// Seek to word `index` of the active page. Out-of-range indices are ignored.
    pub fn seek_to_word_index(&mut self, index: usize) -> Result<(), PlaybackError> {
        let Some(start) = self
            .active_page()
            .and_then(|page| page.word(index))
            .map(|word| word.start)
        else {
            return Ok(());
        };
        self.seek_to_word(start)
    }

    /// Apply one clock event.
    pub fn handle_clock_event(&mut self, event: ClockEvent) {
        match event {
            ClockEvent::PositionAdvanced(now) => {
                self.state.position = now;
                self.run_guard();
            }
            ClockEvent::Ended => {
                self.state.position = self.clock.position();
                self.state.is_playing = false;
                log::debug!("playback ended at {:.3}s", self.state.position);
            }
        }
    }

    /// Filter a raw primitive event through the clock and apply it.
    ///
    /// Returns the event that was applied, if it was not stale.
    pub fn handle_primitive_event(&mut self, event: PrimitiveEvent) -> Option<ClockEvent> {
        let accepted = self.clock.accept(event)?;
        self.handle_clock_event(accepted);
        Some(accepted)
    }

    /// Apply every clock event already queued.
    pub fn pump(&mut self) -> usize {
        let events = self.clock.drain();
        let count = events.len();
        for event in events {
            self.handle_clock_event(event);
        }
        count
    }

    /// Receiver of raw primitive events while a book is loaded.
    pub fn clock_events(&self) -> Option<Receiver<PrimitiveEvent>> {
        self.clock.events().cloned()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        if self.book.is_some() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }

    pub fn book(&self) -> Option<&Book> {
        self.book.as_ref()
    }

    pub fn active_page(&self) -> Option<&Page> {
        self.book
            .as_ref()
            .and_then(|book| book.page(self.state.active_page_index))
    }

    /// Word to highlight on the active page right now.
    pub fn highlighted_word(&self) -> Option<usize> {
        self.active_page()
            .and_then(|page| highlight_index(page, self.state.position, self.state.is_playing))
    }

    pub fn duration(&self) -> Option<Seconds> {
        self.clock.duration()
    }

    /// Most recent playback failure, kept until cleared or a play succeeds.
    pub fn last_error(&self) -> Option<&PlaybackError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    fn page_count(&self) -> usize {
        self.book.as_ref().map_or(0, Book::page_count)
    }

    fn start_playback(&mut self) -> Result<(), PlaybackError> {
        match self.clock.play() {
            Ok(()) => {
                self.state.is_playing = true;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                self.state.is_playing = false;
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    fn turn_to(&mut self, target: usize) -> bool {
        let Some(start) = self
            .book
            .as_ref()
            .and_then(|book| book.page(target))
            .map(|page| page.first().start)
        else {
            return false;
        };

        self.clock.pause();
        self.clock.seek(start);
        self.state.position = start;
        self.state.active_page_index = target;
        self.state.is_playing = false;
        self.rebind_guard();
        log::debug!("turned to page {} at {:.3}s", target, start);
        true
    }

    /// Subscribe the guard to the active page and check the current position.
    fn rebind_guard(&mut self) {
        let index = self.state.active_page_index;
        let Some(page) = self.book.as_ref().and_then(|book| book.page(index)) else {
            self.guard.unbind();
            return;
        };
        self.guard.bind(index, page);
        self.run_guard();
    }

    /// Returns true when the position was outside the page and got rewound.
    fn run_guard(&mut self) -> bool {
        let GuardVerdict::Violated { rewind_to } = self.guard.check(self.state.position) else {
            return false;
        };
        log::debug!(
            "guard: {:.3}s outside page {}, rewinding to {:.3}s",
            self.state.position,
            self.state.active_page_index,
            rewind_to
        );
        self.clock.pause();
        self.clock.seek(rewind_to);
        self.state.is_playing = false;
        self.state.position = rewind_to;
        true
    }
}
