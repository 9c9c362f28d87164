//! Serial event loop around the navigation controller.
//!
//! Reader commands and clock events arrive on separate channels; the session
//! handles exactly one at a time and reports what changed to an observer.

use super::clock::ClockEvent;
use super::controller::NavigationController;
use super::primitive::{AudioPrimitive, PrimitiveEvent};
use super::state::{Phase, PlaybackState};
use crate::book::{Book, Seconds};
use crate::error::PlaybackError;
use crossbeam_channel::{Receiver, Sender, never, select};

/// Reader action delivered to the session.
#[derive(Debug)]
pub enum Command {
    Load(Box<Book>),
    Unload,
    TogglePlayPause,
    NextPage,
    PrevPage,
    SeekToWord(Seconds),
    SeekToWordIndex(usize),
    /// Try again to start playback after a failure.
    Retry,
    Quit,
}

/// Change reported after a command or clock event was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    BookLoaded { id: String, pages: usize },
    LoadFailed { message: String },
    Unloaded,
    PageShown { index: usize, count: usize },
    HighlightChanged { page: usize, word: Option<usize> },
    PlayingChanged { playing: bool },
    Ended { position: Seconds },
    PlaybackFailed(PlaybackError),
}

/// Receives session events, with read access to the controller for rendering.
pub trait SessionObserver {
    fn notify(&mut self, controller: &NavigationController, event: &SessionEvent);
}

/// Collects events; handy in tests.
impl SessionObserver for Vec<SessionEvent> {
    fn notify(&mut self, _controller: &NavigationController, event: &SessionEvent) {
        self.push(event.clone());
    }
}

/// Forwards events to another thread. A closed channel is ignored.
impl SessionObserver for Sender<SessionEvent> {
    fn notify(&mut self, _controller: &NavigationController, event: &SessionEvent) {
        if self.send(event.clone()).is_err() {
            log::trace!("session observer channel closed");
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
struct Snapshot {
    phase: Phase,
    state: PlaybackState,
    highlight: Option<usize>,
}

pub struct Session<O: SessionObserver> {
    controller: NavigationController,
    observer: O,
    clock_closed: bool,
}

impl<O: SessionObserver> Session<O> {
    pub fn new(primitive: Box<dyn AudioPrimitive>, observer: O) -> Self {
        Self {
            controller: NavigationController::new(primitive),
            observer,
            clock_closed: false,
        }
    }

    pub fn controller(&self) -> &NavigationController {
        &self.controller
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Run until `Command::Quit` or until every command sender is dropped.
    pub fn run(&mut self, commands: Receiver<Command>) {
        loop {
            let clock_rx = match self.controller.clock_events() {
                Some(rx) if !self.clock_closed => rx,
                _ => never(),
            };

            select! {
                recv(commands) -> msg => match msg {
                    Ok(Command::Quit) | Err(_) => break,
                    Ok(command) => self.handle_command(command),
                },
                recv(clock_rx) -> msg => match msg {
                    Ok(event) => self.handle_primitive_event(event),
                    Err(_) => {
                        log::warn!("audio event channel closed");
                        self.clock_closed = true;
                    }
                },
            }
        }
        self.controller.unload();
    }

    /// Handle one command. `Quit` is a no-op here; only `run` stops on it.
    pub fn handle_command(&mut self, command: Command) {
        let before = self.snapshot();
        let mut extra = Vec::new();

        match command {
            Command::Load(book) => {
                let id = book.id.clone();
                match self.controller.load_book(*book) {
                    Ok(()) => {
                        self.clock_closed = false;
                        extra.push(SessionEvent::BookLoaded {
                            id,
                            pages: self.controller.book().map_or(0, Book::page_count),
                        });
                    }
                    Err(e) => {
                        log::warn!("failed to load {}: {}", id, e);
                        extra.push(SessionEvent::LoadFailed {
                            message: e.to_string(),
                        });
                    }
                }
            }
            Command::Unload => {
                if self.controller.phase() == Phase::Ready {
                    self.controller.unload();
                    extra.push(SessionEvent::Unloaded);
                }
            }
            Command::TogglePlayPause => {
                if let Err(e) = self.controller.toggle_play_pause() {
                    extra.push(SessionEvent::PlaybackFailed(e));
                }
            }
            Command::NextPage => {
                self.controller.next_page();
            }
            Command::PrevPage => {
                self.controller.prev_page();
            }
            Command::SeekToWord(start) => {
                if let Err(e) = self.controller.seek_to_word(start) {
                    extra.push(SessionEvent::PlaybackFailed(e));
                }
            }
            Command::SeekToWordIndex(index) => {
                if let Err(e) = self.controller.seek_to_word_index(index) {
                    extra.push(SessionEvent::PlaybackFailed(e));
                }
            }
            Command::Retry => {
                let failed = self.controller.last_error().is_some();
                if failed && !self.controller.state().is_playing {
                    if let Err(e) = self.controller.toggle_play_pause() {
                        extra.push(SessionEvent::PlaybackFailed(e));
                    }
                }
            }
            Command::Quit => {}
        }

        self.publish(before, extra);
    }

    /// Handle one raw event from the audio primitive.
    pub fn handle_primitive_event(&mut self, event: PrimitiveEvent) {
        let before = self.snapshot();
        let mut extra = Vec::new();
        if let Some(ClockEvent::Ended) = self.controller.handle_primitive_event(event) {
            extra.push(SessionEvent::Ended {
                position: self.controller.state().position,
            });
        }
        self.publish(before, extra);
    }

    /// Handle every clock event already queued. Returns how many were raw events.
    pub fn pump(&mut self) -> usize {
        let Some(rx) = self.controller.clock_events() else {
            return 0;
        };
        let pending: Vec<PrimitiveEvent> = rx.try_iter().collect();
        let count = pending.len();
        for event in pending {
            self.handle_primitive_event(event);
        }
        count
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.controller.phase(),
            state: self.controller.state(),
            highlight: self.controller.highlighted_word(),
        }
    }

    fn publish(&mut self, before: Snapshot, extra: Vec<SessionEvent>) {
        let after = self.snapshot();
        let mut events = extra;

        if after.phase == Phase::Ready {
            let page_changed = before.phase != Phase::Ready
                || before.state.active_page_index != after.state.active_page_index
                || events
                    .iter()
                    .any(|e| matches!(e, SessionEvent::BookLoaded { .. }));
            if page_changed {
                events.push(SessionEvent::PageShown {
                    index: after.state.active_page_index,
                    count: self.controller.book().map_or(0, Book::page_count),
                });
            }
            if before.state.is_playing != after.state.is_playing {
                events.push(SessionEvent::PlayingChanged {
                    playing: after.state.is_playing,
                });
            }
            if page_changed || before.highlight != after.highlight {
                events.push(SessionEvent::HighlightChanged {
                    page: after.state.active_page_index,
                    word: after.highlight,
                });
            }
        }

        for event in &events {
            self.observer.notify(&self.controller, event);
        }
    }
}
