//! Playback clock adapter.
//!
//! Wraps one [`AudioPrimitive`] and turns its raw notifications into the two
//! events the engine reasons about: the position advanced, or the resource
//! ended. The primitive pushes; the clock only filters.

use super::primitive::{AudioPrimitive, PrimitiveEvent};
use crate::assets::AudioRef;
use crate::book::Seconds;
use crate::error::PlaybackError;
use crossbeam_channel::Receiver;

/// Event observed by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockEvent {
    PositionAdvanced(Seconds),
    Ended,
}

pub struct PlaybackClock {
    primitive: Box<dyn AudioPrimitive>,
    events: Option<Receiver<PrimitiveEvent>>,
    playing: bool,
    ended: bool,
}

impl PlaybackClock {
    pub fn new(primitive: Box<dyn AudioPrimitive>) -> Self {
        Self {
            primitive,
            events: None,
            playing: false,
            ended: false,
        }
    }

    /// Bind a new resource, dropping the previous one and its pending events.
    pub fn load(&mut self, audio: &AudioRef) -> Result<(), PlaybackError> {
        self.unload();
        let (tx, rx) = crossbeam_channel::unbounded();
        self.primitive.load(audio, tx)?;
        self.events = Some(rx);
        self.ended = false;
        log::debug!(
            "{}: bound {} ({:?}s)",
            self.primitive.name(),
            audio.describe(),
            self.primitive.duration()
        );
        Ok(())
    }

    pub fn unload(&mut self) {
        if self.events.take().is_some() {
            self.primitive.unload();
        }
        self.playing = false;
        self.ended = false;
    }

    pub fn is_loaded(&self) -> bool {
        self.events.is_some()
    }

    /// Start playback. Failure leaves the clock paused.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        if !self.is_loaded() {
            return Err(PlaybackError::NotLoaded);
        }
        match self.primitive.play() {
            Ok(()) => {
                self.playing = true;
                self.ended = false;
                Ok(())
            }
            Err(e) => {
                self.playing = false;
                log::warn!("{}: play failed: {}", self.primitive.name(), e);
                Err(e)
            }
        }
    }

    pub fn pause(&mut self) {
        if self.is_loaded() {
            self.primitive.pause();
        }
        self.playing = false;
    }

    /// Move the playhead. Events produced before the seek become stale.
    pub fn seek(&mut self, position: Seconds) {
        if !self.is_loaded() {
            return;
        }
        self.primitive.set_position(position.max(0.0));
        self.ended = false;
    }

    pub fn position(&self) -> Seconds {
        if self.is_loaded() {
            self.primitive.position()
        } else {
            0.0
        }
    }

    pub fn duration(&self) -> Option<Seconds> {
        self.events.as_ref().and_then(|_| self.primitive.duration())
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Receiver to select on; `None` while nothing is bound.
    pub fn events(&self) -> Option<&Receiver<PrimitiveEvent>> {
        self.events.as_ref()
    }

    /// Filter one raw event.
    ///
    /// Stale generations are dropped and `Ended` is reported at most once per
    /// play-through.
    pub fn accept(&mut self, event: PrimitiveEvent) -> Option<ClockEvent> {
        if !self.is_loaded() {
            return None;
        }
        let current = self.primitive.generation();
        if event.generation() != current {
            log::trace!(
                "dropping stale event (generation {} != {})",
                event.generation(),
                current
            );
            return None;
        }
        match event {
            PrimitiveEvent::Advanced { position, .. } => Some(ClockEvent::PositionAdvanced(position)),
            PrimitiveEvent::Ended { .. } => {
                if self.ended {
                    return None;
                }
                self.ended = true;
                self.playing = false;
                Some(ClockEvent::Ended)
            }
        }
    }

    /// Accept everything already queued, in order.
    pub fn drain(&mut self) -> Vec<ClockEvent> {
        let pending: Vec<PrimitiveEvent> = match &self.events {
            Some(rx) => rx.try_iter().collect(),
            None => return Vec::new(),
        };
        pending
            .into_iter()
            .filter_map(|event| self.accept(event))
            .collect()
    }
}
