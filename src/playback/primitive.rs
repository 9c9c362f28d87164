use crate::assets::AudioRef;
use crate::book::Seconds;
use crate::error::PlaybackError;
use crossbeam_channel::Sender;
use std::sync::{Arc, Mutex, MutexGuard};

/// Notification pushed by an audio primitive.
///
/// Every event carries the primitive's generation at the time it was produced
/// so consumers can discard events that predate a seek or a reload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveEvent {
    Advanced { generation: u64, position: Seconds },
    Ended { generation: u64 },
}

impl PrimitiveEvent {
    pub fn generation(&self) -> u64 {
        match self {
            PrimitiveEvent::Advanced { generation, .. } | PrimitiveEvent::Ended { generation } => {
                *generation
            }
        }
    }
}

/// Trait for audio playback devices.
///
/// Implementations push [`PrimitiveEvent`]s on the sender handed to `load`, at
/// whatever cadence the underlying device produces them. `load` and
/// `set_position` must bump the generation.
pub trait AudioPrimitive: Send {
    /// Bind a resource. Position resets to 0 and playback is paused.
    fn load(
        &mut self,
        audio: &AudioRef,
        events: Sender<PrimitiveEvent>,
    ) -> Result<(), PlaybackError>;

    /// Release the bound resource, if any.
    fn unload(&mut self);

    /// Start or resume playback from the current position.
    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    /// Move the playhead. Legal while paused or playing.
    fn set_position(&mut self, position: Seconds);

    fn position(&self) -> Seconds;

    /// Current event generation.
    fn generation(&self) -> u64;

    /// Length of the bound resource, if known.
    fn duration(&self) -> Option<Seconds>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "audio"
    }
}

/// Calls recorded by [`MockAudioPrimitive`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Load,
    Unload,
    Play,
    Pause,
    SetPosition(Seconds),
}

#[derive(Debug, Default)]
struct MockState {
    loaded: bool,
    playing: bool,
    position: Seconds,
    generation: u64,
    duration: Option<Seconds>,
    events: Option<Sender<PrimitiveEvent>>,
    calls: Vec<MockCall>,
    load_failure: Option<PlaybackError>,
    play_failure: Option<PlaybackError>,
}

/// Mock audio primitive for testing.
///
/// Clones share state, so a test can keep one handle while the engine owns
/// another, then drive playback with [`advance_to`](Self::advance_to) and
/// [`finish`](Self::finish).
#[derive(Debug, Clone, Default)]
pub struct MockAudioPrimitive {
    state: Arc<Mutex<MockState>>,
}

impl MockAudioPrimitive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the reported resource length.
    pub fn with_duration(self, duration: Seconds) -> Self {
        self.lock().duration = Some(duration);
        self
    }

    /// Configure `load` to fail.
    pub fn with_load_failure(self, error: PlaybackError) -> Self {
        self.lock().load_failure = Some(error);
        self
    }

    /// Configure `play` to fail.
    pub fn with_play_failure(self, error: PlaybackError) -> Self {
        self.set_play_failure(Some(error));
        self
    }

    /// Change play behavior after construction (e.g. to test a retry).
    pub fn set_play_failure(&self, error: Option<PlaybackError>) {
        self.lock().play_failure = error;
    }

    pub fn is_playing(&self) -> bool {
        self.lock().playing
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().loaded
    }

    pub fn current_position(&self) -> Seconds {
        self.lock().position
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Simulate the device reaching `position` and notifying it.
    ///
    /// Returns false when no listener is attached.
    pub fn advance_to(&self, position: Seconds) -> bool {
        let mut state = self.lock();
        state.position = position;
        let event = PrimitiveEvent::Advanced {
            generation: state.generation,
            position,
        };
        Self::send(&state, event)
    }

    /// Push an event stamped with an older generation.
    pub fn emit_stale(&self, position: Seconds) -> bool {
        let state = self.lock();
        let event = PrimitiveEvent::Advanced {
            generation: state.generation.wrapping_sub(1),
            position,
        };
        Self::send(&state, event)
    }

    /// Simulate the resource running out.
    pub fn finish(&self) -> bool {
        let mut state = self.lock();
        state.playing = false;
        if let Some(duration) = state.duration {
            state.position = duration;
        }
        let event = PrimitiveEvent::Ended {
            generation: state.generation,
        };
        Self::send(&state, event)
    }

    fn send(state: &MockState, event: PrimitiveEvent) -> bool {
        state
            .events
            .as_ref()
            .is_some_and(|tx| tx.send(event).is_ok())
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AudioPrimitive for MockAudioPrimitive {
    fn load(
        &mut self,
        _audio: &AudioRef,
        events: Sender<PrimitiveEvent>,
    ) -> Result<(), PlaybackError> {
        let mut state = self.lock();
        state.calls.push(MockCall::Load);
        if let Some(error) = state.load_failure.clone() {
            return Err(error);
        }
        state.loaded = true;
        state.playing = false;
        state.position = 0.0;
        state.generation += 1;
        state.events = Some(events);
        Ok(())
    }

    fn unload(&mut self) {
        let mut state = self.lock();
        state.calls.push(MockCall::Unload);
        state.loaded = false;
        state.playing = false;
        state.events = None;
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let mut state = self.lock();
        state.calls.push(MockCall::Play);
        if !state.loaded {
            return Err(PlaybackError::NotLoaded);
        }
        if let Some(error) = state.play_failure.clone() {
            return Err(error);
        }
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.lock();
        state.calls.push(MockCall::Pause);
        state.playing = false;
    }

    fn set_position(&mut self, position: Seconds) {
        let mut state = self.lock();
        state.calls.push(MockCall::SetPosition(position));
        state.position = position;
        state.generation += 1;
    }

    fn position(&self) -> Seconds {
        self.lock().position
    }

    fn generation(&self) -> u64 {
        self.lock().generation
    }

    fn duration(&self) -> Option<Seconds> {
        self.lock().duration
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
