//! Wall-clock transport that plays narration silently.
//!
//! Reads only the WAV header for the duration, then advances the position in
//! real time on a ticker thread. Useful on machines without an output device
//! and for driving the engine in tests.

use crate::assets::AudioRef;
use crate::audio::wav;
use crate::book::Seconds;
use crate::error::PlaybackError;
use crate::playback::{AudioPrimitive, PrimitiveEvent};
use crossbeam_channel::{Sender, select};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Transport {
    loaded: bool,
    playing: bool,
    /// Position at `anchored_at`.
    anchor: Seconds,
    anchored_at: Option<Instant>,
    duration: Seconds,
    generation: u64,
    events: Option<Sender<PrimitiveEvent>>,
}

impl Transport {
    fn position(&self) -> Seconds {
        match (self.playing, self.anchored_at) {
            (true, Some(at)) => (self.anchor + at.elapsed().as_secs_f64()).min(self.duration),
            _ => self.anchor,
        }
    }

    /// Called once per tick from the ticker thread.
    fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let position = self.position();
        let event = if position >= self.duration {
            self.playing = false;
            self.anchor = self.duration;
            self.anchored_at = None;
            PrimitiveEvent::Ended {
                generation: self.generation,
            }
        } else {
            PrimitiveEvent::Advanced {
                generation: self.generation,
                position,
            }
        };
        if let Some(tx) = &self.events
            && tx.send(event).is_err()
        {
            log::trace!("headless: listener gone, dropping {:?}", event);
        }
    }
}

struct Ticker {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// Silent transport driven by the wall clock.
pub struct HeadlessPlayer {
    tick: Duration,
    transport: Arc<Mutex<Transport>>,
    ticker: Option<Ticker>,
}

impl HeadlessPlayer {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            transport: Arc::new(Mutex::new(Transport::default())),
            ticker: None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Transport> {
        self.transport.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn start_ticker(&mut self) -> Result<(), PlaybackError> {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);
        let transport = Arc::clone(&self.transport);
        let ticks = crossbeam_channel::tick(self.tick);

        let handle = std::thread::Builder::new()
            .name("readalong-ticker".to_string())
            .spawn(move || {
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticks) -> _ => {
                            transport.lock().unwrap_or_else(|e| e.into_inner()).tick();
                        }
                    }
                }
            })
            .map_err(|e| PlaybackError::Device {
                message: format!("Failed to spawn ticker thread: {}", e),
            })?;

        self.ticker = Some(Ticker {
            stop: stop_tx,
            handle,
        });
        Ok(())
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            drop(ticker.stop);
            if ticker.handle.join().is_err() {
                log::warn!("headless: ticker thread panicked");
            }
        }
    }
}

impl Default for HeadlessPlayer {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::defaults::TICK_MS))
    }
}

impl AudioPrimitive for HeadlessPlayer {
    fn load(
        &mut self,
        audio: &AudioRef,
        events: Sender<PrimitiveEvent>,
    ) -> Result<(), PlaybackError> {
        self.unload();
        let info = wav::probe(audio)?;

        {
            let mut t = self.lock();
            t.loaded = true;
            t.playing = false;
            t.anchor = 0.0;
            t.anchored_at = None;
            t.duration = info.duration();
            t.generation += 1;
            t.events = Some(events);
        }
        self.start_ticker()?;
        log::debug!(
            "headless: {} ({:.2}s, {} Hz)",
            audio.describe(),
            info.duration(),
            info.sample_rate
        );
        Ok(())
    }

    fn unload(&mut self) {
        self.stop_ticker();
        let mut t = self.lock();
        t.loaded = false;
        t.playing = false;
        t.anchor = 0.0;
        t.anchored_at = None;
        t.events = None;
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let mut t = self.lock();
        if !t.loaded {
            return Err(PlaybackError::NotLoaded);
        }
        if !t.playing {
            t.playing = true;
            t.anchored_at = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        let mut t = self.lock();
        t.anchor = t.position();
        t.playing = false;
        t.anchored_at = None;
    }

    fn set_position(&mut self, position: Seconds) {
        let mut t = self.lock();
        t.anchor = position.clamp(0.0, t.duration);
        if t.playing {
            t.anchored_at = Some(Instant::now());
        }
        t.generation += 1;
    }

    fn position(&self) -> Seconds {
        self.lock().position()
    }

    fn generation(&self) -> u64 {
        self.lock().generation
    }

    fn duration(&self) -> Option<Seconds> {
        let t = self.lock();
        t.loaded.then_some(t.duration)
    }

    fn name(&self) -> &'static str {
        "headless"
    }
}

impl Drop for HeadlessPlayer {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}
