//! Narration playback through the system output device using CPAL.

use crate::assets::AudioRef;
use crate::audio::wav::WavClip;
use crate::book::Seconds;
use crate::error::PlaybackError;
use crate::playback::{AudioPrimitive, PrimitiveEvent};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is owned by one `CpalPlayer` and only touched from the
/// thread that drives it; the audio callback communicates through atomics.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Playhead shared between the player and the audio callback.
#[derive(Debug, Default)]
struct PlayHead {
    /// Next frame to render.
    cursor: AtomicUsize,
    playing: AtomicBool,
    generation: AtomicU64,
    since_report: AtomicUsize,
}

/// Everything the audio callback needs.
struct Voice {
    clip: Arc<[f32]>,
    rate: u32,
    channels: usize,
    report_every: usize,
    head: Arc<PlayHead>,
    events: Sender<PrimitiveEvent>,
}

impl Voice {
    /// Fill one output buffer and report progress.
    fn render<T: Copy>(&self, out: &mut [T], silence: T, convert: impl Fn(f32) -> T) {
        // Read the generation first: a seek stores the cursor before bumping
        // it, so a position computed below is never stamped newer than it is.
        let generation = self.head.generation.load(Ordering::Acquire);
        if !self.head.playing.load(Ordering::Acquire) {
            out.fill(silence);
            return;
        }

        let start = self.head.cursor.load(Ordering::Acquire);
        let mut cursor = start;
        for frame in out.chunks_mut(self.channels.max(1)) {
            let value = match self.clip.get(cursor) {
                Some(&sample) => {
                    cursor += 1;
                    convert(sample)
                }
                None => silence,
            };
            frame.fill(value);
        }

        if self
            .head
            .cursor
            .compare_exchange(start, cursor, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            // A seek landed mid-buffer; its cursor wins.
            return;
        }

        if cursor >= self.clip.len() {
            if self.head.playing.swap(false, Ordering::AcqRel) {
                self.emit(PrimitiveEvent::Ended { generation });
            }
            return;
        }

        let advanced = cursor - start;
        let pending = self.head.since_report.fetch_add(advanced, Ordering::Relaxed) + advanced;
        if pending >= self.report_every {
            self.head.since_report.store(0, Ordering::Relaxed);
            self.emit(PrimitiveEvent::Advanced {
                generation,
                position: cursor as f64 / self.rate as f64,
            });
        }
    }

    fn emit(&self, event: PrimitiveEvent) {
        if self.events.send(event).is_err() {
            log::trace!("cpal: listener gone, dropping {:?}", event);
        }
    }
}

struct Bound {
    // Held for its Drop: dropping the stream stops the callback.
    _stream: SendableStream,
    head: Arc<PlayHead>,
    rate: u32,
    frames: usize,
}

/// Audio primitive backed by a CPAL output stream.
///
/// The stream runs for as long as a resource is bound and renders silence
/// while paused, so play and pause are just flag flips.
pub struct CpalPlayer {
    device_name: Option<String>,
    tick: Duration,
    bound: Option<Bound>,
}

impl CpalPlayer {
    /// `device_name` selects an output device by name; `None` uses the default.
    pub fn new(device_name: Option<&str>, tick: Duration) -> Self {
        Self {
            device_name: device_name.map(str::to_string),
            tick,
            bound: None,
        }
    }

    fn open_device(&self) -> Result<cpal::Device, PlaybackError> {
        let host = cpal::default_host();
        match &self.device_name {
            Some(name) => {
                let devices = host.output_devices().map_err(|e| PlaybackError::Device {
                    message: format!("Failed to enumerate output devices: {}", e),
                })?;
                for device in devices {
                    if let Ok(device_name) = device.name()
                        && &device_name == name
                    {
                        return Ok(device);
                    }
                }
                Err(PlaybackError::Device {
                    message: format!("Output device not found: {}", name),
                })
            }
            None => host
                .default_output_device()
                .ok_or_else(|| PlaybackError::Device {
                    message: "No default output device".to_string(),
                }),
        }
    }

    fn build_stream(
        device: &cpal::Device,
        supported: &cpal::SupportedStreamConfig,
        voice: Voice,
    ) -> Result<cpal::Stream, PlaybackError> {
        let config: cpal::StreamConfig = supported.config();
        let err_callback = |err| {
            log::error!("audio stream error: {}", err);
        };

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => device.build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    voice.render(data, 0.0, |s| s);
                },
                err_callback,
                None,
            ),
            cpal::SampleFormat::I16 => device.build_output_stream(
                &config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    voice.render(data, 0, |s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16);
                },
                err_callback,
                None,
            ),
            fmt => {
                return Err(PlaybackError::Device {
                    message: format!("Unsupported output sample format: {:?}", fmt),
                });
            }
        };

        stream.map_err(|e| PlaybackError::Device {
            message: format!("Failed to build output stream: {}", e),
        })
    }
}

/// Whether a default output device is present.
pub fn output_available() -> bool {
    cpal::default_host().default_output_device().is_some()
}

impl AudioPrimitive for CpalPlayer {
    fn load(
        &mut self,
        audio: &AudioRef,
        events: Sender<PrimitiveEvent>,
    ) -> Result<(), PlaybackError> {
        let previous_generation = self
            .bound
            .as_ref()
            .map_or(0, |b| b.head.generation.load(Ordering::Acquire));
        self.unload();

        let device = self.open_device()?;
        let supported = device
            .default_output_config()
            .map_err(|e| PlaybackError::Device {
                message: format!("Failed to query output config: {}", e),
            })?;
        let rate = supported.sample_rate().0;
        let clip = WavClip::open(audio)?.resampled(rate);

        let head = Arc::new(PlayHead::default());
        head.generation
            .store(previous_generation + 1, Ordering::Release);
        let voice = Voice {
            clip: clip.shared_samples(),
            rate,
            channels: supported.channels() as usize,
            report_every: ((rate as f64 * self.tick.as_secs_f64()) as usize).max(1),
            head: Arc::clone(&head),
            events,
        };

        let stream = Self::build_stream(&device, &supported, voice)?;
        stream.play().map_err(|e| PlaybackError::Device {
            message: format!("Failed to start output stream: {}", e),
        })?;

        log::debug!(
            "cpal: {} ({:.2}s at {} Hz, {} ch)",
            audio.describe(),
            clip.duration(),
            rate,
            supported.channels()
        );
        self.bound = Some(Bound {
            _stream: SendableStream(stream),
            head,
            rate,
            frames: clip.frames(),
        });
        Ok(())
    }

    fn unload(&mut self) {
        if let Some(bound) = self.bound.take() {
            bound.head.playing.store(false, Ordering::Release);
        }
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let bound = self.bound.as_ref().ok_or(PlaybackError::NotLoaded)?;
        bound.head.playing.store(true, Ordering::Release);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(bound) = &self.bound {
            bound.head.playing.store(false, Ordering::Release);
        }
    }

    fn set_position(&mut self, position: Seconds) {
        if let Some(bound) = &self.bound {
            let frame = ((position.max(0.0) * bound.rate as f64) as usize).min(bound.frames);
            bound.head.cursor.store(frame, Ordering::Release);
            bound.head.since_report.store(0, Ordering::Relaxed);
            bound.head.generation.fetch_add(1, Ordering::AcqRel);
        }
    }

    fn position(&self) -> Seconds {
        self.bound.as_ref().map_or(0.0, |b| {
            b.head.cursor.load(Ordering::Acquire) as f64 / b.rate as f64
        })
    }

    fn generation(&self) -> u64 {
        self.bound
            .as_ref()
            .map_or(0, |b| b.head.generation.load(Ordering::Acquire))
    }

    fn duration(&self) -> Option<Seconds> {
        self.bound
            .as_ref()
            .map(|b| b.frames as f64 / b.rate as f64)
    }

    fn name(&self) -> &'static str {
        "cpal"
    }
}
