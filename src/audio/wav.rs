//! WAV narration decoding.

use crate::assets::AudioRef;
use crate::book::Seconds;
use crate::error::PlaybackError;
use std::io::Read;
use std::sync::Arc;

/// Header facts needed to drive a transport without decoding samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub frames: u32,
}

impl WavInfo {
    pub fn duration(&self) -> Seconds {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }
}

/// Read only the WAV header.
pub fn probe(audio: &AudioRef) -> Result<WavInfo, PlaybackError> {
    let reader = open(audio)?;
    let wav_reader = hound::WavReader::new(reader).map_err(|e| PlaybackError::Decode {
        message: format!("Failed to parse WAV file {}: {}", audio.describe(), e),
    })?;
    let spec = wav_reader.spec();
    Ok(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        frames: wav_reader.duration(),
    })
}

/// Decoded narration, downmixed to mono f32 in [-1, 1].
#[derive(Debug, Clone)]
pub struct WavClip {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl WavClip {
    pub fn open(audio: &AudioRef) -> Result<Self, PlaybackError> {
        Self::from_reader(open(audio)?)
    }

    /// Decode from any reader.
    ///
    /// Integer formats of any width and 32-bit float are accepted; channels
    /// are averaged to mono.
    pub fn from_reader(reader: Box<dyn Read + Send>) -> Result<Self, PlaybackError> {
        let mut wav_reader = hound::WavReader::new(reader).map_err(|e| PlaybackError::Decode {
            message: format!("Failed to parse WAV file: {}", e),
        })?;

        let spec = wav_reader.spec();
        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => wav_reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>(),
            hound::SampleFormat::Int => {
                let scale = (1u64 << spec.bits_per_sample.saturating_sub(1).min(31)) as f32;
                wav_reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<Vec<_>, _>>()
            }
        }
        .map_err(|e| PlaybackError::Decode {
            message: format!("Failed to read WAV samples: {}", e),
        })?;

        let channels = spec.channels.max(1) as usize;
        let samples: Vec<f32> = if channels == 1 {
            interleaved
        } else {
            interleaved
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        };

        Ok(Self {
            samples: Arc::from(samples),
            sample_rate: spec.sample_rate,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Shared handle to the sample buffer, for audio callbacks.
    pub fn shared_samples(&self) -> Arc<[f32]> {
        Arc::clone(&self.samples)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> usize {
        self.samples.len()
    }

    pub fn duration(&self) -> Seconds {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Copy of this clip at another sample rate.
    pub fn resampled(&self, to_rate: u32) -> Self {
        if to_rate == self.sample_rate {
            return self.clone();
        }
        Self {
            samples: Arc::from(resample(&self.samples, self.sample_rate, to_rate)),
            sample_rate: to_rate,
        }
    }
}

fn open(audio: &AudioRef) -> Result<Box<dyn Read + Send>, PlaybackError> {
    audio.open().map_err(|e| PlaybackError::NotReady {
        message: format!("{}: {}", audio.describe(), e),
    })
}

/// Simple linear interpolation resampling.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || from_rate == 0 || to_rate == 0 || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = (source_pos.floor() as usize).min(samples.len() - 1);
            let fraction = (source_pos - source_idx as f64) as f32;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx];
                let right = samples[source_idx + 1];
                left + (right - left) * fraction
            }
        })
        .collect()
}

/// Encode mono 16-bit PCM; used to build fixtures.
pub fn encode_pcm16(sample_rate: u32, samples: &[i16]) -> Result<Vec<u8>, PlaybackError> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let to_decode_error = |e: hound::Error| PlaybackError::Decode {
        message: format!("Failed to encode WAV: {}", e),
    };
    let mut writer = hound::WavWriter::new(&mut cursor, spec).map_err(to_decode_error)?;
    for &s in samples {
        writer.write_sample(s).map_err(to_decode_error)?;
    }
    writer.finalize().map_err(to_decode_error)?;
    Ok(cursor.into_inner())
}
