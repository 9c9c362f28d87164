//! Audio primitives: WAV decoding, a silent wall-clock transport, and (with
//! the `cpal-audio` feature) real output through the sound card.

pub mod headless;
#[cfg(feature = "cpal-audio")]
pub mod output;
pub mod wav;

pub use headless::HeadlessPlayer;
#[cfg(feature = "cpal-audio")]
pub use output::CpalPlayer;
pub use wav::{WavClip, WavInfo};

use crate::error::PlaybackError;
use crate::playback::AudioPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Which audio primitive drives playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Sound card when one is available, otherwise headless.
    #[default]
    Auto,
    Headless,
    Cpal,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Auto => write!(f, "auto"),
            Backend::Headless => write!(f, "headless"),
            Backend::Cpal => write!(f, "cpal"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Backend::Auto),
            "headless" | "none" => Ok(Backend::Headless),
            "cpal" => Ok(Backend::Cpal),
            other => Err(format!(
                "unknown audio backend '{}' (expected auto, headless or cpal)",
                other
            )),
        }
    }
}

/// Build the primitive for `backend`.
///
/// `device` names a sound card output; it is ignored by the headless transport.
pub fn open_primitive(
    backend: Backend,
    tick: Duration,
    device: Option<&str>,
) -> Result<Box<dyn AudioPrimitive>, PlaybackError> {
    match backend {
        Backend::Headless => Ok(Box::new(HeadlessPlayer::new(tick))),
        Backend::Cpal => cpal_primitive(tick, device),
        Backend::Auto => {
            if sound_card_available() {
                cpal_primitive(tick, device)
            } else {
                log::info!("no audio output device, playing silently");
                Ok(Box::new(HeadlessPlayer::new(tick)))
            }
        }
    }
}

#[cfg(feature = "cpal-audio")]
fn cpal_primitive(
    tick: Duration,
    device: Option<&str>,
) -> Result<Box<dyn AudioPrimitive>, PlaybackError> {
    Ok(Box::new(CpalPlayer::new(device, tick)))
}

#[cfg(not(feature = "cpal-audio"))]
fn cpal_primitive(
    _tick: Duration,
    _device: Option<&str>,
) -> Result<Box<dyn AudioPrimitive>, PlaybackError> {
    Err(PlaybackError::Device {
        message: "built without the cpal-audio feature".to_string(),
    })
}

#[cfg(feature = "cpal-audio")]
fn sound_card_available() -> bool {
    output::output_available()
}

#[cfg(not(feature = "cpal-audio"))]
fn sound_card_available() -> bool {
    false
}
