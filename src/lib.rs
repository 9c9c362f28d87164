//! readalong - read-along book player
//!
//! Plays a book's narration while highlighting the word being spoken, one
//! page at a time.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod assets;
pub mod audio;
pub mod book;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod output;
pub mod playback;

// Book model
pub use book::{Book, Page, Seconds, TimeWindow, TimedWord, paginate, parse_timestamps};

// Assets
pub use assets::{AssetStore, AudioRef, BookEntry, Catalog, FsLibrary, ImageRef, MemoryAssetStore};

// Playback engine
pub use playback::{
    AudioPrimitive, Command, NavigationController, Phase, PlaybackState, Session, SessionEvent,
    SessionObserver, highlight_index,
};

// Audio primitives
pub use audio::{Backend, HeadlessPlayer, open_primitive};

// Error handling
pub use error::{LoadError, PlaybackError, ReadalongError, Result, TimestampError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
