//! Default configuration constants for readalong.
//!
//! Shared by the config layer, the CLI and the engine so every entry point
//! paginates and plays the same way out of the box.

/// Minimum number of words on a page before a sentence end may close it.
///
/// A page closes at the first word ending in "." once it holds at least this
/// many words, so real pages run slightly longer than this.
pub const MIN_WORDS_PER_PAGE: usize = 160;

/// Interval between position updates emitted by the headless transport.
///
/// 50ms keeps highlighting visually in step with speech without flooding the
/// event loop.
pub const TICK_MS: u64 = 50;

/// File holding the word timestamps inside a book directory.
pub const TIMESTAMPS_FILE: &str = "timestamps.json";

/// File holding the narration audio inside a book directory.
pub const AUDIO_FILE: &str = "audio.wav";

/// Optional per-book metadata file (currently only `title`).
pub const BOOK_META_FILE: &str = "book.toml";

/// Illustration file stems probed in order, with these extensions.
pub const IMAGE_STEM: &str = "image";
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Name of the library directory under the user's data directory.
pub const LIBRARY_DIR: &str = "books";
