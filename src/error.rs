//! Error types for readalong.
//!
//! Library failures fall into two recoverable kinds: [`LoadError`] while a book
//! is being assembled from the asset store, and [`PlaybackError`] when the audio
//! primitive refuses to start. Both are wrapped by [`ReadalongError`].

use crate::book::Seconds;
use thiserror::Error;

/// A timestamps payload that cannot be turned into an ordered word list.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimestampError {
    #[error("invalid interval [{start}, {end}]: {reason}")]
    Interval {
        start: Seconds,
        end: Seconds,
        reason: &'static str,
    },

    #[error("not a JSON array of words: {message}")]
    NotAnArray { message: String },

    #[error("entry {index}: {message}")]
    Entry { index: usize, message: String },

    #[error("entry {index}: start {start} is before previous start {previous}")]
    Order {
        index: usize,
        start: Seconds,
        previous: Seconds,
    },
}

/// A book's timestamps or audio could not be obtained.
///
/// The engine stays idle when a load fails; the reader can retry.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Book not found: {book_id}")]
    BookNotFound { book_id: String },

    #[error("Timestamps for {book_id} not found at {path}")]
    TimestampsNotFound { book_id: String, path: String },

    #[error("Malformed timestamps for {book_id}: {source}")]
    MalformedTimestamps {
        book_id: String,
        #[source]
        source: TimestampError,
    },

    #[error("Audio for {book_id} unavailable: {message}")]
    AudioUnavailable { book_id: String, message: String },

    #[error("Book {book_id} has no words to display")]
    EmptyBook { book_id: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The audio primitive could not start or continue playback.
///
/// Never fatal: the controller forces `is_playing` to false and keeps the
/// error around for display.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("No audio resource is loaded")]
    NotLoaded,

    #[error("Audio resource not ready: {message}")]
    NotReady { message: String },

    #[error("Failed to decode audio: {message}")]
    Decode { message: String },

    #[error("Audio device error: {message}")]
    Device { message: String },
}

#[derive(Error, Debug)]
pub enum ReadalongError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReadalongError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_book_not_found_display() {
        let error = LoadError::BookNotFound {
            book_id: "three-pigs".to_string(),
        };
        assert_eq!(error.to_string(), "Book not found: three-pigs");
    }

    #[test]
    fn test_malformed_timestamps_display() {
        let error = LoadError::MalformedTimestamps {
            book_id: "three-pigs".to_string(),
            source: TimestampError::Order {
                index: 3,
                start: 1.0,
                previous: 2.5,
            },
        };
        assert_eq!(
            error.to_string(),
            "Malformed timestamps for three-pigs: entry 3: start 1 is before previous start 2.5"
        );
    }

    #[test]
    fn test_read_error_keeps_source() {
        let error = LoadError::Read {
            path: "/books/a/timestamps.json".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
        assert!(error.to_string().contains("/books/a/timestamps.json"));
    }

    #[test]
    fn test_playback_error_display() {
        assert_eq!(
            PlaybackError::NotLoaded.to_string(),
            "No audio resource is loaded"
        );
        let error = PlaybackError::Decode {
            message: "unsupported bit depth".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to decode audio: unsupported bit depth"
        );
    }

    #[test]
    fn test_load_error_is_transparent_when_wrapped() {
        let error: ReadalongError = LoadError::EmptyBook {
            book_id: "blank".to_string(),
        }
        .into();
        assert_eq!(error.to_string(), "Book blank has no words to display");
    }

    #[test]
    fn test_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: ReadalongError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: ReadalongError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_every_readalong_error_has_a_source() {
        fn origin(error: &ReadalongError) -> &'static str {
            match error {
                ReadalongError::Load(_) => "asset store",
                ReadalongError::Playback(_) => "audio primitive",
                ReadalongError::ConfigParse { .. } => "config serializer",
                ReadalongError::ConfigInvalidValue { .. } => "config validation",
                ReadalongError::Config(_) => "config parser",
                ReadalongError::Io(_) => "filesystem",
            }
        }

        let errors: Vec<ReadalongError> = vec![
            LoadError::EmptyBook {
                book_id: "blank".to_string(),
            }
            .into(),
            PlaybackError::NotLoaded.into(),
            ReadalongError::ConfigInvalidValue {
                key: "paging.min_words_per_page".to_string(),
                message: "must be at least 1".to_string(),
            },
            toml::from_str::<toml::Value>("= nope").unwrap_err().into(),
            io::Error::new(io::ErrorKind::NotFound, "gone").into(),
        ];
        let origins: Vec<&str> = errors.iter().map(origin).collect();
        assert_eq!(
            origins,
            vec![
                "asset store",
                "audio primitive",
                "config validation",
                "config parser",
                "filesystem"
            ]
        );
    }

    #[test]
    fn test_errors_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TimestampError>();
        assert_send_sync::<LoadError>();
        assert_send_sync::<PlaybackError>();
        assert_send_sync::<ReadalongError>();
    }
}
