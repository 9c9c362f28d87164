use crate::audio::Backend;
use crate::defaults;
use crate::error::{ReadalongError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub library: LibraryConfig,
    pub paging: PagingConfig,
    pub playback: PlaybackConfig,
}

/// Where books live
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LibraryConfig {
    /// Library directory; `None` means the per-user data directory.
    pub root: Option<PathBuf>,
}

/// Pagination configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PagingConfig {
    pub min_words_per_page: usize,
}

/// Audio playback configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    pub backend: Backend,
    /// Output device name for the cpal backend; `None` uses the default.
    pub device: Option<String>,
    pub tick_ms: u64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            min_words_per_page: defaults::MIN_WORDS_PER_PAGE,
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            device: None,
            tick_ms: defaults::TICK_MS,
        }
    }
}

impl LibraryConfig {
    /// Configured root, or `<data dir>/readalong/books`.
    pub fn resolved_root(&self) -> PathBuf {
        match &self.root {
            Some(root) => root.clone(),
            None => default_library_root(),
        }
    }
}

impl PlaybackConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields use default values; invalid TOML or out-of-range values
    /// are errors.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, or defaults if the file doesn't exist
    ///
    /// Any other failure (unreadable file, invalid TOML) is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(ReadalongError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.paging.min_words_per_page == 0 {
            return Err(ReadalongError::ConfigInvalidValue {
                key: "paging.min_words_per_page".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.playback.tick_ms == 0 {
            return Err(ReadalongError::ConfigInvalidValue {
                key: "playback.tick_ms".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - READALONG_LIBRARY → library.root
    /// - READALONG_MIN_WORDS → paging.min_words_per_page
    /// - READALONG_AUDIO_BACKEND → playback.backend
    ///
    /// Empty values are ignored; unparsable ones are ignored with a warning.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(root) = std::env::var("READALONG_LIBRARY")
            && !root.is_empty()
        {
            self.library.root = Some(PathBuf::from(root));
        }

        if let Ok(min_words) = std::env::var("READALONG_MIN_WORDS")
            && !min_words.is_empty()
        {
            match min_words.parse::<usize>() {
                Ok(n) if n > 0 => self.paging.min_words_per_page = n,
                _ => log::warn!("ignoring READALONG_MIN_WORDS={:?}", min_words),
            }
        }

        if let Ok(backend) = std::env::var("READALONG_AUDIO_BACKEND")
            && !backend.is_empty()
        {
            match backend.parse::<Backend>() {
                Ok(b) => self.playback.backend = b,
                Err(e) => log::warn!("ignoring READALONG_AUDIO_BACKEND: {}", e),
            }
        }

        self
    }

    /// Serialize as TOML, for `config show` and `config init`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ReadalongError::ConfigParse {
            message: e.to_string(),
        })
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/readalong/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("readalong")
            .join("config.toml")
    }
}

/// `<data dir>/readalong/books`, e.g. ~/.local/share/readalong/books on Linux.
pub fn default_library_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("readalong")
        .join(defaults::LIBRARY_DIR)
}
