//! Command-line interface for readalong
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Read-along book player
#[derive(Parser, Debug)]
#[command(
    name = "readalong",
    version,
    about = "Read-along book player: narration with word highlighting"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Library directory (overrides config)
    #[arg(long, global = true, value_name = "DIR")]
    pub library: Option<PathBuf>,

    /// Minimum words per page (overrides config)
    #[arg(long, global = true, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub min_words: Option<u32>,

    /// Suppress output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: progress, -vv: engine diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List books in the library
    List,

    /// Print a book's pages with their time windows
    Pages {
        /// Book id (directory name in the library)
        book: String,
    },

    /// Read a book with synchronized narration
    Play {
        /// Book id (directory name in the library)
        book: String,

        /// Audio backend override (auto, headless, cpal)
        #[arg(long, value_name = "BACKEND")]
        backend: Option<String>,

        /// Start on this page (1-based)
        #[arg(long, value_name = "N", default_value = "1")]
        page: usize,

        /// Start playing immediately
        #[arg(long)]
        autoplay: bool,
    },

    /// Manage configuration
    Config {
        /// Action to perform
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Reader key as typed on one line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Toggle,
    Next,
    Prev,
    /// 1-based word number on the current page.
    Word(usize),
    Retry,
    Quit,
    Help,
}

/// Parse one line of interactive input. Unknown input yields `None`.
pub fn parse_key(line: &str) -> Option<Key> {
    let trimmed = line.trim();
    // A bare Enter toggles, like a space.
    if trimmed.is_empty() {
        return Some(Key::Toggle);
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "t" | "space" => Some(Key::Toggle),
        "n" => Some(Key::Next),
        "p" => Some(Key::Prev),
        "r" => Some(Key::Retry),
        "q" | "quit" | "exit" => Some(Key::Quit),
        "h" | "?" | "help" => Some(Key::Help),
        other => other
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(Key::Word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_play_with_globals() {
        let cli = Cli::try_parse_from([
            "readalong",
            "-vv",
            "--library",
            "/srv/books",
            "play",
            "pigs",
            "--backend",
            "headless",
            "--page",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.library, Some(PathBuf::from("/srv/books")));
        match cli.command {
            Commands::Play {
                book,
                backend,
                page,
                autoplay,
            } => {
                assert_eq!(book, "pigs");
                assert_eq!(backend.as_deref(), Some("headless"));
                assert_eq!(page, 3);
                assert!(!autoplay);
            }
            other => panic!("expected play, got {other:?}"),
        }
    }

    #[test]
    fn min_words_must_be_positive() {
        assert!(Cli::try_parse_from(["readalong", "--min-words", "0", "list"]).is_err());
        let cli = Cli::try_parse_from(["readalong", "list", "--min-words", "20"]).unwrap();
        assert_eq!(cli.min_words, Some(20));
    }

    #[test]
    fn config_init_takes_force() {
        let cli = Cli::try_parse_from(["readalong", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
    }

    #[test]
    fn keys_parse() {
        assert_eq!(parse_key(" \n"), Some(Key::Toggle));
        assert_eq!(parse_key("\n"), Some(Key::Toggle));
        assert_eq!(parse_key("t"), Some(Key::Toggle));
        assert_eq!(parse_key("N"), Some(Key::Next));
        assert_eq!(parse_key("p\n"), Some(Key::Prev));
        assert_eq!(parse_key("12"), Some(Key::Word(12)));
        assert_eq!(parse_key("r"), Some(Key::Retry));
        assert_eq!(parse_key("q"), Some(Key::Quit));
        assert_eq!(parse_key("?"), Some(Key::Help));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert_eq!(parse_key("0"), None);
        assert_eq!(parse_key("zz"), None);
        assert_eq!(parse_key("-3"), None);
    }
}
