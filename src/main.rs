use anyhow::{Context, Result, bail};
use clap::Parser;
use crossbeam_channel::Sender;
use owo_colors::OwoColorize;
use readalong::cli::{Cli, Commands, ConfigAction, Key, parse_key};
use readalong::config::Config;
use readalong::output::{KEY_HELP, TerminalView, WRAP_WIDTH, render_page_text};
use readalong::{
    AudioPrimitive, Backend, Book, Catalog, Command, FsLibrary, Session, open_primitive,
};
use std::io::{BufRead, IsTerminal};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let Cli {
        command,
        config,
        library,
        min_words,
        quiet,
        verbose,
    } = Cli::parse();

    init_logging(readalong::logging::level_for(quiet, verbose))?;
    log::debug!("readalong {}", readalong::version_string());

    match command {
        Commands::List => {
            let config = load_config(config.as_deref(), library, min_words)?;
            list_books(&config)?;
        }
        Commands::Pages { book } => {
            let config = load_config(config.as_deref(), library, min_words)?;
            print_pages(&config, &book)?;
        }
        Commands::Play {
            book,
            backend,
            page,
            autoplay,
        } => {
            let mut config = load_config(config.as_deref(), library, min_words)?;
            if let Some(backend) = backend {
                config.playback.backend = backend
                    .parse::<Backend>()
                    .map_err(anyhow::Error::msg)?;
            }
            run_play(&config, &book, page, autoplay)?;
        }
        Commands::Config { action } => {
            handle_config_command(action, config.as_deref())?;
        }
    }

    Ok(())
}

/// Send `log` records to stderr, without timestamps, at `level`.
fn init_logging(level: log::LevelFilter) -> Result<()> {
    env_logger::Builder::new()
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .try_init()
        .context("Failed to install logger")
}

/// Load configuration from file or use defaults.
///
/// Priority order (highest first):
/// 1. Command-line flags (--library, --min-words)
/// 2. Environment variables (READALONG_*)
/// 3. Config file (--config, or ~/.config/readalong/config.toml)
/// 4. Built-in defaults
fn load_config(
    custom_path: Option<&Path>,
    library: Option<PathBuf>,
    min_words: Option<u32>,
) -> Result<Config> {
    let config = match custom_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            let default_path = Config::default_path();
            Config::load_or_default(&default_path)
                .with_context(|| format!("Failed to load config from {}", default_path.display()))?
        }
    };

    let mut config = config.with_env_overrides();
    if let Some(root) = library {
        config.library.root = Some(root);
    }
    if let Some(n) = min_words {
        config.paging.min_words_per_page = n as usize;
    }
    Ok(config)
}

fn open_book(config: &Config, book_id: &str) -> Result<Book> {
    let library = FsLibrary::new(config.library.resolved_root());
    let entry = library.find_book(book_id)?;
    let book = Book::load(&library, &entry, config.paging.min_words_per_page)?;
    Ok(book)
}

fn list_books(config: &Config) -> Result<()> {
    let root = config.library.resolved_root();
    let books = FsLibrary::new(&root).list_books()?;

    if books.is_empty() {
        eprintln!("No books found in {}", root.display());
        return Ok(());
    }

    let width = books.iter().map(|b| b.id.len()).max().unwrap_or(0);
    for book in &books {
        println!("  {:<width$}  {}", book.id.bold(), book.title);
    }
    Ok(())
}

fn print_pages(config: &Config, book_id: &str) -> Result<()> {
    let book = open_book(config, book_id)?;
    let color = std::io::stdout().is_terminal();

    println!(
        "{} ({} pages, {} words)",
        book.title.bold(),
        book.page_count(),
        book.word_count()
    );
    for (i, page) in book.pages().iter().enumerate() {
        let window = page.window();
        let heading = format!(
            "Page {}/{}  {:.2}s - {:.2}s  ({} words)",
            i + 1,
            book.page_count(),
            window.start,
            window.end,
            page.len()
        );
        if color {
            println!("\n{}", heading.dimmed());
        } else {
            println!("\n{}", heading);
        }
        println!("{}", render_page_text(page, None, false, WRAP_WIDTH));
    }
    Ok(())
}

fn run_play(config: &Config, book_id: &str, start_page: usize, autoplay: bool) -> Result<()> {
    let book = open_book(config, book_id)?;
    if start_page == 0 || start_page > book.page_count() {
        bail!(
            "Page {} is out of range ({} has {} pages)",
            start_page,
            book.id,
            book.page_count()
        );
    }

    let primitive = open_primitive(
        config.playback.backend,
        config.playback.tick(),
        config.playback.device.as_deref(),
    )?;
    log::info!("audio backend: {}", primitive.name());

    let interactive = std::io::stdout().is_terminal();
    let view = TerminalView::new(std::io::stdout(), interactive, interactive);
    let mut session = Session::new(primitive, view);

    let (tx, rx) = crossbeam_channel::unbounded();
    tx.send(Command::Load(Box::new(book)))?;
    for _ in 1..start_page {
        tx.send(Command::NextPage)?;
    }
    if autoplay {
        tx.send(Command::TogglePlayPause)?;
    }

    std::thread::Builder::new()
        .name("readalong-input".to_string())
        .spawn(move || read_keys(tx))
        .context("Failed to spawn input thread")?;

    session.run(rx);
    Ok(())
}

/// Forward reader keys from stdin until `q` or end of input.
fn read_keys(tx: Sender<Command>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let command = match parse_key(&line) {
            Some(Key::Toggle) => Command::TogglePlayPause,
            Some(Key::Next) => Command::NextPage,
            Some(Key::Prev) => Command::PrevPage,
            Some(Key::Word(n)) => Command::SeekToWordIndex(n - 1),
            Some(Key::Retry) => Command::Retry,
            Some(Key::Quit) => Command::Quit,
            Some(Key::Help) => {
                eprintln!("{}", KEY_HELP);
                continue;
            }
            None => {
                eprintln!("Unknown key {:?} ({})", line.trim(), KEY_HELP);
                continue;
            }
        };
        let quit = matches!(command, Command::Quit);
        if tx.send(command).is_err() || quit {
            return;
        }
    }
    // End of input: dropping `tx` ends the session.
}

fn handle_config_command(action: ConfigAction, custom_path: Option<&Path>) -> Result<()> {
    let config_path = custom_path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default(&config_path)?.with_env_overrides();
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    config_path.display()
                );
            }
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(&config_path, Config::default().to_toml()?)
                .with_context(|| format!("Failed to write {}", config_path.display()))?;
            println!("{}", format!("Wrote {}", config_path.display()).green());
        }
    }
    Ok(())
}
