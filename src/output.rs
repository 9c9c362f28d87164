//! Terminal rendering for the reader.
//! Used by `readalong play` (live view) and `readalong pages` (static dump).

use crate::book::Page;
use crate::playback::{NavigationController, SessionEvent, SessionObserver};
use std::io::Write;

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const REVERSE: &str = "\x1b[7m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Column at which page text wraps.
pub const WRAP_WIDTH: usize = 72;

pub const KEY_HELP: &str = "space play/pause  n next  p prev  <n> read from word n  r retry  q quit";

/// Lay out `page` as wrapped lines, emphasizing word `highlight`.
///
/// Emphasis uses reverse video when `color` is set and `[brackets]` otherwise,
/// so the output stays readable when piped.
pub fn render_page_text(page: &Page, highlight: Option<usize>, color: bool, width: usize) -> String {
    let mut out = String::new();
    let mut column = 0;

    for (i, word) in page.words().iter().enumerate() {
        let highlighted = highlight == Some(i);
        let mut visible = word.text.chars().count();
        if highlighted && !color {
            visible += 2;
        }
        if column > 0 && column + 1 + visible > width {
            out.push('\n');
            column = 0;
        } else if column > 0 {
            out.push(' ');
            column += 1;
        }

        if highlighted {
            if color {
                out.push_str(&format!("{REVERSE}{BOLD}{}{RESET}", word.text));
            } else {
                out.push_str(&format!("[{}]", word.text));
            }
        } else {
            out.push_str(&word.text);
        }
        column += visible;
    }

    out
}

/// Status line under the page.
pub fn render_status(playing: bool, position: f64, color: bool) -> String {
    let state = if playing { "playing" } else { "paused " };
    if color {
        let tint = if playing { GREEN } else { DIM };
        format!("{tint}[{state}]{RESET} {position:>7.2}s")
    } else {
        format!("[{state}] {position:>7.2}s")
    }
}

/// The full live view for the controller's current state.
pub fn render_frame(controller: &NavigationController, color: bool) -> String {
    let (Some(book), Some(page)) = (controller.book(), controller.active_page()) else {
        return "No book loaded".to_string();
    };
    let state = controller.state();

    let header = format!(
        "{} · page {}/{}",
        book.title,
        state.active_page_index + 1,
        book.page_count()
    );
    let header = if color {
        format!("{BOLD}{header}{RESET}")
    } else {
        header
    };

    let mut frame = format!(
        "{header}\n\n{}\n\n{}",
        render_page_text(page, controller.highlighted_word(), color, WRAP_WIDTH),
        render_status(state.is_playing, state.position, color)
    );
    if let Some(error) = controller.last_error() {
        if color {
            frame.push_str(&format!("  {RED}{error}{RESET}"));
        } else {
            frame.push_str(&format!("  {error}"));
        }
    }
    frame.push('\n');
    if color {
        frame.push_str(&format!("{DIM}{KEY_HELP}{RESET}\n"));
    } else {
        frame.push_str(KEY_HELP);
        frame.push('\n');
    }
    frame
}

/// One-line description of an event, for logs and non-interactive output.
pub fn describe_event(event: &SessionEvent) -> String {
    match event {
        SessionEvent::BookLoaded { id, pages } => format!("Loaded {id} ({pages} pages)"),
        SessionEvent::LoadFailed { message } => format!("Load failed: {message}"),
        SessionEvent::Unloaded => "Book closed".to_string(),
        SessionEvent::PageShown { index, count } => format!("Page {}/{}", index + 1, count),
        SessionEvent::HighlightChanged { page, word } => match word {
            Some(w) => format!("Page {} word {}", page + 1, w + 1),
            None => format!("Page {} no highlight", page + 1),
        },
        SessionEvent::PlayingChanged { playing: true } => "Playing".to_string(),
        SessionEvent::PlayingChanged { playing: false } => "Paused".to_string(),
        SessionEvent::Ended { position } => format!("Narration ended at {position:.2}s"),
        SessionEvent::PlaybackFailed(e) => format!("Playback failed: {e}"),
    }
}

/// Redraws the live view whenever something visible changes.
pub struct TerminalView<W: Write> {
    out: W,
    color: bool,
    /// Clear the screen before each frame (interactive terminals only).
    redraw: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, color: bool, redraw: bool) -> Self {
        Self { out, color, redraw }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, controller: &NavigationController) {
        let clear = if self.redraw { CLEAR_SCREEN } else { "" };
        let frame = render_frame(controller, self.color);
        if write!(self.out, "{clear}{frame}")
            .and_then(|()| self.out.flush())
            .is_err()
        {
            log::debug!("terminal output closed");
        }
    }

    fn line(&mut self, text: &str, tint: &str) {
        let written = if self.color && !tint.is_empty() {
            writeln!(self.out, "{tint}{text}{RESET}")
        } else {
            writeln!(self.out, "{text}")
        };
        if written.is_err() {
            log::debug!("terminal output closed");
        }
    }
}

impl<W: Write> SessionObserver for TerminalView<W> {
    fn notify(&mut self, controller: &NavigationController, event: &SessionEvent) {
        match event {
            // A page change is always followed by a highlight event; draw once then.
            SessionEvent::PageShown { .. } | SessionEvent::BookLoaded { .. } => {}
            SessionEvent::HighlightChanged { .. }
            | SessionEvent::PlayingChanged { .. }
            | SessionEvent::PlaybackFailed(_) => self.draw(controller),
            SessionEvent::Ended { .. } => {
                self.draw(controller);
                self.line(&describe_event(event), DIM);
            }
            SessionEvent::LoadFailed { .. } => self.line(&describe_event(event), RED),
            SessionEvent::Unloaded => self.line(&describe_event(event), DIM),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AudioRef;
    use crate::book::{Book, TimedWord};
    use crate::playback::MockAudioPrimitive;
    use std::sync::Arc;

    fn page(words: &[&str]) -> Page {
        Page::new(
            words
                .iter()
                .enumerate()
                .map(|(i, w)| TimedWord::new(*w, i as f64, i as f64 + 1.0).unwrap())
                .collect(),
        )
        .unwrap()
    }

    fn controller() -> (NavigationController, MockAudioPrimitive) {
        let mock = MockAudioPrimitive::new();
        let mut controller = NavigationController::new(Box::new(mock.clone()));
        let book = Book::new(
            "pigs",
            "Pigs",
            vec![page(&["Hi", "there."]), page(&["Bye."])],
            AudioRef::Memory {
                name: "pigs.wav".to_string(),
                bytes: Arc::from(vec![0u8; 4]),
            },
            None,
        );
        controller.load_book(book).unwrap();
        (controller, mock)
    }

    #[test]
    fn plain_highlight_uses_brackets() {
        let text = render_page_text(&page(&["Hi", "there."]), Some(1), false, 80);
        assert_eq!(text, "Hi [there.]");
    }

    #[test]
    fn color_highlight_uses_reverse_video() {
        let text = render_page_text(&page(&["Hi", "there."]), Some(0), true, 80);
        assert_eq!(text, format!("{REVERSE}{BOLD}Hi{RESET} there."));
    }

    #[test]
    fn long_pages_wrap_at_width() {
        let text = render_page_text(&page(&["aaaa", "bbbb", "cccc"]), None, false, 9);
        assert_eq!(text, "aaaa bbbb\ncccc");
    }

    #[test]
    fn status_pads_position() {
        assert_eq!(render_status(false, 1.5, false), "[paused ]    1.50s");
        assert_eq!(render_status(true, 12.0, false), "[playing]   12.00s");
    }

    #[test]
    fn frame_shows_title_page_and_help() {
        let (controller, _mock) = controller();
        let frame = render_frame(&controller, false);

        assert!(frame.starts_with("Pigs · page 1/2\n\nHi there.\n\n[paused ]"));
        assert!(frame.contains(KEY_HELP));
    }

    #[test]
    fn frame_shows_last_playback_error() {
        let (mut controller, mock) = controller();
        mock.set_play_failure(Some(crate::error::PlaybackError::Device {
            message: "unplugged".to_string(),
        }));
        assert!(controller.toggle_play_pause().is_err());

        assert!(render_frame(&controller, false).contains("Audio device error: unplugged"));
    }

    #[test]
    fn idle_frame_says_so() {
        let controller = NavigationController::new(Box::new(MockAudioPrimitive::new()));
        assert_eq!(render_frame(&controller, false), "No book loaded");
    }

    #[test]
    fn view_draws_on_highlight_but_not_on_page_shown() {
        let (controller, _mock) = controller();
        let mut view = TerminalView::new(Vec::new(), false, false);

        view.notify(&controller, &SessionEvent::PageShown { index: 0, count: 2 });
        assert!(view.out.is_empty());

        view.notify(
            &controller,
            &SessionEvent::HighlightChanged {
                page: 0,
                word: None,
            },
        );
        let text = String::from_utf8(view.into_inner()).unwrap();
        assert!(text.contains("Hi there."));
    }

    #[test]
    fn events_have_readable_descriptions() {
        assert_eq!(
            describe_event(&SessionEvent::HighlightChanged {
                page: 0,
                word: Some(2)
            }),
            "Page 1 word 3"
        );
        assert_eq!(
            describe_event(&SessionEvent::Ended { position: 30.0 }),
            "Narration ended at 30.00s"
        );
    }
}
