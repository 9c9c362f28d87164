use crate::book::Seconds;

/// Snapshot of the reader's playback position.
///
/// Owned by the navigation controller; everything else receives copies.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackState {
    pub position: Seconds,
    pub is_playing: bool,
    pub active_page_index: usize,
}

/// Controller lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No book loaded.
    Idle,
    /// Book loaded; `active_page_index` is in range.
    Ready,
}
