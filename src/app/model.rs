//! The main application model used by the UI and the event loop.

use crate::album::{Album, Track, TrackId};
use crate::player::{PROGRESS_SCALE, PlayerSnapshot};

/// Album header fields shown above the track list.
#[derive(Debug, Clone, Default)]
pub struct AlbumMeta {
    pub title: String,
    pub artist: String,
    pub published: String,
    pub genre: String,
}

/// Application state.
pub struct App {
    /// Album header, present once the descriptor arrived.
    pub meta: Option<AlbumMeta>,
    /// Tracks in album order; rows of the list.
    pub tracks: Vec<Track>,
    /// Cursor position in the track list.
    pub selected: usize,
    /// Latest snapshot received from the player.
    pub snapshot: PlayerSnapshot,
    /// When true, the cursor follows the playing track.
    pub follow_playback: bool,
    /// Seek target while the user adjusts the gauge. While set, the gauge
    /// shows this instead of live progress.
    pub pending_seek: Option<u16>,
    /// One-shot failure message; cleared on the next key press.
    pub toast: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self {
            meta: None,
            tracks: Vec::new(),
            selected: 0,
            snapshot: PlayerSnapshot::default(),
            follow_playback: true,
            pending_seek: None,
            toast: None,
        }
    }

    /// Replace the album view. The cursor is clamped into the new list.
    pub fn set_album(&mut self, album: Album) {
        self.meta = Some(AlbumMeta {
            title: album.title,
            artist: album.artist,
            published: album.published,
            genre: album.genre,
        });
        self.tracks = album.tracks;
        if self.selected >= self.tracks.len() {
            self.selected = 0;
        }
    }

    /// Apply a player snapshot. In follow mode a change of current track
    /// identity pulls the cursor onto its row.
    pub fn apply_snapshot(&mut self, snapshot: PlayerSnapshot) {
        let previous = self.snapshot.current.as_ref().map(|t| t.id);
        let current = snapshot.current.as_ref().map(|t| t.id);
        if self.follow_playback && current != previous {
            if let Some(id) = current {
                if let Some(row) = self.row_of(id) {
                    self.selected = row;
                }
            }
        }
        self.snapshot = snapshot;
    }

    /// Row index of the track with `id`, if it is listed.
    pub fn row_of(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// Track under the cursor.
    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks.get(self.selected)
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    /// Move the cursor down, wrapping; leaves follow mode.
    pub fn select_next(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.tracks.len();
        self.follow_playback = false;
    }

    /// Move the cursor up, wrapping; leaves follow mode.
    pub fn select_prev(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.selected = (self.selected + self.tracks.len() - 1) % self.tracks.len();
        self.follow_playback = false;
    }

    /// Jump the cursor to the first row; leaves follow mode.
    pub fn select_first(&mut self) {
        if !self.tracks.is_empty() {
            self.selected = 0;
            self.follow_playback = false;
        }
    }

    /// Jump the cursor to the last row; leaves follow mode.
    pub fn select_last(&mut self) {
        if let Some(last) = self.tracks.len().checked_sub(1) {
            self.selected = last;
            self.follow_playback = false;
        }
    }

    /// Re-enable following the playing track.
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    /// What the progress gauge shows: the pending seek target while the
    /// user adjusts it, live progress otherwise.
    pub fn gauge_permille(&self) -> u16 {
        self.pending_seek.unwrap_or(self.snapshot.progress_permille)
    }

    /// Nudge the seek target by `step` permille (negative moves back),
    /// starting from whatever the gauge currently shows.
    pub fn adjust_pending_seek(&mut self, step: i32) {
        let from = i32::from(self.gauge_permille());
        let next = (from + step).clamp(0, i32::from(PROGRESS_SCALE)) as u16;
        self.pending_seek = Some(next);
    }

    /// Take the seek target for committing to the player.
    pub fn take_pending_seek(&mut self) -> Option<u16> {
        self.pending_seek.take()
    }

    /// Abandon the seek; the gauge snaps back to live progress.
    pub fn cancel_pending_seek(&mut self) {
        self.pending_seek = None;
    }

    /// Record a failure for the status line.
    pub fn show_toast(&mut self, message: String) {
        self.toast = Some(message);
    }

    /// Acknowledge the failure message.
    pub fn clear_toast(&mut self) {
        self.toast = None;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
