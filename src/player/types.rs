//! Commands, lifecycle events and snapshots exchanged with the player thread.

use std::sync::mpsc::Sender;

use crate::album::{Track, TrackId};

/// Scale of the canonical progress unit: positions are permille (0..=1000)
/// of the track duration.
pub const PROGRESS_SCALE: u16 = 1000;

/// Commands accepted by the player thread.
#[derive(Debug)]
pub enum PlayerCmd {
    /// Replace the playlist. Never disturbs active playback.
    SetPlaylist(Vec<Track>),
    /// Start the track with this id from the beginning. Unknown ids are ignored.
    Play(TrackId),
    /// Toggle pause/resume; with no track selected, start the first one.
    PlayPause,
    /// Advance to the next track, wrapping at the end.
    Next,
    /// Go back to the previous track, wrapping at the start.
    Prev,
    /// Seek within the current track to `permille` of its total duration.
    Seek { permille: u16 },
    /// Release the decoder and stop the player thread.
    Release,
}

/// Lifecycle notifications from the decoder backend.
#[derive(Debug)]
pub enum DecoderEvent {
    /// The source for `track` is decoded and ready to start.
    Prepared { track: TrackId },
    /// The current source played to its natural end.
    Completed { track: TrackId },
    /// Loading or decoding failed; playback stops on this track.
    Failed { track: TrackId, message: String },
    /// An issued seek finished repositioning.
    SeekComplete { track: TrackId },
}

/// Everything that flows into the player loop.
#[derive(Debug)]
pub(crate) enum PlayerMsg {
    Cmd(PlayerCmd),
    Decoder(DecoderEvent),
}

/// Sender half handed to decoder backends for lifecycle events.
#[derive(Clone)]
pub struct DecoderEvents {
    tx: Sender<PlayerMsg>,
}

impl DecoderEvents {
    pub(crate) fn new(tx: Sender<PlayerMsg>) -> Self {
        Self { tx }
    }

    /// Deliver one lifecycle event. Ignored once the player is gone.
    pub fn send(&self, event: DecoderEvent) {
        let _ = self.tx.send(PlayerMsg::Decoder(event));
    }
}

/// One immutable view of playback, emitted on every observable transition
/// and once per tick while playing.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    /// Whether the transport is running.
    pub playing: bool,
    /// The track the player is on, kept across pauses and errors.
    pub current: Option<Track>,
    /// Position within the track, 0..=1000. Zero when the duration is unknown.
    pub progress_permille: u16,
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        Self {
            playing: false,
            current: None,
            progress_permille: 0,
        }
    }
}
