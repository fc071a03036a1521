//! Public handle over the player thread.

use std::fmt::Display;
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::album::{Track, TrackId};
use crate::config::PlayerSettings;
use crate::decoder::Decoder;

use super::thread::PlayerLoop;
use super::types::{DecoderEvents, PlayerCmd, PlayerMsg, PlayerSnapshot};

/// Command side of the player. All methods return immediately; after
/// [`Player::release`] every command is a silent no-op.
pub struct Player {
    tx: Sender<PlayerMsg>,
    snapshots_rx: Mutex<Option<Receiver<PlayerSnapshot>>>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Player {
    /// Spawn the player thread. `build` runs on that thread and constructs
    /// the decoder backend, receiving the sender it reports lifecycle
    /// events through.
    pub fn spawn<D, E, F>(settings: PlayerSettings, build: F) -> Self
    where
        D: Decoder + 'static,
        E: Display,
        F: FnOnce(DecoderEvents) -> Result<D, E> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<PlayerMsg>();
        let (snap_tx, snap_rx) = mpsc::channel::<PlayerSnapshot>();

        let events = DecoderEvents::new(tx.clone());
        let join = thread::spawn(move || {
            // The backend is built here because audio output handles do not
            // travel across threads.
            let decoder = match build(events) {
                Ok(d) => d,
                Err(err) => {
                    tracing::error!(error = %err, "decoder backend unavailable");
                    return;
                }
            };
            PlayerLoop::new(decoder, settings, snap_tx).run(rx);
        });

        Self {
            tx,
            snapshots_rx: Mutex::new(Some(snap_rx)),
            join: Mutex::new(Some(join)),
        }
    }

    /// Take the snapshot stream. Yields every emission in order; only the
    /// first caller gets it.
    pub fn take_snapshots(&self) -> Option<Receiver<PlayerSnapshot>> {
        self.snapshots_rx.lock().ok().and_then(|mut rx| rx.take())
    }

    /// Replace the playlist without touching active playback.
    pub fn set_playlist(&self, tracks: Vec<Track>) {
        self.send(PlayerCmd::SetPlaylist(tracks));
    }

    /// Play the track with `id` from the start, even if it already plays.
    pub fn play(&self, id: TrackId) {
        self.send(PlayerCmd::Play(id));
    }

    /// Toggle pause/resume, or start the first track when none is selected.
    pub fn play_pause(&self) {
        self.send(PlayerCmd::PlayPause);
    }

    /// Advance to the next track (wraps around).
    pub fn play_next(&self) {
        self.send(PlayerCmd::Next);
    }

    /// Go back to the previous track (wraps around).
    pub fn play_previous(&self) {
        self.send(PlayerCmd::Prev);
    }

    /// Seek within the current track to `permille` of its duration.
    pub fn seek_to(&self, permille: u16) {
        self.send(PlayerCmd::Seek { permille });
    }

    /// Shut the player down and wait for its thread to finish.
    pub fn release(&self) {
        self.send(PlayerCmd::Release);
        if let Ok(mut join) = self.join.lock() {
            if let Some(handle) = join.take() {
                let _ = handle.join();
            }
        }
    }

    fn send(&self, cmd: PlayerCmd) {
        // After release the thread is gone and the channel is closed;
        // commands are defined as no-ops at that point.
        let _ = self.tx.send(PlayerMsg::Cmd(cmd));
    }
}
