//! The player event loop.
//!
//! One thread owns the decoder and all playback state. Commands and decoder
//! events arrive through the same channel; the receive timeout doubles as
//! the progress tick, so the tick cancels itself whenever playback stops.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::album::{Track, TrackId};
use crate::config::PlayerSettings;
use crate::decoder::Decoder;

use super::types::{DecoderEvent, PROGRESS_SCALE, PlayerCmd, PlayerMsg, PlayerSnapshot};

pub(super) struct PlayerLoop<D: Decoder> {
    decoder: D,
    tick: Duration,
    end_guard: Duration,
    snapshots: Sender<PlayerSnapshot>,

    playlist: Vec<Track>,
    current: Option<Track>,
    /// The decoder finished preparing the current source.
    ready: bool,
    /// Transport running; implies `ready`.
    playing: bool,
    /// Waiting for `Prepared` on the current source.
    loading: bool,
    /// Waiting for `SeekComplete`; suspends the tick.
    seeking: bool,
}

impl<D: Decoder> PlayerLoop<D> {
    pub(super) fn new(
        decoder: D,
        settings: PlayerSettings,
        snapshots: Sender<PlayerSnapshot>,
    ) -> Self {
        Self {
            decoder,
            tick: Duration::from_millis(settings.tick_interval_ms),
            end_guard: Duration::from_millis(settings.seek_end_guard_ms),
            snapshots,
            playlist: Vec::new(),
            current: None,
            ready: false,
            playing: false,
            loading: false,
            seeking: false,
        }
    }

    pub(super) fn run(mut self, rx: Receiver<PlayerMsg>) {
        tracing::debug!("player loop started");
        loop {
            match rx.recv_timeout(self.tick) {
                Ok(PlayerMsg::Cmd(cmd)) => {
                    if self.handle_cmd(cmd) {
                        break;
                    }
                }
                Ok(PlayerMsg::Decoder(event)) => self.handle_event(event),
                Err(RecvTimeoutError::Timeout) => self.progress_tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.decoder.release();
        tracing::debug!("player loop stopped");
    }

    /// Returns true when the loop should shut down.
    fn handle_cmd(&mut self, cmd: PlayerCmd) -> bool {
        match cmd {
            PlayerCmd::SetPlaylist(tracks) => self.set_playlist(tracks),
            PlayerCmd::Play(id) => self.play(id),
            PlayerCmd::PlayPause => self.play_pause(),
            PlayerCmd::Next => self.navigate(1),
            PlayerCmd::Prev => self.navigate(-1),
            PlayerCmd::Seek { permille } => self.seek(permille),
            PlayerCmd::Release => return true,
        }
        false
    }

    fn handle_event(&mut self, event: DecoderEvent) {
        match event {
            DecoderEvent::Prepared { track } => self.on_prepared(track),
            DecoderEvent::Completed { track } => self.on_completed(track),
            DecoderEvent::Failed { track, message } => self.on_failed(track, message),
            DecoderEvent::SeekComplete { track } => self.on_seek_complete(track),
        }
    }

    /// Pure data update: the decoder and active playback are untouched, and
    /// no snapshot goes out. Refreshed track fields (durations, mostly) ride
    /// along with the next emission.
    fn set_playlist(&mut self, tracks: Vec<Track>) {
        let current_id = self.current.as_ref().map(|t| t.id);
        if let Some(id) = current_id {
            if let Some(refreshed) = tracks.iter().find(|t| t.id == id) {
                self.current = Some(refreshed.clone());
            }
        }
        self.playlist = tracks;
    }

    fn play(&mut self, id: TrackId) {
        let Some(track) = self.playlist.iter().find(|t| t.id == id).cloned() else {
            tracing::debug!(id, "play requested for a track not in the playlist");
            return;
        };
        tracing::info!(track = %track.title, "loading track");
        self.ready = false;
        self.playing = false;
        self.loading = true;
        self.seeking = false;
        self.decoder.reset();
        self.decoder.load(&track);
        self.current = Some(track);
        self.emit();
    }

    fn play_pause(&mut self) {
        if self.playing {
            self.decoder.pause();
            self.playing = false;
            self.emit();
        } else if self.current.is_none() {
            let first = self.playlist.first().map(|t| t.id);
            if let Some(id) = first {
                self.play(id);
            }
        } else if self.ready {
            self.decoder.start();
            self.playing = true;
            self.emit();
        }
        // Otherwise a track is selected but not ready, either still
        // loading or failed; nothing to toggle.
    }

    fn navigate(&mut self, offset: i64) {
        if self.playlist.is_empty() {
            return;
        }
        let len = self.playlist.len() as i64;
        let cur = self
            .current
            .as_ref()
            .and_then(|c| self.playlist.iter().position(|t| t.id == c.id))
            .map_or(-1, |p| p as i64);
        let next = (cur + offset).rem_euclid(len) as usize;
        let id = self.playlist[next].id;
        self.play(id);
    }

    fn seek(&mut self, permille: u16) {
        if !self.ready {
            return;
        }
        let Some(total) = self.total_duration() else {
            // Without a known duration the permille target is meaningless.
            return;
        };
        if total.is_zero() {
            return;
        }
        let permille = permille.min(PROGRESS_SCALE);
        let target = total * u32::from(permille) / u32::from(PROGRESS_SCALE);
        // Keep a small margin from the end so a seek cannot land on the
        // completion edge and skip the track.
        let target = target.min(total.saturating_sub(self.end_guard));
        self.seeking = true;
        tracing::debug!(?target, "seeking");
        self.decoder.seek(target);
        // No snapshot here; SeekComplete emits the refreshed one.
    }

    fn on_prepared(&mut self, track: TrackId) {
        // Only meaningful while still loading that same track.
        if !self.loading || self.current.as_ref().map(|t| t.id) != Some(track) {
            tracing::debug!(track, "stale prepared event ignored");
            return;
        }
        self.loading = false;
        self.ready = true;
        self.playing = true;
        self.decoder.start();
        self.emit();
    }

    fn on_completed(&mut self, track: TrackId) {
        if !self.ready || self.current.as_ref().map(|t| t.id) != Some(track) {
            tracing::debug!(track, "stale completion ignored");
            return;
        }
        tracing::debug!(track, "track completed, advancing");
        self.ready = false;
        self.playing = false;
        self.navigate(1);
    }

    fn on_failed(&mut self, track: TrackId, message: String) {
        if self.current.as_ref().map(|t| t.id) != Some(track) {
            tracing::debug!(track, "stale failure ignored");
            return;
        }
        tracing::warn!(track, %message, "decoder failed");
        self.ready = false;
        self.playing = false;
        self.loading = false;
        self.seeking = false;
        self.emit();
    }

    fn on_seek_complete(&mut self, track: TrackId) {
        if self.current.as_ref().map(|t| t.id) != Some(track) {
            return;
        }
        self.seeking = false;
        self.emit();
    }

    /// The tick only re-emits; it goes quiet whenever the state says there
    /// is nothing new to report.
    fn progress_tick(&mut self) {
        if self.playing && self.ready && !self.seeking {
            self.emit();
        }
    }

    /// Push one snapshot to the subscriber stream.
    fn emit(&mut self) {
        let snapshot = PlayerSnapshot {
            playing: self.playing,
            current: self.current.clone(),
            progress_permille: if self.ready { self.progress() } else { 0 },
        };
        let _ = self.snapshots.send(snapshot);
    }

    /// Track duration as the decoder reports it, falling back to the value
    /// the playlist carries.
    fn total_duration(&self) -> Option<Duration> {
        self.decoder
            .duration()
            .or_else(|| self.current.as_ref().and_then(|t| t.duration))
    }

    /// Current position in permille of the known duration.
    fn progress(&self) -> u16 {
        let Some(total) = self.total_duration() else {
            return 0;
        };
        if total.as_millis() == 0 {
            return 0;
        }
        let pos = self.decoder.position().min(total);
        let scaled = pos.as_millis().saturating_mul(u128::from(PROGRESS_SCALE)) / total.as_millis();
        scaled.min(u128::from(PROGRESS_SCALE)) as u16
    }
}
