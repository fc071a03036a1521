//! rodio-backed decoder.
//!
//! Sources are fetched and validated on a worker thread, then kept in
//! memory. Seeking rebuilds the sink over the buffered bytes with
//! `skip_duration`, which works for every format rodio can decode.

use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};

use crate::album::probe::duration_of_bytes;
use crate::album::{Track, TrackId, http_client, read_source};
use crate::config::FetchSettings;
use crate::player::{DecoderEvent, DecoderEvents};

use super::{Decoder, LoadError};

/// Outcome of a background load, parked until the player starts it.
struct PreparedSource {
    track: TrackId,
    bytes: Arc<[u8]>,
    duration: Option<Duration>,
}

pub struct RodioDecoder {
    stream: OutputStream,
    events: DecoderEvents,
    fetch: FetchSettings,
    /// Bumped whenever the current source or sink is invalidated. Worker
    /// and watcher threads capture the value they were spawned under and
    /// stay silent once it moved on.
    epoch: Arc<AtomicU64>,
    pending: Arc<Mutex<Option<PreparedSource>>>,
    sink: Option<Arc<Sink>>,
    bytes: Option<Arc<[u8]>>,
    track: Option<TrackId>,
    duration: Option<Duration>,
    /// Position of the start of the current sink within the track.
    base: Duration,
}

impl RodioDecoder {
    /// Open the default audio output. The stream stays with this value
    /// until it is dropped.
    pub fn new(events: DecoderEvents, fetch: FetchSettings) -> Result<Self, rodio::StreamError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio logs to stderr when an OutputStream is dropped. That's
        // useful in debugging, but noisy for a TUI app.
        stream.log_on_drop(false);
        Ok(Self {
            stream,
            events,
            fetch,
            epoch: Arc::new(AtomicU64::new(0)),
            pending: Arc::new(Mutex::new(None)),
            sink: None,
            bytes: None,
            track: None,
            duration: None,
            base: Duration::ZERO,
        })
    }

    /// Build a paused sink over `bytes`, positioned at `start_at`.
    fn build_sink(
        &self,
        bytes: Arc<[u8]>,
        start_at: Duration,
    ) -> Result<Sink, rodio::decoder::DecoderError> {
        // `skip_duration` is the seeking primitive; Duration::ZERO is fine.
        let source = rodio::Decoder::new(Cursor::new(bytes))?.skip_duration(start_at);
        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        sink.pause();
        Ok(sink)
    }

    /// Report `Completed` when `sink` drains to its natural end.
    fn spawn_completion_watcher(&self, sink: Arc<Sink>, track: TrackId) {
        let epoch = self.epoch.clone();
        let at = epoch.load(Ordering::SeqCst);
        let events = self.events.clone();
        thread::spawn(move || {
            sink.sleep_until_end();
            if epoch.load(Ordering::SeqCst) == at {
                events.send(DecoderEvent::Completed { track });
            }
        });
    }
}

impl Decoder for RodioDecoder {
    fn reset(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut slot) = self.pending.lock() {
            *slot = None;
        }
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.bytes = None;
        self.track = None;
        self.duration = None;
        self.base = Duration::ZERO;
    }

    fn load(&mut self, track: &Track) {
        let at = self.epoch.load(Ordering::SeqCst);
        let epoch = self.epoch.clone();
        let pending = self.pending.clone();
        let events = self.events.clone();
        let fetch = self.fetch.clone();
        let id = track.id;
        let locator = track.locator.clone();
        let title = track.title.clone();

        thread::spawn(move || match load_source(&fetch, &locator) {
            Ok((bytes, duration)) => {
                let Ok(mut slot) = pending.lock() else { return };
                // Re-checked under the lock so a reset that already cleared
                // the slot cannot be overwritten by a stale result.
                if epoch.load(Ordering::SeqCst) != at {
                    return;
                }
                *slot = Some(PreparedSource {
                    track: id,
                    bytes,
                    duration,
                });
                drop(slot);
                tracing::debug!(track = %title, "source prepared");
                events.send(DecoderEvent::Prepared { track: id });
            }
            Err(err) => {
                if epoch.load(Ordering::SeqCst) != at {
                    return;
                }
                tracing::warn!(track = %title, error = %err, "source load failed");
                events.send(DecoderEvent::Failed {
                    track: id,
                    message: err.to_string(),
                });
            }
        });
    }

    fn start(&mut self) {
        // The first start after a load consumes the prepared source; later
        // calls resume the existing sink.
        if let Some(prepared) = self.pending.lock().ok().and_then(|mut slot| slot.take()) {
            self.track = Some(prepared.track);
            self.duration = prepared.duration;
            self.base = Duration::ZERO;
            match self.build_sink(prepared.bytes.clone(), Duration::ZERO) {
                Ok(sink) => {
                    let sink = Arc::new(sink);
                    self.spawn_completion_watcher(sink.clone(), prepared.track);
                    self.bytes = Some(prepared.bytes);
                    self.sink = Some(sink);
                }
                Err(err) => {
                    self.events.send(DecoderEvent::Failed {
                        track: prepared.track,
                        message: err.to_string(),
                    });
                    return;
                }
            }
        }
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn seek(&mut self, position: Duration) {
        let Some(bytes) = self.bytes.clone() else {
            return;
        };
        let Some(track) = self.track else {
            return;
        };
        let was_playing = self.sink.as_ref().is_some_and(|s| !s.is_paused());

        // Invalidate the old sink so its completion watcher stays silent.
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(old) = self.sink.take() {
            old.stop();
        }

        match self.build_sink(bytes, position) {
            Ok(sink) => {
                let sink = Arc::new(sink);
                self.spawn_completion_watcher(sink.clone(), track);
                if was_playing {
                    sink.play();
                }
                self.base = position;
                self.sink = Some(sink);
                self.events.send(DecoderEvent::SeekComplete { track });
            }
            Err(err) => {
                self.events.send(DecoderEvent::Failed {
                    track,
                    message: err.to_string(),
                });
            }
        }
    }

    fn position(&self) -> Duration {
        match &self.sink {
            Some(sink) => self.base + sink.get_pos(),
            None => Duration::ZERO,
        }
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn release(&mut self) {
        self.reset();
    }
}

/// Fetch the source bytes, prove they decode and find their duration.
fn load_source(
    fetch: &FetchSettings,
    locator: &str,
) -> Result<(Arc<[u8]>, Option<Duration>), LoadError> {
    let client = http_client(fetch)?;
    let bytes: Arc<[u8]> = read_source(&client, locator)?.into();

    let decoded = rodio::Decoder::new(Cursor::new(bytes.clone()))
        .map_err(|e| LoadError::Decode(e.to_string()))?;
    let duration = decoded
        .total_duration()
        .or_else(|| duration_of_bytes(&bytes));

    Ok((bytes, duration))
}
