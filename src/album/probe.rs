//! Per-track duration probe.
//!
//! Descriptors in the wild rarely carry durations, so after the album is
//! shown we download each track once and read the real duration from its
//! container metadata. A track that cannot be fetched or parsed keeps
//! whatever value it already had.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use lofty::prelude::*;
use lofty::probe::Probe;

use crate::config::FetchSettings;

use super::fetch::{http_client, read_source};
use super::model::Album;

/// Read the container duration from raw audio bytes.
pub fn duration_of_bytes(bytes: &[u8]) -> Option<Duration> {
    let probe = Probe::new(Cursor::new(bytes)).guess_file_type().ok()?;
    let tagged = probe.read().ok()?;
    Some(tagged.properties().duration())
}

/// Download every track of `album` and return the album with refined
/// durations. Checks `cancelled` between tracks.
pub fn refine_durations(settings: &FetchSettings, album: Album, cancelled: &AtomicBool) -> Album {
    let Ok(client) = http_client(settings) else {
        return album;
    };
    refine_with(album, cancelled, |locator| {
        read_source(&client, locator).ok()
    })
}

pub(super) fn refine_with<F>(mut album: Album, cancelled: &AtomicBool, fetch: F) -> Album
where
    F: Fn(&str) -> Option<Vec<u8>>,
{
    for track in album.tracks.iter_mut() {
        if cancelled.load(Ordering::SeqCst) {
            break;
        }
        let Some(bytes) = fetch(&track.locator) else {
            tracing::debug!(track = %track.title, "duration probe skipped, source unavailable");
            continue;
        };
        if let Some(duration) = duration_of_bytes(&bytes) {
            tracing::debug!(track = %track.title, secs = duration.as_secs(), "duration probed");
            track.duration = Some(duration);
        }
    }
    album
}
