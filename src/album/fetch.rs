//! Fetching the album descriptor and raw track sources over HTTP.
//!
//! The fetch runs on its own thread and reports through an [`AlbumEvent`]
//! channel. Cancellation is cooperative: once cancelled, no further event
//! is delivered.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;

use crate::config::FetchSettings;

use super::model::{Album, AlbumDoc, base_from_url, has_scheme};
use super::probe;

const USER_AGENT: &str = concat!("attacca/", env!("CARGO_PKG_VERSION"));

/// Failure to obtain or decode the album descriptor or a track source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server returned status {0}")]
    Status(u16),

    #[error("malformed album descriptor: {0}")]
    Parse(String),

    #[error("cannot read {0}: {1}")]
    Io(String, String),
}

/// Updates delivered by the fetch thread.
#[derive(Debug)]
pub enum AlbumEvent {
    /// Descriptor fetched and decoded.
    Loaded(Album),
    /// The same album after the duration probe refined its tracks.
    Refined(Album),
    /// Terminal failure; the message is surfaced to the user once.
    Failed(String),
}

/// Handle over the fetch thread. Cancelling suppresses event delivery;
/// in-flight work winds down on its own.
pub struct FetchHandle {
    cancelled: Arc<AtomicBool>,
}

impl FetchHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Spawn the fetch thread for `album_url`, delivering into `tx`.
pub fn spawn_fetch(
    settings: FetchSettings,
    album_url: String,
    base_url: String,
    tx: Sender<AlbumEvent>,
) -> FetchHandle {
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();

    thread::spawn(move || fetch_worker(settings, album_url, base_url, tx, flag));

    FetchHandle { cancelled }
}

fn fetch_worker(
    settings: FetchSettings,
    album_url: String,
    base_url: String,
    tx: Sender<AlbumEvent>,
    cancelled: Arc<AtomicBool>,
) {
    tracing::info!(url = %album_url, "fetching album descriptor");

    let album = match fetch_album(&settings, &album_url, &base_url) {
        Ok(album) => album,
        Err(err) => {
            tracing::warn!(error = %err, "album fetch failed");
            if !cancelled.load(Ordering::SeqCst) {
                let _ = tx.send(AlbumEvent::Failed(err.to_string()));
            }
            return;
        }
    };

    if cancelled.load(Ordering::SeqCst) {
        return;
    }
    tracing::info!(album = %album.title, tracks = album.tracks.len(), "album loaded");
    let _ = tx.send(AlbumEvent::Loaded(album.clone()));

    if !settings.probe_durations {
        return;
    }
    let refined = probe::refine_durations(&settings, album, &cancelled);
    if cancelled.load(Ordering::SeqCst) {
        return;
    }
    let _ = tx.send(AlbumEvent::Refined(refined));
}

/// One GET of the album descriptor, decoded and resolved against the base
/// URL. An empty `base_url` means "derive it from the descriptor URL".
pub fn fetch_album(
    settings: &FetchSettings,
    album_url: &str,
    base_url: &str,
) -> Result<Album, FetchError> {
    let client = http_client(settings)?;

    let response = client
        .get(album_url)
        .send()
        .map_err(|e| FetchError::Network(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let body = response
        .text()
        .map_err(|e| FetchError::Network(e.to_string()))?;
    let doc: AlbumDoc =
        serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let base = if base_url.is_empty() {
        base_from_url(album_url)
    } else {
        base_url.to_string()
    };
    Ok(doc.into_album(&base))
}

/// Build the blocking HTTP client with the configured timeouts.
pub fn http_client(settings: &FetchSettings) -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_millis(settings.connect_timeout_ms))
        .timeout(Duration::from_millis(settings.request_timeout_ms))
        .build()
        .map_err(|e| FetchError::Network(e.to_string()))
}

/// Read the raw bytes of a track source, remote or local.
pub fn read_source(client: &Client, locator: &str) -> Result<Vec<u8>, FetchError> {
    if has_scheme(locator) {
        let response = client
            .get(locator)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let bytes = response
            .bytes()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    } else {
        std::fs::read(locator).map_err(|e| FetchError::Io(locator.to_string(), e.to_string()))
    }
}
