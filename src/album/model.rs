//! Domain model of a published album and the JSON it is described by.

use std::time::Duration;

use serde::Deserialize;

/// Stable track identity within one album descriptor.
pub type TrackId = u64;

/// One playable track from the fetched album.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    /// Where the audio lives: an absolute URL or a local path.
    pub locator: String,
    /// Display title, derived from the source file name.
    pub title: String,
    pub album_title: String,
    /// Total length when known. `None` until a probe or the decoder fills it in.
    pub duration: Option<Duration>,
}

/// The fetched album: header metadata plus the ordered track list.
#[derive(Debug, Clone)]
pub struct Album {
    pub title: String,
    pub artist: String,
    pub published: String,
    pub genre: String,
    pub tracks: Vec<Track>,
}

/// Album descriptor as served over HTTP. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct AlbumDoc {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub published: String,
    #[serde(default)]
    pub genre: String,
    pub tracks: Vec<TrackDoc>,
}

/// One track entry of the descriptor. `file` is usually relative to the
/// album base URL; `duration` is optional milliseconds.
#[derive(Debug, Deserialize)]
pub struct TrackDoc {
    pub id: TrackId,
    pub file: String,
    #[serde(default)]
    pub duration: Option<u64>,
}

impl AlbumDoc {
    /// Turn the wire form into a domain [`Album`], resolving every track
    /// locator against `base`.
    pub fn into_album(self, base: &str) -> Album {
        let album_title = self.title.clone();
        let tracks = self
            .tracks
            .into_iter()
            .map(|t| Track {
                id: t.id,
                locator: resolve_locator(base, &t.file),
                title: title_from_file(&t.file),
                album_title: album_title.clone(),
                duration: t.duration.map(Duration::from_millis),
            })
            .collect();

        Album {
            title: self.title,
            artist: self.artist,
            published: self.published,
            genre: self.genre,
            tracks,
        }
    }
}

/// True when `locator` carries its own scheme (`http://`, `https://`, ...).
pub fn has_scheme(locator: &str) -> bool {
    locator.contains("://")
}

/// Resolve a descriptor `file` entry against the album base URL. Entries
/// with their own scheme pass through untouched.
pub fn resolve_locator(base: &str, file: &str) -> String {
    if has_scheme(file) || base.is_empty() {
        file.to_string()
    } else {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            file.trim_start_matches('/')
        )
    }
}

/// Base URL for relative track paths, derived from the descriptor URL by
/// dropping everything after the last `/`.
pub fn base_from_url(album_url: &str) -> String {
    match album_url.rfind('/') {
        Some(i) => album_url[..i].to_string(),
        None => String::new(),
    }
}

/// Display title for a track: the final path segment without its extension.
pub fn title_from_file(file: &str) -> String {
    let name = file.rsplit('/').next().unwrap_or(file);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}
