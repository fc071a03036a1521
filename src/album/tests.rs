use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::probe;
use super::*;
use crate::config::FetchSettings;

const DESCRIPTOR: &str = r#"
{
    "id": 1,
    "title": "Some album",
    "subtitle": "Remastered",
    "artist": "Some artist",
    "published": "2021",
    "genre": "Classical",
    "tracks": [
        { "id": 1, "file": "audio/01_overture.mp3" },
        { "id": 2, "file": "audio/02_aria.mp3", "duration": 154000 },
        { "id": 3, "file": "https://cdn.example.org/bonus.flac" }
    ]
}
"#;

/// A valid little WAV: 16-bit mono PCM of silence, `seconds` long.
fn wav_bytes(seconds: u32, sample_rate: u32) -> Vec<u8> {
    let data_len = seconds * sample_rate * 2;
    let mut v = Vec::with_capacity(44 + data_len as usize);
    v.extend_from_slice(b"RIFF");
    v.extend_from_slice(&(36 + data_len).to_le_bytes());
    v.extend_from_slice(b"WAVE");
    v.extend_from_slice(b"fmt ");
    v.extend_from_slice(&16u32.to_le_bytes());
    v.extend_from_slice(&1u16.to_le_bytes()); // PCM
    v.extend_from_slice(&1u16.to_le_bytes()); // mono
    v.extend_from_slice(&sample_rate.to_le_bytes());
    v.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    v.extend_from_slice(&2u16.to_le_bytes());
    v.extend_from_slice(&16u16.to_le_bytes());
    v.extend_from_slice(b"data");
    v.extend_from_slice(&data_len.to_le_bytes());
    v.resize(44 + data_len as usize, 0);
    v
}

fn sample_album() -> Album {
    let doc: AlbumDoc = serde_json::from_str(DESCRIPTOR).expect("descriptor parses");
    doc.into_album("https://example.org/data")
}

#[test]
fn descriptor_parses_and_resolves() {
    let album = sample_album();

    assert_eq!(album.title, "Some album");
    assert_eq!(album.artist, "Some artist");
    assert_eq!(album.published, "2021");
    assert_eq!(album.genre, "Classical");
    assert_eq!(album.tracks.len(), 3);

    let first = &album.tracks[0];
    assert_eq!(first.id, 1);
    assert_eq!(first.locator, "https://example.org/data/audio/01_overture.mp3");
    assert_eq!(first.title, "01_overture");
    assert_eq!(first.album_title, "Some album");
    assert_eq!(first.duration, None);

    assert_eq!(album.tracks[1].duration, Some(Duration::from_millis(154000)));
    // Absolute entries keep their own URL.
    assert_eq!(album.tracks[2].locator, "https://cdn.example.org/bonus.flac");
}

#[test]
fn descriptor_without_metadata_still_parses() {
    let doc: AlbumDoc = serde_json::from_str(r#"{ "tracks": [] }"#).expect("minimal descriptor");
    let album = doc.into_album("");
    assert_eq!(album.title, "");
    assert!(album.tracks.is_empty());
}

#[test]
fn locators_resolve_against_the_base() {
    assert_eq!(resolve_locator("https://h/a", "t.mp3"), "https://h/a/t.mp3");
    assert_eq!(resolve_locator("https://h/a/", "t.mp3"), "https://h/a/t.mp3");
    assert_eq!(resolve_locator("https://h/a", "/t.mp3"), "https://h/a/t.mp3");
    assert_eq!(resolve_locator("", "music/t.mp3"), "music/t.mp3");
    assert_eq!(
        resolve_locator("https://h/a", "ftp://other/t.mp3"),
        "ftp://other/t.mp3"
    );
}

#[test]
fn base_drops_the_last_url_segment() {
    assert_eq!(
        base_from_url("https://example.org/data/album.json"),
        "https://example.org/data"
    );
    assert_eq!(base_from_url("album.json"), "");
}

#[test]
fn titles_come_from_the_file_stem() {
    assert_eq!(title_from_file("audio/01_overture.mp3"), "01_overture");
    assert_eq!(title_from_file("plain.flac"), "plain");
    assert_eq!(title_from_file("noext"), "noext");
    assert_eq!(title_from_file("dir/.hidden"), ".hidden");
}

#[test]
fn wav_duration_is_read_from_the_container() {
    let bytes = wav_bytes(2, 8000);
    let duration = probe::duration_of_bytes(&bytes).expect("wav has a duration");
    assert_eq!(duration.as_secs(), 2);
}

#[test]
fn garbage_bytes_have_no_duration() {
    assert_eq!(probe::duration_of_bytes(b"not audio at all"), None);
}

#[test]
fn probe_refines_durations_and_keeps_failures_intact() {
    let album = sample_album();
    let cancelled = AtomicBool::new(false);

    let refined = probe::refine_with(album, &cancelled, |locator| {
        // Only the first track is reachable in this scenario.
        locator.ends_with("01_overture.mp3").then(|| wav_bytes(3, 8000))
    });

    assert_eq!(refined.tracks[0].duration, Some(Duration::from_secs(3)));
    // Unreachable tracks keep their descriptor value.
    assert_eq!(refined.tracks[1].duration, Some(Duration::from_millis(154000)));
    assert_eq!(refined.tracks[2].duration, None);
}

#[test]
fn probe_stops_once_cancelled() {
    let album = sample_album();
    let cancelled = AtomicBool::new(false);

    let refined = probe::refine_with(album, &cancelled, |_| {
        // Cancel from "outside" while the first track is in flight.
        cancelled.store(true, Ordering::SeqCst);
        Some(wav_bytes(1, 8000))
    });

    assert_eq!(refined.tracks[0].duration, Some(Duration::from_secs(1)));
    assert_eq!(refined.tracks[2].duration, None);
}

#[test]
fn local_sources_are_read_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("track.wav");
    std::fs::write(&path, wav_bytes(1, 8000)).expect("write wav");

    let client = http_client(&FetchSettings::default()).expect("client");
    let bytes = read_source(&client, path.to_str().expect("utf-8 path")).expect("read back");
    assert_eq!(bytes.len(), 44 + 16000);

    let missing = read_source(&client, "/definitely/not/there.mp3");
    assert!(matches!(missing, Err(FetchError::Io(_, _))));
}
