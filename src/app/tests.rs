use std::time::Duration;

use super::*;
use crate::album::{Album, Track};
use crate::player::PlayerSnapshot;

fn track(id: u64, title: &str) -> Track {
    Track {
        id,
        locator: format!("https://example.org/data/{title}.mp3"),
        title: title.to_string(),
        album_title: "Some album".to_string(),
        duration: Some(Duration::from_secs(180)),
    }
}

fn album(tracks: Vec<Track>) -> Album {
    Album {
        title: "Some album".to_string(),
        artist: "Some artist".to_string(),
        published: "2021".to_string(),
        genre: "Classical".to_string(),
        tracks,
    }
}

fn playing(id: u64, progress: u16) -> PlayerSnapshot {
    PlayerSnapshot {
        playing: true,
        current: Some(track(id, "t")),
        progress_permille: progress,
    }
}

fn app_with_tracks(n: u64) -> App {
    let mut app = App::new();
    app.set_album(album((1..=n).map(|i| track(i, &format!("t{i}"))).collect()));
    app
}

#[test]
fn set_album_fills_meta_and_clamps_the_cursor() {
    let mut app = app_with_tracks(5);
    app.selected = 4;

    app.set_album(album(vec![track(1, "only")]));
    assert_eq!(app.selected, 0);
    assert_eq!(app.meta.as_ref().map(|m| m.artist.as_str()), Some("Some artist"));
    assert!(app.has_tracks());
}

#[test]
fn cursor_wraps_both_ways_and_leaves_follow_mode() {
    let mut app = app_with_tracks(3);
    assert!(app.follow_playback);

    app.select_prev();
    assert_eq!(app.selected, 2);
    assert!(!app.follow_playback);

    app.select_next();
    assert_eq!(app.selected, 0);

    app.select_last();
    assert_eq!(app.selected, 2);
    app.select_first();
    assert_eq!(app.selected, 0);
}

#[test]
fn cursor_moves_are_safe_on_an_empty_list() {
    let mut app = App::new();
    app.select_next();
    app.select_prev();
    app.select_first();
    app.select_last();
    assert_eq!(app.selected, 0);
    assert!(app.selected_track().is_none());
}

#[test]
fn follow_mode_pulls_the_cursor_onto_the_playing_track() {
    let mut app = app_with_tracks(3);

    app.apply_snapshot(playing(3, 0));
    assert_eq!(app.selected, 2);

    // Same identity again: the cursor stays wherever it is.
    app.selected = 0;
    app.apply_snapshot(playing(3, 500));
    assert_eq!(app.selected, 0);
}

#[test]
fn free_roam_keeps_the_cursor_in_place() {
    let mut app = app_with_tracks(3);
    app.select_next(); // leaves follow mode

    app.apply_snapshot(playing(3, 0));
    assert_eq!(app.selected, 1);
    assert_eq!(app.snapshot.progress_permille, 0);
}

#[test]
fn pending_seek_overrides_the_gauge_until_resolved() {
    let mut app = app_with_tracks(1);
    app.apply_snapshot(playing(1, 400));
    assert_eq!(app.gauge_permille(), 400);

    app.adjust_pending_seek(50);
    assert_eq!(app.gauge_permille(), 450);
    app.adjust_pending_seek(50);
    assert_eq!(app.gauge_permille(), 500);

    // Live progress keeps arriving but the gauge stays on the target.
    app.apply_snapshot(playing(1, 410));
    assert_eq!(app.gauge_permille(), 500);

    assert_eq!(app.take_pending_seek(), Some(500));
    assert_eq!(app.gauge_permille(), 410);
    assert_eq!(app.take_pending_seek(), None);
}

#[test]
fn pending_seek_clamps_to_the_track_bounds() {
    let mut app = app_with_tracks(1);
    app.apply_snapshot(playing(1, 980));

    app.adjust_pending_seek(100);
    assert_eq!(app.gauge_permille(), 1000);

    app.cancel_pending_seek();
    app.apply_snapshot(playing(1, 10));
    app.adjust_pending_seek(-100);
    assert_eq!(app.gauge_permille(), 0);
}

#[test]
fn cancel_pending_seek_snaps_back_to_live_progress() {
    let mut app = app_with_tracks(1);
    app.apply_snapshot(playing(1, 300));

    app.adjust_pending_seek(200);
    assert_eq!(app.gauge_permille(), 500);
    app.cancel_pending_seek();
    assert_eq!(app.gauge_permille(), 300);
}

#[test]
fn toast_is_stored_until_acknowledged() {
    let mut app = App::new();
    app.show_toast("Could not load the album: network error".to_string());
    assert!(app.toast.is_some());
    app.clear_toast();
    assert!(app.toast.is_none());
}
