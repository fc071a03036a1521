use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::album::AlbumEvent;
use crate::app::App;
use crate::config;
use crate::player::{Player, PlayerSnapshot};
use crate::ui;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self { pending_gg: false }
    }
}

/// Main terminal event loop: drains the album and snapshot channels,
/// draws, and handles input. Returns when a quit is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    player: &Player,
    album_rx: &Receiver<AlbumEvent>,
    snapshots: &Receiver<PlayerSnapshot>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut state = EventLoopState::new();

    loop {
        while let Ok(event) = album_rx.try_recv() {
            apply_album_event(event, app, player);
        }

        while let Ok(snapshot) = snapshots.try_recv() {
            app.apply_snapshot(snapshot);
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, player, &mut state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn apply_album_event(event: AlbumEvent, app: &mut App, player: &Player) {
    match event {
        AlbumEvent::Loaded(album) | AlbumEvent::Refined(album) => {
            player.set_playlist(album.tracks.clone());
            app.set_album(album);
        }
        AlbumEvent::Failed(message) => {
            app.show_toast(format!("Could not load the album: {message}"));
        }
    }
}

/// Handle a single key press. Returns true when the app should quit.
fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    player: &Player,
    state: &mut EventLoopState,
) -> bool {
    // Any key acknowledges a failure message.
    app.clear_toast();

    match key.code {
        KeyCode::Char('q') => {
            return true;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.pending_gg = false;
            app.select_next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.pending_gg = false;
            app.select_prev();
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.select_first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.pending_gg = false;
            app.select_last();
        }
        KeyCode::Enter => {
            state.pending_gg = false;
            if let Some(permille) = app.take_pending_seek() {
                player.seek_to(permille);
            } else {
                let selected = app.selected_track().map(|t| t.id);
                if let Some(id) = selected {
                    app.follow_playback_on();
                    player.play(id);
                }
            }
        }
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            state.pending_gg = false;
            if app.has_tracks() {
                app.follow_playback_on();
                player.play_pause();
            }
        }
        KeyCode::Char('l') | KeyCode::Right => {
            state.pending_gg = false;
            if app.has_tracks() {
                app.follow_playback_on();
                player.play_next();
            }
        }
        KeyCode::Char('h') | KeyCode::Left => {
            state.pending_gg = false;
            if app.has_tracks() {
                app.follow_playback_on();
                player.play_previous();
            }
        }
        KeyCode::Char('L') => {
            state.pending_gg = false;
            app.adjust_pending_seek(i32::from(settings.ui.seek_step_permille));
        }
        KeyCode::Char('H') => {
            state.pending_gg = false;
            app.adjust_pending_seek(-i32::from(settings.ui.seek_step_permille));
        }
        KeyCode::Esc => {
            state.pending_gg = false;
            app.cancel_pending_seek();
        }
        _ => {
            state.pending_gg = false;
        }
    }
    false
}
