use std::env;
use std::sync::mpsc;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::album::{self, AlbumEvent};
use crate::app::App;

mod event_loop;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    startup::init_logging(&settings.log);

    let album_url = env::args()
        .nth(1)
        .unwrap_or_else(|| settings.album.url.clone());
    if album_url.is_empty() {
        return Err("no album URL: pass one as the first argument or set album.url".into());
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), url = %album_url, "starting");

    let player = startup::spawn_player(&settings);
    let snapshots = player
        .take_snapshots()
        .ok_or("player snapshot stream already taken")?;

    let (album_tx, album_rx) = mpsc::channel::<AlbumEvent>();
    let fetch = album::spawn_fetch(
        settings.fetch.clone(),
        album_url,
        settings.album.base_url.clone(),
        album_tx,
    );

    let mut app = App::new();
    app.follow_playback = settings.ui.follow_playback;

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &player,
        &album_rx,
        &snapshots,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Stop background work before tearing the player down; the fetch
    // thread finishes on its own without delivering anything further.
    fetch.cancel();
    player.release();
    tracing::info!("stopped");

    run_result
}
