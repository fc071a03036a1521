use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::{LogSettings, Settings};
use crate::decoder::RodioDecoder;
use crate::player::Player;

/// Initialize the tracing subscriber, writing to the configured file.
/// With no file configured logging stays off; the TUI owns the terminal,
/// so there is nowhere sensible to print to.
pub fn init_logging(log: &LogSettings) {
    if log.file.is_empty() {
        return;
    }
    let file = match File::create(&log.file) {
        Ok(f) => f,
        Err(err) => {
            eprintln!("attacca: cannot open log file {}: {err}", log.file);
            return;
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log.filter.as_str()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
}

/// Spawn the player thread over the rodio backend.
pub fn spawn_player(settings: &Settings) -> Player {
    let fetch = settings.fetch.clone();
    Player::spawn(settings.player.clone(), move |events| {
        RodioDecoder::new(events, fetch)
    })
}
