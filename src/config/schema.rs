use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/attacca/config.toml` or `~/.config/attacca/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ATTACCA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub album: AlbumSettings,
    pub fetch: FetchSettings,
    pub player: PlayerSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            album: AlbumSettings::default(),
            fetch: FetchSettings::default(),
            player: PlayerSettings::default(),
            ui: UiSettings::default(),
            log: LogSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlbumSettings {
    /// URL of the album descriptor (JSON). The first CLI argument overrides it.
    pub url: String,
    /// Base URL for relative track paths.
    /// Empty means "derive it from `url` by dropping the last segment".
    pub base_url: String,
}

impl Default for AlbumSettings {
    fn default() -> Self {
        Self {
            url: "https://raw.githubusercontent.com/netology-code/andad-homeworks/master/09_multimedia/data/album.json"
                .to_string(),
            base_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// TCP connect timeout for HTTP requests (milliseconds).
    pub connect_timeout_ms: u64,
    /// Whole-request timeout for HTTP requests (milliseconds).
    /// Also bounds how long a single track download may take.
    pub request_timeout_ms: u64,
    /// Whether to download each track once after the fetch and read its
    /// real duration from the container metadata.
    pub probe_durations: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            probe_durations: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Cadence of progress snapshots while playback runs (milliseconds).
    pub tick_interval_ms: u64,
    /// Safety margin kept from the end of a track when seeking (milliseconds).
    pub seek_end_guard_ms: u64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            seek_end_guard_ms: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Whether the cursor starts in "follow playback" mode.
    pub follow_playback: bool,
    /// How far one `H` / `L` press moves the seek target, in permille
    /// of the track (50 = 5%).
    pub seek_step_permille: u16,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            follow_playback: true,
            seek_step_permille: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log file path. Empty disables logging entirely (the TUI owns the
    /// terminal, so there is no sensible stderr to write to).
    pub file: String,
    /// `tracing` filter directive, e.g. "info" or "attacca=debug".
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: String::new(),
            filter: "info".to_string(),
        }
    }
}
