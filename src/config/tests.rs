use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_attacca_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("ATTACCA_CONFIG_PATH", "/tmp/attacca-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/attacca-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("attacca")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("attacca")
            .join("config.toml")
    );
}

#[test]
fn defaults_point_at_the_published_album() {
    let s = Settings::default();
    assert!(s.album.url.ends_with("album.json"));
    assert!(s.album.base_url.is_empty());
    assert_eq!(s.player.tick_interval_ms, 1000);
    assert_eq!(s.player.seek_end_guard_ms, 200);
    assert!(s.fetch.probe_durations);
    assert!(s.ui.follow_playback);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[album]
url = "https://example.org/music/album.json"
base_url = "https://cdn.example.org/music"

[fetch]
connect_timeout_ms = 2000
request_timeout_ms = 5000
probe_durations = false

[player]
tick_interval_ms = 250
seek_end_guard_ms = 500

[ui]
follow_playback = false
seek_step_permille = 100

[log]
file = "/tmp/attacca.log"
filter = "attacca=debug"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("ATTACCA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("ATTACCA__PLAYER__TICK_INTERVAL_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.album.url, "https://example.org/music/album.json");
    assert_eq!(s.album.base_url, "https://cdn.example.org/music");
    assert_eq!(s.fetch.connect_timeout_ms, 2000);
    assert_eq!(s.fetch.request_timeout_ms, 5000);
    assert!(!s.fetch.probe_durations);
    assert_eq!(s.player.tick_interval_ms, 250);
    assert_eq!(s.player.seek_end_guard_ms, 500);
    assert!(!s.ui.follow_playback);
    assert_eq!(s.ui.seek_step_permille, 100);
    assert_eq!(s.log.file, "/tmp/attacca.log");
    assert_eq!(s.log.filter, "attacca=debug");
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[player]
tick_interval_ms = 1000
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("ATTACCA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("ATTACCA__PLAYER__TICK_INTERVAL_MS", "125");

    let s = Settings::load().unwrap();
    assert_eq!(s.player.tick_interval_ms, 125);
}

#[test]
fn validate_rejects_zeroed_timings() {
    let mut s = Settings::default();
    s.player.tick_interval_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.fetch.request_timeout_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.ui.seek_step_permille = 1001;
    assert!(s.validate().is_err());
}
