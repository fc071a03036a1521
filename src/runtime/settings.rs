use crate::config;

/// Load settings, falling back to defaults when the config is missing or
/// invalid. The app should start either way.
pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(settings) => match settings.validate() {
            Ok(()) => settings,
            Err(msg) => {
                eprintln!("attacca: invalid config ({msg}), using defaults");
                config::Settings::default()
            }
        },
        Err(err) => {
            eprintln!("attacca: failed to load config ({err}), using defaults");
            config::Settings::default()
        }
    }
}
