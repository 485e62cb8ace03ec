// Settings service
// Loads and stores EngineSettings as TOML in the platform config directory

mod service;

pub use service::{default_settings_path, SettingsService};
