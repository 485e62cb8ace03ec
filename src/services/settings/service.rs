use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::models::settings::EngineSettings;

const SETTINGS_FILE: &str = "gestures.toml";

/// Location of the settings file in the platform config directory.
pub fn default_settings_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "KenBoyle", "RustCalendar")
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}

pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Service bound to the platform config directory.
    pub fn from_default_location() -> Result<Self> {
        let path = default_settings_path()
            .ok_or_else(|| anyhow!("Could not determine a config directory"))?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings; a missing file yields defaults
    pub fn load(&self) -> Result<EngineSettings> {
        if !self.path.exists() {
            log::debug!("No settings at {}, using defaults", self.path.display());
            return Ok(EngineSettings::default());
        }

        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let settings: EngineSettings = toml::from_str(&text)
            .with_context(|| format!("Failed to parse settings in {}", self.path.display()))?;

        settings
            .validate()
            .with_context(|| format!("Rejected settings in {}", self.path.display()))?;
        Ok(settings)
    }

    /// Validate and write settings, creating the directory if needed
    pub fn save(&self, settings: &EngineSettings) -> Result<()> {
        settings.validate().context("Refusing to save settings")?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let text = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        fs::write(&self.path, text)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))?;
        Ok(())
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(&self) -> EngineSettings {
        match self.load() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to load settings: {:#}, using defaults", e);
                EngineSettings::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::slots::CustomSlotMap;
    use tempfile::TempDir;

    fn service_in(dir: &TempDir) -> SettingsService {
        SettingsService::new(dir.path().join("nested").join(SETTINGS_FILE))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir);
        assert_eq!(service.load().unwrap(), EngineSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir);

        let settings = EngineSettings {
            hour_height: 48.0,
            snap_minutes: 15,
            max_simultaneous_events: 4,
            custom_slots: CustomSlotMap::new().with_offsets(9, [20, 40]),
        };
        service.save(&settings).unwrap();

        assert_eq!(service.load().unwrap(), settings);
    }

    #[test]
    fn test_save_rejects_invalid() {
        let dir = TempDir::new().unwrap();
        let service = service_in(&dir);

        let settings = EngineSettings {
            max_simultaneous_events: 0,
            ..Default::default()
        };
        assert!(service.save(&settings).is_err());
        assert!(!service.path().exists());
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let service = SettingsService::new(dir.path().join(SETTINGS_FILE));
        fs::write(service.path(), "hour_height = \"tall\"").unwrap();

        assert!(service.load().is_err());
        assert_eq!(service.load_or_default(), EngineSettings::default());
    }

    #[test]
    fn test_out_of_range_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let service = SettingsService::new(dir.path().join(SETTINGS_FILE));
        fs::write(service.path(), "snap_minutes = 120").unwrap();

        assert!(service.load().is_err());
    }
}
