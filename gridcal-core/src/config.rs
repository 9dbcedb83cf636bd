//! Application configuration at ~/.config/gridcal/config.toml

use std::path::{Path, PathBuf};

use ::config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::aggregator::HolidayOverlay;
use crate::error::{GridcalError, GridcalResult};

static DEFAULT_CALENDAR_ID: &str = "primary";

/// Holiday sources tried in order when the overlay is on.
pub const DEFAULT_HOLIDAY_CALENDARS: [&str; 3] = [
    "ko.south_korea#holiday@group.v.calendar.google.com",
    "en.south_korea#holiday@group.v.calendar.google.com",
    "ko.south_korea.official#holiday@group.v.calendar.google.com",
];

fn default_calendar_id() -> String {
    DEFAULT_CALENDAR_ID.to_string()
}

fn default_holiday_overlay() -> bool {
    true
}

fn default_holiday_calendars() -> Vec<String> {
    DEFAULT_HOLIDAY_CALENDARS.iter().map(|s| s.to_string()).collect()
}

/// `~/.config/gridcal`, home of the config, OAuth client and session files.
pub fn base_dir() -> GridcalResult<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| GridcalError::Config("Could not determine config directory".into()))?
        .join("gridcal"))
}

/// Per-user directory for files that only matter while gridcal runs, like the
/// instance lock. Falls back to the cache dir, then to `base_dir()`.
pub fn runtime_dir() -> GridcalResult<PathBuf> {
    match dirs::runtime_dir().or_else(dirs::cache_dir) {
        Some(dir) => Ok(dir.join("gridcal")),
        None => base_dir(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Calendar whose events are shown and edited
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,

    #[serde(default = "default_holiday_overlay")]
    pub holiday_overlay: bool,

    #[serde(default = "default_holiday_calendars")]
    pub holiday_calendars: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            calendar_id: default_calendar_id(),
            holiday_overlay: default_holiday_overlay(),
            holiday_calendars: default_holiday_calendars(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> GridcalResult<PathBuf> {
        Ok(base_dir()?.join("config.toml"))
    }

    /// Load the user's config, writing a commented default file on first run.
    pub fn load() -> GridcalResult<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            Self::create_default_config(&path)?;
        }

        Self::load_from(&path)
    }

    /// Read `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> GridcalResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .build()
            .map_err(|e| GridcalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| GridcalError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> GridcalResult<()> {
        let holidays = DEFAULT_HOLIDAY_CALENDARS
            .iter()
            .map(|id| format!("#   \"{}\",\n", id))
            .collect::<String>();

        let contents = format!(
            "\
# gridcal configuration

# Calendar to show and edit:
# calendar_id = \"{}\"

# Show public holidays on the month grid:
# holiday_overlay = true

# Holiday calendars, tried in order until one answers:
# holiday_calendars = [
{}# ]
",
            DEFAULT_CALENDAR_ID, holidays
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GridcalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| GridcalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    pub fn holiday_overlay(&self) -> HolidayOverlay {
        HolidayOverlay {
            enabled: self.holiday_overlay,
            calendars: self.holiday_calendars.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn runtime_files_live_in_a_gridcal_directory() {
        let dir = runtime_dir().unwrap();
        assert!(dir.ends_with("gridcal"));
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.calendar_id, "primary");
        assert!(config.holiday_overlay);
    }

    #[test]
    fn generated_default_file_parses_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        AppConfig::create_default_config(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains(DEFAULT_HOLIDAY_CALENDARS[0]));

        assert_eq!(AppConfig::load_from(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "holiday_overlay = false\nholiday_calendars = [\"a@group\", \"b@group\"]\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.calendar_id, "primary");

        let overlay = config.holiday_overlay();
        assert!(!overlay.enabled);
        assert_eq!(overlay.calendars, ["a@group", "b@group"]);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "holiday_overlay = \"sometimes\"\n").unwrap();

        assert!(matches!(AppConfig::load_from(&path), Err(GridcalError::Config(_))));
    }
}
