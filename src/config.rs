//! Persisted user settings (lives in the OS config directory).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::drag::DEFAULT_DRAG_THRESHOLD;
use crate::error::StoreError;

const APP_NAME: &str = "OpApproachGantt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// The timeline ends on December 31 of this year.
    pub horizon_year: i32,
    /// Pointer travel, in pixels, before a press becomes a drag.
    pub drag_threshold: f32,
    /// Dataset reopened at start-up.
    pub last_dataset: Option<PathBuf>,
    /// Where imported datasets are written.
    pub data_dir: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            horizon_year: 2030,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            last_dataset: None,
            data_dir: default_data_dir(),
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("datasets"))
        .unwrap_or_else(|| PathBuf::from("datasets"))
}

/// Location of `settings.json`, falling back to the working directory.
pub fn settings_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join("settings.json"))
        .unwrap_or_else(|| PathBuf::from("settings.json"))
}

impl AppSettings {
    pub fn load() -> Self {
        Self::load_from(&settings_path())
    }

    /// Missing or unreadable files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(json) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring invalid settings file");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), StoreError> {
        self.save_to(&settings_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "horizon_year": 2035 }"#).unwrap();
        let settings = AppSettings::load_from(&path);
        assert_eq!(settings.horizon_year, 2035);
        assert_eq!(settings.drag_threshold, DEFAULT_DRAG_THRESHOLD);
        assert!(settings.last_dataset.is_none());
    }

    #[test]
    fn invalid_or_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(AppSettings::load_from(&path), AppSettings::default());
        std::fs::write(&path, "horizon_year = 2031").unwrap();
        assert_eq!(AppSettings::load_from(&path).horizon_year, 2030);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");
        let settings = AppSettings {
            last_dataset: Some(dir.path().join("harbour.json")),
            ..AppSettings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path), settings);
    }
}
