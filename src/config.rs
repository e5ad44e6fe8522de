// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use chrono::TimeDelta;
use flash_core::error::ErrorReport;
use flash_core::error::Fallible;
use flash_core::queue::QueueConfig;
use flash_core::types::card::Timeouts;
use serde::Deserialize;

/// Name of the settings file looked up next to a deck.
pub const SETTINGS_FILE: &str = "flash.toml";

/// Review settings. Every field is optional; missing fields take the
/// default.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Minutes a card waits after a correct answer.
    pub right_timeout: Option<u32>,
    /// Minutes a card waits after an incorrect answer.
    pub wrong_timeout: Option<u32>,
    pub cluster_window: Option<usize>,
}

impl Settings {
    pub fn load(path: &Path) -> Fallible<Self> {
        let text = read_to_string(path).map_err(|e| {
            ErrorReport::new(format!("failed to read settings '{}': {e}", path.display()))
        })?;
        let settings: Settings = toml::from_str(&text)?;
        log::debug!("Loaded settings from {}: {settings:?}", path.display());
        Ok(settings)
    }

    /// Load the settings file at `explicit` if given. Otherwise use the
    /// settings file next to the deck at `deck_path`, if there is one.
    pub fn find(explicit: Option<&str>, deck_path: &Path) -> Fallible<Self> {
        if let Some(path) = explicit {
            return Self::load(Path::new(path));
        }
        let candidate: PathBuf = if deck_path.is_dir() {
            deck_path.join(SETTINGS_FILE)
        } else {
            deck_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(SETTINGS_FILE)
        };
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Fields set in `overrides` win.
    pub fn merge(self, overrides: Settings) -> Settings {
        Settings {
            right_timeout: overrides.right_timeout.or(self.right_timeout),
            wrong_timeout: overrides.wrong_timeout.or(self.wrong_timeout),
            cluster_window: overrides.cluster_window.or(self.cluster_window),
        }
    }

    pub fn queue_config(&self) -> QueueConfig {
        let defaults = QueueConfig::default();
        let minutes = |m: u32| TimeDelta::minutes(i64::from(m));
        QueueConfig {
            timeouts: Timeouts {
                right: self
                    .right_timeout
                    .map(minutes)
                    .unwrap_or(defaults.timeouts.right),
                wrong: self
                    .wrong_timeout
                    .map(minutes)
                    .unwrap_or(defaults.timeouts.wrong),
            },
            cluster_window: self.cluster_window.unwrap_or(defaults.cluster_window),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Settings::default().queue_config();
        assert_eq!(config, QueueConfig::default());
        assert_eq!(config.timeouts.right, TimeDelta::minutes(10));
        assert_eq!(config.timeouts.wrong, TimeDelta::minutes(1));
        assert_eq!(config.cluster_window, 5);
    }

    #[test]
    fn test_load() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join(SETTINGS_FILE);
        write(&path, "right_timeout = 20\ncluster_window = 3\n")?;
        let settings = Settings::load(&path)?;
        assert_eq!(
            settings,
            Settings {
                right_timeout: Some(20),
                wrong_timeout: None,
                cluster_window: Some(3),
            }
        );
        let config = settings.queue_config();
        assert_eq!(config.timeouts.right, TimeDelta::minutes(20));
        assert_eq!(config.timeouts.wrong, TimeDelta::minutes(1));
        assert_eq!(config.cluster_window, 3);
        Ok(())
    }

    #[test]
    fn test_unknown_field() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join(SETTINGS_FILE);
        write(&path, "right_timeuot = 20\n")?;
        assert!(Settings::load(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_find_next_to_deck() -> Fallible<()> {
        let dir = tempdir()?;
        write(dir.path().join(SETTINGS_FILE), "wrong_timeout = 2\n")?;
        let deck = dir.path().join("deck.yaml");
        write(&deck, "")?;
        let expected = Settings {
            wrong_timeout: Some(2),
            ..Settings::default()
        };
        assert_eq!(Settings::find(None, &deck)?, expected);
        assert_eq!(Settings::find(None, dir.path())?, expected);
        Ok(())
    }

    #[test]
    fn test_find_without_file() -> Fallible<()> {
        let dir = tempdir()?;
        assert_eq!(Settings::find(None, dir.path())?, Settings::default());
        Ok(())
    }

    #[test]
    fn test_find_explicit_missing() -> Fallible<()> {
        let dir = tempdir()?;
        let missing = dir.path().join("nope.toml");
        let missing = missing.display().to_string();
        assert!(Settings::find(Some(&missing), dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_merge() {
        let file = Settings {
            right_timeout: Some(20),
            wrong_timeout: Some(2),
            cluster_window: None,
        };
        let cli = Settings {
            right_timeout: Some(5),
            ..Settings::default()
        };
        assert_eq!(
            file.merge(cli),
            Settings {
                right_timeout: Some(5),
                wrong_timeout: Some(2),
                cluster_window: None,
            }
        );
    }
}
