use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Display convention for temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// String form used in the settings file and the units selector.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    /// Parse a selector value; anything unrecognized falls back to metric.
    pub fn parse(value: &str) -> Self {
        match value {
            "imperial" => Self::Imperial,
            _ => Self::Metric,
        }
    }
}

/// Last-used settings, persisted between runs as a single JSON document.
///
/// Read once at startup and overwritten in full after every successful
/// fetch. Missing keys take their defaults individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Access credential for the weather service.
    pub api: String,
    /// Last requested location.
    pub city: String,
    /// Unit system for temperature display.
    pub units: UnitSystem,
}

impl Settings {
    /// Load settings from `path`.
    ///
    /// A missing file, an unreadable file, or malformed content all yield
    /// defaults without raising.
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!("Failed to read settings file {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    "Malformed settings file {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save settings to `path`, replacing any previous document.
    ///
    /// The document is written to a sibling temp file first and renamed
    /// into place, so a crash mid-write leaves the previous file intact.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create settings directory")?;
        }

        let contents =
            serde_json::to_string_pretty(self).context("Failed to serialize settings")?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).context("Failed to write settings file")?;
        std::fs::rename(&tmp, path).context("Failed to replace settings file")?;

        Ok(())
    }

    /// Default location of the settings file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stratus")
            .join("settings.json")
    }
}
