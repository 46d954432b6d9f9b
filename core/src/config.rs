//! Loader configuration (`config.toml`)
//!
//! Handles loading and providing defaults for loader settings.
//! Settings are stored in TOML format in the platform-specific config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Loader configuration.
///
/// Serialized to/from TOML format; every section is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LoaderConfig {
    /// CD-audio track cache settings
    #[serde(default)]
    pub tracks: TrackConfig,
    /// System3 specific settings
    #[serde(default)]
    pub system3: System3Config,
}

/// Where resolved CD-audio tracks are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackCacheStrategy {
    /// Keep resolved track bytes in memory
    Memory,
    /// Spill resolved tracks into a temporary directory and hand out paths
    Disk,
}

impl TrackCacheStrategy {
    /// Strategy used when the config does not name one.
    ///
    /// Memory-constrained mobile targets spill to disk.
    pub fn platform_default() -> Self {
        if cfg!(any(target_os = "ios", target_os = "android")) {
            TrackCacheStrategy::Disk
        } else {
            TrackCacheStrategy::Memory
        }
    }
}

impl Default for TrackCacheStrategy {
    fn default() -> Self {
        Self::platform_default()
    }
}

/// CD-audio track cache configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrackConfig {
    /// Storage strategy (default: platform dependent)
    #[serde(default)]
    pub strategy: TrackCacheStrategy,
}

/// System3 configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System3Config {
    /// Save directory used when the container carries no label (default: `save/system3`)
    #[serde(default = "default_save_dir")]
    pub default_save_dir: String,
}

fn default_save_dir() -> String {
    "save/system3".to_string()
}

impl Default for System3Config {
    fn default() -> Self {
        Self {
            default_save_dir: default_save_dir(),
        }
    }
}

/// Config file errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Returns the platform-specific configuration directory.
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "xsys", "xsys").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Default location of `config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

impl LoaderConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads `path`, returning defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// A file that exists but cannot be read or parsed is an error rather
    /// than a silent fallback.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No loader config, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = LoaderConfig::default();
        assert_eq!(config.tracks.strategy, TrackCacheStrategy::platform_default());
        assert_eq!(config.system3.default_save_dir, "save/system3");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = LoaderConfig::from_toml("").unwrap();
        assert_eq!(config, LoaderConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = LoaderConfig::from_toml(
            r#"
            [tracks]
            strategy = "disk"
            "#,
        )
        .unwrap();
        assert_eq!(config.tracks.strategy, TrackCacheStrategy::Disk);
        assert_eq!(config.system3.default_save_dir, "save/system3");
    }

    #[test]
    fn test_full_toml() {
        let config = LoaderConfig::from_toml(
            r#"
            [tracks]
            strategy = "memory"

            [system3]
            default_save_dir = "save/rance"
            "#,
        )
        .unwrap();
        assert_eq!(config.tracks.strategy, TrackCacheStrategy::Memory);
        assert_eq!(config.system3.default_save_dir, "save/rance");
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        assert!(LoaderConfig::from_toml("[tracks]\nstrategy = \"cloud\"\n").is_err());
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoaderConfig::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, LoaderConfig::default());
    }

    #[test]
    fn test_load_malformed_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tracks\nstrategy=").unwrap();
        let err = LoaderConfig::load_or_default(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let config = LoaderConfig {
            tracks: TrackConfig {
                strategy: TrackCacheStrategy::Disk,
            },
            system3: System3Config {
                default_save_dir: "save/x".to_string(),
            },
        };
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(LoaderConfig::from_toml(&text).unwrap(), config);
    }
}
