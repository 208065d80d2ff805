//! Root configuration type and file loading.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{AnimationConfig, GestureConfig, PointerConfig, ReadingConfig, RingConfig};

/// Directory name used under the platform configuration folders.
pub const CONFIG_DIR_NAME: &str = "arcana";

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Root configuration for the selection core.
///
/// Every section is optional; missing fields fall back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ArcanaConfig {
    /// Hand-gesture timings.
    pub gesture: GestureConfig,

    /// Pointer click and drag behaviour.
    pub pointer: PointerConfig,

    /// Ring geometry and rotation speeds.
    pub ring: RingConfig,

    /// Pick animation timings and placement.
    pub animation: AnimationConfig,

    /// Draw sizes and card artwork location.
    pub reading: ReadingConfig,
}

/// Errors that can occur when loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at ~/.config/arcana/config.jsonc \
         or the platform configuration directory"
    )]
    NotFound,

    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Returns the possible configuration file paths in priority order.
///
/// 1. `$XDG_CONFIG_HOME/arcana/config.jsonc` or `config.json`
/// 2. `~/.config/arcana/config.jsonc` or `config.json`
/// 3. The platform configuration directory (`dirs::config_dir`)
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut push_dir = |dir: PathBuf| {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    };

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        push_dir(PathBuf::from(xdg_config).join(CONFIG_DIR_NAME));
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(home.join(".config").join(CONFIG_DIR_NAME));
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(config_dir.join(CONFIG_DIR_NAME));
    }

    paths
}

/// Loads the configuration from the first available config file.
///
/// Comments are stripped before parsing, so `.jsonc` files are accepted.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of the expected locations.
/// Returns `ConfigError::IoError` if a configuration file exists but could not be read.
/// Returns `ConfigError::ParseError` if the configuration file contains invalid JSON.
pub fn load_config() -> Result<(ArcanaConfig, PathBuf), ConfigError> {
    config_paths()
        .into_iter()
        .find(|path| path.exists())
        .map_or(Err(ConfigError::NotFound), load_config_from_path)
}

/// Loads the configuration from an explicit path.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the path does not exist, or the I/O and
/// parse errors of [`load_config`].
pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<(ArcanaConfig, PathBuf), ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    let config: ArcanaConfig = serde_json::from_reader(reader)?;
    Ok((config, path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config_matches_reference_behaviour() {
        let config = ArcanaConfig::default();
        assert_eq!(config.reading.card_count, 3);
        assert_eq!(config.gesture.arm_hold_ms, 300);
        assert_eq!(config.animation.slots.len(), 3);
    }

    #[test]
    fn test_config_paths_are_not_empty() {
        let paths = config_paths();
        assert!(!paths.is_empty());
        assert!(paths.iter().all(|path| path.to_string_lossy().contains(CONFIG_DIR_NAME)));
    }

    #[test]
    fn test_load_config_from_path_strips_comments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                // tighter timings for testing
                "gesture": {{ "armHoldMs": 120 }},
                /* larger draw */
                "reading": {{ "cardCount": 5 }}
            }}"#
        )
        .unwrap();

        let (config, path) = load_config_from_path(file.path()).unwrap();
        assert_eq!(path, file.path());
        assert_eq!(config.gesture.arm_hold_ms, 120);
        assert_eq!(config.gesture.grace_ms, 800);
        assert_eq!(config.reading.card_count, 5);
    }

    #[test]
    fn test_load_config_from_missing_path() {
        let result = load_config_from_path("/definitely/not/here/config.jsonc");
        assert!(matches!(result, Err(ConfigError::NotFound)));
    }

    #[test]
    fn test_load_config_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{ \"reading\": ").unwrap();

        let result = load_config_from_path(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_config_error_display() {
        let msg = ConfigError::NotFound.to_string();
        assert!(msg.contains("No configuration file found"));
    }
}
