//! CLI configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/daybook/config.toml` by default.

use std::path::{Path, PathBuf};

use daybook_core::RecordFormat;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// Configuration for the daybook CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaybookConfig {
    /// Header prefix, as in `X-<prefix>-Subject:`.
    pub header_prefix: String,

    /// Logging settings.
    pub logging: LoggingSettings,

    /// Occurrence listing settings.
    pub occurrences: OccurrenceSettings,
}

impl Default for DaybookConfig {
    fn default() -> Self {
        Self {
            header_prefix: RecordFormat::DEFAULT_PREFIX.to_string(),
            logging: LoggingSettings::default(),
            occurrences: OccurrenceSettings::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human-readable output
    Pretty,
    /// Single-line output
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Occurrence listing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OccurrenceSettings {
    /// Window length in days when `--to` is not given.
    pub default_days: u32,
}

impl Default for OccurrenceSettings {
    fn default() -> Self {
        Self { default_days: 30 }
    }
}

impl DaybookConfig {
    /// Loads configuration from the default path, or defaults when absent.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
        toml::from_str(&content)
            .map_err(|e| CliError::config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Returns the record format built from `header_prefix`.
    pub fn record_format(&self) -> RecordFormat {
        RecordFormat::new(self.header_prefix.clone())
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("daybook")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = DaybookConfig::default();
        assert_eq!(config.header_prefix, "SC");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.occurrences.default_days, 30);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config: DaybookConfig = toml::from_str("").unwrap();
        assert_eq!(config.header_prefix, "SC");
        assert_eq!(config.occurrences.default_days, 30);
    }

    #[test]
    fn partial_sections() {
        let toml_content = r#"
header_prefix = "DB"

[logging]
format = "json"

[occurrences]
default_days = 7
"#;
        let config: DaybookConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.header_prefix, "DB");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.occurrences.default_days, 7);
        assert_eq!(config.record_format().prefix(), "DB");
    }

    #[test]
    fn unknown_format_is_rejected() {
        let result: Result<DaybookConfig, _> = toml::from_str("[logging]\nformat = \"fancy\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"daybook_core=debug\"").unwrap();
        let config = DaybookConfig::load_from(file.path()).unwrap();
        assert_eq!(config.logging.level, "daybook_core=debug");
    }

    #[test]
    fn load_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = DaybookConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }

    #[test]
    fn load_from_invalid_toml_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "header_prefix = [").unwrap();
        let err = DaybookConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn dump_round_trips() {
        let config = DaybookConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: DaybookConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.header_prefix, config.header_prefix);
        assert_eq!(back.logging.format, config.logging.format);
    }

    #[test]
    fn default_path_ends_with_daybook() {
        let path = DaybookConfig::default_path();
        assert!(path.ends_with("daybook/config.toml"));
    }
}
