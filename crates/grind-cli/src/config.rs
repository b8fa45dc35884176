//! Runner configuration
//!
//! Settings come from an optional TOML file, then environment overrides.
//! Tokens are read from the environment only and never logged.

use grind_adapters::{DEFAULT_HISTORY_LIMIT, DEFAULT_SNAPSHOT_FILE, DEFAULT_WORKSHEET};
use grind_core::ReportOrder;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given
pub(crate) const DEFAULT_CONFIG_FILE: &str = "grindcount.toml";

/// Bot token for the chat platform
pub(crate) const ENV_SLACK_TOKEN: &str = "SLACK_BOT_TOKEN";
/// OAuth access token for the spreadsheet API
pub(crate) const ENV_SHEETS_TOKEN: &str = "GOOGLE_SHEETS_TOKEN";
/// Overrides `channel_name`
pub(crate) const ENV_CHANNEL: &str = "GRINDCOUNT_CHANNEL";
/// Overrides `snapshot_path`
pub(crate) const ENV_SNAPSHOT: &str = "GRINDCOUNT_SNAPSHOT";
/// Overrides `spreadsheet_id`
pub(crate) const ENV_SPREADSHEET_ID: &str = "GRINDCOUNT_SPREADSHEET_ID";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A setting has an unusable value
    #[error("invalid setting: {0}")]
    Invalid(String),

    /// Required secret missing from the environment
    #[error("environment variable {0} is not set")]
    MissingSecret(&'static str),
}

/// Runner settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GrindConfig {
    /// Tracked channel name
    pub(crate) channel_name: String,
    /// History messages fetched per run
    pub(crate) history_limit: u32,
    /// Snapshot CSV location
    pub(crate) snapshot_path: PathBuf,
    /// Target spreadsheet; publishing is skipped without one
    pub(crate) spreadsheet_id: Option<String>,
    /// Worksheet title inside the spreadsheet
    pub(crate) worksheet: String,
    /// Sort published rows by total
    pub(crate) sort_by_total: bool,
    /// Publish after saving
    pub(crate) publish: bool,
}

impl Default for GrindConfig {
    fn default() -> Self {
        Self {
            channel_name: "grind-22".to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_FILE),
            spreadsheet_id: None,
            worksheet: DEFAULT_WORKSHEET.to_string(),
            sort_by_total: true,
            publish: true,
        }
    }
}

impl GrindConfig {
    /// Load from `path`, or from `grindcount.toml` if present, then apply
    /// environment overrides
    ///
    /// # Errors
    /// An explicit path that can't be read, invalid TOML, or invalid values
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file
    ///
    /// # Errors
    /// Read or parse failure
    pub(crate) fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override settings from environment lookups
    pub(crate) fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(channel) = lookup(ENV_CHANNEL) {
            self.channel_name = channel;
        }
        if let Some(path) = lookup(ENV_SNAPSHOT) {
            self.snapshot_path = PathBuf::from(path);
        }
        if let Some(id) = lookup(ENV_SPREADSHEET_ID) {
            self.spreadsheet_id = Some(id);
        }
    }

    /// Reject unusable values
    ///
    /// # Errors
    /// `ConfigError::Invalid` describing the first bad setting
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_name.trim().is_empty() {
            return Err(ConfigError::Invalid("channel_name is empty".into()));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history_limit must be positive".into()));
        }
        if self.worksheet.trim().is_empty() {
            return Err(ConfigError::Invalid("worksheet is empty".into()));
        }
        Ok(())
    }

    /// Report row order
    #[must_use]
    pub(crate) fn report_order(&self) -> ReportOrder {
        if self.sort_by_total {
            ReportOrder::ByTotalDesc
        } else {
            ReportOrder::Stored
        }
    }
}

/// Read a required secret from the environment
///
/// # Errors
/// `ConfigError::MissingSecret` when unset or empty
pub(crate) fn secret(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingSecret(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = GrindConfig::default();
        assert_eq!(config.channel_name, "grind-22");
        assert_eq!(config.history_limit, 200);
        assert_eq!(config.snapshot_path, PathBuf::from("Total_Grind.csv"));
        assert_eq!(config.worksheet, "Sheet1");
        assert_eq!(config.report_order(), ReportOrder::ByTotalDesc);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "channel_name = \"grind-23\"\nsort_by_total = false").unwrap();

        let config = GrindConfig::from_file(file.path()).unwrap();
        assert_eq!(config.channel_name, "grind-23");
        assert_eq!(config.history_limit, 200);
        assert_eq!(config.report_order(), ReportOrder::Stored);
    }

    #[test]
    fn unknown_key_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chanel_name = \"typo\"").unwrap();
        assert!(matches!(
            GrindConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GrindConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_CHANNEL, "grind-24"),
            (ENV_SNAPSHOT, "/tmp/totals.csv"),
            (ENV_SPREADSHEET_ID, "sheet-123"),
        ]
        .into_iter()
        .collect();

        let mut config = GrindConfig {
            channel_name: "ignored".to_string(),
            ..GrindConfig::default()
        };
        config.apply_env(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.channel_name, "grind-24");
        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/totals.csv"));
        assert_eq!(config.spreadsheet_id.as_deref(), Some("sheet-123"));
    }

    #[test]
    fn invalid_values() {
        let config = GrindConfig {
            history_limit: 0,
            ..GrindConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        assert!(GrindConfig {
            channel_name: " ".to_string(),
            ..GrindConfig::default()
        }
        .validate()
        .is_err());
    }
}
