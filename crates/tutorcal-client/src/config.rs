//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/tutorcal/config.toml` by default. Every section is optional:
//!
//! ```toml
//! [calendar]
//! name = "Study Plan"
//! product_id = "-//Tutorcal//Calendar Export//EN"
//! uid_domain = "tutorcal.app"
//! alarm_minutes = 15
//!
//! [export]
//! product = "tutorcal"
//! output_dir = "exports"
//! kinds = ["session", "task"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tutorcal_core::EventKind;
use tutorcal_ics::{CalendarMeta, DEFAULT_ALARM_MINUTES};

use crate::error::{ClientError, ClientResult};

/// Longest reminder lead time accepted, one week.
const MAX_ALARM_MINUTES: u32 = 7 * 24 * 60;

/// Configuration for the tutorcal client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Calendar identity written into exports.
    pub calendar: CalendarSettings,

    /// Export behavior.
    pub export: ExportConfig,
}

/// Calendar identity settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Display name shown by calendar applications.
    pub name: String,

    /// `PRODID` of generated documents.
    pub product_id: String,

    /// Domain appended to event UIDs.
    pub uid_domain: String,

    /// Minutes before an event at which the reminder fires.
    pub alarm_minutes: u32,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        let meta = CalendarMeta::default();
        Self {
            name: meta.name,
            product_id: meta.product_id,
            uid_domain: meta.uid_domain,
            alarm_minutes: DEFAULT_ALARM_MINUTES,
        }
    }
}

impl CalendarSettings {
    /// Converts to encoder metadata.
    pub fn to_meta(&self) -> CalendarMeta {
        CalendarMeta::new(&self.name)
            .with_product_id(&self.product_id)
            .with_uid_domain(&self.uid_domain)
            .with_alarm_minutes(self.alarm_minutes)
    }
}

/// Export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Product name used as the filename prefix.
    pub product: String,

    /// Directory exported files are written to.
    pub output_dir: Option<PathBuf>,

    /// Record kinds to export. Empty means all kinds.
    pub kinds: Vec<EventKind>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            product: "tutorcal".to_string(),
            output_dir: None,
            kinds: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    ///
    /// A missing file yields the default configuration.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> ClientResult<Self> {
        toml::from_str(content).map_err(|e| ClientError::Config(format!("failed to parse config: {}", e)))
    }

    /// Checks values that parse but cannot produce a usable export.
    pub fn validate(&self) -> ClientResult<()> {
        let invalid = |msg: &str| Err(ClientError::Config(msg.to_string()));

        if self.calendar.name.trim().is_empty() {
            return invalid("calendar.name must not be empty");
        }
        if self.calendar.product_id.trim().is_empty() {
            return invalid("calendar.product_id must not be empty");
        }
        if self.calendar.uid_domain.trim().is_empty()
            || self.calendar.uid_domain.contains(char::is_whitespace)
        {
            return invalid("calendar.uid_domain must be a non-empty domain without spaces");
        }
        if self.calendar.alarm_minutes > MAX_ALARM_MINUTES {
            return invalid("calendar.alarm_minutes must be at most 10080 (one week)");
        }
        if self.export.product.trim().is_empty()
            || self.export.product.contains(['/', '\\'])
        {
            return invalid("export.product must be a non-empty name without path separators");
        }
        Ok(())
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tutorcal")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ClientConfig::parse("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.calendar.alarm_minutes, 15);
        assert_eq!(config.export.product, "tutorcal");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ClientConfig::parse(
            r#"
            [calendar]
            name = "Study Plan"

            [export]
            kinds = ["task"]
            "#,
        )
        .unwrap();

        assert_eq!(config.calendar.name, "Study Plan");
        assert_eq!(config.calendar.uid_domain, "tutorcal.app");
        assert_eq!(config.export.kinds, vec![EventKind::Task]);
        assert_eq!(config.export.product, "tutorcal");
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        let result = ClientConfig::parse("[export]\nkinds = [\"meeting\"]\n");
        assert!(matches!(result, Err(ClientError::Config(msg)) if msg.contains("failed to parse")));
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[calendar]\nalarm_minutes = 30\n").unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.calendar.alarm_minutes, 30);
    }

    #[test]
    fn load_from_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = ClientConfig::load_from(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ClientError::Config(msg)) if msg.contains("failed to read")));
    }

    #[test]
    fn settings_convert_to_meta() {
        let settings = CalendarSettings {
            name: "Archive".to_string(),
            product_id: "-//Acme//EN".to_string(),
            uid_domain: "acme.example".to_string(),
            alarm_minutes: 5,
        };

        let meta = settings.to_meta();
        assert_eq!(meta.name, "Archive");
        assert_eq!(meta.product_id, "-//Acme//EN");
        assert_eq!(meta.uid_domain, "acme.example");
        assert_eq!(meta.alarm_minutes, 5);
    }

    #[test]
    fn default_config_validates() {
        assert!(ClientConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = ClientConfig::default();
        config.export.product = "../escape".to_string();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.calendar.uid_domain = "my domain".to_string();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.calendar.alarm_minutes = MAX_ALARM_MINUTES + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_path_ends_with_config_toml() {
        let path = ClientConfig::default_path();
        assert!(path.ends_with("tutorcal/config.toml"));
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = ClientConfig::default();
        config.export.output_dir = Some(PathBuf::from("/tmp/calendars"));
        config.export.kinds = vec![EventKind::Session];

        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(ClientConfig::parse(&text).unwrap(), config);
    }
}
