//! Configuration system for rote.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Local schedule store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the schedule database.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let rote_dir = dirs::home_dir()
            .map(|h| h.join(".rote"))
            .unwrap_or_else(|| PathBuf::from(".rote"));

        Self {
            path: rote_dir.join("schedules.db"),
        }
    }
}

/// Session behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Most cards a single session will present (default: 50).
    pub max_cards: usize,
    /// Seconds between elapsed-time ticks (default: 1).
    pub tick_interval_secs: u64,
    /// Event bus channel capacity (default: 1024).
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_cards: 50,
            tick_interval_secs: 1,
            event_capacity: 1024,
        }
    }
}

/// Main study configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Local schedule store configuration.
    pub database: DatabaseConfig,
    /// Session behavior configuration.
    pub session: SessionConfig,
}

impl StudyConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::error::RoteResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| crate::error::RoteError::Configuration(e.to_string())),
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| crate::error::RoteError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| crate::error::RoteError::Configuration(e.to_string())),
            _ => Err(crate::error::RoteError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("ROTE_DB_PATH") {
            config.database.path = PathBuf::from(path);
        }
        if let Ok(max_cards) = std::env::var("ROTE_MAX_CARDS") {
            if let Ok(n) = max_cards.parse() {
                config.session.max_cards = n;
            }
        }
        if let Ok(interval) = std::env::var("ROTE_TICK_INTERVAL_SECS") {
            if let Ok(n) = interval.parse() {
                config.session.tick_interval_secs = n;
            }
        }

        config
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> StudyConfigBuilder {
        StudyConfigBuilder::default()
    }
}

/// Builder for StudyConfig.
#[derive(Default)]
pub struct StudyConfigBuilder {
    config: StudyConfig,
}

impl StudyConfigBuilder {
    /// Set the schedule database path.
    pub fn database_path(mut self, path: PathBuf) -> Self {
        self.config.database.path = path;
        self
    }

    /// Set the session card cap.
    pub fn max_cards(mut self, max_cards: usize) -> Self {
        self.config.session.max_cards = max_cards;
        self
    }

    /// Set the elapsed-time tick interval.
    pub fn tick_interval_secs(mut self, secs: u64) -> Self {
        self.config.session.tick_interval_secs = secs;
        self
    }

    /// Set the event bus channel capacity.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.session.event_capacity = capacity;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> StudyConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = StudyConfig::default();
        assert_eq!(config.session.max_cards, 50);
        assert_eq!(config.session.tick_interval_secs, 1);
        assert_eq!(config.session.event_capacity, 1024);
        assert!(config.database.path.ends_with("schedules.db"));
    }

    #[test]
    fn test_builder() {
        let config = StudyConfig::builder()
            .database_path(PathBuf::from("/tmp/test.db"))
            .max_cards(20)
            .tick_interval_secs(5)
            .build();

        assert_eq!(config.database.path, PathBuf::from("/tmp/test.db"));
        assert_eq!(config.session.max_cards, 20);
        assert_eq!(config.session.tick_interval_secs, 5);
        // Untouched fields keep their defaults
        assert_eq!(config.session.event_capacity, 1024);
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[session]\nmax_cards = 25\n\n[database]\npath = \"/tmp/rote.db\""
        )
        .unwrap();

        let config = StudyConfig::from_file(file.path()).unwrap();
        assert_eq!(config.session.max_cards, 25);
        assert_eq!(config.database.path, PathBuf::from("/tmp/rote.db"));
        // Missing keys fall back to defaults
        assert_eq!(config.session.tick_interval_secs, 1);
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let err = StudyConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, crate::error::RoteError::Configuration(_)));
    }
}
