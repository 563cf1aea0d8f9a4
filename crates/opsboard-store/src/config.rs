//! Store configuration
//!
//! [`StoreConfig`] carries everything the store would otherwise hard-code:
//! the initial responsible-person roster, the color palette for custom
//! persons, the progress goals and whether missing collections are seeded
//! with sample records.
//!
//! # Example
//!
//! ```toml
//! seed_sample_data = false
//! palette = ["#3E7BFA", "#10B981"]
//!
//! [goals]
//! overall_requests = 40
//! ```

use crate::error::ConfigError;
use crate::seed;
use opsboard_model::ResponsiblePerson;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Registry contents used when no roster is persisted yet
    pub roster: Vec<ResponsiblePerson>,
    /// Colors assigned to custom responsible persons
    pub palette: Vec<String>,
    /// Targets for the progress trackers
    pub goals: ProgressGoals,
    /// Seed empty board collections with sample records
    pub seed_sample_data: bool,
}

impl StoreConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed TOML and the validation
    /// errors of [`StoreConfig::validate`].
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: StoreConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`StoreConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Check internal consistency
    ///
    /// # Errors
    /// Empty palette or duplicate roster ids.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        let mut seen = HashSet::new();
        for person in &self.roster {
            if !seen.insert(person.id.as_str()) {
                return Err(ConfigError::DuplicateRosterId(person.id.to_string()));
            }
        }
        Ok(())
    }

    /// With roster
    #[inline]
    #[must_use]
    pub fn with_roster(mut self, roster: Vec<ResponsiblePerson>) -> Self {
        self.roster = roster;
        self
    }

    /// With palette
    #[inline]
    #[must_use]
    pub fn with_palette(mut self, palette: Vec<String>) -> Self {
        self.palette = palette;
        self
    }

    /// With progress goals
    #[inline]
    #[must_use]
    pub fn with_goals(mut self, goals: ProgressGoals) -> Self {
        self.goals = goals;
        self
    }

    /// With or without sample records
    #[inline]
    #[must_use]
    pub fn with_sample_data(mut self, seed: bool) -> Self {
        self.seed_sample_data = seed;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            roster: seed::initial_roster(),
            palette: seed::DEFAULT_PALETTE.iter().map(|c| (*c).to_string()).collect(),
            goals: ProgressGoals::default(),
            seed_sample_data: true,
        }
    }
}

/// Progress tracker targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressGoals {
    /// Requests granted overall
    pub overall_requests: u64,
    /// Nudges per week bucket
    pub weekly_nudges: u32,
    /// Each weekly counter (new requests, new joiners, granted)
    pub weekly_metric: u64,
}

impl Default for ProgressGoals {
    fn default() -> Self {
        Self {
            overall_requests: 30,
            weekly_nudges: 10,
            weekly_metric: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_is_valid() {
        let config = StoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.roster.len(), 5);
        assert!(config.seed_sample_data);
        assert_eq!(config.goals.overall_requests, 30);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = StoreConfig::from_toml_str(
            r#"
            seed_sample_data = false

            [goals]
            weekly_nudges = 12
            "#,
        )
        .unwrap();
        assert!(!config.seed_sample_data);
        assert_eq!(config.goals.weekly_nudges, 12);
        assert_eq!(config.goals.weekly_metric, 3);
        assert_eq!(config.roster, StoreConfig::default().roster);
    }

    #[test]
    fn roster_from_toml() {
        let config = StoreConfig::from_toml_str(
            r##"
            [[roster]]
            id = "a"
            name = "Ann"
            color = "#111111"
            "##,
        )
        .unwrap();
        assert_eq!(config.roster, vec![ResponsiblePerson::new("a", "Ann", "#111111")]);
    }

    #[test]
    fn empty_palette_rejected() {
        let err = StoreConfig::from_toml_str("palette = []").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPalette));
    }

    #[test]
    fn duplicate_roster_ids_rejected() {
        let config = StoreConfig::new().with_roster(vec![
            ResponsiblePerson::new("1", "A", "#000"),
            ResponsiblePerson::new("1", "B", "#111"),
        ]);
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateRosterId(id)) if id == "1"));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = StoreConfig::from_toml_str("goals = 7").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = StoreConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
