//! Runtime configuration.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file in the working directory.

use std::path::PathBuf;

use crate::error::{PlannerError, Result};

/// Default directory for the file-backed store.
pub const DEFAULT_DATA_DIR: &str = ".shootplan";

/// Default log filter when neither `RUST_LOG` nor `SHOOTPLAN_LOG` is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration for the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Directory holding one JSON file per storage key.
    pub data_dir: PathBuf,

    /// Log filter passed to the tracing subscriber.
    pub log_level: String,

    /// Whether slots adopt values written by other processes.
    pub sync_external_changes: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            sync_external_changes: true,
        }
    }
}

impl PlannerConfig {
    /// Build the configuration from the environment.
    pub fn from_env() -> Result<Self> {
        // Load .env if present
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_dir = lookup("SHOOTPLAN_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let log_level = lookup("SHOOTPLAN_LOG")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.log_level);

        let sync_external_changes = match lookup("SHOOTPLAN_SYNC") {
            Some(value) => parse_bool("SHOOTPLAN_SYNC", &value)?,
            None => defaults.sync_external_changes,
        };

        Ok(Self {
            data_dir,
            log_level,
            sync_external_changes,
        })
    }

    /// Override the data directory.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(PlannerError::Config {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = PlannerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, PlannerConfig::default());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = PlannerConfig::from_lookup(lookup_from(&[
            ("SHOOTPLAN_DATA_DIR", "/tmp/plans"),
            ("SHOOTPLAN_LOG", "debug"),
            ("SHOOTPLAN_SYNC", "off"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/plans"));
        assert_eq!(config.log_level, "debug");
        assert!(!config.sync_external_changes);
    }

    #[test]
    fn test_rejects_bad_sync_value() {
        let result = PlannerConfig::from_lookup(lookup_from(&[("SHOOTPLAN_SYNC", "maybe")]));
        assert!(matches!(result, Err(PlannerError::Config { .. })));
    }
}
