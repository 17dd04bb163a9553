//! Runtime configuration, loaded from TOML.
//!
//! ```
//! use substitute_planner::config::Config;
//!
//! let config = Config::from_toml_str(r#"
//!     timetable_path = "data/week.csv"
//!
//!     [rules]
//!     max_substitutions_per_day = 3
//! "#).unwrap();
//!
//! assert_eq!(config.rules.max_substitutions_per_day, 3);
//! assert_eq!(config.rules.same_subject_bonus, 100);
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Limits and weights applied by the replacement engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PlanningRules {
    /// How many lessons one teacher may cover in a day.
    pub max_substitutions_per_day: u32,

    /// Added to the score of a candidate who teaches the slot's subject.
    pub same_subject_bonus: i32,

    /// Score offset from which the candidate's own daily load is subtracted.
    /// Loads above this value make the term negative.
    pub load_baseline: i32,
}

impl Default for PlanningRules {
    fn default() -> Self {
        Self {
            max_substitutions_per_day: 2,
            same_subject_bonus: 100,
            load_baseline: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    /// CSV (or `.json`) file holding the normalized timetable.
    pub timetable_path: PathBuf,

    pub bind_addr: String,

    pub rules: PlanningRules,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timetable_path: PathBuf::from("data/timetable.csv"),
            bind_addr: "127.0.0.1:8080".to_string(),
            rules: PlanningRules::default(),
        }
    }
}

impl Config {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file can't be read, isn't valid TOML, or fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.max_substitutions_per_day == 0 {
            return Err(ConfigError::Invalid(
                "max_substitutions_per_day must be at least 1".to_string(),
            ));
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("bind_addr '{}': {}", self.bind_addr, e)))
    }
}
