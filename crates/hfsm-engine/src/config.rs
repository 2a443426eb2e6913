//! Engine tuning and the runtime configuration file.
//!
//! ```toml
//! [engine]
//! max_transition_depth = 5
//!
//! [[sets]]
//! name = "offense"
//! path = "ai/offense.xml"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tuning of the transition resolution engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Chained transitions followed before a walk is abandoned.
    pub max_transition_depth: usize,

    /// Report transitions whose predicate the script does not define.
    pub warn_missing_predicates: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_transition_depth: 5,
            warn_missing_predicates: true,
        }
    }
}

impl EngineConfig {
    /// No chaining at all: every transition must land on a state directly.
    pub fn flat() -> Self {
        Self {
            max_transition_depth: 1,
            ..Default::default()
        }
    }

    /// Deep chains for authoring experiments.
    pub fn deep() -> Self {
        Self {
            max_transition_depth: 16,
            ..Default::default()
        }
    }
}

/// One named set and the structural file describing it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SetEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Root of the runtime configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub sets: Vec<SetEntry>,
}

impl RuntimeConfig {
    /// Parse and validate; paths are kept as written.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file. Relative set paths are resolved against
    /// the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for set in &mut config.sets {
            if set.path.is_relative() {
                set.path = base.join(&set.path);
            }
        }
        Ok(config)
    }

    pub fn set(&self, name: &str) -> Option<&SetEntry> {
        self.sets.iter().find(|s| s.name == name)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.max_transition_depth == 0 {
            return Err(ConfigError::Invalid {
                message: "max_transition_depth must be at least 1".into(),
            });
        }
        let mut seen = HashSet::new();
        for set in &self.sets {
            if !seen.insert(set.name.as_str()) {
                return Err(ConfigError::DuplicateSet {
                    name: set.name.clone(),
                });
            }
        }
        Ok(())
    }
}
