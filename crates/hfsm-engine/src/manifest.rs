//! Name-only catalogs for tools that load sets without a host application.
//!
//! ```toml
//! events = ["ball_lost", "ball_won"]
//! states = ["waiting", "running"]
//! ```

use std::collections::HashSet;
use std::path::Path;

use hfsm_core::StaticFactory;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Event and state names, in id order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CatalogManifest {
    #[serde(default)]
    pub events: Vec<String>,
    pub states: Vec<String>,
}

impl CatalogManifest {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let manifest: CatalogManifest = toml::from_str(text)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// A callback-free factory over these names.
    pub fn factory<A>(&self) -> StaticFactory<A> {
        StaticFactory::from_names(self.events.iter().cloned(), self.states.iter().cloned())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.states.is_empty() {
            return Err(ConfigError::Invalid {
                message: "a catalog needs at least one state".into(),
            });
        }
        for (kind, names) in [("event", &self.events), ("state", &self.states)] {
            let mut seen = HashSet::new();
            for name in names {
                if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic() || c == '_') {
                    return Err(ConfigError::Invalid {
                        message: format!("{kind} name {name:?} must be letters and underscores"),
                    });
                }
                if !seen.insert(name.as_str()) {
                    return Err(ConfigError::Invalid {
                        message: format!("duplicate {kind} name {name:?}"),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hfsm_core::{Automaton, AutomatonId};

    #[test]
    fn test_manifest_builds_factory() {
        let manifest = CatalogManifest::from_toml_str(
            r#"
            events = ["go", "stop"]
            states = ["waiting", "running"]
            "#,
        )
        .unwrap();

        let automaton: Automaton<()> = Automaton::create(AutomatonId(0), &manifest.factory::<()>());
        assert_eq!(automaton.events().len(), 2);
        assert_eq!(automaton.find_state_by_name("running").unwrap().slot_count(), 2);
        assert!(automaton.states()[0].entrance().is_none());
    }

    #[test]
    fn test_manifest_rejects_bad_names() {
        let dup = CatalogManifest::from_toml_str("states = [\"a\", \"a\"]");
        assert!(matches!(dup, Err(ConfigError::Invalid { .. })));

        let digits = CatalogManifest::from_toml_str("events = [\"go2\"]\nstates = [\"a\"]");
        assert!(matches!(digits, Err(ConfigError::Invalid { .. })));

        let empty = CatalogManifest::from_toml_str("events = []\nstates = []");
        assert!(matches!(empty, Err(ConfigError::Invalid { .. })));

        assert!(matches!(
            CatalogManifest::from_toml_str("events = []"),
            Err(ConfigError::Parse(_))
        ));
    }
}
