//! CLI command implementations.

pub mod graph;
pub mod script;
pub mod table;
pub mod verify;

use std::path::Path;

use anyhow::{Context, Result};
use hfsm_engine::{CatalogManifest, LoadedSet, SetLoader};

/// Report format for commands that print diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Unknown format: {}. Use 'text' or 'json'", s),
        }
    }
}

pub fn load_manifest(catalog: &Path) -> Result<CatalogManifest> {
    CatalogManifest::load(catalog)
        .with_context(|| format!("Failed to load catalog {}", catalog.display()))
}

/// Load a set against a manifest. Tools never run callbacks, so the actor
/// type is `()`.
pub fn load_set(set: &Path, catalog: &Path) -> Result<LoadedSet<()>> {
    let factory = load_manifest(catalog)?.factory::<()>();
    let loaded = SetLoader::new(&factory)
        .load(set)
        .with_context(|| format!("Failed to load set {}", set.display()))?;
    Ok(loaded)
}
