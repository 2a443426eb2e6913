//! Lookup-table commands: blank generation and dumping.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use hfsm_core::{Automaton, AutomatonId};
use hfsm_engine::{dump_table, generate_blank_table, SetDescription, WriteError};

use super::{load_manifest, load_set};

/// Write a blank table for every automaton (or just `only`) whose table
/// file is missing. Returns the files written.
pub fn blank(set: &Path, catalog: &Path, only: Option<&str>) -> Result<Vec<PathBuf>> {
    let factory = load_manifest(catalog)?.factory::<()>();
    let description = SetDescription::read(set)?;
    let base = set.parent().unwrap_or_else(|| Path::new(""));

    if let Some(name) = only {
        if description.automaton(name).is_none() {
            anyhow::bail!("No automaton named {name:?} in {}", set.display());
        }
    }

    let mut written = Vec::new();
    for block in &description.automatons {
        let Some(name) = block.name.as_deref().map(str::trim) else {
            continue;
        };
        if only.is_some_and(|o| o != name) {
            continue;
        }
        let Some(file) = block.csv_file.as_deref().map(str::trim).filter(|f| !f.is_empty()) else {
            warn!(automaton = name, "automaton_without_table_file");
            continue;
        };

        let mut automaton = Automaton::create(AutomatonId(0), &factory);
        automaton.set_name(name);
        let path = base.join(file);
        match generate_blank_table(&path, &automaton) {
            Ok(()) => written.push(path),
            Err(WriteError::AlreadyExists { path }) => {
                warn!(path = %path.display(), "table_exists_skipped");
            }
            Err(err) => return Err(err).context("Failed to write blank table"),
        }
    }
    Ok(written)
}

pub fn dump(set: &Path, catalog: &Path, automaton: &str, output: &Path, force: bool) -> Result<()> {
    let loaded = load_set(set, catalog)?;
    let target = loaded
        .set
        .find_automaton_by_name(automaton)
        .with_context(|| format!("No automaton named {automaton:?} in {}", set.display()))?;
    dump_table(output, target, force)?;
    Ok(())
}
