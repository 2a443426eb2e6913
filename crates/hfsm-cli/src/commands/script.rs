//! Blank predicate script generation.

use std::path::Path;

use anyhow::Result;

use hfsm_engine::{generate_blank_script, SetDescription};

/// Write stubs for every predicate of `set`. Returns how many were written.
pub fn blank(set: &Path, output: &Path) -> Result<usize> {
    let description = SetDescription::read(set)?;
    generate_blank_script(output, &description)?;
    Ok(description.predicate_names().len())
}
