//! Authoring helpers: blank and dumped lookup tables, blank predicate scripts.

use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use csv::WriterBuilder;
use hfsm_core::Automaton;
use tracing::info;

use crate::error::{WriteError, WriteResult};
use crate::loader::SetDescription;

/// Write a table with one row per state and every cell empty.
///
/// Never overwrites: an existing file is [`WriteError::AlreadyExists`].
pub fn generate_blank_table<A>(path: &Path, automaton: &Automaton<A>) -> WriteResult<()> {
    let file = create(path, false)?;
    let mut csv = WriterBuilder::new().from_writer(file);

    let mut header = vec![String::new()];
    header.extend(automaton.events().iter().map(|e| e.name().to_string()));
    csv.write_record(&header)?;

    let blank = vec![""; automaton.events().len()];
    for state in automaton.states() {
        csv.write_field(state.name())?;
        csv.write_record(&blank)?;
    }
    finish(csv, path)?;

    info!(path = %path.display(), automaton = automaton.name(), "blank_table_written");
    Ok(())
}

/// Write out the grid of a linked automaton, columns in event-id order.
pub fn dump_table<A>(path: &Path, automaton: &Automaton<A>, overwrite: bool) -> WriteResult<()> {
    let file = create(path, overwrite)?;
    let mut csv = WriterBuilder::new().from_writer(file);

    let mut header = vec![String::new()];
    header.extend(automaton.events().iter().map(|e| format!(" {}", e.name())));
    csv.write_record(&header)?;

    for state in automaton.states() {
        csv.write_field(state.name())?;
        let cells: Vec<&str> = state
            .transitions()
            .iter()
            .map(|slot| {
                slot.and_then(|t| automaton.transition(t))
                    .map(|t| t.name())
                    .unwrap_or("")
            })
            .collect();
        csv.write_record(&cells)?;
    }
    finish(csv, path)?;

    info!(path = %path.display(), automaton = automaton.name(), "table_dumped");
    Ok(())
}

/// Lua source stubbing every predicate in `names` as always-false.
pub fn render_blank_script<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let rule = "-".repeat(80);
    let mut out = String::new();
    for name in names {
        // Infallible: writing into a String.
        let _ = writeln!(
            out,
            "{rule}\n-- {name}\n{rule}\nfunction {name}(group, index)\n  return 0\nend\n"
        );
    }
    out
}

/// Write a stub script for every predicate the set description names.
///
/// Never overwrites.
pub fn generate_blank_script(path: &Path, description: &SetDescription) -> WriteResult<()> {
    let names = description.predicate_names();
    let mut file = create(path, false)?;
    file.write_all(render_blank_script(names.iter().copied()).as_bytes())
        .map_err(|source| io_error(path, source))?;

    info!(path = %path.display(), predicates = names.len(), "blank_script_written");
    Ok(())
}

fn create(path: &Path, overwrite: bool) -> WriteResult<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    options.open(path).map_err(|source| {
        if source.kind() == io::ErrorKind::AlreadyExists {
            WriteError::AlreadyExists {
                path: path.to_path_buf(),
            }
        } else {
            io_error(path, source)
        }
    })
}

fn finish(csv: csv::Writer<File>, path: &Path) -> WriteResult<()> {
    let mut file = csv
        .into_inner()
        .map_err(|err| io_error(path, io::Error::other(err.to_string())))?;
    file.flush().map_err(|source| io_error(path, source))
}

fn io_error(path: &Path, source: io::Error) -> WriteError {
    WriteError::Io {
        path: path.to_path_buf(),
        source,
    }
}
