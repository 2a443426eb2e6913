//! Lookup-table files: the (state, event) -> transition grid of one automaton.
//!
//! ```text
//! ,go,stop
//! waiting,t_start,
//! running,,t_halt
//! ```
//!
//! The header fixes the file's own column order; it is remapped to event
//! ids. Whitespace inside names is ignored, any other character outside
//! `[A-Za-z_]` is rejected.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use hfsm_core::{Automaton, EventId, StateId};
use tracing::{debug, warn};

use crate::error::TableError;

/// Parsed grid, with state and event names already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTable {
    pub columns: Vec<EventId>,
    pub rows: Vec<TableRow>,
}

/// One data row. `cells[i]` belongs to `columns[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub line: u64,
    pub state: StateId,
    pub cells: Vec<Option<String>>,
}

/// A cell that named a transition the automaton does not have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCell {
    pub line: u64,
    pub state: StateId,
    pub event: EventId,
    pub transition: String,
}

impl LookupTable {
    /// Parse a table against the states and events of `automaton`.
    pub fn parse<A, R: Read>(automaton: &Automaton<A>, mut reader: R) -> Result<Self, TableError> {
        let mut text = String::new();
        reader.read_to_string(&mut text).map_err(csv::Error::from)?;
        // Line numbers in diagnostics are counted over `\n` endings.
        let text = text.replace("\r\n", "\n");

        let mut csv = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());
        let mut records = csv.records();

        let header = records.next().ok_or(TableError::EmptyFile)??;
        let columns = parse_header(automaton, &header)?;

        let mut rows = Vec::new();
        for record in records {
            let record = record?;
            let line = line_of(&record);
            let cells = record
                .iter()
                .map(|cell| clean_name(cell, line))
                .collect::<Result<Vec<_>, _>>()?;
            if cells.iter().all(String::is_empty) {
                continue;
            }

            let name = &cells[0];
            let state = automaton
                .find_state_by_name(name)
                .ok_or_else(|| TableError::UnknownState {
                    line,
                    name: name.clone(),
                })?
                .id();

            let cells: Vec<Option<String>> = cells[1..]
                .iter()
                .map(|c| (!c.is_empty()).then(|| c.clone()))
                .collect();
            if cells.len() > columns.len() {
                return Err(TableError::TooManyCells {
                    line,
                    found: cells.len(),
                    expected: columns.len(),
                });
            }
            rows.push(TableRow { line, state, cells });
        }

        debug!(
            automaton = automaton.name(),
            columns = columns.len(),
            rows = rows.len(),
            "lookup_table_parsed"
        );
        Ok(Self { columns, rows })
    }

    /// Write the grid into the automaton's states.
    ///
    /// A cell naming an unknown transition leaves its slot empty and is
    /// returned; every other cell is still applied.
    pub fn apply<A>(&self, automaton: &mut Automaton<A>) -> Vec<UnknownCell> {
        let mut unknown = Vec::new();
        for row in &self.rows {
            for (event, cell) in self.columns.iter().zip(&row.cells) {
                let transition = match cell {
                    None => None,
                    Some(name) => match automaton.find_transition_by_name(name) {
                        Some(t) => Some(t.id()),
                        None => {
                            warn!(
                                automaton = automaton.name(),
                                line = row.line,
                                transition = name.as_str(),
                                "lookup_table_unknown_transition"
                            );
                            unknown.push(UnknownCell {
                                line: row.line,
                                state: row.state,
                                event: *event,
                                transition: name.clone(),
                            });
                            None
                        }
                    },
                };
                automaton.bind(row.state, *event, transition);
            }
        }
        unknown
    }
}

fn parse_header<A>(
    automaton: &Automaton<A>,
    header: &StringRecord,
) -> Result<Vec<EventId>, TableError> {
    let line = line_of(header);
    let names = header
        .iter()
        .skip(1)
        .map(|cell| clean_name(cell, line))
        .collect::<Result<Vec<_>, _>>()?;

    let expected = automaton.events().len();
    if names.len() > expected {
        return Err(TableError::TooManyEvents {
            found: names.len(),
            expected,
        });
    }

    let mut columns: Vec<EventId> = Vec::with_capacity(names.len());
    for name in names {
        let event = automaton
            .find_event_by_name(&name)
            .ok_or_else(|| TableError::UnknownEvent { name: name.clone() })?
            .id();
        if columns.contains(&event) {
            return Err(TableError::DuplicateEvent { name });
        }
        columns.push(event);
    }
    Ok(columns)
}

fn clean_name(cell: &str, line: u64) -> Result<String, TableError> {
    let name: String = cell.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(bad) = name.chars().find(|c| !(c.is_ascii_alphabetic() || *c == '_')) {
        return Err(TableError::BadCharacter {
            line,
            cell: cell.to_string(),
            character: bad,
        });
    }
    Ok(name)
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}
