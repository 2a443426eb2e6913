//! Loading automaton sets from a structural file plus per-automaton
//! lookup tables and predicate scripts.

mod structure;
mod table;

use std::fmt;

use hfsm_core::AutomatonSet;
use serde::Serialize;
use tracing::warn;

pub use structure::{
    AutomatonDescription, BranchDescription, SetDescription, SetLoader, TransitionDescription,
};
pub use table::{LookupTable, TableRow, UnknownCell};

/// A problem that did not stop the load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadWarning {
    /// A lookup-table cell named a transition that does not exist; the
    /// slot was left empty.
    UnknownTransitionInTable {
        automaton: String,
        line: u64,
        state: String,
        event: String,
        transition: String,
    },

    /// A transition's predicate is not a function in the loaded script.
    PredicateNotDefined {
        automaton: String,
        transition: String,
        predicate: String,
    },

    /// No event sequence reaches this state from the set's entry point.
    UnreachableState { automaton: String, state: String },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::UnknownTransitionInTable {
                automaton,
                line,
                state,
                event,
                transition,
            } => write!(
                f,
                "{automaton}: line {line}: unknown transition {transition:?} for ({state}, {event})"
            ),
            LoadWarning::PredicateNotDefined {
                automaton,
                transition,
                predicate,
            } => write!(
                f,
                "{automaton}::{transition}: predicate {predicate:?} is not defined by the script"
            ),
            LoadWarning::UnreachableState { automaton, state } => {
                write!(f, "{automaton}::{state} is unreachable from the entry point")
            }
        }
    }
}

/// Everything non-fatal found while loading one set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadDiagnostics {
    pub warnings: Vec<LoadWarning>,
}

impl LoadDiagnostics {
    pub fn push(&mut self, warning: LoadWarning) {
        warn!(%warning, "load_warning");
        self.warnings.push(warning);
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadWarning> {
        self.warnings.iter()
    }
}

/// A fully linked set and the warnings collected while loading it.
pub struct LoadedSet<A> {
    pub set: AutomatonSet<A>,
    pub diagnostics: LoadDiagnostics,
}

impl<A> fmt::Debug for LoadedSet<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedSet")
            .field("set", &self.set)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}
