//! Error types for loading, resolving and writing automatons.

use std::path::PathBuf;

use hfsm_core::PredicateError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for loading a set.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type alias for the table and script writers.
pub type WriteResult<T> = Result<T, WriteError>;

/// Why a runtime configuration file was rejected.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("set {name:?} is listed twice")]
    DuplicateSet { name: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

/// Why a set failed to load. A failed load never yields a partial set.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The structural file is not well-formed.
    #[error("malformed structural file {}: {message}", path.display())]
    Xml { path: PathBuf, message: String },

    /// An automaton block has no name.
    #[error("automaton #{position} has no name")]
    MissingAutomatonName { position: usize },

    /// A transition block has no name.
    #[error("transition #{position} of automaton {automaton} has no name")]
    MissingTransitionName { automaton: String, position: usize },

    /// Two automatons, or two transitions of one automaton, share a name.
    #[error("duplicate {kind} name {name:?} in {scope}")]
    DuplicateName {
        kind: &'static str,
        name: String,
        scope: String,
    },

    #[error("automaton {automaton} names no script file")]
    MissingScriptFile { automaton: String },

    #[error("automaton {automaton} names no lookup-table file")]
    MissingTableFile { automaton: String },

    #[error("automaton {automaton} names no start state")]
    MissingStartState { automaton: String },

    #[error("automaton {automaton}: start state {state:?} does not exist")]
    InvalidStartState { automaton: String, state: String },

    /// A transition lacks its predicate or a branch, or a branch is empty.
    #[error("transition {automaton}::{transition} is malformed: {reason}")]
    MalformedTransition {
        automaton: String,
        transition: String,
        reason: String,
    },

    /// A branch names a state or transition its effective automaton lacks.
    #[error("transition {automaton}::{transition}: unknown {kind} {name:?} in {target}")]
    UnknownBranchTarget {
        automaton: String,
        transition: String,
        kind: &'static str,
        name: String,
        target: String,
    },

    /// A branch switches to an automaton the set does not contain.
    #[error("transition {automaton}::{transition}: unknown automaton {name:?}")]
    UnknownAutomaton {
        automaton: String,
        transition: String,
        name: String,
    },

    #[error("set names no start automaton")]
    MissingStartAutomaton,

    #[error("start automaton {name:?} does not exist")]
    InvalidStartAutomaton { name: String },

    /// The lookup-table file of an automaton is malformed.
    #[error("lookup table {}: {source}", path.display())]
    Table {
        path: PathBuf,
        #[source]
        source: TableError,
    },

    /// The script file failed to load or execute.
    #[error("script {}: {message}", path.display())]
    Script { path: PathBuf, message: String },
}

/// Stable, payload-free identification of a [`LoadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadErrorCode {
    Io,
    Xml,
    MissingAutomatonName,
    MissingTransitionName,
    DuplicateName,
    MissingScriptFile,
    MissingTableFile,
    MissingStartState,
    InvalidStartState,
    MalformedTransition,
    UnknownBranchTarget,
    UnknownAutomaton,
    MissingStartAutomaton,
    InvalidStartAutomaton,
    Table,
    Script,
}

impl LoadError {
    pub fn code(&self) -> LoadErrorCode {
        match self {
            LoadError::Io { .. } => LoadErrorCode::Io,
            LoadError::Xml { .. } => LoadErrorCode::Xml,
            LoadError::MissingAutomatonName { .. } => LoadErrorCode::MissingAutomatonName,
            LoadError::MissingTransitionName { .. } => LoadErrorCode::MissingTransitionName,
            LoadError::DuplicateName { .. } => LoadErrorCode::DuplicateName,
            LoadError::MissingScriptFile { .. } => LoadErrorCode::MissingScriptFile,
            LoadError::MissingTableFile { .. } => LoadErrorCode::MissingTableFile,
            LoadError::MissingStartState { .. } => LoadErrorCode::MissingStartState,
            LoadError::InvalidStartState { .. } => LoadErrorCode::InvalidStartState,
            LoadError::MalformedTransition { .. } => LoadErrorCode::MalformedTransition,
            LoadError::UnknownBranchTarget { .. } => LoadErrorCode::UnknownBranchTarget,
            LoadError::UnknownAutomaton { .. } => LoadErrorCode::UnknownAutomaton,
            LoadError::MissingStartAutomaton => LoadErrorCode::MissingStartAutomaton,
            LoadError::InvalidStartAutomaton { .. } => LoadErrorCode::InvalidStartAutomaton,
            LoadError::Table { .. } => LoadErrorCode::Table,
            LoadError::Script { .. } => LoadErrorCode::Script,
        }
    }
}

/// Why a lookup-table file could not be parsed.
#[derive(Debug, Error)]
pub enum TableError {
    /// A name contains a character outside `[A-Za-z_]`.
    #[error("line {line}: bad character {character:?} in {cell:?}")]
    BadCharacter {
        line: u64,
        cell: String,
        character: char,
    },

    #[error("header names unknown event {name:?}")]
    UnknownEvent { name: String },

    #[error("header names event {name:?} twice")]
    DuplicateEvent { name: String },

    #[error("header lists {found} events, automaton has {expected}")]
    TooManyEvents { found: usize, expected: usize },

    #[error("line {line}: unknown state {name:?}")]
    UnknownState { line: u64, name: String },

    #[error("line {line}: {found} cells for {expected} events")]
    TooManyCells {
        line: u64,
        found: usize,
        expected: usize,
    },

    /// No header row.
    #[error("file is empty")]
    EmptyFile,

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Why a transition walk produced no state. Logged, never propagated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("transition depth {depth} exceeded")]
    DepthExceeded { depth: usize },

    #[error(transparent)]
    Predicate(#[from] PredicateError),

    #[error("automaton {automaton} has no state named {state:?}")]
    MissingSameNamedState { automaton: String, state: String },

    /// The transition was never linked, or an id points outside its array.
    #[error("transition {transition} is not linked")]
    Unlinked { transition: String },
}

/// Why a table or script could not be written.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("{} already exists", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
