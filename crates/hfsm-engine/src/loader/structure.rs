//! The structural file of a set, and the linker that turns it into a set.
//!
//! ```xml
//! <automaton_set>
//!   <automaton name="attack">
//!     <lua_file>attack.lua</lua_file>
//!     <csv_file>attack.csv</csv_file>
//!     <start_state>waiting</start_state>
//!     <transition name="t_start">
//!       <lua_function_name>has_ball</lua_function_name>
//!       <true><state>running</state></true>
//!       <false><transition>t_pass</transition><automaton>support</automaton></false>
//!     </transition>
//!   </automaton>
//!   <start_automaton>attack</start_automaton>
//! </automaton_set>
//! ```
//!
//! Linking runs in four phases: allocate one automaton per block, intern
//! every automaton and transition name, link each automaton (lookup
//! table, start state, branches, script), then resolve the set's start
//! automaton. Any error discards everything built so far.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use hfsm_core::{
    AutomatonFactory, AutomatonId, AutomatonSet, Branch, PredicateEvaluator, StateGraph,
    TransitionId, TransitionLink,
};
use serde::Deserialize;
use tracing::{debug, info};

use super::table::LookupTable;
use super::{LoadDiagnostics, LoadWarning, LoadedSet};
use crate::config::EngineConfig;
use crate::error::{LoadError, LoadResult};
use crate::script::{HostHook, LuaPredicates};

// ============================================================================
// Description
// ============================================================================

/// Parsed structural file, before any name is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SetDescription {
    #[serde(rename = "automaton", default)]
    pub automatons: Vec<AutomatonDescription>,
    #[serde(default)]
    pub start_automaton: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AutomatonDescription {
    #[serde(rename = "@name", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lua_file: Option<String>,
    #[serde(default)]
    pub csv_file: Option<String>,
    #[serde(default)]
    pub start_state: Option<String>,
    #[serde(rename = "transition", default)]
    pub transitions: Vec<TransitionDescription>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransitionDescription {
    #[serde(rename = "@name", default)]
    pub name: Option<String>,
    #[serde(rename = "lua_function_name", default)]
    pub predicate: Option<String>,
    #[serde(rename = "true", default)]
    pub on_true: Option<BranchDescription>,
    #[serde(rename = "false", default)]
    pub on_false: Option<BranchDescription>,
}

/// One side of a transition. At least one field must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BranchDescription {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub transition: Option<String>,
    #[serde(default)]
    pub automaton: Option<String>,
}

impl SetDescription {
    pub fn from_xml_str(text: &str) -> Result<Self, quick_xml::DeError> {
        quick_xml::de::from_str(text)
    }

    pub fn read(path: &Path) -> LoadResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_xml_str(&text).map_err(|err| LoadError::Xml {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Every predicate named by a transition, first occurrence order.
    pub fn predicate_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.automatons
            .iter()
            .flat_map(|a| a.transitions.iter())
            .filter_map(|t| field(&t.predicate))
            .filter(|p| seen.insert(*p))
            .collect()
    }

    pub fn automaton(&self, name: &str) -> Option<&AutomatonDescription> {
        self.automatons.iter().find(|a| field(&a.name) == Some(name))
    }
}

impl AutomatonDescription {
    /// Predicates used by this automaton's transitions, first occurrence order.
    pub fn predicate_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.transitions
            .iter()
            .filter_map(|t| field(&t.predicate))
            .filter(|p| seen.insert(*p))
            .collect()
    }
}

/// A trimmed, non-empty field value.
fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ============================================================================
// Linker
// ============================================================================

/// Builds linked sets from structural files.
pub struct SetLoader<'a, A> {
    factory: &'a dyn AutomatonFactory<A>,
    host: Option<&'a HostHook>,
    warn_missing_predicates: bool,
}

impl<'a, A> SetLoader<'a, A> {
    pub fn new(factory: &'a dyn AutomatonFactory<A>) -> Self {
        Self {
            factory,
            host: None,
            warn_missing_predicates: true,
        }
    }

    /// Run `host` on every automaton's VM before its script.
    pub fn with_host(mut self, host: &'a HostHook) -> Self {
        self.host = Some(host);
        self
    }

    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.warn_missing_predicates = config.warn_missing_predicates;
        self
    }

    /// Load a set named after the file stem.
    pub fn load(&self, path: impl AsRef<Path>) -> LoadResult<LoadedSet<A>> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.load_named(name, path)
    }

    pub fn load_named(&self, name: impl Into<String>, path: &Path) -> LoadResult<LoadedSet<A>> {
        let description = SetDescription::read(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        self.link(name, &description, base)
    }

    /// Link a parsed description. Relative file names resolve against `base`.
    pub fn link(
        &self,
        name: impl Into<String>,
        description: &SetDescription,
        base: &Path,
    ) -> LoadResult<LoadedSet<A>> {
        let mut set = AutomatonSet::new(name);
        let mut diagnostics = LoadDiagnostics::default();

        // Phase 1: allocate.
        set.allocate(description.automatons.len(), self.factory);
        debug!(set = set.name(), automatons = set.len(), "automaton_set_allocated");

        // Phase 2: intern automaton and transition names.
        self.intern(&mut set, description)?;

        // Phase 3: link each automaton.
        for (index, block) in description.automatons.iter().enumerate() {
            self.link_automaton(&mut set, AutomatonId(index), block, base, &mut diagnostics)?;
        }

        // Phase 4: start automaton.
        let start = field(&description.start_automaton).ok_or(LoadError::MissingStartAutomaton)?;
        let start = set
            .find_automaton_by_name(start)
            .ok_or_else(|| LoadError::InvalidStartAutomaton {
                name: start.to_string(),
            })?
            .id();
        set.set_start_automaton(start);

        for node in StateGraph::from_set(&set).unreachable_from_entry() {
            let automaton = set.automaton(node.automaton);
            let state = automaton.and_then(|a| a.state(node.state));
            if let (Some(automaton), Some(state)) = (automaton, state) {
                diagnostics.push(LoadWarning::UnreachableState {
                    automaton: automaton.name().to_string(),
                    state: state.name().to_string(),
                });
            }
        }

        info!(
            set = set.name(),
            automatons = set.len(),
            warnings = diagnostics.len(),
            "automaton_set_loaded"
        );
        Ok(LoadedSet { set, diagnostics })
    }

    fn intern(&self, set: &mut AutomatonSet<A>, description: &SetDescription) -> LoadResult<()> {
        let mut names = HashSet::new();
        for (index, block) in description.automatons.iter().enumerate() {
            let name =
                field(&block.name).ok_or(LoadError::MissingAutomatonName { position: index })?;
            if !names.insert(name) {
                return Err(LoadError::DuplicateName {
                    kind: "automaton",
                    name: name.to_string(),
                    scope: set.name().to_string(),
                });
            }

            let Some(automaton) = set.automaton_mut(AutomatonId(index)) else {
                continue;
            };
            automaton.set_name(name);

            let mut transitions = HashSet::new();
            for (position, transition) in block.transitions.iter().enumerate() {
                let transition_name =
                    field(&transition.name).ok_or_else(|| LoadError::MissingTransitionName {
                        automaton: name.to_string(),
                        position,
                    })?;
                if !transitions.insert(transition_name) {
                    return Err(LoadError::DuplicateName {
                        kind: "transition",
                        name: transition_name.to_string(),
                        scope: name.to_string(),
                    });
                }
                automaton.add_transition(transition_name);
            }
        }
        Ok(())
    }

    fn link_automaton(
        &self,
        set: &mut AutomatonSet<A>,
        id: AutomatonId,
        block: &AutomatonDescription,
        base: &Path,
        diagnostics: &mut LoadDiagnostics,
    ) -> LoadResult<()> {
        let name = field(&block.name).unwrap_or_default().to_string();
        let table_file = field(&block.csv_file).ok_or_else(|| LoadError::MissingTableFile {
            automaton: name.clone(),
        })?;
        let script_file = field(&block.lua_file).ok_or_else(|| LoadError::MissingScriptFile {
            automaton: name.clone(),
        })?;
        let start_state = field(&block.start_state).ok_or_else(|| LoadError::MissingStartState {
            automaton: name.clone(),
        })?;

        // Branch targets may live in any automaton, so resolve them against
        // the whole set before borrowing this one mutably.
        let links = block
            .transitions
            .iter()
            .map(|t| resolve_link(set, id, &name, t))
            .collect::<LoadResult<Vec<_>>>()?;

        let table_path = resolve_path(base, table_file);
        let table = {
            let Some(automaton) = set.automaton(id) else {
                return Ok(());
            };
            let file = File::open(&table_path).map_err(|source| LoadError::Io {
                path: table_path.clone(),
                source,
            })?;
            LookupTable::parse(automaton, file).map_err(|source| LoadError::Table {
                path: table_path.clone(),
                source,
            })?
        };

        let script_path = resolve_path(base, script_file);
        let predicates = LuaPredicates::from_file(&script_path, self.host)?;

        let Some(automaton) = set.automaton_mut(id) else {
            return Ok(());
        };

        for cell in table.apply(automaton) {
            let state = automaton.state(cell.state).map(|s| s.name()).unwrap_or("?");
            let event = automaton.event(cell.event).map(|e| e.name()).unwrap_or("?");
            let warning = LoadWarning::UnknownTransitionInTable {
                automaton: name.clone(),
                line: cell.line,
                state: state.to_string(),
                event: event.to_string(),
                transition: cell.transition,
            };
            diagnostics.push(warning);
        }

        let start = automaton
            .find_state_by_name(start_state)
            .ok_or_else(|| LoadError::InvalidStartState {
                automaton: name.clone(),
                state: start_state.to_string(),
            })?
            .id();
        automaton.set_start_state(start);

        for (index, link) in links.into_iter().enumerate() {
            if self.warn_missing_predicates && !predicates.defines(&link.predicate) {
                let transition = automaton
                    .transition(TransitionId(index))
                    .map(|t| t.name().to_string())
                    .unwrap_or_default();
                diagnostics.push(LoadWarning::PredicateNotDefined {
                    automaton: name.clone(),
                    transition,
                    predicate: link.predicate.clone(),
                });
            }
            automaton.link_transition(TransitionId(index), link);
        }

        automaton.set_predicates(Box::new(predicates));
        debug!(
            automaton = name.as_str(),
            table = %table_path.display(),
            script = %script_path.display(),
            "automaton_linked"
        );
        Ok(())
    }
}

fn resolve_path(base: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    }
}

fn resolve_link<A>(
    set: &AutomatonSet<A>,
    owner: AutomatonId,
    owner_name: &str,
    block: &TransitionDescription,
) -> LoadResult<TransitionLink> {
    let transition = field(&block.name).unwrap_or_default();
    let malformed = |reason: &str| LoadError::MalformedTransition {
        automaton: owner_name.to_string(),
        transition: transition.to_string(),
        reason: reason.to_string(),
    };

    let predicate = field(&block.predicate).ok_or_else(|| malformed("no predicate"))?;
    let on_true = block.on_true.as_ref().ok_or_else(|| malformed("no true branch"))?;
    let on_false = block.on_false.as_ref().ok_or_else(|| malformed("no false branch"))?;

    let on_true = resolve_branch(set, owner, owner_name, transition, on_true)?;
    let on_false = resolve_branch(set, owner, owner_name, transition, on_false)?;
    Ok(TransitionLink::new(predicate, on_true, on_false))
}

fn resolve_branch<A>(
    set: &AutomatonSet<A>,
    owner: AutomatonId,
    owner_name: &str,
    transition: &str,
    branch: &BranchDescription,
) -> LoadResult<Branch> {
    let switch = match field(&branch.automaton) {
        Some(target) => Some(
            set.find_automaton_by_name(target)
                .ok_or_else(|| LoadError::UnknownAutomaton {
                    automaton: owner_name.to_string(),
                    transition: transition.to_string(),
                    name: target.to_string(),
                })?
                .id(),
        ),
        None => None,
    };

    let effective = switch.unwrap_or(owner);
    let Some(target) = set.automaton(effective) else {
        return Err(LoadError::UnknownAutomaton {
            automaton: owner_name.to_string(),
            transition: transition.to_string(),
            name: effective.to_string(),
        });
    };
    let unknown = |kind: &'static str, name: &str| LoadError::UnknownBranchTarget {
        automaton: owner_name.to_string(),
        transition: transition.to_string(),
        kind,
        name: name.to_string(),
        target: target.name().to_string(),
    };

    match (field(&branch.state), field(&branch.transition), switch) {
        (Some(state), _, _) => {
            let state = target
                .find_state_by_name(state)
                .ok_or_else(|| unknown("state", state))?
                .id();
            Ok(Branch::State {
                automaton: switch,
                state,
            })
        }
        (None, Some(chained), _) => {
            let chained = target
                .find_transition_by_name(chained)
                .ok_or_else(|| unknown("transition", chained))?
                .id();
            Ok(Branch::Transition {
                automaton: switch,
                transition: chained,
            })
        }
        (None, None, Some(automaton)) => Ok(Branch::Automaton(automaton)),
        (None, None, None) => Err(LoadError::MalformedTransition {
            automaton: owner_name.to_string(),
            transition: transition.to_string(),
            reason: "branch names no state, transition or automaton".to_string(),
        }),
    }
}
