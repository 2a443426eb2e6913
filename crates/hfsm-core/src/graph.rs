//! Static state graph of an automaton set, for verification and export.
//!
//! Nodes are (automaton, state) pairs. An edge `a -> b` labelled
//! `event/transition` means that firing the event in `a` can end in `b`
//! for some predicate outcomes. Transition chains are flattened, so a
//! chain through several transitions produces direct edges to every state
//! it can reach.

use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;

use crate::ids::{AutomatonId, EventId, StateId, TransitionId};
use crate::set::AutomatonSet;
use crate::transition::Branch;

/// Node weight: one state in one automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateNode {
    pub automaton: AutomatonId,
    pub state: StateId,
    pub label: String,
}

impl fmt::Display for StateNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Edge weight: the (event, transition) cell that produces the move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEdge {
    pub event: EventId,
    pub transition: TransitionId,
    pub label: String,
}

impl fmt::Display for StateEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Directed graph over every state of a set.
#[derive(Debug, Clone, Default)]
pub struct StateGraph {
    graph: DiGraph<StateNode, StateEdge>,
    index: HashMap<(AutomatonId, StateId), NodeIndex>,
    entry: Option<NodeIndex>,
}

impl StateGraph {
    /// Build the graph from a linked set. Unlinked transitions contribute
    /// no edges.
    pub fn from_set<A>(set: &AutomatonSet<A>) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for automaton in set.automatons() {
            for state in automaton.states() {
                let node = graph.add_node(StateNode {
                    automaton: automaton.id(),
                    state: state.id(),
                    label: format!("{}::{}", automaton.name(), state.name()),
                });
                index.insert((automaton.id(), state.id()), node);
            }
        }

        for automaton in set.automatons() {
            for state in automaton.states() {
                let from = index[&(automaton.id(), state.id())];
                for (slot, bound) in state.transitions().iter().enumerate() {
                    let Some(transition) = *bound else { continue };
                    let event = EventId(slot);
                    let mut seen = HashSet::new();
                    let mut targets = Vec::new();
                    collect_targets(
                        set,
                        automaton.id(),
                        transition,
                        state.name(),
                        &mut seen,
                        &mut targets,
                    );

                    let label = format!(
                        "{}/{}",
                        automaton.event(event).map(|e| e.name()).unwrap_or("?"),
                        automaton
                            .transition(transition)
                            .map(|t| t.name())
                            .unwrap_or("?"),
                    );
                    let mut emitted = HashSet::new();
                    for target in targets.into_iter().filter(|t| emitted.insert(*t)) {
                        if let Some(&to) = index.get(&target) {
                            graph.add_edge(
                                from,
                                to,
                                StateEdge {
                                    event,
                                    transition,
                                    label: label.clone(),
                                },
                            );
                        }
                    }
                }
            }
        }

        let entry = set.entry_point().and_then(|key| index.get(&key).copied());
        Self {
            graph,
            index,
            entry,
        }
    }

    pub fn graph(&self) -> &DiGraph<StateNode, StateEdge> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether an event can move an actor from `from` to `to` directly.
    pub fn has_edge(&self, from: (AutomatonId, StateId), to: (AutomatonId, StateId)) -> bool {
        match (self.index.get(&from), self.index.get(&to)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// States no event sequence can reach from the set's entry point.
    ///
    /// Empty when the set has no entry point.
    pub fn unreachable_from_entry(&self) -> Vec<&StateNode> {
        let Some(entry) = self.entry else {
            return Vec::new();
        };
        let mut reached = HashSet::new();
        let mut dfs = Dfs::new(&self.graph, entry);
        while let Some(node) = dfs.next(&self.graph) {
            reached.insert(node);
        }

        self.graph
            .node_indices()
            .filter(|n| !reached.contains(n))
            .map(|n| &self.graph[n])
            .collect()
    }

    /// Graphviz rendering.
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::new(&self.graph))
    }
}

fn collect_targets<A>(
    set: &AutomatonSet<A>,
    owner: AutomatonId,
    transition: TransitionId,
    from_name: &str,
    seen: &mut HashSet<(AutomatonId, TransitionId)>,
    out: &mut Vec<(AutomatonId, StateId)>,
) {
    if !seen.insert((owner, transition)) {
        return;
    }
    let Some(link) = set
        .automaton(owner)
        .and_then(|a| a.transition(transition))
        .and_then(|t| t.link())
    else {
        return;
    };

    for branch in [&link.on_true, &link.on_false] {
        let target = branch.effective_automaton(owner);
        match *branch {
            Branch::State { state, .. } => out.push((target, state)),
            Branch::Transition { transition, .. } => {
                collect_targets(set, target, transition, from_name, seen, out)
            }
            Branch::Automaton(_) => {
                if let Some(state) = set
                    .automaton(target)
                    .and_then(|a| a.find_state_by_name(from_name))
                {
                    out.push((target, state.id()));
                }
            }
        }
    }
}
