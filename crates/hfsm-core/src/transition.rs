//! Transitions: named edges resolved through a scripted predicate.
//!
//! A transition is created with only its name during the first loading
//! pass, because other transitions and automatons may refer to it before
//! its own definition has been read. Its predicate and branches are
//! attached in the second (linking) pass.

use serde::{Deserialize, Serialize};

use crate::ids::{AutomatonId, StateId, TransitionId};

/// Where one side of a transition leads.
///
/// Any named state or transition lives in the branch's effective
/// automaton: the switched-to automaton when `automaton` is set, otherwise
/// the automaton that owns the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Branch {
    /// Move to a state, optionally switching automaton first.
    State {
        automaton: Option<AutomatonId>,
        state: StateId,
    },
    /// Chain into another transition, optionally switching automaton first.
    Transition {
        automaton: Option<AutomatonId>,
        transition: TransitionId,
    },
    /// Switch automaton and move to the state named like the current one.
    Automaton(AutomatonId),
}

impl Branch {
    /// The automaton this branch switches to, if any.
    pub fn automaton(&self) -> Option<AutomatonId> {
        match *self {
            Branch::State { automaton, .. } | Branch::Transition { automaton, .. } => automaton,
            Branch::Automaton(automaton) => Some(automaton),
        }
    }

    /// The automaton in whose namespace the branch targets live.
    pub fn effective_automaton(&self, owner: AutomatonId) -> AutomatonId {
        self.automaton().unwrap_or(owner)
    }
}

/// Predicate plus both branches, attached during linking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionLink {
    /// Name of the scripted predicate, looked up at call time.
    pub predicate: String,
    pub on_true: Branch,
    pub on_false: Branch,
}

impl TransitionLink {
    pub fn new(predicate: impl Into<String>, on_true: Branch, on_false: Branch) -> Self {
        Self {
            predicate: predicate.into(),
            on_true,
            on_false,
        }
    }

    /// Branch selected by a predicate outcome.
    pub fn branch(&self, outcome: bool) -> &Branch {
        if outcome {
            &self.on_true
        } else {
            &self.on_false
        }
    }
}

/// A single transition in an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    id: TransitionId,
    name: String,
    link: Option<TransitionLink>,
}

impl Transition {
    /// A named, not yet linked transition.
    pub fn new(id: TransitionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            link: None,
        }
    }

    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Predicate and branches; `None` until the linking pass has run.
    pub fn link(&self) -> Option<&TransitionLink> {
        self.link.as_ref()
    }

    pub fn predicate(&self) -> Option<&str> {
        self.link.as_ref().map(|l| l.predicate.as_str())
    }

    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }

    pub fn set_link(&mut self, link: TransitionLink) {
        self.link = Some(link);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_automaton() {
        let owner = AutomatonId(0);
        let local = Branch::State {
            automaton: None,
            state: StateId(2),
        };
        let switched = Branch::Transition {
            automaton: Some(AutomatonId(3)),
            transition: TransitionId(1),
        };
        assert_eq!(local.effective_automaton(owner), owner);
        assert_eq!(switched.effective_automaton(owner), AutomatonId(3));
        assert_eq!(
            Branch::Automaton(AutomatonId(1)).effective_automaton(owner),
            AutomatonId(1)
        );
    }

    #[test]
    fn test_link_selects_branch() {
        let link = TransitionLink::new(
            "always",
            Branch::State {
                automaton: None,
                state: StateId(1),
            },
            Branch::State {
                automaton: None,
                state: StateId(0),
            },
        );
        let mut transition = Transition::new(TransitionId(0), "t");
        assert!(!transition.is_linked());
        transition.set_link(link);

        let link = transition.link().unwrap();
        assert!(matches!(link.branch(true), Branch::State { state: StateId(1), .. }));
        assert!(matches!(link.branch(false), Branch::State { state: StateId(0), .. }));
        assert_eq!(transition.predicate(), Some("always"));
    }
}
