//! A named collection of automatons with an entry point.

use std::fmt;

use crate::automaton::Automaton;
use crate::factory::AutomatonFactory;
use crate::ids::{AutomatonId, StateId};

/// Owns every automaton (and transitively every state, event and
/// transition) of one behavioural mode.
pub struct AutomatonSet<A> {
    name: String,
    automatons: Vec<Automaton<A>>,
    start: Option<AutomatonId>,
}

impl<A> AutomatonSet<A> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            automatons: Vec::new(),
            start: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create `count` empty automatons from `factory`, in order.
    pub fn allocate(&mut self, count: usize, factory: &dyn AutomatonFactory<A>) {
        self.automatons.reserve(count);
        for _ in 0..count {
            let id = AutomatonId(self.automatons.len());
            self.automatons.push(Automaton::create(id, factory));
        }
    }

    /// Add an automaton built elsewhere; its id is reassigned to its slot.
    pub fn push(&mut self, automaton: Automaton<A>) -> AutomatonId {
        let id = AutomatonId(self.automatons.len());
        let mut automaton = automaton;
        automaton.set_id(id);
        self.automatons.push(automaton);
        id
    }

    pub fn automatons(&self) -> &[Automaton<A>] {
        &self.automatons
    }

    pub fn len(&self) -> usize {
        self.automatons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.automatons.is_empty()
    }

    pub fn automaton(&self, id: AutomatonId) -> Option<&Automaton<A>> {
        self.automatons.get(id.index())
    }

    pub fn automaton_mut(&mut self, id: AutomatonId) -> Option<&mut Automaton<A>> {
        self.automatons.get_mut(id.index())
    }

    /// Exact-name lookup.
    pub fn find_automaton_by_name(&self, name: &str) -> Option<&Automaton<A>> {
        self.automatons.iter().find(|a| a.name() == name)
    }

    pub fn start_automaton(&self) -> Option<AutomatonId> {
        self.start
    }

    pub fn set_start_automaton(&mut self, id: AutomatonId) {
        self.start = Some(id);
    }

    /// Start automaton and its start state: where a fresh actor begins.
    pub fn entry_point(&self) -> Option<(AutomatonId, StateId)> {
        let automaton = self.automaton(self.start?)?;
        Some((automaton.id(), automaton.start_state()?))
    }
}

impl<A> fmt::Debug for AutomatonSet<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutomatonSet")
            .field("name", &self.name)
            .field("automatons", &self.automatons)
            .field("start", &self.start)
            .finish()
    }
}
