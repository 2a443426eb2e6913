//! A single automaton: states, events, transitions and a scripting context.

use std::fmt;

use crate::event::Event;
use crate::factory::AutomatonFactory;
use crate::ids::{AutomatonId, EventId, StateId, TransitionId};
use crate::predicate::PredicateEvaluator;
use crate::state::{State, StateSpec};
use crate::transition::{Transition, TransitionLink};

/// One complete state machine definition.
///
/// Any part may still be unset while the automaton is being loaded; a set
/// is only handed out once every automaton in it is fully linked.
pub struct Automaton<A> {
    id: AutomatonId,
    name: String,
    states: Vec<State<A>>,
    events: Vec<Event>,
    transitions: Vec<Transition>,
    start_state: Option<StateId>,
    predicates: Option<Box<dyn PredicateEvaluator>>,
}

impl<A> Automaton<A> {
    /// Build the states and events of a new automaton from two factories.
    ///
    /// Events are produced first; the state factory receives their count.
    pub fn create_with<S, E>(id: AutomatonId, state_factory: S, event_factory: E) -> Self
    where
        S: FnOnce(usize) -> Vec<StateSpec<A>>,
        E: FnOnce() -> Vec<String>,
    {
        let events: Vec<Event> = event_factory()
            .into_iter()
            .enumerate()
            .map(|(i, name)| Event::new(EventId(i), name))
            .collect();
        let event_count = events.len();
        let states = state_factory(event_count)
            .into_iter()
            .enumerate()
            .map(|(i, spec)| State::new(StateId(i), spec, event_count))
            .collect();

        Self {
            id,
            name: String::new(),
            states,
            events,
            transitions: Vec::new(),
            start_state: None,
            predicates: None,
        }
    }

    /// Build a new automaton from an [`AutomatonFactory`].
    pub fn create(id: AutomatonId, factory: &dyn AutomatonFactory<A>) -> Self {
        Self::create_with(id, |count| factory.states(count), || factory.events())
    }

    pub fn id(&self) -> AutomatonId {
        self.id
    }

    // Ids are positional; only the owning set may move an automaton.
    pub(crate) fn set_id(&mut self, id: AutomatonId) {
        self.id = id;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn states(&self) -> &[State<A>] {
        &self.states
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn state(&self, id: StateId) -> Option<&State<A>> {
        self.states.get(id.index())
    }

    pub fn state_mut(&mut self, id: StateId) -> Option<&mut State<A>> {
        self.states.get_mut(id.index())
    }

    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.get(id.index())
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        self.transitions.get(id.index())
    }

    // Lookups by name are linear scans. Automatons hold tens of records.

    pub fn find_state_by_name(&self, name: &str) -> Option<&State<A>> {
        self.states.iter().find(|s| s.name() == name)
    }

    pub fn find_event_by_name(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name() == name)
    }

    pub fn find_transition_by_name(&self, name: &str) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.name() == name)
    }

    /// Append a named, unlinked transition and return its id.
    pub fn add_transition(&mut self, name: impl Into<String>) -> TransitionId {
        let id = TransitionId(self.transitions.len());
        self.transitions.push(Transition::new(id, name));
        id
    }

    /// Attach predicate and branches to a transition.
    ///
    /// Returns `false` if the transition does not exist.
    pub fn link_transition(&mut self, id: TransitionId, link: TransitionLink) -> bool {
        match self.transitions.get_mut(id.index()) {
            Some(transition) => {
                transition.set_link(link);
                true
            }
            None => false,
        }
    }

    /// Bind (or clear) the transition for a (state, event) cell.
    pub fn bind(
        &mut self,
        state: StateId,
        event: EventId,
        transition: Option<TransitionId>,
    ) -> bool {
        if let Some(t) = transition {
            if t.index() >= self.transitions.len() {
                return false;
            }
        }
        self.states
            .get_mut(state.index())
            .is_some_and(|s| s.bind(event, transition))
    }

    pub fn start_state(&self) -> Option<StateId> {
        self.start_state
    }

    pub fn set_start_state(&mut self, state: StateId) {
        self.start_state = Some(state);
    }

    /// The scripting context used to evaluate this automaton's predicates.
    pub fn predicates(&self) -> Option<&dyn PredicateEvaluator> {
        self.predicates.as_deref()
    }

    pub fn set_predicates(&mut self, predicates: Box<dyn PredicateEvaluator>) {
        self.predicates = Some(predicates);
    }

    /// Whether every transition is linked and a start state is set.
    pub fn is_complete(&self) -> bool {
        self.start_state.is_some()
            && self.predicates.is_some()
            && self.transitions.iter().all(Transition::is_linked)
    }
}

impl<A> fmt::Debug for Automaton<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Automaton")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("states", &self.states.len())
            .field("events", &self.events.len())
            .field("transitions", &self.transitions.len())
            .field("start_state", &self.start_state)
            .field("has_predicates", &self.predicates.is_some())
            .finish()
    }
}
