//! Factories supplying the states and events of each automaton.
//!
//! States and events come from the embedding application (they carry
//! native callbacks), not from data files. The loader invokes the factory
//! once per automaton it creates.

use crate::state::StateSpec;

/// Supplies event names and state specs for a new automaton.
///
/// `events` is always called before `states`, so the state factory knows
/// how many transition slots each state needs.
pub trait AutomatonFactory<A> {
    /// Event names, in id order.
    fn events(&self) -> Vec<String>;

    /// State specs, in id order.
    fn states(&self, event_count: usize) -> Vec<StateSpec<A>>;
}

/// Factory backed by fixed lists, handing out clones of its specs.
pub struct StaticFactory<A> {
    events: Vec<String>,
    states: Vec<StateSpec<A>>,
}

impl<A> StaticFactory<A> {
    pub fn new(events: Vec<String>, states: Vec<StateSpec<A>>) -> Self {
        Self { events, states }
    }

    /// Callback-free catalog, as used by the authoring tools.
    pub fn from_names<E, S>(events: E, states: S) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            events: events.into_iter().map(Into::into).collect(),
            states: states.into_iter().map(StateSpec::named).collect(),
        }
    }

    pub fn with_state(mut self, spec: StateSpec<A>) -> Self {
        self.states.push(spec);
        self
    }

    pub fn with_event(mut self, name: impl Into<String>) -> Self {
        self.events.push(name.into());
        self
    }
}

impl<A> Default for StaticFactory<A> {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            states: Vec::new(),
        }
    }
}

impl<A> AutomatonFactory<A> for StaticFactory<A> {
    fn events(&self) -> Vec<String> {
        self.events.clone()
    }

    fn states(&self, _event_count: usize) -> Vec<StateSpec<A>> {
        self.states.clone()
    }
}
