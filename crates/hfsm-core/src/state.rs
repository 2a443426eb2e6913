//! Automaton states and the actor callbacks attached to them.
//!
//! A state owns one transition slot per known event. The slot either binds
//! a transition or is empty, in which case the event has no effect while
//! the actor sits in this state.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::ids::{EventId, StateId, TransitionId};

/// Callback fired with the actor on entering or leaving a state.
pub type ActorHook<A> = Rc<dyn Fn(&mut A)>;

/// Per-tick behaviour callback: receives the actor and the elapsed time.
pub type BehaviorHook<A> = Rc<dyn Fn(&mut A, Duration)>;

/// Optional callbacks for a state. All of them are opaque to the engine.
pub struct StateCallbacks<A> {
    pub entrance: Option<ActorHook<A>>,
    pub exit: Option<ActorHook<A>>,
    pub behavior: Option<BehaviorHook<A>>,
}

impl<A> Default for StateCallbacks<A> {
    fn default() -> Self {
        Self {
            entrance: None,
            exit: None,
            behavior: None,
        }
    }
}

impl<A> Clone for StateCallbacks<A> {
    fn clone(&self) -> Self {
        Self {
            entrance: self.entrance.clone(),
            exit: self.exit.clone(),
            behavior: self.behavior.clone(),
        }
    }
}

impl<A> fmt::Debug for StateCallbacks<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCallbacks")
            .field("entrance", &self.entrance.is_some())
            .field("exit", &self.exit.is_some())
            .field("behavior", &self.behavior.is_some())
            .finish()
    }
}

/// What a factory hands back for each state: a name plus its callbacks.
pub struct StateSpec<A> {
    pub name: String,
    pub callbacks: StateCallbacks<A>,
}

impl<A> Clone for StateSpec<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            callbacks: self.callbacks.clone(),
        }
    }
}

impl<A> fmt::Debug for StateSpec<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSpec")
            .field("name", &self.name)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

impl<A> StateSpec<A> {
    /// A state with no callbacks.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            callbacks: StateCallbacks::default(),
        }
    }

    pub fn on_entrance(mut self, hook: impl Fn(&mut A) + 'static) -> Self {
        self.callbacks.entrance = Some(Rc::new(hook));
        self
    }

    pub fn on_exit(mut self, hook: impl Fn(&mut A) + 'static) -> Self {
        self.callbacks.exit = Some(Rc::new(hook));
        self
    }

    pub fn with_behavior(mut self, hook: impl Fn(&mut A, Duration) + 'static) -> Self {
        self.callbacks.behavior = Some(Rc::new(hook));
        self
    }
}

/// A single state in an automaton.
pub struct State<A> {
    id: StateId,
    name: String,
    transitions: Vec<Option<TransitionId>>,
    callbacks: StateCallbacks<A>,
}

impl<A> State<A> {
    /// Create a state with every one of `event_count` slots empty.
    pub fn new(id: StateId, spec: StateSpec<A>, event_count: usize) -> Self {
        Self {
            id,
            name: spec.name,
            transitions: vec![None; event_count],
            callbacks: spec.callbacks,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transition bound to `event`, if any.
    ///
    /// An event id outside this state's slot range reads as "no transition".
    pub fn transition_for(&self, event: EventId) -> Option<TransitionId> {
        self.transitions.get(event.index()).copied().flatten()
    }

    /// All slots in event-id order.
    pub fn transitions(&self) -> &[Option<TransitionId>] {
        &self.transitions
    }

    pub fn slot_count(&self) -> usize {
        self.transitions.len()
    }

    /// Bind (or clear, with `None`) the slot for `event`.
    ///
    /// Returns `false` when the event id has no slot in this state.
    pub fn bind(&mut self, event: EventId, transition: Option<TransitionId>) -> bool {
        match self.transitions.get_mut(event.index()) {
            Some(slot) => {
                *slot = transition;
                true
            }
            None => false,
        }
    }

    pub fn callbacks(&self) -> &StateCallbacks<A> {
        &self.callbacks
    }

    pub fn entrance(&self) -> Option<&ActorHook<A>> {
        self.callbacks.entrance.as_ref()
    }

    pub fn exit(&self) -> Option<&ActorHook<A>> {
        self.callbacks.exit.as_ref()
    }

    pub fn behavior(&self) -> Option<&BehaviorHook<A>> {
        self.callbacks.behavior.as_ref()
    }
}

impl<A> fmt::Debug for State<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("transitions", &self.transitions)
            .field("callbacks", &self.callbacks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_new_state_has_one_empty_slot_per_event() {
        let state: State<()> = State::new(StateId(0), StateSpec::named("waiting"), 4);
        assert_eq!(state.slot_count(), 4);
        assert!(state.transitions().iter().all(Option::is_none));
    }

    #[test]
    fn test_bind_and_lookup() {
        let mut state: State<()> = State::new(StateId(1), StateSpec::named("running"), 2);
        assert!(state.bind(EventId(1), Some(TransitionId(5))));
        assert_eq!(state.transition_for(EventId(1)), Some(TransitionId(5)));
        assert_eq!(state.transition_for(EventId(0)), None);

        // Out-of-range events neither bind nor resolve.
        assert!(!state.bind(EventId(9), Some(TransitionId(0))));
        assert_eq!(state.transition_for(EventId(9)), None);
    }

    #[test]
    fn test_callbacks_fire_with_actor() {
        let spec = StateSpec::<Cell<u32>>::named("s")
            .on_entrance(|a| a.set(a.get() + 1))
            .with_behavior(|a, dt| a.set(a.get() + dt.as_millis() as u32));
        let state = State::new(StateId(0), spec, 0);

        let mut actor = Cell::new(0);
        (state.entrance().unwrap())(&mut actor);
        (state.behavior().unwrap())(&mut actor, Duration::from_millis(10));
        assert_eq!(actor.get(), 11);
        assert!(state.exit().is_none());
    }
}
