//! Minimal fixtures for engine testing.
//!
//! Provides in-memory catalogs, a recording actor and fixed predicates, so
//! resolution and ticking can be tested without files or Lua.

use std::time::Duration;

use hfsm_core::{
    ActorId, Automaton, AutomatonId, AutomatonSet, Branch, FixedPredicates, StateId, StateSpec,
    StaticFactory, TransitionId, TransitionLink,
};

use crate::actor::{Actor, ActorFsm, SetId};

/// Actor that records every callback fired on it.
#[derive(Debug, Clone)]
pub struct TestActor {
    pub id: ActorId,
    pub fsm: ActorFsm,
    /// `"enter:<state>"` and `"exit:<state>"` in firing order.
    pub log: Vec<String>,
    /// `(state, elapsed)` for every behaviour call.
    pub ticks: Vec<(String, Duration)>,
    pub automated: bool,
}

impl TestActor {
    pub fn new(id: ActorId, fsm: ActorFsm) -> Self {
        Self {
            id,
            fsm,
            log: Vec::new(),
            ticks: Vec::new(),
            automated: true,
        }
    }

    /// Actor `(0:0)` at the entry point of `set`.
    ///
    /// Panics if the set has no entry point.
    pub fn entering(set: &AutomatonSet<TestActor>) -> Self {
        Self::entering_as(ActorId::new(0, 0), SetId(0), set)
    }

    pub fn entering_as(id: ActorId, set_id: SetId, set: &AutomatonSet<TestActor>) -> Self {
        let fsm = ActorFsm::enter(set_id, set).expect("set has an entry point");
        Self::new(id, fsm)
    }
}

impl Actor for TestActor {
    fn id(&self) -> ActorId {
        self.id
    }

    fn fsm(&self) -> &ActorFsm {
        &self.fsm
    }

    fn fsm_mut(&mut self) -> &mut ActorFsm {
        &mut self.fsm
    }

    fn is_automated(&self) -> bool {
        self.automated
    }
}

/// Factory whose states log into a [`TestActor`].
pub fn recording_factory<E, S>(events: E, states: S) -> StaticFactory<TestActor>
where
    E: IntoIterator,
    E::Item: Into<String>,
    S: IntoIterator,
    S::Item: Into<String>,
{
    let specs = states
        .into_iter()
        .map(|name| {
            let name: String = name.into();
            let (enter, exit, tick) = (name.clone(), name.clone(), name.clone());
            StateSpec::named(name)
                .on_entrance(move |a: &mut TestActor| a.log.push(format!("enter:{enter}")))
                .on_exit(move |a: &mut TestActor| a.log.push(format!("exit:{exit}")))
                .with_behavior(move |a: &mut TestActor, dt| a.ticks.push((tick.clone(), dt)))
        })
        .collect();
    StaticFactory::new(events.into_iter().map(Into::into).collect(), specs)
}

/// Builder for in-memory sets of recording states.
///
/// Every automaton starts in state 0; the first automaton added is the
/// set's start automaton.
pub struct CatalogBuilder {
    factory: StaticFactory<TestActor>,
    set: AutomatonSet<TestActor>,
}

impl CatalogBuilder {
    pub fn new<E, S>(events: E, states: S) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            factory: recording_factory(events, states),
            set: AutomatonSet::new("test"),
        }
    }

    pub fn automaton(&mut self, name: &str) -> AutomatonId {
        let mut automaton = Automaton::create(AutomatonId(0), &self.factory);
        automaton.set_name(name);
        automaton.set_start_state(StateId(0));
        let id = self.set.push(automaton);
        if self.set.start_automaton().is_none() {
            self.set.set_start_automaton(id);
        }
        id
    }

    pub fn transition(&mut self, automaton: AutomatonId, name: &str) -> TransitionId {
        self.get(automaton).add_transition(name)
    }

    pub fn link(
        &mut self,
        automaton: AutomatonId,
        transition: TransitionId,
        predicate: &str,
        on_true: Branch,
        on_false: Branch,
    ) {
        let linked = self
            .get(automaton)
            .link_transition(transition, TransitionLink::new(predicate, on_true, on_false));
        assert!(linked, "unknown transition {transition}");
    }

    /// Bind `transition` to the (state, event) cell, by name.
    pub fn bind(
        &mut self,
        automaton: AutomatonId,
        state: &str,
        event: &str,
        transition: TransitionId,
    ) {
        let a = self.get(automaton);
        let state = a.find_state_by_name(state).expect("state exists").id();
        let event = a.find_event_by_name(event).expect("event exists").id();
        assert!(a.bind(state, event, Some(transition)));
    }

    /// Add a transition between two local states and bind it.
    #[allow(clippy::too_many_arguments)]
    pub fn bind_to_state(
        &mut self,
        automaton: AutomatonId,
        state: &str,
        event: &str,
        transition: &str,
        predicate: &str,
        on_true: &str,
        on_false: &str,
    ) -> TransitionId {
        let local = |a: &Automaton<TestActor>, name: &str| Branch::State {
            automaton: None,
            state: a.find_state_by_name(name).expect("state exists").id(),
        };
        let t = self.transition(automaton, transition);
        let (on_true, on_false) = {
            let a = self.get(automaton);
            (local(a, on_true), local(a, on_false))
        };
        self.link(automaton, t, predicate, on_true, on_false);
        self.bind(automaton, state, event, t);
        t
    }

    /// Finish the set, giving every automaton a copy of `predicates`.
    pub fn build(mut self, predicates: FixedPredicates) -> AutomatonSet<TestActor> {
        for index in 0..self.set.len() {
            self.get(AutomatonId(index))
                .set_predicates(Box::new(predicates.clone()));
        }
        self.set
    }

    fn get(&mut self, automaton: AutomatonId) -> &mut Automaton<TestActor> {
        self.set
            .automaton_mut(automaton)
            .expect("automaton was added to the builder")
    }
}
