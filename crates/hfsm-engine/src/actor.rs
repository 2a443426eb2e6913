//! What the engine needs from an actor: its identity and its machine state.

use hfsm_core::{ActorId, AutomatonId, AutomatonSet, StateId};
use serde::{Deserialize, Serialize};

use crate::queue::ActorEventQueue;

/// Index of a set inside an [`AutomatonHandler`](crate::handler::AutomatonHandler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SetId(pub usize);

/// An actor's position in the automaton graph plus its pending events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorFsm {
    set: SetId,
    automaton: AutomatonId,
    state: StateId,
    queue: ActorEventQueue,
}

impl ActorFsm {
    pub fn new(set: SetId, automaton: AutomatonId, state: StateId) -> Self {
        Self {
            set,
            automaton,
            state,
            queue: ActorEventQueue::new(),
        }
    }

    /// Place a fresh actor at the set's start automaton and start state.
    pub fn enter<A>(set_id: SetId, set: &AutomatonSet<A>) -> Option<Self> {
        let (automaton, state) = set.entry_point()?;
        Some(Self::new(set_id, automaton, state))
    }

    /// Move to another set's entry point. Pending events are kept.
    pub fn reenter<A>(&mut self, set_id: SetId, set: &AutomatonSet<A>) -> bool {
        match set.entry_point() {
            Some((automaton, state)) => {
                self.set = set_id;
                self.automaton = automaton;
                self.state = state;
                true
            }
            None => false,
        }
    }

    pub fn set(&self) -> SetId {
        self.set
    }

    pub fn automaton(&self) -> AutomatonId {
        self.automaton
    }

    pub fn state(&self) -> StateId {
        self.state
    }

    pub fn position(&self) -> (AutomatonId, StateId) {
        (self.automaton, self.state)
    }

    /// Commit a resolved position. Both parts change together.
    pub fn move_to(&mut self, automaton: AutomatonId, state: StateId) {
        self.automaton = automaton;
        self.state = state;
    }

    pub fn queue(&self) -> &ActorEventQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut ActorEventQueue {
        &mut self.queue
    }
}

/// An entity driven by an automaton.
///
/// State callbacks receive the implementing type itself, so hosts keep
/// their own gameplay data next to the [`ActorFsm`].
pub trait Actor {
    fn id(&self) -> ActorId;

    fn fsm(&self) -> &ActorFsm;

    fn fsm_mut(&mut self) -> &mut ActorFsm;

    /// Actors under direct control still receive events but are not ticked.
    fn is_automated(&self) -> bool {
        true
    }
}
