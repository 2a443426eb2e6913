//! The fixed pair of actor groups, and event delivery into their queues.

use hfsm_core::{ActorId, Automaton, EventId};
use tracing::{debug, warn};

use crate::actor::Actor;
use crate::timed::{EventTarget, TimedEvent};

/// Number of actor groups.
pub const GROUPS: usize = 2;

/// Two groups of actors, addressed by [`ActorId`] `(group, index)`.
///
/// Actors are visited index-major: index 0 of group 0, index 0 of group 1,
/// index 1 of group 0, and so on.
#[derive(Debug, Clone)]
pub struct Roster<A> {
    groups: [Vec<A>; GROUPS],
}

impl<A> Default for Roster<A> {
    fn default() -> Self {
        Self {
            groups: [Vec::new(), Vec::new()],
        }
    }
}

impl<A: Actor> Roster<A> {
    pub fn new(first: Vec<A>, second: Vec<A>) -> Self {
        Self {
            groups: [first, second],
        }
    }

    pub fn group(&self, group: u32) -> &[A] {
        self.groups
            .get(group as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn group_mut(&mut self, group: u32) -> Option<&mut Vec<A>> {
        self.groups.get_mut(group as usize)
    }

    pub fn actor(&self, id: ActorId) -> Option<&A> {
        self.groups.get(id.group as usize)?.get(id.index as usize)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut A> {
        self.groups
            .get_mut(id.group as usize)?
            .get_mut(id.index as usize)
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every roster position, index-major.
    pub fn ids(&self) -> Vec<ActorId> {
        let longest = self.groups.iter().map(Vec::len).max().unwrap_or(0);
        (0..longest)
            .flat_map(|index| {
                self.groups
                    .iter()
                    .enumerate()
                    .filter(move |(_, g)| index < g.len())
                    .map(move |(group, _)| ActorId::new(group as u32, index as u32))
            })
            .collect()
    }

    /// Visit every actor mutably, index-major.
    pub fn for_each_mut(&mut self, mut visit: impl FnMut(&mut A)) {
        for id in self.ids() {
            if let Some(actor) = self.actor_mut(id) {
                visit(actor);
            }
        }
    }

    /// Queue `event` for one actor. Returns `false` if no such actor.
    pub fn enqueue_event(&mut self, id: ActorId, event: EventId) -> bool {
        match self.actor_mut(id) {
            Some(actor) => {
                actor.fsm_mut().queue_mut().enqueue(event);
                true
            }
            None => {
                warn!(group = id.group, index = id.index, event = %event, "enqueue_unknown_actor");
                false
            }
        }
    }

    /// Queue the event called `name` in `automaton`. Unknown names are a
    /// logged no-op.
    pub fn enqueue_event_by_name(
        &mut self,
        id: ActorId,
        automaton: &Automaton<A>,
        name: &str,
    ) -> bool {
        match lookup(automaton, name) {
            Some(event) => self.enqueue_event(id, event),
            None => false,
        }
    }

    /// Queue `event` for every actor.
    pub fn broadcast_event(&mut self, event: EventId) {
        debug!(event = %event, actors = self.len(), "event_broadcast");
        self.for_each_mut(|actor| actor.fsm_mut().queue_mut().enqueue(event));
    }

    pub fn broadcast_event_by_name(&mut self, automaton: &Automaton<A>, name: &str) -> bool {
        match lookup(automaton, name) {
            Some(event) => {
                self.broadcast_event(event);
                true
            }
            None => false,
        }
    }

    /// Route a released timed event. Returns how many queues received it.
    pub fn deliver(&mut self, timed: &TimedEvent) -> usize {
        match timed.target {
            EventTarget::Actor(id) => usize::from(self.enqueue_event(id, timed.event)),
            EventTarget::Broadcast => {
                self.broadcast_event(timed.event);
                self.len()
            }
        }
    }
}

fn lookup<A>(automaton: &Automaton<A>, name: &str) -> Option<EventId> {
    let event = automaton.find_event_by_name(name).map(|e| e.id());
    if event.is_none() {
        warn!(automaton = automaton.name(), event = name, "unknown_event_name");
    }
    event
}
