//! Per-actor FIFO of pending events.

use std::collections::VecDeque;

use hfsm_core::EventId;

/// Events waiting to be fed through the resolution engine, oldest first.
///
/// Unbounded. The tick driver drains it completely once per tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorEventQueue {
    events: VecDeque<EventId>,
}

impl ActorEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the newest end.
    pub fn enqueue(&mut self, event: EventId) {
        self.events.push_back(event);
    }

    /// Remove the oldest event.
    pub fn dequeue(&mut self) -> Option<EventId> {
        self.events.pop_front()
    }

    pub fn peek(&self) -> Option<EventId> {
        self.events.front().copied()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = EventId> + '_ {
        self.events.iter().copied()
    }
}
