//! Shared queue of delayed events, ordered by due time.

use std::collections::VecDeque;
use std::time::Duration;

use hfsm_core::{ActorId, EventId};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Who receives a timed event once it is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTarget {
    Actor(ActorId),
    /// Every actor in the roster.
    Broadcast,
}

/// One scheduled delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub event: EventId,
    /// Simulation time at which the delay started.
    pub start: Duration,
    pub duration: Duration,
    pub target: EventTarget,
}

impl TimedEvent {
    /// `start + duration`, saturating.
    pub fn due(&self) -> Duration {
        self.start.saturating_add(self.duration)
    }
}

/// Timed events kept in ascending due-time order.
///
/// Events with the same due time are released in scheduling order.
#[derive(Debug, Clone, Default)]
pub struct TimedEventQueue {
    entries: VecDeque<TimedEvent>,
}

impl TimedEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(
        &mut self,
        event: EventId,
        start: Duration,
        duration: Duration,
        target: EventTarget,
    ) {
        self.push(TimedEvent {
            event,
            start,
            duration,
            target,
        });
    }

    pub fn push(&mut self, timed: TimedEvent) {
        let due = timed.due();
        let at = self.entries.partition_point(|e| e.due() <= due);
        trace!(
            event = %timed.event,
            due_ms = due.as_millis() as u64,
            position = at,
            "timed_event_scheduled"
        );
        self.entries.insert(at, timed);
    }

    /// Remove and return, in due order, every event due at or before `now`.
    pub fn release_due(&mut self, now: Duration) -> Vec<TimedEvent> {
        let count = self.entries.partition_point(|e| e.due() <= now);
        self.entries.drain(..count).collect()
    }

    /// Due time of the earliest pending event.
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.front().map(TimedEvent::due)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimedEvent> {
        self.entries.iter()
    }
}
