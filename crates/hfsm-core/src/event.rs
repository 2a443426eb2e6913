//! Named stimuli that can trigger a transition.

use serde::{Deserialize, Serialize};

use crate::ids::EventId;

/// A single event. Immutable once the automaton is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    name: String,
}

impl Event {
    pub fn new(id: EventId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    /// Name used to reference the event from lookup-table headers.
    pub fn name(&self) -> &str {
        &self.name
    }
}
