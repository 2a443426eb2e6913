//! Typed indices into the arrays owned by an automaton set.
//!
//! Every cross-reference in the catalog is one of these ids rather than a
//! pointer, so the set owns all records and cycles between transitions or
//! automatons need no shared ownership.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! catalog_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub usize);

        impl $name {
            /// Position of the record in its owning array.
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }
    };
}

catalog_id!(
    /// Dense event id. Shared by every automaton built from the same factory.
    EventId,
    "event"
);
catalog_id!(
    /// Index of a state inside one automaton.
    StateId,
    "state"
);
catalog_id!(
    /// Index of a transition inside one automaton.
    TransitionId,
    "transition"
);
catalog_id!(
    /// Index of an automaton inside one set.
    AutomatonId,
    "automaton"
);

/// Identifies an actor by its group (roster) and its index in that group.
///
/// These two numbers are the only arguments a predicate receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId {
    pub group: u32,
    pub index: u32,
}

impl ActorId {
    pub fn new(group: u32, index: u32) -> Self {
        Self { group, index }
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.group, self.index)
    }
}
