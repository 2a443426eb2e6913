//! Catalog types for data-driven hierarchical state machines driving actors.
//!
//! An [`AutomatonSet`] owns a list of [`Automaton`]s. Each automaton owns its
//! [`State`]s, [`Event`]s and [`Transition`]s, and every cross-reference
//! between them is a typed index ([`StateId`], [`TransitionId`], ...).
//!
//! ## Core Concepts
//!
//! - **State**: where an actor sits, with optional entrance, exit and
//!   per-tick behaviour callbacks
//! - **Event**: a named stimulus; each state has one transition slot per event
//! - **Transition**: a named predicate plus a true and a false [`Branch`]
//! - **Branch**: a target state, a chained transition, and/or an automaton switch
//!
//! ```text
//! state[event] -> transition --predicate--> Branch
//!                                    |-- State       (done)
//!                                    |-- Transition  (chain, bounded depth)
//!                                    \-- Automaton   (same-named state)
//! ```
//!
//! States and events are supplied by the host through an
//! [`AutomatonFactory`]; transitions and the lookup table come from data
//! files and are attached by the loader in `hfsm-engine`.

mod automaton;
mod event;
mod factory;
pub mod graph;
mod ids;
mod predicate;
mod set;
mod state;
mod transition;

pub use automaton::Automaton;
pub use event::Event;
pub use factory::{AutomatonFactory, StaticFactory};
pub use graph::{StateEdge, StateGraph, StateNode};
pub use ids::{ActorId, AutomatonId, EventId, StateId, TransitionId};
pub use predicate::{FixedPredicates, PredicateError, PredicateEvaluator};
pub use set::AutomatonSet;
pub use state::{ActorHook, BehaviorHook, State, StateCallbacks, StateSpec};
pub use transition::{Branch, Transition, TransitionLink};
