//! Loading and running data-driven hierarchical state machines.
//!
//! A set is described by one structural XML file naming its automatons and
//! their transitions. Each automaton points at a CSV lookup table (state ×
//! event → transition) and a Lua script defining the transitions'
//! predicates. The [`SetLoader`] turns those files into an
//! [`AutomatonSet`](hfsm_core::AutomatonSet); the [`Engine`] feeds events
//! through it on behalf of [`Actor`]s, and the [`AutomatonHandler`] drives a
//! whole [`Roster`] once per tick.
//!
//! ## Pipeline
//!
//! ```text
//! set.xml ──► intern names ──► link tables + scripts ──► AutomatonSet
//!                                                            │
//! TimedEventQueue ──► Roster queues ──► Engine::advance ◄────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use hfsm_core::StaticFactory;
//! use hfsm_engine::{SetLoader, SetId};
//! # use hfsm_engine::{Actor, ActorFsm};
//! # struct Player { fsm: ActorFsm }
//! # impl Actor for Player {
//! #     fn id(&self) -> hfsm_core::ActorId { hfsm_core::ActorId::new(0, 0) }
//! #     fn fsm(&self) -> &ActorFsm { &self.fsm }
//! #     fn fsm_mut(&mut self) -> &mut ActorFsm { &mut self.fsm }
//! # }
//!
//! let factory = StaticFactory::<Player>::from_names(["ball_lost"], ["waiting", "running"]);
//! let loaded = SetLoader::new(&factory).load("ai/offense.xml")?;
//! for warning in loaded.diagnostics.iter() {
//!     eprintln!("{warning}");
//! }
//! let fsm = ActorFsm::enter(SetId(0), &loaded.set);
//! # Ok::<(), hfsm_engine::LoadError>(())
//! ```

mod actor;
pub mod config;
mod engine;
mod error;
mod handler;
pub mod loader;
mod manifest;
mod queue;
mod roster;
pub mod script;
mod timed;
pub mod writer;

#[cfg(test)]
mod test_fixtures;

pub use actor::{Actor, ActorFsm, SetId};
pub use config::{EngineConfig, RuntimeConfig, SetEntry};
pub use engine::{Engine, Step};
pub use error::{
    ConfigError, LoadError, LoadErrorCode, LoadResult, ResolveError, TableError, WriteError,
    WriteResult,
};
pub use handler::{AutomatonHandler, TickReport};
pub use loader::{LoadDiagnostics, LoadWarning, LoadedSet, SetDescription, SetLoader};
pub use manifest::CatalogManifest;
pub use queue::ActorEventQueue;
pub use roster::{Roster, GROUPS};
pub use script::{CurrentActor, HostHook, LuaPredicates};
pub use timed::{EventTarget, TimedEvent, TimedEventQueue};
pub use writer::{dump_table, generate_blank_script, generate_blank_table};
