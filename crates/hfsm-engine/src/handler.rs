//! Per-tick driver owning the loaded sets and the shared timed queue.

use std::time::{Duration, Instant};

use hfsm_core::{AutomatonFactory, AutomatonSet, EventId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::actor::{Actor, ActorFsm, SetId};
use crate::config::RuntimeConfig;
use crate::engine::{Engine, Step};
use crate::error::LoadResult;
use crate::loader::{LoadDiagnostics, SetLoader};
use crate::roster::Roster;
use crate::script::HostHook;
use crate::timed::{EventTarget, TimedEventQueue};

/// Result of a single tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Timed events that fell due.
    pub released: usize,

    /// Actor queues that received a released event.
    pub delivered: usize,

    /// Events fed through the resolution engine.
    pub processed: usize,

    /// Events that moved an actor.
    pub moved: usize,

    /// Events whose walk failed.
    pub failed: usize,

    /// Behaviour callbacks run.
    pub behaviors: usize,

    pub duration: Duration,
}

/// Owns every set of a running simulation.
///
/// All sets must be built from the same factory, so an [`EventId`] means
/// the same event in each of them.
pub struct AutomatonHandler<A> {
    engine: Engine,
    sets: Vec<AutomatonSet<A>>,
    timed: TimedEventQueue,
}

impl<A: Actor> AutomatonHandler<A> {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            sets: Vec::new(),
            timed: TimedEventQueue::new(),
        }
    }

    /// Load every set listed in `config`, failing on the first bad one.
    pub fn from_config(
        config: &RuntimeConfig,
        factory: &dyn AutomatonFactory<A>,
        host: Option<&HostHook>,
    ) -> LoadResult<(Self, Vec<(SetId, LoadDiagnostics)>)> {
        let mut handler = Self::new(Engine::with_config(config.engine.clone()));
        let mut loader = SetLoader::new(factory).with_config(&config.engine);
        if let Some(host) = host {
            loader = loader.with_host(host);
        }

        let mut diagnostics = Vec::with_capacity(config.sets.len());
        for entry in &config.sets {
            let loaded = loader.load_named(entry.name.clone(), &entry.path)?;
            let id = handler.add_set(loaded.set);
            diagnostics.push((id, loaded.diagnostics));
        }
        info!(sets = handler.sets.len(), "automaton_handler_ready");
        Ok((handler, diagnostics))
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn add_set(&mut self, set: AutomatonSet<A>) -> SetId {
        let id = SetId(self.sets.len());
        self.sets.push(set);
        id
    }

    pub fn set_id(&self, name: &str) -> Option<SetId> {
        self.sets.iter().position(|s| s.name() == name).map(SetId)
    }

    pub fn set(&self, name: &str) -> Option<&AutomatonSet<A>> {
        self.set_id(name).and_then(|id| self.set_by_id(id))
    }

    pub fn set_by_id(&self, id: SetId) -> Option<&AutomatonSet<A>> {
        self.sets.get(id.0)
    }

    pub fn sets(&self) -> &[AutomatonSet<A>] {
        &self.sets
    }

    /// A machine placed at the entry point of set `id`.
    pub fn enter(&self, id: SetId) -> Option<ActorFsm> {
        ActorFsm::enter(id, self.set_by_id(id)?)
    }

    pub fn timed_queue(&self) -> &TimedEventQueue {
        &self.timed
    }

    pub fn timed_queue_mut(&mut self) -> &mut TimedEventQueue {
        &mut self.timed
    }

    pub fn schedule(
        &mut self,
        event: EventId,
        start: Duration,
        duration: Duration,
        target: EventTarget,
    ) {
        self.timed.schedule(event, start, duration, target);
    }

    /// Feed every queued event of `actor` through its set.
    pub fn process_events(&self, actor: &mut A) -> Vec<Step> {
        let mut steps = Vec::new();
        let Some(set) = self.sets.get(actor.fsm().set().0) else {
            return steps;
        };
        while let Some(event) = actor.fsm_mut().queue_mut().dequeue() {
            steps.push(self.engine.advance(set, event, actor));
        }
        steps
    }

    /// Run the current state's behaviour. Returns whether one ran.
    pub fn run_behavior(&self, actor: &mut A, elapsed: Duration) -> bool {
        let (automaton, state) = actor.fsm().position();
        let behavior = self
            .sets
            .get(actor.fsm().set().0)
            .and_then(|s| s.automaton(automaton))
            .and_then(|a| a.state(state))
            .and_then(|s| s.behavior());
        match behavior {
            Some(behavior) => {
                behavior(actor, elapsed);
                true
            }
            None => false,
        }
    }

    /// One simulation tick: release due timed events, then for each
    /// automated actor drain its queue and run its state's behaviour.
    pub fn tick(&mut self, now: Duration, elapsed: Duration, roster: &mut Roster<A>) -> TickReport {
        let started = Instant::now();
        let mut report = TickReport::default();

        for timed in self.timed.release_due(now) {
            report.released += 1;
            report.delivered += roster.deliver(&timed);
        }

        let this = &*self;
        roster.for_each_mut(|actor| {
            if !actor.is_automated() {
                return;
            }
            for step in this.process_events(actor) {
                report.processed += 1;
                match step {
                    Step::Moved { .. } => report.moved += 1,
                    Step::Stayed { .. } => report.failed += 1,
                    Step::Unbound { .. } => {}
                }
            }
            if this.run_behavior(actor, elapsed) {
                report.behaviors += 1;
            }
        });

        report.duration = started.elapsed();
        debug!(
            now_ms = now.as_millis() as u64,
            released = report.released,
            processed = report.processed,
            moved = report.moved,
            failed = report.failed,
            "automaton_tick_complete"
        );
        report
    }
}

impl<A> std::fmt::Debug for AutomatonHandler<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomatonHandler")
            .field("engine", &self.engine)
            .field("sets", &self.sets.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("timed", &self.timed.len())
            .finish()
    }
}
