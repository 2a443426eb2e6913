//! Transition resolution: feeding one event through an actor's automaton.

use hfsm_core::{ActorId, AutomatonId, AutomatonSet, Branch, EventId, StateId, TransitionId};
use tracing::{debug, warn};

use crate::actor::Actor;
use crate::config::EngineConfig;
use crate::error::ResolveError;

/// Outcome of [`Engine::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// No transition is bound to the event in the current state. No
    /// callback fired.
    Unbound { state: StateId },

    /// The walk resolved and the actor now sits at this position.
    Moved {
        automaton: AutomatonId,
        state: StateId,
    },

    /// The walk failed; the actor kept its automaton and state. Exit and
    /// entrance of the current state have both fired.
    Stayed { state: StateId, error: ResolveError },
}

impl Step {
    /// State the actor is in after the step.
    pub fn state(&self) -> StateId {
        match self {
            Step::Unbound { state } | Step::Stayed { state, .. } => *state,
            Step::Moved { state, .. } => *state,
        }
    }

    pub fn is_moved(&self) -> bool {
        matches!(self, Step::Moved { .. })
    }
}

/// Resolves events against a set's transition graph.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Feed `event` to `actor`, moving it through `set`.
    ///
    /// With no transition bound, nothing happens. Otherwise the current
    /// state's exit fires, the transition is walked, the actor is moved to
    /// the resolved position (or kept in place if the walk fails) and the
    /// entrance of the state it ends up in fires.
    pub fn advance<A: Actor>(&self, set: &AutomatonSet<A>, event: EventId, actor: &mut A) -> Step {
        let id = actor.id();
        let (automaton_id, state_id) = actor.fsm().position();

        let Some(current) = set.automaton(automaton_id).and_then(|a| a.state(state_id)) else {
            warn!(
                group = id.group,
                index = id.index,
                automaton = %automaton_id,
                state = %state_id,
                "actor_position_invalid"
            );
            return Step::Unbound { state: state_id };
        };
        let Some(transition) = current.transition_for(event) else {
            return Step::Unbound { state: state_id };
        };

        if let Some(exit) = current.exit() {
            exit(actor);
        }

        let walk = Walk {
            set,
            actor: id,
            from_state: current.name(),
            max_depth: self.config.max_transition_depth,
        };
        let step = match walk.resolve(automaton_id, transition, 0) {
            Ok((automaton, state)) => {
                debug!(
                    group = id.group,
                    index = id.index,
                    from = current.name(),
                    automaton = %automaton,
                    state = %state,
                    "actor_state_changed"
                );
                actor.fsm_mut().move_to(automaton, state);
                Step::Moved { automaton, state }
            }
            Err(error) => {
                warn!(
                    group = id.group,
                    index = id.index,
                    state = current.name(),
                    %error,
                    "transition_unresolved"
                );
                Step::Stayed {
                    state: state_id,
                    error,
                }
            }
        };

        let (automaton, state) = actor.fsm().position();
        if let Some(entrance) = set
            .automaton(automaton)
            .and_then(|a| a.state(state))
            .and_then(|s| s.entrance())
        {
            entrance(actor);
        }
        step
    }

    /// Pure resolution of one transition, without callbacks or moving the
    /// actor. `from_state` names the actor's current state for
    /// automaton-only branches.
    pub fn resolve<A>(
        &self,
        set: &AutomatonSet<A>,
        automaton: AutomatonId,
        transition: TransitionId,
        from_state: &str,
        actor: ActorId,
    ) -> Result<(AutomatonId, StateId), ResolveError> {
        Walk {
            set,
            actor,
            from_state,
            max_depth: self.config.max_transition_depth,
        }
        .resolve(automaton, transition, 0)
    }
}

struct Walk<'a, A> {
    set: &'a AutomatonSet<A>,
    actor: ActorId,
    from_state: &'a str,
    max_depth: usize,
}

impl<A> Walk<'_, A> {
    fn resolve(
        &self,
        owner: AutomatonId,
        transition: TransitionId,
        depth: usize,
    ) -> Result<(AutomatonId, StateId), ResolveError> {
        if depth >= self.max_depth {
            return Err(ResolveError::DepthExceeded { depth });
        }

        let automaton = self.set.automaton(owner).ok_or_else(|| ResolveError::Unlinked {
            transition: transition.to_string(),
        })?;
        let record = automaton
            .transition(transition)
            .ok_or_else(|| ResolveError::Unlinked {
                transition: transition.to_string(),
            })?;
        let link = record.link().ok_or_else(|| ResolveError::Unlinked {
            transition: record.name().to_string(),
        })?;
        let predicates = automaton
            .predicates()
            .ok_or_else(|| hfsm_core::PredicateError::Missing {
                name: link.predicate.clone(),
            })?;

        let outcome = predicates.evaluate(&link.predicate, self.actor)?;
        debug!(
            group = self.actor.group,
            index = self.actor.index,
            transition = record.name(),
            predicate = link.predicate.as_str(),
            outcome,
            depth,
            "predicate_evaluated"
        );

        let branch = link.branch(outcome);
        let target = branch.effective_automaton(owner);
        match *branch {
            Branch::State { state, .. } => Ok((target, state)),
            Branch::Transition { transition, .. } => self.resolve(target, transition, depth + 1),
            Branch::Automaton(_) => {
                let switched = self.set.automaton(target).ok_or_else(|| ResolveError::Unlinked {
                    transition: record.name().to_string(),
                })?;
                switched
                    .find_state_by_name(self.from_state)
                    .map(|s| (target, s.id()))
                    .ok_or_else(|| ResolveError::MissingSameNamedState {
                        automaton: switched.name().to_string(),
                        state: self.from_state.to_string(),
                    })
            }
        }
    }
}
