//! The scripting seam: evaluating a transition predicate by name.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::ids::ActorId;

/// Why a predicate produced no usable answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PredicateError {
    /// No callable with that name exists in the scripting context.
    #[error("predicate not defined: {name}")]
    Missing { name: String },

    /// The predicate returned something other than a number.
    #[error("predicate {name} returned {found}, expected a number")]
    NotANumber { name: String, found: String },

    /// The predicate returned zero or several values.
    #[error("predicate {name} returned {count} values, expected exactly one")]
    WrongArity { name: String, count: usize },

    /// The predicate raised an error while running.
    #[error("predicate {name} raised: {message}")]
    Raised { name: String, message: String },
}

/// A scripting context able to evaluate named boolean predicates.
///
/// The actor that triggered the evaluation is passed explicitly. Its group
/// and index are the only arguments the predicate sees.
pub trait PredicateEvaluator {
    /// Evaluate `predicate` for `actor`. Zero is false, anything else true.
    fn evaluate(&self, predicate: &str, actor: ActorId) -> Result<bool, PredicateError>;

    /// Whether a predicate of that name can currently be called.
    fn defines(&self, predicate: &str) -> bool;
}

/// Predicates with fixed answers, keyed by name.
///
/// Useful for tools that never evaluate and for tests.
#[derive(Debug, Clone, Default)]
pub struct FixedPredicates {
    answers: HashMap<String, bool>,
}

impl FixedPredicates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, predicate: impl Into<String>, answer: bool) -> Self {
        self.answers.insert(predicate.into(), answer);
        self
    }

    pub fn set(&mut self, predicate: impl Into<String>, answer: bool) {
        self.answers.insert(predicate.into(), answer);
    }
}

impl PredicateEvaluator for FixedPredicates {
    fn evaluate(&self, predicate: &str, _actor: ActorId) -> Result<bool, PredicateError> {
        self.answers
            .get(predicate)
            .copied()
            .ok_or_else(|| PredicateError::Missing {
                name: predicate.to_string(),
            })
    }

    fn defines(&self, predicate: &str) -> bool {
        self.answers.contains_key(predicate)
    }
}

impl fmt::Debug for dyn PredicateEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PredicateEvaluator")
    }
}
