//! Lua predicate bridge.
//!
//! Each automaton owns one [`LuaPredicates`]: a Lua VM with the automaton's
//! script executed into it. A predicate is a global Lua function looked up
//! by name at call time:
//!
//! ```lua
//! function has_ball(group, index)
//!   return 1
//! end
//! ```
//!
//! It is called with the actor's group and index and must return exactly
//! one number. Zero is false, anything else is true.

use std::fmt;
use std::path::{Path, PathBuf};

use hfsm_core::{ActorId, PredicateError, PredicateEvaluator};
use mlua::{Lua, MultiValue, Value};
use tracing::debug;

use crate::error::{LoadError, LoadResult};

/// Registers host functions into a fresh VM before the script runs.
pub type HostHook = dyn Fn(&Lua) -> mlua::Result<()>;

/// The actor a predicate is being evaluated for.
///
/// Present as Lua app data only for the duration of one call, so host
/// functions invoked by the predicate can read it with
/// `lua.app_data_ref::<CurrentActor>()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentActor(pub ActorId);

/// A Lua VM holding one automaton's predicates.
pub struct LuaPredicates {
    lua: Lua,
    origin: Option<PathBuf>,
}

impl LuaPredicates {
    /// An empty VM with the standard safe libraries.
    pub fn new() -> Self {
        Self {
            lua: Lua::new(),
            origin: None,
        }
    }

    /// Execute `source` into a fresh VM. `host` runs first.
    pub fn from_source(name: &str, source: &str, host: Option<&HostHook>) -> mlua::Result<Self> {
        let predicates = Self::new();
        if let Some(host) = host {
            host(&predicates.lua)?;
        }
        predicates.lua.load(source).set_name(name).exec()?;
        Ok(predicates)
    }

    /// Read and execute a script file.
    pub fn from_file(path: &Path, host: Option<&HostHook>) -> LoadResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = format!("@{}", path.display());
        let mut predicates =
            Self::from_source(&name, &source, host).map_err(|err| LoadError::Script {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        predicates.origin = Some(path.to_path_buf());
        debug!(script = %path.display(), "predicate_script_loaded");
        Ok(predicates)
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Script file this VM was loaded from.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    fn call(&self, predicate: &str, actor: ActorId) -> Result<bool, PredicateError> {
        let function = match self.lua.globals().get::<Value>(predicate) {
            Ok(Value::Function(function)) => function,
            Ok(Value::Nil) | Err(_) => {
                return Err(PredicateError::Missing {
                    name: predicate.to_string(),
                })
            }
            Ok(other) => {
                return Err(PredicateError::Raised {
                    name: predicate.to_string(),
                    message: format!("global is a {}, not a function", other.type_name()),
                })
            }
        };

        let values = function
            .call::<MultiValue>((actor.group, actor.index))
            .map_err(|err| PredicateError::Raised {
                name: predicate.to_string(),
                message: err.to_string(),
            })?;

        if values.len() != 1 {
            return Err(PredicateError::WrongArity {
                name: predicate.to_string(),
                count: values.len(),
            });
        }
        match values.into_iter().next() {
            Some(Value::Integer(i)) => Ok(i != 0),
            Some(Value::Number(n)) => Ok(n != 0.0),
            Some(other) => Err(PredicateError::NotANumber {
                name: predicate.to_string(),
                found: other.type_name().to_string(),
            }),
            None => Err(PredicateError::WrongArity {
                name: predicate.to_string(),
                count: 0,
            }),
        }
    }
}

impl Default for LuaPredicates {
    fn default() -> Self {
        Self::new()
    }
}

impl PredicateEvaluator for LuaPredicates {
    fn evaluate(&self, predicate: &str, actor: ActorId) -> Result<bool, PredicateError> {
        let previous = self.lua.set_app_data(CurrentActor(actor));
        let outcome = self.call(predicate, actor);
        match previous {
            Some(previous) => {
                self.lua.set_app_data(previous);
            }
            None => {
                self.lua.remove_app_data::<CurrentActor>();
            }
        }
        outcome
    }

    fn defines(&self, predicate: &str) -> bool {
        matches!(
            self.lua.globals().get::<Value>(predicate),
            Ok(Value::Function(_))
        )
    }
}

impl fmt::Debug for LuaPredicates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LuaPredicates")
            .field("origin", &self.origin)
            .finish()
    }
}
