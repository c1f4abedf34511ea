//! Restricted script engine for model-generated analysis scriptlets.
//!
//! Scriptlets are short, assignment-only programs: each line binds a name to
//! the value of a Python-flavored expression (arithmetic, comparisons,
//! conditionals, list and map comprehensions, a small builtin allowlist).
//! There are no loops, no function definitions, no imports, and no I/O; the
//! only reachable symbols are the builtins and the values the caller placed
//! in the [`ScriptContext`].
//!
//! Supplied scripts are treated as untrusted input. The engine copies
//! context data instead of sharing it, bounds every run with a step budget
//! and a wall-clock deadline, and reports failures through [`ScriptError`]
//! values that carry script-visible information only.

#![deny(unsafe_code)]

pub mod errors;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

pub use errors::{ScriptError, ScriptResult};
pub use eval::{ScriptEngine, ScriptLimits};
pub use value::{OutputBindings, ScriptContext, Value};
