//! Script engine error types
//!
//! Every failure a script can provoke is reported through [`ScriptError`].
//! Messages carry only script-visible information: source positions, symbol
//! names, and the operation that failed. Host paths, host state, and engine
//! internals never appear here.

use std::time::Duration;

/// Errors raised while lexing, parsing, or evaluating a script
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("Parse error at line {line}, column {col}: {message}")]
    Parse {
        line: usize,
        col: usize,
        message: String,
    },

    #[error("Unexpected token: expected {expected}, found '{found}'")]
    UnexpectedToken { expected: String, found: String },

    #[error("Unexpected end of script: expected {0}")]
    UnexpectedEof(String),

    #[error("Expression nesting exceeds the limit of {0} levels")]
    NestingTooDeep(usize),

    #[error("Unknown name: '{0}'")]
    UnknownName(String),

    #[error("Unknown function: '{0}'")]
    UnknownFunction(String),

    #[error("Unknown field: '{0}'")]
    UnknownField(String),

    #[error("Unknown key: '{0}'")]
    UnknownKey(String),

    #[error("Type mismatch: {operation} expected {expected}, found {found}")]
    TypeMismatch {
        operation: String,
        expected: String,
        found: String,
    },

    #[error("Wrong number of arguments to '{name}': expected {expected}, found {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("'{0}' requires a non-empty list")]
    EmptyList(String),

    #[error("List index {index} out of bounds (length {len})")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Result of '{0}' is not a finite number")]
    NonFiniteResult(String),

    #[error("Step budget of {0} exhausted")]
    StepBudgetExhausted(u64),

    #[error("Execution exceeded the {0:?} time limit")]
    TimedOut(Duration),
}

/// Result type alias for script operations
pub type ScriptResult<T> = Result<T, ScriptError>;
