//! cirius-int - Tree-walking interpreter.
//!
//! Evaluates the AST directly against a stack of environment frames.
//! `return` travels as an explicit control-flow signal through statement
//! execution rather than through unwinding, and all I/O goes through
//! injected reader/writer handles so the program's stdin and stdout can
//! be anything the embedder chooses.

mod env;
mod interp;
mod value;

pub use env::{Environment, FrameId};
pub use interp::Interpreter;
pub use value::{Builtin, Value};

use thiserror::Error;

/// Errors raised while a program runs.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("name '{0}' is not defined")]
    UndefinedName(String),

    #[error("function 'main' is not defined")]
    MissingMain,

    #[error("invalid input: expected an integer, got '{0}'")]
    InvalidInput(String),

    #[error("unexpected end of input")]
    InputExhausted,

    #[error("unsupported operand types for '{op}': {lhs} and {rhs}")]
    UnsupportedBinary {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },

    #[error("unsupported operand type for '{op}': {operand}")]
    UnsupportedUnary {
        op: &'static str,
        operand: &'static str,
    },

    #[error("'{0}' is not a function")]
    NotCallable(String),

    #[error("function '{name}' expects {expected} arguments, got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    IntegerOverflow,

    #[error("for loop bounds must be integers")]
    NonIntegerBounds,

    #[error("call to '{0}' produced no value")]
    NoValue(String),

    #[error("invalid argument to '{name}': {message}")]
    InvalidArgument {
        name: &'static str,
        message: String,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
