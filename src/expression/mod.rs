//! Model definition compiler.
//!
//! Turns a textual model such as `"lambda x, a, b : a*x+b ; (1, 1)"` into an
//! executable [`FitFunction`] and its initial parameter guesses. The body
//! language is restricted to arithmetic over the declared names, numeric
//! literals, the constants `pi` and `e`, and a fixed set of numeric
//! functions; nothing in a definition is ever executed as code.

pub mod ast;
pub mod definition;
pub mod functions;
mod parser;

pub use ast::{BinaryOp, Expression, Node, UnaryOp};
pub use definition::{
    compile, format_tuple, parse_initial_params, CompiledDefinition, FitFunction, MAX_DEFINITION_LEN,
};
pub use functions::Builtin;
