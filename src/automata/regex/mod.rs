//! Regular expressions over single-character symbols: `|`, `*`,
//! implicit concatenation, parentheses, `ε` and `∅`.

pub use ast::Regex;
pub use compiler::compile;

mod ast;
mod compiler;
mod parser;

pub const EMPTY_SET: &str = "∅";
