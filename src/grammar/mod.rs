pub mod chomsky;
pub mod equivalence;
pub mod examples;
pub mod first_follow;
pub mod grammar;
pub mod ll1_parser;
pub mod ll1_parsing_table;
pub mod meta;
pub mod parse;
pub mod pretty_print;
pub mod scanner;

pub use chomsky::{ChomskyType, Classification};
pub use equivalence::{compare, Comparison, LanguageGenerator};
pub use grammar::{Grammar, Production, Symbol, SymbolKind};
pub use ll1_parser::{ConflictPolicy, Ll1Parser, ParseTree, Token};
pub use ll1_parsing_table::{Conflict, Ll1Table};

pub const EPSILON: &str = "ε";
pub const EPSILON_WORD: &str = "epsilon";
pub const END_MARK: &str = "$";
