pub mod conversions;
pub mod dfa;
pub mod interchange;
pub mod nfa;
pub mod regex;

pub use dfa::Dfa;
pub use interchange::TransitionTable;
pub use nfa::{Input, Nfa};
pub use regex::{compile, Regex};

/// Index of a state inside the automaton that owns it.
pub type StateId = usize;
