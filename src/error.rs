use thiserror::Error;

/// Errors raised while reading grammar text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("Line {line}: no '->', '::=' or '→' found in rule")]
    MissingSeparator { line: usize },
    #[error("Line {line}: empty left side")]
    EmptyLeftSide { line: usize },
    #[error("Line {line}: empty right side")]
    EmptyRightSide { line: usize },
    #[error("Line {line}: cannot find left side")]
    MissingPreviousLeft { line: usize },
    #[error("grammar is empty or only contains comments")]
    Empty,
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegexError {
    #[error("regular expression is empty")]
    Empty,
    #[error("operator '{operator}' is missing an operand")]
    MissingOperand { operator: char },
    #[error("unbalanced parenthesis")]
    UnbalancedParenthesis,
    #[error("unsupported symbol '{0}' in regular expression")]
    UnsupportedSymbol(char),
    #[error("invalid regular expression: {0} fragments left after evaluation")]
    LeftoverFragments(usize),
}

/// Errors raised by the automaton/grammar conversions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("rule '{production}' is not of the form A -> a B, A -> a or A -> ε")]
    NotRegular { production: String },
    #[error("grammar has no productions")]
    EmptyGrammar,
    #[error("transition table columns have different lengths")]
    RaggedTable,
    #[error("state {state} has more than one transition on '{symbol}'")]
    NonDeterministic { state: usize, symbol: String },
}

/// A positioned failure of the LL(1) parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("[Line {line} | Column {column}] found {found} (kind {kind}), but expected {expected}")]
    Mismatch {
        line: usize,
        column: usize,
        found: String,
        kind: String,
        expected: String,
    },
    #[error("[Line {line} | Column {column}] found {found} (kind {kind}) after the expected end of input")]
    TrailingInput {
        line: usize,
        column: usize,
        found: String,
        kind: String,
    },
    #[error("[Line {line} | Column {column}] unexpected {found} (kind {kind}); <{non_terminal}> expects one of: {}", expected_list(.expected))]
    UnexpectedToken {
        line: usize,
        column: usize,
        found: String,
        kind: String,
        non_terminal: String,
        expected: Vec<String>,
    },
    #[error("internal parser error: {0}")]
    Internal(String),
}

fn expected_list(expected: &[String]) -> String {
    if expected.is_empty() {
        "<none>".to_string()
    } else {
        expected.join(", ")
    }
}

impl ParseError {
    /// Line and column of the offending token, when there is one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            ParseError::Mismatch { line, column, .. }
            | ParseError::TrailingInput { line, column, .. }
            | ParseError::UnexpectedToken { line, column, .. } => Some((*line, *column)),
            ParseError::Internal(_) => None,
        }
    }
}
