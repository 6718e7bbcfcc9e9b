//! Longest-match tokenizer for grammar text.
//!
//! Produces the token stream consumed by the grammar-of-grammars in
//! [`super::meta`]. Every line ends with a `NEWLINE` token; characters no
//! rule accepts become `INVALID` tokens so the parser can report them.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ll1_parser::Token;

pub const NON_TERMINAL: &str = "NON_TERMINAL";
pub const TERMINAL: &str = "TERMINAL";
pub const EPSILON_KIND: &str = "EPSILON";
pub const ARROW: &str = "ARROW";
pub const PIPE: &str = "PIPE";
pub const NEWLINE: &str = "NEWLINE";
pub const INVALID: &str = "INVALID";

struct Rule {
    pattern: Regex,
    kind: Option<&'static str>,
}

fn rule(pattern: &str, kind: Option<&'static str>) -> Rule {
    Rule {
        pattern: Regex::new(&format!("^(?:{})", pattern)).expect("scanner patterns are valid"),
        kind,
    }
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(r"\s+", None),
        rule(r"#.*", None),
        rule(r"->|::=|→", Some(ARROW)),
        rule(r"\|", Some(PIPE)),
        rule(r"epsilon|ε", Some(EPSILON_KIND)),
        rule(r"<[a-zA-Z_][a-zA-Z0-9_]*>", Some(NON_TERMINAL)),
        rule(r"[A-Z][A-Za-z0-9_']*", Some(NON_TERMINAL)),
        rule(r"[a-z0-9_][A-Za-z0-9_']*", Some(TERMINAL)),
        rule(r"'[^']*'", Some(TERMINAL)),
        rule(r"[-+*/()\[\]{}.,;:=!?&%^~@]", Some(TERMINAL)),
    ]
});

/// Tokenizes one line. Ties between equally long matches go to the rule
/// listed first.
pub fn scan_line(line: &str, line_number: usize) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = line;
    let mut column = 1;

    while !rest.is_empty() {
        let best = RULES
            .iter()
            .filter_map(|r| r.pattern.find(rest).map(|m| (m.end(), r)))
            .filter(|(len, _)| *len > 0)
            .fold(None, |best: Option<(usize, &Rule)>, (len, r)| match best {
                Some((best_len, _)) if best_len >= len => best,
                _ => Some((len, r)),
            });

        let (len, kind) = match best {
            Some((len, r)) => (len, r.kind),
            None => {
                let len = rest.chars().next().map_or(1, |c| c.len_utf8());
                (len, Some(INVALID))
            }
        };

        let lexeme = &rest[..len];
        if let Some(kind) = kind {
            let lexeme = if lexeme.len() >= 2 && lexeme.starts_with('\'') && lexeme.ends_with('\'') {
                &lexeme[1..lexeme.len() - 1]
            } else {
                lexeme
            };
            tokens.push(Token::new(lexeme, kind, line_number, column));
        }
        column += lexeme.chars().count();
        rest = &rest[len..];
    }

    tokens.push(Token::new("\\n", NEWLINE, line_number, column));
    tokens
}

pub fn scan(text: &str) -> Vec<Token> {
    text.lines()
        .enumerate()
        .flat_map(|(i, line)| scan_line(line, i + 1))
        .collect()
}
