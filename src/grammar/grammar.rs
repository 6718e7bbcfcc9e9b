use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use super::EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Terminal,
    NonTerminal,
}

/// A grammar symbol. Equality is by value and kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Symbol {
    pub value: String,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn terminal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: SymbolKind::Terminal,
        }
    }

    pub fn non_terminal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: SymbolKind::NonTerminal,
        }
    }

    /// Builds a symbol from a grammar-text token: `<name>` or a leading
    /// uppercase letter marks a non-terminal, anything else is a terminal.
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        if token.len() >= 3 && token.starts_with('<') && token.ends_with('>') {
            Self::non_terminal(&token[1..token.len() - 1])
        } else if token.chars().next().map_or(false, |c| c.is_uppercase()) {
            Self::non_terminal(token)
        } else {
            Self::terminal(token)
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.kind == SymbolKind::Terminal
    }

    pub fn is_non_terminal(&self) -> bool {
        self.kind == SymbolKind::NonTerminal
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reads_as_terminal = !self.value.chars().next().map_or(false, |c| c.is_uppercase());
        if self.is_non_terminal() && reads_as_terminal {
            write!(f, "<{}>", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

/// `alpha -> beta`; an empty `beta` is ε.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Production {
    pub alpha: Vec<Symbol>,
    pub beta: Vec<Symbol>,
}

impl Production {
    pub fn new(alpha: Vec<Symbol>, beta: Vec<Symbol>) -> Self {
        Self { alpha, beta }
    }

    /// The left side as a single non-terminal, if it is one.
    pub fn single_left(&self) -> Option<&Symbol> {
        match self.alpha.as_slice() {
            [s] if s.is_non_terminal() => Some(s),
            _ => None,
        }
    }

    pub fn alpha_string(&self) -> String {
        join_symbols(&self.alpha)
    }

    pub fn beta_string(&self) -> String {
        if self.beta.is_empty() {
            EPSILON.to_string()
        } else {
            join_symbols(&self.beta)
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.alpha_string(), self.beta_string())
    }
}

fn join_symbols(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// An ordered list of productions. The first production's left side
/// holds the start symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Grammar {
    pub productions: Vec<Production>,
}

impl Grammar {
    pub fn new(productions: Vec<Production>) -> Self {
        Self { productions }
    }

    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }

    pub fn start_symbol(&self) -> Option<&Symbol> {
        self.productions.first().and_then(|p| p.alpha.first())
    }

    /// Productions with a single non-terminal on the left, grouped by that
    /// non-terminal in order of first appearance. Other productions are
    /// dropped.
    pub fn to_rule_map(&self) -> IndexMap<String, Vec<Vec<String>>> {
        let mut rules: IndexMap<String, Vec<Vec<String>>> = IndexMap::new();
        for production in &self.productions {
            if let Some(left) = production.single_left() {
                rules
                    .entry(left.value.clone())
                    .or_default()
                    .push(production.beta.iter().map(|s| s.value.clone()).collect());
            }
        }
        rules
    }

    /// Alternatives grouped by identical left side, in order of first
    /// appearance.
    pub fn grouped(&self) -> IndexMap<String, Vec<String>> {
        let mut grouped: IndexMap<String, Vec<String>> = IndexMap::new();
        for production in &self.productions {
            let beta = if production.beta.is_empty() {
                super::EPSILON_WORD.to_string()
            } else {
                production.beta_string()
            };
            grouped
                .entry(production.alpha_string())
                .or_default()
                .push(beta);
        }
        grouped
    }

    /// Serializes back to grammar text, one `LHS -> alt1 | alt2` line per
    /// distinct left side.
    pub fn to_text(&self) -> String {
        self.grouped()
            .iter()
            .map(|(left, rights)| format!("{} -> {}", left, rights.join(" | ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
