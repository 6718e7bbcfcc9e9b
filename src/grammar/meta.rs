//! The grammar-description language, parsed with the generic LL(1)
//! machinery instead of the line-based reader in [`super::parse`].

use once_cell::sync::Lazy;

use crate::error::GrammarError;

use super::{
    first_follow::RuleMap,
    grammar::{Production, Symbol},
    ll1_parser::{Ll1Parser, ParseTree},
    ll1_parsing_table::Ll1Table,
    scanner::{self, NON_TERMINAL, TERMINAL},
    Grammar,
};

pub const META_START: &str = "Grammar";

const META_RULES: &[(&str, &[&[&str]])] = &[
    ("Grammar", &[&["Lines"]]),
    ("Lines", &[&["Line", "Lines"], &[]]),
    ("Line", &[&["NEWLINE"], &["Rule", "NEWLINE"]]),
    ("Rule", &[&["Symbol", "LhsTail", "ARROW", "Alternatives"]]),
    ("LhsTail", &[&["Symbol", "LhsTail"], &[]]),
    ("Symbol", &[&["NON_TERMINAL"], &["TERMINAL"]]),
    ("Alternatives", &[&["Sequence", "AltTail"]]),
    ("AltTail", &[&["PIPE", "Sequence", "AltTail"], &[]]),
    ("Sequence", &[&["Item", "Sequence"], &[]]),
    ("Item", &[&["NON_TERMINAL"], &["TERMINAL"], &["EPSILON"]]),
];

pub fn meta_rules() -> RuleMap {
    META_RULES
        .iter()
        .map(|(left, alternatives)| {
            (
                left.to_string(),
                alternatives
                    .iter()
                    .map(|alt| alt.iter().map(|s| s.to_string()).collect())
                    .collect(),
            )
        })
        .collect()
}

static META_TABLE: Lazy<Ll1Table> = Lazy::new(|| Ll1Table::build(&meta_rules(), META_START));

pub fn meta_table() -> &'static Ll1Table {
    &META_TABLE
}

/// Scans and parses grammar text, then reads the productions off the tree.
pub fn parse_grammar_text(text: &str) -> Result<(Grammar, ParseTree), GrammarError> {
    let tokens = scanner::scan(text);
    let tree = Ll1Parser::new(meta_table()).parse(&tokens)?;
    let productions = extract_productions(&tree);
    if productions.is_empty() {
        return Err(GrammarError::Empty);
    }
    Ok((Grammar::new(productions), tree))
}

pub fn extract_productions(tree: &ParseTree) -> Vec<Production> {
    let mut productions = Vec::new();
    collect_rules(tree, &mut productions);
    productions
}

fn collect_rules(node: &ParseTree, productions: &mut Vec<Production>) {
    if node.symbol != "Rule" {
        for child in &node.children {
            collect_rules(child, productions);
        }
        return;
    }

    let mut alpha = Vec::new();
    let mut alternatives: Vec<Vec<Symbol>> = Vec::new();
    for child in &node.children {
        match child.symbol.as_str() {
            "Symbol" | "LhsTail" => collect_symbols(child, &mut alpha),
            "Alternatives" => collect_alternatives(child, &mut alternatives),
            _ => {}
        }
    }
    productions.extend(
        alternatives
            .into_iter()
            .map(|beta| Production::new(alpha.clone(), beta)),
    );
}

fn collect_alternatives(node: &ParseTree, alternatives: &mut Vec<Vec<Symbol>>) {
    for child in &node.children {
        match child.symbol.as_str() {
            "Sequence" => {
                let mut beta = Vec::new();
                collect_symbols(child, &mut beta);
                alternatives.push(beta);
            }
            "AltTail" => collect_alternatives(child, alternatives),
            _ => {}
        }
    }
}

fn collect_symbols(node: &ParseTree, symbols: &mut Vec<Symbol>) {
    match (&node.lexeme, node.symbol.as_str()) {
        (Some(lexeme), NON_TERMINAL) => symbols.push(Symbol::from_token(lexeme)),
        (Some(lexeme), TERMINAL) => symbols.push(Symbol::terminal(lexeme.as_str())),
        _ => {
            for child in &node.children {
                collect_symbols(child, symbols);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ParseError;

    #[test]
    fn meta_grammar_is_ll1() {
        assert!(meta_table().is_ll1(), "{:?}", meta_table().conflicts());
    }

    #[test]
    fn agrees_with_line_reader() {
        let text = "# comment\nS -> a S b | a b\n\nA ::= <x> | epsilon\nS A → A S\n";
        let (g, tree) = parse_grammar_text(text).unwrap();
        assert_eq!(tree.symbol, META_START);
        assert_eq!(g, Grammar::parse(text).unwrap());
    }

    #[test]
    fn empty_alternative() {
        let (g, _) = parse_grammar_text("S -> a |").unwrap();
        assert_eq!(g.productions.len(), 2);
        assert!(g.productions[1].beta.is_empty());
    }

    #[test]
    fn missing_arrow_is_a_positioned_error() {
        let err = parse_grammar_text("S -> a\nA b").unwrap_err();
        match err {
            GrammarError::Parse(ParseError::UnexpectedToken { line, column, non_terminal, .. }) => {
                assert_eq!((line, column), (2, 4));
                assert_eq!(non_terminal, "LhsTail");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn blank_text_has_no_productions() {
        assert_eq!(parse_grammar_text("\n# only a comment\n").unwrap_err(), GrammarError::Empty);
    }
}
