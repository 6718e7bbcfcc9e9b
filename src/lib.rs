extern crate wasm_bindgen;

use std::fmt::Display;

use wasm_bindgen::prelude::*;

pub mod automata;
pub mod error;
pub mod grammar;

pub use automata::{Dfa, Nfa, Regex, TransitionTable};
pub use error::{ConversionError, GrammarError, ParseError, RegexError};
pub use grammar::{
    compare, ChomskyType, Classification, Comparison, Grammar, Ll1Parser, Ll1Table, ParseTree,
};

use grammar::pretty_print::to_json;

fn error_json(e: impl Display) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

#[wasm_bindgen]
pub fn classify_to_json(grammar: &str) -> String {
    match Grammar::parse(grammar) {
        Ok(g) => to_json(&g.classify()),
        Err(e) => error_json(e),
    }
}

#[wasm_bindgen]
pub fn nullable_first_follow_to_json(grammar: &str) -> String {
    match Grammar::parse(grammar).and_then(|g| Ll1Table::from_grammar(&g)) {
        Ok(t) => t.to_non_terminal_output_vec().to_json(),
        Err(e) => error_json(e),
    }
}

#[wasm_bindgen]
pub fn ll1_table_to_json(grammar: &str) -> String {
    match Grammar::parse(grammar).and_then(|g| Ll1Table::from_grammar(&g)) {
        Ok(t) => to_json(&t.to_output()),
        Err(e) => error_json(e),
    }
}

#[wasm_bindgen]
pub fn regex_to_dfa_json(regex: &str) -> String {
    match automata::compile(regex) {
        Ok(nfa) => nfa.to_dfa().to_table(regex).to_json(),
        Err(e) => error_json(e),
    }
}

#[wasm_bindgen]
pub fn compare_grammars_to_json(left: &str, right: &str, max_len: usize) -> String {
    match (Grammar::parse(left), Grammar::parse(right)) {
        (Ok(l), Ok(r)) => to_json(&compare(&l, &r, max_len)),
        (Err(e), _) => error_json(format!("grammar 1: {}", e)),
        (_, Err(e)) => error_json(format!("grammar 2: {}", e)),
    }
}

#[cfg(test)]
mod scenario_tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use crate::{
        automata::compile,
        grammar::{equivalence::LanguageGenerator, meta::parse_grammar_text, Token},
        *,
    };

    #[test]
    fn context_free_but_not_regular() {
        let c = Grammar::parse("S -> a S b | a b").unwrap().classify();
        assert_eq!(c.grammar_type, 2);
        assert_eq!(c.label, "Type 2 (Context-Free)");
        assert!(c.justification[0].contains("a S b"));
        assert!(c.justification[1].contains("'S -> a b'"));
        assert!(c.justification.iter().all(|j| j.contains("not Type 3")));
    }

    #[test]
    fn bounded_equivalence() {
        let left = Grammar::parse("S -> a A\nA -> b").unwrap();
        let right = Grammar::parse("S -> a b").unwrap();
        let c = compare(&left, &right, 5);
        assert!(c.equivalent);
        assert_eq!(
            LanguageGenerator::new(&left, 5).generate(),
            BTreeSet::from(["ab".to_string()])
        );
    }

    #[test]
    fn first_follow_of_simple_grammar() {
        let t = Ll1Table::from_grammar(&Grammar::parse("S -> a A\nA -> b").unwrap()).unwrap();
        assert_eq!(t.first("S"), Some(vec!["a"]));
        assert_eq!(t.first("A"), Some(vec!["b"]));
        assert_eq!(t.follow("A"), Some(vec!["$"]));
        assert_eq!(t.follow("S"), Some(vec!["$"]));
    }

    #[test]
    fn common_prefix_is_a_conflict() {
        let t = Ll1Table::from_grammar(&Grammar::parse("S -> a | a b").unwrap()).unwrap();
        assert!(!t.is_ll1());
        assert_eq!(t.conflicts()[0].non_terminal, "S");
        assert_eq!(t.conflicts()[0].terminal, "a");
    }

    #[test]
    fn ll1_parse_of_nested_pairs() {
        let t = Ll1Table::from_grammar(&Grammar::parse("S -> a S b | a b").unwrap()).unwrap();
        let parser = Ll1Parser::new(&t);

        let tree = parser.parse(&Token::words("a a b b")).unwrap();
        assert_eq!(tree.symbol, "S");
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.leaves(), vec!["a", "a", "b", "b"]);

        let err = parser.parse(&Token::words("a b b")).unwrap_err();
        assert_eq!(err.position(), Some((1, 5)));
    }

    #[test]
    fn regular_round_trip() {
        let g = Grammar::parse("S -> a A | b\nA -> b | c").unwrap();
        let regex = Nfa::from_regular_grammar(&g).unwrap().to_dfa().to_regex();
        let back = compile(&regex.to_string())
            .unwrap()
            .to_dfa()
            .to_regular_grammar();
        assert_eq!(back.classify().grammar_type, 3);
        assert!(compare(&g, &back, 5).equivalent);
    }

    #[test]
    fn sample_automata_round_trip_through_regex() {
        for table in automata::interchange::samples() {
            let dfa = Dfa::from_table(&table).unwrap();
            let again = compile(&dfa.to_regex().to_string()).unwrap().to_dfa();
            for word in ["", "a", "ab", "abab", "aab", "abb", "ba", "aabb"] {
                assert_eq!(dfa.accepts(word), again.accepts(word), "{} in {}", word, table.name);
            }
        }
    }

    #[test]
    fn grammar_text_through_the_meta_parser() {
        let (g, tree) = parse_grammar_text("S -> a S b | a b\n").unwrap();
        assert_eq!(g, Grammar::parse("S -> a S b | a b").unwrap());
        assert!(tree.to_plaintext().contains("-> 'S' [L:1, C:1]"));
    }

    #[test]
    fn json_entry_points() {
        assert!(classify_to_json("S -> a S b | a b").contains("\"grammar_type\":2"));
        assert_eq!(
            classify_to_json("S a"),
            r#"{"error":"Line 1: no '->', '::=' or '→' found in rule"}"#
        );
        assert!(nullable_first_follow_to_json("S -> a A\nA -> b")
            .contains("{\"name\":\"A\",\"nullable\":false,\"first\":[\"b\"],\"follow\":[\"$\"]}"));
        assert!(ll1_table_to_json("S -> a | a b").contains("\"conflicts\":[{"));
        assert!(regex_to_dfa_json("a(b|c)*").contains("\"start_state\":0"));
        assert_eq!(
            regex_to_dfa_json("a|"),
            r#"{"error":"operator '|' is missing an operand"}"#
        );
        assert!(compare_grammars_to_json("S -> a A\nA -> b", "S -> a b", 5)
            .contains("\"equivalent\":true"));
        assert!(compare_grammars_to_json("S -> a", "oops", 5).starts_with("{\"error\":\"grammar 2:"));
    }
}
