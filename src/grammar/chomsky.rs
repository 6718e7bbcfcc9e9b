use serde::Serialize;

use super::{grammar::Production, Grammar};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ChomskyType {
    Unrestricted,
    ContextSensitive,
    ContextFree,
    Regular,
}

impl ChomskyType {
    pub fn number(self) -> u8 {
        match self {
            ChomskyType::Regular => 3,
            ChomskyType::ContextFree => 2,
            ChomskyType::ContextSensitive => 1,
            ChomskyType::Unrestricted => 0,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            3 => Some(ChomskyType::Regular),
            2 => Some(ChomskyType::ContextFree),
            1 => Some(ChomskyType::ContextSensitive),
            0 => Some(ChomskyType::Unrestricted),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChomskyType::Regular => "Type 3 (Regular)",
            ChomskyType::ContextFree => "Type 2 (Context-Free)",
            ChomskyType::ContextSensitive => "Type 1 (Context-Sensitive)",
            ChomskyType::Unrestricted => "Type 0 (Recursively Enumerable)",
        }
    }
}

/// The verdict of [`Grammar::classify`].
///
/// `justification` explains why the next more restrictive type fails, not
/// why `grammar_type` holds. It is empty for a regular grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub grammar_type: u8,
    pub label: &'static str,
    pub justification: Vec<String>,
}

impl Classification {
    pub fn chomsky_type(&self) -> ChomskyType {
        ChomskyType::from_number(self.grammar_type).unwrap_or(ChomskyType::Unrestricted)
    }
}

/// Outcome of one type predicate.
#[derive(Debug, Clone, Default)]
pub struct Check {
    pub holds: bool,
    pub violations: Vec<String>,
}

impl Check {
    fn from_violations(violations: Vec<String>) -> Self {
        Self {
            holds: violations.is_empty(),
            violations,
        }
    }
}

fn left_is_single_non_terminal(p: &Production) -> bool {
    p.single_left().is_some()
}

impl Grammar {
    /// Type 3: `A -> ε`, `A -> a` or `A -> a B`.
    pub fn check_regular(&self) -> Check {
        let mut violations = Vec::new();
        for p in &self.productions {
            if !left_is_single_non_terminal(p) {
                violations.push(format!(
                    "Rule '{}': not Type 3, the left side is not a single non-terminal.",
                    p
                ));
                continue;
            }
            let right_ok = match p.beta.as_slice() {
                [] => true,
                [a] => a.is_terminal(),
                [a, b] => a.is_terminal() && b.is_non_terminal(),
                _ => false,
            };
            if !right_ok {
                violations.push(format!(
                    "Rule '{}': not Type 3, the right side is not 'a', 'a B' or ε.",
                    p
                ));
            }
        }
        Check::from_violations(violations)
    }

    /// Type 2: every left side is a single non-terminal.
    pub fn check_context_free(&self) -> Check {
        let violations = self
            .productions
            .iter()
            .filter(|p| !left_is_single_non_terminal(p))
            .map(|p| {
                format!(
                    "Rule '{}': not Type 2, the left side is not a single non-terminal.",
                    p
                )
            })
            .collect();
        Check::from_violations(violations)
    }

    /// Type 1: `|alpha| <= |beta|`, except `S -> ε` for the start symbol,
    /// which then must not appear on any right side.
    pub fn check_context_sensitive(&self) -> Check {
        let start = self.start_symbol();
        let mut violations = Vec::new();
        let mut start_to_epsilon = false;

        for p in &self.productions {
            if p.beta.is_empty() {
                if p.alpha.len() == 1 && Some(&p.alpha[0]) == start {
                    start_to_epsilon = true;
                } else {
                    violations.push(format!(
                        "Rule '{}': not Type 1, only the start symbol may derive ε.",
                        p
                    ));
                }
                continue;
            }
            if p.alpha.len() > p.beta.len() {
                violations.push(format!(
                    "Rule '{}': not Type 1, it shortens the string (|alpha| > |beta|).",
                    p
                ));
            }
        }

        if let (true, Some(start)) = (start_to_epsilon, start) {
            for p in &self.productions {
                if p.beta.contains(start) {
                    violations.push(format!(
                        "Rule '{}': not Type 1, {} -> ε exists but {} appears on a right side.",
                        p, start, start
                    ));
                }
            }
        }

        Check::from_violations(violations)
    }

    /// Picks the most restrictive type that holds.
    pub fn classify(&self) -> Classification {
        let regular = self.check_regular();
        let context_free = self.check_context_free();
        let context_sensitive = self.check_context_sensitive();

        let (grammar_type, justification) = if regular.holds {
            (ChomskyType::Regular, regular.violations)
        } else if context_free.holds {
            (ChomskyType::ContextFree, regular.violations)
        } else if context_sensitive.holds {
            (ChomskyType::ContextSensitive, context_free.violations)
        } else {
            (ChomskyType::Unrestricted, context_sensitive.violations)
        };
        log::debug!(
            "classified grammar as {} ({} violations)",
            grammar_type.label(),
            justification.len()
        );

        Classification {
            grammar_type: grammar_type.number(),
            label: grammar_type.label(),
            justification,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::grammar::grammar::Symbol;

    fn classify(text: &str) -> Classification {
        Grammar::parse(text).unwrap().classify()
    }

    #[test]
    fn regular_grammar() {
        let c = classify("S -> a A | b\nA -> a S | c | epsilon");
        assert_eq!(c.grammar_type, 3);
        assert_eq!(c.label, "Type 3 (Regular)");
        assert!(c.justification.is_empty());
    }

    #[test]
    fn context_free_cites_regular_violations() {
        let c = classify("S -> a S b | a b");
        assert_eq!(c.grammar_type, 2);
        assert_eq!(
            c.justification,
            vec![
                "Rule 'S -> a S b': not Type 3, the right side is not 'a', 'a B' or ε.",
                "Rule 'S -> a b': not Type 3, the right side is not 'a', 'a B' or ε.",
            ]
        );
    }

    #[test]
    fn context_sensitive_cites_context_free_violations() {
        let c = classify("S A -> A S\nS -> a S | a\nA -> b A | b");
        assert_eq!(c.chomsky_type(), ChomskyType::ContextSensitive);
        assert_eq!(
            c.justification,
            vec!["Rule 'S A -> A S': not Type 2, the left side is not a single non-terminal."]
        );
    }

    #[test]
    fn unrestricted_cites_context_sensitive_violations() {
        let c = classify("S A -> S\nS -> a S | a A\nA -> b A | b");
        assert_eq!(c.grammar_type, 0);
        assert_eq!(
            c.justification,
            vec!["Rule 'S A -> S': not Type 1, it shortens the string (|alpha| > |beta|)."]
        );
    }

    #[test]
    fn start_epsilon_exception() {
        let ok = Grammar::parse("S -> a B | epsilon\nB -> b").unwrap();
        assert!(ok.check_context_sensitive().holds);

        let recursive = Grammar::parse("S -> a S | epsilon").unwrap();
        let check = recursive.check_context_sensitive();
        assert!(!check.holds);
        assert_eq!(check.violations.len(), 1);

        let other = Grammar::parse("S -> a B\nB -> epsilon").unwrap();
        assert!(!other.check_context_sensitive().holds);
    }

    #[test]
    fn terminal_left_side_is_not_context_free() {
        let c = classify("a -> b");
        assert!(!Grammar::parse("a -> b").unwrap().check_context_free().holds);
        assert_eq!(c.grammar_type, 1);
    }

    #[test]
    fn empty_grammar_is_regular() {
        assert_eq!(Grammar::default().classify().grammar_type, 3);
    }

    fn arb_symbol() -> impl Strategy<Value = Symbol> {
        prop_oneof![
            prop::sample::select(vec!["a", "b"]).prop_map(Symbol::terminal),
            prop::sample::select(vec!["S", "A"]).prop_map(Symbol::non_terminal),
        ]
    }

    fn arb_grammar() -> impl Strategy<Value = Grammar> {
        prop::collection::vec(
            (
                prop::collection::vec(arb_symbol(), 1..3),
                prop::collection::vec(arb_symbol(), 0..4),
            )
                .prop_map(|(alpha, beta)| Production::new(alpha, beta)),
            0..6,
        )
        .prop_map(Grammar::new)
    }

    proptest! {
        #[test]
        fn classification_picks_most_restrictive_holding_type(g in arb_grammar()) {
            let c = g.classify();
            prop_assert!(c.grammar_type <= 3);
            let holds = [
                true,
                g.check_context_sensitive().holds,
                g.check_context_free().holds,
                g.check_regular().holds,
            ];
            prop_assert!(holds[c.grammar_type as usize]);
            for stricter in (c.grammar_type as usize + 1)..4 {
                prop_assert!(!holds[stricter]);
            }
        }
    }
}
