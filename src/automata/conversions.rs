//! Conversions between automata, regular grammars and regular expressions.
//! Each one builds a fresh value and leaves its input untouched.

use indexmap::IndexMap;

use crate::{
    error::ConversionError,
    grammar::{Grammar, Production, Symbol},
};

use super::{
    dfa::Dfa,
    nfa::{Input, Nfa},
    regex::Regex,
    StateId,
};

fn state_symbol(id: StateId) -> Symbol {
    Symbol::non_terminal(format!("Q{}", id))
}

impl Dfa {
    /// `Qi -> a Qj` per transition and `Qf -> ε` per accepting state. The
    /// start state's productions come first so `Q<start>` is the start
    /// symbol.
    pub fn to_regular_grammar(&self) -> Grammar {
        let order = std::iter::once(self.start_state())
            .chain((0..self.states().len()).filter(|&id| id != self.start_state()));

        let mut productions = Vec::new();
        for id in order {
            let state = &self.states()[id];
            for (symbol, &dest) in &state.transitions {
                productions.push(Production::new(
                    vec![state_symbol(id)],
                    vec![Symbol::terminal(symbol.as_str()), state_symbol(dest)],
                ));
            }
            if state.fin {
                productions.push(Production::new(vec![state_symbol(id)], Vec::new()));
            }
        }
        Grammar::new(productions)
    }

    /// State elimination over a matrix with one extra super-final state.
    /// Returns `∅` when no accepting state is reachable.
    ///
    /// Each transition label stays one `Regex::Symbol`, but `Display` prints
    /// symbols bare. A DFA over multi-character terminals such as `id`
    /// therefore prints text that [`compile`](super::compile) reads as
    /// separate characters, and labels outside `[a-z0-9]` do not recompile
    /// at all.
    pub fn to_regex(&self) -> Regex {
        let n = self.states().len();
        let fin = n;
        let mut r: Vec<Vec<Regex>> = vec![vec![Regex::Empty; n + 1]; n + 1];

        for (from, symbol, to) in self.transition_triples() {
            r[from][to] = r[from][to].clone().union(Regex::symbol(symbol));
        }
        for (i, row) in r.iter_mut().enumerate() {
            row[i] = row[i].clone().union(Regex::Epsilon);
        }
        for id in self.final_state_ids() {
            r[id][fin] = r[id][fin].clone().union(Regex::Epsilon);
        }

        for k in 0..n {
            let loop_k = r[k][k].clone().star();
            let previous = r.clone();
            for (i, row) in r.iter_mut().enumerate() {
                if previous[i][k].is_empty() {
                    continue;
                }
                for (j, cell) in row.iter_mut().enumerate() {
                    if previous[k][j].is_empty() {
                        continue;
                    }
                    let through_k = previous[i][k]
                        .clone()
                        .concat(loop_k.clone())
                        .concat(previous[k][j].clone());
                    *cell = previous[i][j].clone().union(through_k);
                }
            }
            log::trace!("eliminated state {}", k);
        }

        r[self.start_state()][fin].clone()
    }
}

impl Nfa {
    /// One state per non-terminal plus a shared final state. Every
    /// production must be `A -> a B`, `A -> a` or `A -> ε`.
    pub fn from_regular_grammar(grammar: &Grammar) -> Result<Nfa, ConversionError> {
        let start = grammar.start_symbol().ok_or(ConversionError::EmptyGrammar)?;

        let mut builder = Nfa::builder();
        let mut states: IndexMap<&str, StateId> = IndexMap::new();
        states.insert(start.value.as_str(), builder.add_state());
        let fin = builder.add_state();
        builder.set_final(fin);

        for p in &grammar.productions {
            let not_regular = || ConversionError::NotRegular {
                production: p.to_string(),
            };
            let left = p.single_left().ok_or_else(not_regular)?;
            let from = *states
                .entry(left.value.as_str())
                .or_insert_with(|| builder.add_state());

            match p.beta.as_slice() {
                [] => builder.add_transition(from, fin, Input::Eps),
                [a] if a.is_terminal() => {
                    builder.add_transition(from, fin, Input::literal(a.value.as_str()))
                }
                [a, b] if a.is_terminal() && b.is_non_terminal() => {
                    let to = *states
                        .entry(b.value.as_str())
                        .or_insert_with(|| builder.add_state());
                    builder.add_transition(from, to, Input::literal(a.value.as_str()));
                }
                _ => return Err(not_regular()),
            }
        }

        Ok(builder.build(states[0]))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        automata::regex::compile,
        grammar::equivalence::LanguageGenerator,
    };

    fn language(g: &Grammar, n: usize) -> BTreeSet<String> {
        LanguageGenerator::new(g, n).generate()
    }

    #[test]
    fn dfa_to_grammar() {
        let dfa = compile("ab").unwrap().to_dfa();
        assert_eq!(
            dfa.to_regular_grammar().to_text(),
            "Q0 -> a Q1\nQ1 -> b Q2\nQ2 -> epsilon"
        );
        assert_eq!(dfa.to_regular_grammar().classify().grammar_type, 3);
    }

    #[test]
    fn grammar_to_nfa() {
        let g = Grammar::parse("S -> a A | b\nA -> a S | c | epsilon").unwrap();
        let nfa = Nfa::from_regular_grammar(&g).unwrap();
        assert_eq!(nfa.states().len(), 3);
        for word in ["b", "a", "ac", "aab", "aaa"] {
            assert!(nfa.accepts(word), "{}", word);
        }
        for word in ["", "c", "ab"] {
            assert!(!nfa.accepts(word), "{}", word);
        }
    }

    #[test]
    fn grammar_to_nfa_rejects_other_shapes() {
        for text in ["S -> a S b", "S -> A", "S A -> a", "S -> A a"] {
            let g = Grammar::parse(text).unwrap();
            assert!(
                matches!(
                    Nfa::from_regular_grammar(&g),
                    Err(ConversionError::NotRegular { .. })
                ),
                "{}",
                text
            );
        }
        assert_eq!(
            Nfa::from_regular_grammar(&Grammar::default()),
            Err(ConversionError::EmptyGrammar)
        );
    }

    #[test]
    fn dfa_to_regex() {
        let regex = compile("a(b|c)*").unwrap().to_dfa().to_regex();
        let back = compile(&regex.to_string()).unwrap();
        for word in ["a", "ab", "acb", "abcc"] {
            assert!(back.accepts(word), "{} on {}", word, regex);
        }
        for word in ["", "b", "ba"] {
            assert!(!back.accepts(word), "{} on {}", word, regex);
        }
    }

    #[test]
    fn regex_of_empty_language() {
        let nfa = compile("a∅").unwrap();
        assert_eq!(nfa.to_dfa().to_regex(), Regex::Empty);
    }

    #[test]
    fn regex_of_single_symbol() {
        assert_eq!(compile("a").unwrap().to_dfa().to_regex().to_string(), "a");
    }

    #[test]
    fn multi_character_terminal_is_one_symbol() {
        let g = Grammar::parse("S -> id").unwrap();
        let regex = Nfa::from_regular_grammar(&g).unwrap().to_dfa().to_regex();
        assert_eq!(regex, Regex::symbol("id"));
        assert_eq!(regex.to_string(), "id");
        assert_eq!(compile(&regex.to_string()).unwrap().to_dfa().states().len(), 3);
    }

    #[test]
    fn round_trip_preserves_bounded_language() {
        let g = Grammar::parse("S -> a A | b\nA -> b | c").unwrap();
        let regex = Nfa::from_regular_grammar(&g).unwrap().to_dfa().to_regex();
        let back = compile(&regex.to_string())
            .unwrap()
            .to_dfa()
            .to_regular_grammar();
        assert_eq!(language(&back, 5), language(&g, 5));
        assert_eq!(
            language(&g, 5),
            BTreeSet::from(["ab".to_string(), "ac".to_string(), "b".to_string()])
        );
    }
}
