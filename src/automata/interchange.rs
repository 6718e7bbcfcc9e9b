//! The five-column transition table exchanged with external tools.
//!
//! `writes` and `moves` only exist for compatibility with a tape-machine
//! format; they are filled with fixed placeholders and ignored on import.

use std::collections::{BTreeMap, BTreeSet};

use crowbook_text_processing::escape;
use serde::{Deserialize, Serialize};

use crate::error::ConversionError;

use super::{dfa::Dfa, StateId};

pub const WRITE_PLACEHOLDER: &str = "ε";
pub const MOVE_RIGHT: i8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionTable {
    pub name: String,
    pub start_state: StateId,
    pub accept_states: BTreeSet<StateId>,
    pub alphabet: BTreeSet<String>,
    pub sources: Vec<StateId>,
    pub reads: Vec<String>,
    pub writes: Vec<String>,
    pub destinations: Vec<StateId>,
    pub moves: Vec<i8>,
}

impl TransitionTable {
    pub fn new(
        name: impl Into<String>,
        start_state: StateId,
        accept_states: impl IntoIterator<Item = StateId>,
        transitions: &[(StateId, &str, StateId)],
    ) -> Self {
        Self {
            name: name.into(),
            start_state,
            accept_states: accept_states.into_iter().collect(),
            alphabet: transitions.iter().map(|(_, s, _)| s.to_string()).collect(),
            sources: transitions.iter().map(|(from, _, _)| *from).collect(),
            reads: transitions.iter().map(|(_, s, _)| s.to_string()).collect(),
            writes: vec![WRITE_PLACEHOLDER.to_string(); transitions.len()],
            destinations: transitions.iter().map(|(_, _, to)| *to).collect(),
            moves: vec![MOVE_RIGHT; transitions.len()],
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> String {
        crate::grammar::pretty_print::to_json(self)
    }

    fn transitions(&self) -> impl Iterator<Item = (StateId, &str, StateId)> + '_ {
        self.sources
            .iter()
            .zip(&self.reads)
            .zip(&self.destinations)
            .map(|((&from, read), &to)| (from, read.as_str(), to))
    }

    fn accept_list(&self) -> String {
        self.accept_states
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn to_plaintext(&self) -> String {
        let header = format!(
            "{}\nstart: {}\naccept: {{{}}}",
            self.name,
            self.start_state,
            self.accept_list()
        );
        std::iter::once(header)
            .chain(
                self.transitions()
                    .map(|(from, read, to)| format!("{} --{}--> {}", from, read, to)),
            )
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let rows = self
            .transitions()
            .map(|(from, read, to)| format!("{} & {} & {}", from, escape::tex(read), to))
            .collect::<Vec<_>>()
            .join(" \\\\\n");
        format!(
            "\\textbf{{{}}}: start ${}$, accept $\\{{{}\\}}$\n\\begin{{tabular}}{{c|c|c}}\nState & Read & Next \\\\\\hline\n{}\n\\end{{tabular}}",
            escape::tex(self.name.as_str()),
            self.start_state,
            self.accept_list(),
            rows
        )
    }

    /// Graphviz source; rendering it to an image is left to `dot`.
    pub fn to_dot(&self) -> String {
        let mut states: BTreeSet<StateId> = self.sources.iter().cloned().collect();
        states.extend(self.destinations.iter().cloned());
        states.insert(self.start_state);

        let nodes = states
            .iter()
            .map(|id| {
                let shape = if self.accept_states.contains(id) {
                    "doublecircle"
                } else {
                    "circle"
                };
                format!("\t{} [shape = {}];", id, shape)
            })
            .collect::<Vec<_>>()
            .join("\n");
        let edges = self
            .transitions()
            .map(|(from, read, to)| format!("\t{} -> {} [label = \"{}\"];", from, to, read))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "digraph \"{}\" {{\n\trankdir = LR;\n\tstart [shape = point];\n{}\n\tstart -> {};\n{}\n}}",
            self.name.replace('"', "\\\""),
            nodes,
            self.start_state,
            edges
        )
    }
}

impl Dfa {
    pub fn to_table(&self, name: &str) -> TransitionTable {
        let transitions: Vec<(StateId, &str, StateId)> = self.transition_triples().collect();
        let mut table =
            TransitionTable::new(name, self.start_state(), self.final_state_ids(), &transitions);
        table.alphabet = self.alphabet();
        table
    }

    /// Rebuilds a DFA, rejecting ragged columns and a state with two
    /// destinations for one symbol. The distinct ids named by the table are
    /// renumbered `0..k` in ascending order, so ids need not be dense.
    pub fn from_table(table: &TransitionTable) -> Result<Dfa, ConversionError> {
        let len = table.sources.len();
        if [
            table.reads.len(),
            table.writes.len(),
            table.destinations.len(),
            table.moves.len(),
        ]
        .iter()
        .any(|&l| l != len)
        {
            return Err(ConversionError::RaggedTable);
        }

        let ids: BTreeSet<StateId> = table
            .sources
            .iter()
            .chain(&table.destinations)
            .chain(&table.accept_states)
            .chain(std::iter::once(&table.start_state))
            .cloned()
            .collect();
        let mut builder = Dfa::builder();
        let dense: BTreeMap<StateId, StateId> = ids
            .into_iter()
            .map(|id| (id, builder.add_state(table.accept_states.contains(&id))))
            .collect();

        for (from, read, to) in table.transitions() {
            builder
                .add_transition(dense[&from], read, dense[&to])
                .map_err(|e| match e {
                    ConversionError::NonDeterministic { symbol, .. } => {
                        ConversionError::NonDeterministic {
                            state: from,
                            symbol,
                        }
                    }
                    e => e,
                })?;
        }
        Ok(builder.build(dense[&table.start_state]))
    }
}

/// The two sample automata: `(ab)*` and `a(a|b)*b`.
pub fn samples() -> Vec<TransitionTable> {
    vec![
        TransitionTable::new("L1: (ab)*", 0, [0], &[(0, "a", 1), (1, "b", 0)]),
        TransitionTable::new(
            "L2: a(a|b)*b",
            0,
            [2],
            &[(0, "a", 1), (1, "a", 1), (1, "b", 2), (2, "a", 1), (2, "b", 2)],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn samples_load() {
        let tables = samples();
        let ab_star = Dfa::from_table(&tables[0]).unwrap();
        assert!(ab_star.accepts(""));
        assert!(ab_star.accepts("abab"));
        assert!(!ab_star.accepts("aba"));

        let l2 = Dfa::from_table(&tables[1]).unwrap();
        assert!(l2.accepts("ab"));
        assert!(l2.accepts("abab"));
        assert!(!l2.accepts("aba"));
        assert!(!l2.accepts("b"));
    }

    #[test]
    fn table_of_a_dfa() {
        let dfa = Dfa::from_table(&samples()[0]).unwrap();
        let table = dfa.to_table("copy");
        assert_eq!(table.sources, vec![0, 1]);
        assert_eq!(table.reads, vec!["a", "b"]);
        assert_eq!(table.destinations, vec![1, 0]);
        assert_eq!(table.writes, vec!["ε", "ε"]);
        assert_eq!(table.moves, vec![1, 1]);
        assert_eq!(Dfa::from_table(&table).unwrap(), dfa);
    }

    #[test]
    fn json_field_names() {
        let json = samples()[0].to_json();
        assert!(json.contains("\"start_state\":0"));
        assert!(json.contains("\"accept_states\":[0]"));
        assert_eq!(TransitionTable::from_json(&json).unwrap(), samples()[0]);
    }

    #[test]
    fn malformed_tables() {
        let mut ragged = samples()[0].clone();
        ragged.moves.pop();
        assert_eq!(Dfa::from_table(&ragged), Err(ConversionError::RaggedTable));

        let split = TransitionTable::new("split", 0, [1], &[(0, "a", 1), (0, "a", 0)]);
        assert_eq!(
            Dfa::from_table(&split),
            Err(ConversionError::NonDeterministic {
                state: 0,
                symbol: "a".to_string()
            })
        );
    }

    #[test]
    fn plaintext_listing() {
        assert_eq!(
            samples()[0].to_plaintext(),
            "L1: (ab)*\nstart: 0\naccept: {0}\n0 --a--> 1\n1 --b--> 0"
        );
    }

    #[test]
    fn dot_output() {
        let dot = samples()[1].to_dot();
        assert!(dot.starts_with("digraph \"L2: a(a|b)*b\" {"));
        assert!(dot.contains("\t2 [shape = doublecircle];"));
        assert!(dot.contains("\t1 -> 2 [label = \"b\"];"));
        assert!(dot.contains("\tstart -> 0;"));
    }

    #[test]
    fn sparse_ids_are_renumbered() {
        let huge = TransitionTable::from_json(
            r#"{"name":"far","start_state":4000000000,"accept_states":[],"alphabet":[],
                "sources":[],"reads":[],"writes":[],"destinations":[],"moves":[]}"#,
        )
        .unwrap();
        let dfa = Dfa::from_table(&huge).unwrap();
        assert_eq!(dfa.states().len(), 1);
        assert_eq!(dfa.start_state(), 0);
        assert!(!dfa.accepts(""));

        let sparse = TransitionTable::new("sparse", 10, [usize::MAX], &[(10, "a", usize::MAX)]);
        let dfa = Dfa::from_table(&sparse).unwrap();
        assert_eq!(dfa.states().len(), 2);
        assert!(dfa.accepts("a"));
        assert!(!dfa.accepts("aa"));
    }
}
