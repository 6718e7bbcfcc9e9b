use std::collections::HashMap;

use serde::Serialize;

use crate::error::GrammarError;

use super::{
    first_follow::{Ll1Grammar, RuleMap, EPSILON_INDEX},
    Grammar,
};

/// A table cell holding more than one alternative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub non_terminal: String,
    pub terminal: String,
    pub alternatives: Vec<Vec<String>>,
}

/// Predictive table built from FIRST/FOLLOW.
///
/// A cell keeps every applicable alternative in textual order; more than
/// one entry is a conflict and the parser prefers the first.
#[derive(Debug, Clone)]
pub struct Ll1Table {
    pub grammar: Ll1Grammar,
    cells: HashMap<(usize, usize), Vec<usize>>,
    conflicts: Vec<Conflict>,
}

impl Ll1Table {
    pub fn build(rules: &RuleMap, start: &str) -> Self {
        let grammar = Ll1Grammar::new(rules, start);
        let mut cells: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        let mut conflict_cells: Vec<(usize, usize)> = Vec::new();

        for nt in grammar.non_terminal_iter() {
            for (alt, production) in nt.productions.iter().enumerate() {
                let first = grammar.first_of_sequence(production);
                let mut lookaheads: Vec<usize> = first
                    .iter()
                    .filter(|&&t| t != EPSILON_INDEX)
                    .cloned()
                    .collect();
                if first.contains(&EPSILON_INDEX) {
                    lookaheads.extend(nt.follow.iter().cloned());
                }

                for terminal in lookaheads {
                    let cell = cells.entry((nt.index, terminal)).or_default();
                    if cell.contains(&alt) {
                        continue;
                    }
                    cell.push(alt);
                    if cell.len() == 2 {
                        conflict_cells.push((nt.index, terminal));
                    }
                }
            }
        }

        let conflicts: Vec<Conflict> = conflict_cells
            .iter()
            .map(|&(nt, terminal)| Conflict {
                non_terminal: grammar.get_symbol_name(nt).to_string(),
                terminal: grammar.get_symbol_name(terminal).to_string(),
                alternatives: cells[&(nt, terminal)]
                    .iter()
                    .map(|&alt| alternative_names(&grammar, nt, alt))
                    .collect(),
            })
            .collect();
        if !conflicts.is_empty() {
            log::debug!("LL(1) table has {} conflicting cells", conflicts.len());
        }

        Self {
            grammar,
            cells,
            conflicts,
        }
    }

    /// Table for the context-free productions of `grammar`, started from
    /// its start symbol.
    pub fn from_grammar(grammar: &Grammar) -> Result<Self, GrammarError> {
        let start = grammar.start_symbol().ok_or(GrammarError::Empty)?;
        Ok(Self::build(&grammar.to_rule_map(), &start.value))
    }

    pub fn start_symbol(&self) -> &str {
        self.grammar.get_symbol_name(self.grammar.start_symbol)
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn is_ll1(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn non_terminals(&self) -> Vec<&str> {
        self.grammar
            .non_terminal_iter()
            .map(|nt| nt.name.as_str())
            .collect()
    }

    /// Terminal names in order of first appearance, end marker last.
    pub fn terminals(&self) -> Vec<&str> {
        let mut terminals: Vec<usize> = self.grammar.terminal_indices().collect();
        terminals.rotate_left(1);
        terminals
            .into_iter()
            .map(|t| self.grammar.get_symbol_name(t))
            .collect()
    }

    /// Sorted FIRST set of a symbol, `None` for an unknown name.
    pub fn first(&self, symbol: &str) -> Option<Vec<&str>> {
        let idx = self.grammar.get_symbol_index(symbol)?;
        Some(self.sorted_names(self.grammar.first_of_symbol(idx)))
    }

    /// Sorted FOLLOW set of a non-terminal.
    pub fn follow(&self, non_terminal: &str) -> Option<Vec<&str>> {
        let idx = self.grammar.get_symbol_index(non_terminal)?;
        let nt = self.grammar.symbols[idx].non_terminal()?;
        Some(self.sorted_names(nt.follow.iter().cloned()))
    }

    /// FIRST of a sequence of symbol names; unknown names count as terminals.
    pub fn first_of(&self, sequence: &[&str]) -> Vec<String> {
        let mut first: Vec<String> = Vec::new();
        for name in sequence {
            let symbol_first: Vec<String> = match self.first(name) {
                Some(f) => f.into_iter().map(|s| s.to_string()).collect(),
                None => vec![name.to_string()],
            };
            let nullable = symbol_first.iter().any(|s| s == super::EPSILON);
            first.extend(symbol_first.into_iter().filter(|s| s != super::EPSILON));
            if !nullable {
                first.sort();
                first.dedup();
                return first;
            }
        }
        first.push(super::EPSILON.to_string());
        first.sort();
        first.dedup();
        first
    }

    /// Alternatives applicable at `(non_terminal, terminal)`, in table order.
    pub fn cell(&self, non_terminal: &str, terminal: &str) -> Vec<Vec<String>> {
        match (
            self.grammar.get_symbol_index(non_terminal),
            self.grammar.get_symbol_index(terminal),
        ) {
            (Some(nt), Some(t)) => self
                .cell_indices(nt, t)
                .iter()
                .map(|&alt| alternative_names(&self.grammar, nt, alt))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn cell_indices(&self, non_terminal: usize, terminal: usize) -> &[usize] {
        self.cells
            .get(&(non_terminal, terminal))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Sorted names of the terminals with a non-empty cell in the row.
    pub fn expected(&self, non_terminal: usize) -> Vec<String> {
        let mut expected: Vec<String> = self
            .cells
            .iter()
            .filter(|((nt, _), alts)| *nt == non_terminal && !alts.is_empty())
            .map(|((_, t), _)| self.grammar.get_symbol_name(*t).to_string())
            .collect();
        expected.sort();
        expected
    }

    fn sorted_names(&self, set: impl IntoIterator<Item = usize>) -> Vec<&str> {
        let mut names: Vec<&str> = set
            .into_iter()
            .map(|i| self.grammar.get_symbol_name(i))
            .collect();
        names.sort();
        names
    }
}

fn alternative_names(grammar: &Ll1Grammar, nt: usize, alt: usize) -> Vec<String> {
    grammar.symbols[nt]
        .non_terminal()
        .map(|nt| {
            nt.productions[alt]
                .iter()
                .map(|&s| grammar.get_symbol_name(s).to_string())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn table(text: &str) -> Ll1Table {
        Ll1Table::from_grammar(&Grammar::parse(text).unwrap()).unwrap()
    }

    #[test]
    fn first_follow_of_simple_grammar() {
        let t = table("S -> a A\nA -> b");
        assert_eq!(t.first("S"), Some(vec!["a"]));
        assert_eq!(t.first("A"), Some(vec!["b"]));
        assert_eq!(t.follow("A"), Some(vec!["$"]));
        assert_eq!(t.follow("S"), Some(vec!["$"]));
        assert!(t.is_ll1());
        assert_eq!(t.cell("S", "a"), vec![vec!["a", "A"]]);
        assert_eq!(t.cell("A", "b"), vec![vec!["b"]]);
        assert!(t.cell("S", "b").is_empty());
    }

    #[test]
    fn common_prefix_conflict() {
        let t = table("S -> a | a b");
        assert_eq!(
            t.conflicts(),
            &[Conflict {
                non_terminal: "S".to_string(),
                terminal: "a".to_string(),
                alternatives: vec![vec!["a".to_string()], vec!["a".to_string(), "b".to_string()]],
            }]
        );
        assert_eq!(t.cell("S", "a")[0], vec!["a"]);
    }

    #[test]
    fn conflict_is_recorded_once_per_cell() {
        let t = table("S -> a | a b | a c");
        assert_eq!(t.conflicts().len(), 1);
        assert_eq!(t.conflicts()[0].alternatives.len(), 3);
    }

    #[test]
    fn epsilon_alternative_goes_to_follow_columns() {
        let t = table("S -> A b\nA -> a | epsilon");
        assert!(t.is_ll1());
        assert_eq!(t.cell("A", "b"), vec![Vec::<String>::new()]);
        assert_eq!(t.cell("A", "a"), vec![vec!["a"]]);
        assert_eq!(t.first_of(&["A", "b"]), vec!["a", "b"]);
        assert_eq!(t.first_of(&["A"]), vec!["a", "ε"]);
        assert_eq!(t.first_of(&[]), vec!["ε"]);
    }

    #[test]
    fn terminals_end_with_end_marker() {
        let t = table("S -> a S b | c");
        assert_eq!(t.terminals(), vec!["a", "b", "c", "$"]);
        assert_eq!(t.non_terminals(), vec!["S"]);
    }
}
