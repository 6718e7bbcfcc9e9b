use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;

use super::{END_MARK, EPSILON, EPSILON_WORD};

/// Non-terminal name to its ordered alternatives, each an ordered list of
/// symbol names. Every name that is not a key is a terminal.
pub type RuleMap = IndexMap<String, Vec<Vec<String>>>;

pub const EPSILON_INDEX: usize = 0;
pub const END_MARK_INDEX: usize = 1;

#[derive(Debug, Clone)]
pub struct NonTerminal {
    pub index: usize,
    pub name: String,
    pub first: BTreeSet<usize>,
    pub follow: BTreeSet<usize>,
    pub productions: Vec<Vec<usize>>,
}

impl NonTerminal {
    pub fn new(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            first: BTreeSet::new(),
            follow: BTreeSet::new(),
            productions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SymbolEntry {
    Epsilon,
    Terminal(String),
    NonTerminal(NonTerminal),
}

impl SymbolEntry {
    pub fn non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            SymbolEntry::NonTerminal(nt) => Some(nt),
            _ => None,
        }
    }

    pub fn mut_non_terminal(&mut self) -> Option<&mut NonTerminal> {
        match self {
            SymbolEntry::NonTerminal(nt) => Some(nt),
            _ => None,
        }
    }
}

/// A rule map interned into an index arena, carrying FIRST and FOLLOW.
///
/// Index 0 is the epsilon marker and index 1 the end marker `$`.
#[derive(Debug, Clone)]
pub struct Ll1Grammar {
    pub symbols: Vec<SymbolEntry>,
    pub symbol_table: HashMap<String, usize>,
    pub start_symbol: usize,
}

impl Ll1Grammar {
    pub fn new(rules: &RuleMap, start: &str) -> Self {
        let mut g = Self {
            symbols: vec![SymbolEntry::Epsilon, SymbolEntry::Terminal(END_MARK.to_string())],
            symbol_table: HashMap::new(),
            start_symbol: 0,
        };
        g.symbol_table.insert(EPSILON.to_string(), EPSILON_INDEX);
        g.symbol_table.insert(EPSILON_WORD.to_string(), EPSILON_INDEX);
        g.symbol_table.insert(END_MARK.to_string(), END_MARK_INDEX);

        for name in rules.keys() {
            g.add_non_terminal(name);
        }
        g.start_symbol = match g.get_symbol_index(start) {
            Some(idx) if g.is_non_terminal(idx) => idx,
            _ => g.add_non_terminal(start),
        };

        for (left, alternatives) in rules {
            let left = g.symbol_table[left.as_str()];
            for alternative in alternatives {
                let right: Vec<usize> = alternative
                    .iter()
                    .map(|s| match g.get_symbol_index(s) {
                        Some(idx) => idx,
                        None => g.add_terminal(s),
                    })
                    .collect();
                if let Some(nt) = g.symbols[left].mut_non_terminal() {
                    nt.productions.push(right);
                }
            }
        }

        g.calculate_first();
        g.calculate_follow();
        g
    }

    fn add_non_terminal(&mut self, name: &str) -> usize {
        let idx = self.symbols.len();
        self.symbols
            .push(SymbolEntry::NonTerminal(NonTerminal::new(idx, name.to_string())));
        self.symbol_table.insert(name.to_string(), idx);
        idx
    }

    fn add_terminal(&mut self, name: &str) -> usize {
        let idx = self.symbols.len();
        self.symbols.push(SymbolEntry::Terminal(name.to_string()));
        self.symbol_table.insert(name.to_string(), idx);
        idx
    }

    pub fn get_symbol_index(&self, name: &str) -> Option<usize> {
        self.symbol_table.get(name).cloned()
    }

    pub fn get_symbol_name(&self, index: usize) -> &str {
        match &self.symbols[index] {
            SymbolEntry::Epsilon => EPSILON,
            SymbolEntry::Terminal(name) => name.as_str(),
            SymbolEntry::NonTerminal(nt) => nt.name.as_str(),
        }
    }

    pub fn is_non_terminal(&self, index: usize) -> bool {
        matches!(self.symbols.get(index), Some(SymbolEntry::NonTerminal(_)))
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &NonTerminal> {
        self.symbols.iter().filter_map(|s| s.non_terminal())
    }

    /// Terminal indices, the end marker included.
    pub fn terminal_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s, SymbolEntry::Terminal(_)))
            .map(|(i, _)| i)
    }

    pub fn first_of_symbol(&self, index: usize) -> BTreeSet<usize> {
        match &self.symbols[index] {
            SymbolEntry::Epsilon => BTreeSet::from([EPSILON_INDEX]),
            SymbolEntry::Terminal(_) => BTreeSet::from([index]),
            SymbolEntry::NonTerminal(nt) => nt.first.clone(),
        }
    }

    /// FIRST of a symbol sequence; the empty sequence yields `{ε}`.
    pub fn first_of_sequence(&self, sequence: &[usize]) -> BTreeSet<usize> {
        let mut first = BTreeSet::new();
        for idx in sequence {
            let symbol_first = self.first_of_symbol(*idx);
            first.extend(symbol_first.iter().filter(|&&i| i != EPSILON_INDEX));
            if !symbol_first.contains(&EPSILON_INDEX) {
                return first;
            }
        }
        first.insert(EPSILON_INDEX);
        first
    }

    fn calculate_first(&mut self) {
        let mut changed = true;
        let mut rounds = 0;
        while changed {
            changed = false;
            rounds += 1;
            for i in 0..self.symbols.len() {
                let first: BTreeSet<usize> = match &self.symbols[i] {
                    SymbolEntry::NonTerminal(nt) => {
                        nt.productions
                            .iter()
                            .fold(nt.first.clone(), |mut first, production| {
                                first.extend(self.first_of_sequence(production));
                                first
                            })
                    }
                    _ => continue,
                };

                if let Some(nt) = self.symbols[i].mut_non_terminal() {
                    if nt.first.len() != first.len() {
                        changed = true;
                        nt.first = first;
                    }
                }
            }
        }
        log::trace!("FIRST reached a fixed point after {} rounds", rounds);
    }

    fn calculate_follow(&mut self) {
        let start = self.start_symbol;
        if let Some(nt) = self.symbols[start].mut_non_terminal() {
            nt.follow.insert(END_MARK_INDEX);
        }

        let mut changed = true;
        let mut rounds = 0;
        while changed {
            changed = false;
            rounds += 1;

            let mut additions: Vec<(usize, BTreeSet<usize>)> = Vec::new();
            for left in self.non_terminal_iter() {
                for production in &left.productions {
                    for (i, &b) in production.iter().enumerate() {
                        if !self.is_non_terminal(b) {
                            continue;
                        }
                        let rest_first = self.first_of_sequence(&production[i + 1..]);
                        let mut follow: BTreeSet<usize> = rest_first
                            .iter()
                            .filter(|&&s| s != EPSILON_INDEX)
                            .cloned()
                            .collect();
                        if rest_first.contains(&EPSILON_INDEX) {
                            follow.extend(left.follow.iter().cloned());
                        }
                        additions.push((b, follow));
                    }
                }
            }

            for (b, follow) in additions {
                if let Some(nt) = self.symbols[b].mut_non_terminal() {
                    let before = nt.follow.len();
                    nt.follow.extend(follow);
                    if nt.follow.len() != before {
                        changed = true;
                    }
                }
            }
        }
        log::trace!("FOLLOW reached a fixed point after {} rounds", rounds);
    }
}
