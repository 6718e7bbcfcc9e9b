use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::{grammar::Symbol, Grammar};

pub const DEFAULT_MAX_LEN: usize = 5;
const EXAMPLE_LIMIT: usize = 5;

#[derive(Debug, Clone)]
enum CacheEntry {
    InProgress,
    Computed(BTreeSet<String>),
}

/// Enumerates the strings of length `<= max_len` a grammar derives.
///
/// Results are memoized per non-terminal name only, whatever the length
/// already consumed at the call site, and a non-terminal reached again
/// while it is still being expanded contributes nothing. For recursive
/// grammars the set is therefore an approximation that may depend on the
/// order in which non-terminals are first reached.
pub struct LanguageGenerator {
    max_len: usize,
    start: Option<Symbol>,
    rules: HashMap<String, Vec<Vec<Symbol>>>,
}

impl LanguageGenerator {
    /// Only productions with a single non-terminal on the left are used.
    /// Derivation starts from a non-terminal named after the start symbol,
    /// even when the first left side reads as a terminal.
    pub fn new(grammar: &Grammar, max_len: usize) -> Self {
        let mut rules: HashMap<String, Vec<Vec<Symbol>>> = HashMap::new();
        for p in &grammar.productions {
            if let Some(left) = p.single_left() {
                rules
                    .entry(left.value.clone())
                    .or_default()
                    .push(p.beta.clone());
            }
        }
        Self {
            max_len,
            start: grammar
                .start_symbol()
                .map(|s| Symbol::non_terminal(s.value.clone())),
            rules,
        }
    }

    pub fn generate(&self) -> BTreeSet<String> {
        let Some(start) = &self.start else {
            return BTreeSet::new();
        };
        let mut cache: HashMap<String, CacheEntry> = HashMap::new();
        let strings = self.generate_sequence(std::slice::from_ref(start), &mut cache, 0);
        log::debug!(
            "generated {} strings up to length {} ({} non-terminals memoized)",
            strings.len(),
            self.max_len,
            cache.len()
        );
        strings
    }

    fn generate_sequence(
        &self,
        sequence: &[Symbol],
        cache: &mut HashMap<String, CacheEntry>,
        consumed: usize,
    ) -> BTreeSet<String> {
        if consumed > self.max_len {
            return BTreeSet::new();
        }
        let Some((head, rest)) = sequence.split_first() else {
            return BTreeSet::from([String::new()]);
        };

        if head.is_terminal() {
            let head_len = head.value.chars().count();
            return self
                .generate_sequence(rest, cache, consumed + head_len)
                .into_iter()
                .map(|tail| format!("{}{}", head.value, tail))
                .filter(|s| s.chars().count() <= self.max_len)
                .collect();
        }

        let heads = self.generate_non_terminal(&head.value, cache, consumed);
        let tails = self.generate_sequence(rest, cache, consumed);

        let mut result = BTreeSet::new();
        for h in &heads {
            for t in &tails {
                if h.chars().count() + t.chars().count() <= self.max_len {
                    result.insert(format!("{}{}", h, t));
                }
            }
        }
        result
    }

    fn generate_non_terminal(
        &self,
        name: &str,
        cache: &mut HashMap<String, CacheEntry>,
        consumed: usize,
    ) -> BTreeSet<String> {
        match cache.get(name) {
            Some(CacheEntry::Computed(strings)) => return strings.clone(),
            Some(CacheEntry::InProgress) => return BTreeSet::new(),
            None => {}
        }

        cache.insert(name.to_string(), CacheEntry::InProgress);
        let mut strings = BTreeSet::new();
        if let Some(alternatives) = self.rules.get(name) {
            for beta in alternatives {
                strings.extend(self.generate_sequence(beta, cache, consumed));
            }
        }
        cache.insert(name.to_string(), CacheEntry::Computed(strings.clone()));
        strings
    }
}

/// Bounded comparison of two grammars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub equivalent: bool,
    pub max_len: usize,
    pub left_count: usize,
    pub right_count: usize,
    pub only_in_left: Vec<String>,
    pub only_in_right: Vec<String>,
}

impl Comparison {
    pub fn message(&self) -> String {
        if self.equivalent {
            format!(
                "HEURISTIC: possibly equivalent.\nBoth grammars generate the same {} strings (up to length {}).",
                self.left_count, self.max_len
            )
        } else {
            format!(
                "HEURISTIC: not equivalent (n = {}).\nOnly in grammar 1: {:?}\nOnly in grammar 2: {:?}",
                self.max_len, self.only_in_left, self.only_in_right
            )
        }
    }
}

pub fn compare(left: &Grammar, right: &Grammar, max_len: usize) -> Comparison {
    let left_strings = LanguageGenerator::new(left, max_len).generate();
    let right_strings = LanguageGenerator::new(right, max_len).generate();

    Comparison {
        equivalent: left_strings == right_strings,
        max_len,
        left_count: left_strings.len(),
        right_count: right_strings.len(),
        only_in_left: left_strings
            .difference(&right_strings)
            .take(EXAMPLE_LIMIT)
            .cloned()
            .collect(),
        only_in_right: right_strings
            .difference(&left_strings)
            .take(EXAMPLE_LIMIT)
            .cloned()
            .collect(),
    }
}
