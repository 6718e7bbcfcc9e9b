use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::error::ConversionError;

use super::{nfa::Nfa, StateId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DfaState {
    pub id: StateId,
    pub fin: bool,
    pub transitions: BTreeMap<String, StateId>,
}

/// A partial deterministic automaton: missing transitions reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    start_state: StateId,
    states: Vec<DfaState>,
}

impl Dfa {
    pub fn builder() -> DfaBuilder {
        DfaBuilder::default()
    }

    /// Subset construction. DFA states are numbered in discovery order,
    /// exploring symbols in sorted order, so the start state is `0`.
    pub fn from_nfa(nfa: &Nfa) -> Self {
        let alphabet = nfa.alphabet();
        let mut builder = Dfa::builder();
        let mut ids: HashMap<Vec<StateId>, StateId> = HashMap::new();
        let mut queue: VecDeque<BTreeSet<StateId>> = VecDeque::new();

        let start = nfa.eps_closure(&BTreeSet::from([nfa.start_state()]));
        let start_id = builder.add_state(nfa.is_accepting(&start));
        ids.insert(start.iter().cloned().collect(), start_id);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            let current_id = ids[&current.iter().cloned().collect::<Vec<_>>()];
            for symbol in &alphabet {
                let image = nfa.step(&current, symbol);
                if image.is_empty() {
                    continue;
                }
                let next = nfa.eps_closure(&image);
                let key: Vec<StateId> = next.iter().cloned().collect();
                let next_id = match ids.get(&key) {
                    Some(&id) => id,
                    None => {
                        let id = builder.add_state(nfa.is_accepting(&next));
                        ids.insert(key, id);
                        queue.push_back(next);
                        id
                    }
                };
                builder.insert_transition(current_id, symbol, next_id);
            }
        }

        log::debug!(
            "subset construction: {} NFA states -> {} DFA states",
            nfa.states().len(),
            ids.len()
        );
        builder.build(start_id)
    }

    pub fn start_state(&self) -> StateId {
        self.start_state
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn final_state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.iter().filter(|s| s.fin).map(|s| s.id)
    }

    pub fn transition(&self, state: StateId, symbol: &str) -> Option<StateId> {
        self.states.get(state)?.transitions.get(symbol).cloned()
    }

    /// `(source, symbol, destination)` in state then symbol order.
    pub fn transition_triples(&self) -> impl Iterator<Item = (StateId, &str, StateId)> + '_ {
        self.states.iter().flat_map(|s| {
            s.transitions
                .iter()
                .map(move |(symbol, &dest)| (s.id, symbol.as_str(), dest))
        })
    }

    pub fn alphabet(&self) -> BTreeSet<String> {
        self.states
            .iter()
            .flat_map(|s| s.transitions.keys().cloned())
            .collect()
    }

    /// Runs the automaton on `word`, one character per symbol.
    pub fn accepts(&self, word: &str) -> bool {
        let mut state = self.start_state;
        let mut buf = [0u8; 4];
        for c in word.chars() {
            match self.transition(state, c.encode_utf8(&mut buf)) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.states.get(state).map_or(false, |s| s.fin)
    }
}

#[derive(Debug, Default)]
pub struct DfaBuilder {
    states: Vec<DfaState>,
}

impl DfaBuilder {
    pub fn add_state(&mut self, fin: bool) -> StateId {
        let id = self.states.len();
        self.states.push(DfaState {
            id,
            fin,
            transitions: BTreeMap::new(),
        });
        id
    }

    /// Fails when `start` already moves elsewhere on `symbol`.
    pub fn add_transition(
        &mut self,
        start: StateId,
        symbol: &str,
        end: StateId,
    ) -> Result<(), ConversionError> {
        match self.states[start].transitions.get(symbol) {
            Some(&existing) if existing != end => Err(ConversionError::NonDeterministic {
                state: start,
                symbol: symbol.to_string(),
            }),
            _ => {
                self.insert_transition(start, symbol, end);
                Ok(())
            }
        }
    }

    fn insert_transition(&mut self, start: StateId, symbol: &str, end: StateId) {
        self.states[start]
            .transitions
            .insert(symbol.to_string(), end);
    }

    pub fn build(self, start_state: StateId) -> Dfa {
        Dfa {
            start_state,
            states: self.states,
        }
    }
}

impl Nfa {
    pub fn to_dfa(&self) -> Dfa {
        Dfa::from_nfa(self)
    }
}
