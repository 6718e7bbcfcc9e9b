use std::collections::{BTreeMap, BTreeSet};

use super::StateId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Input {
    /// Taken without consuming input.
    Eps,
    Literal(String),
}

impl Input {
    pub fn literal(symbol: impl Into<String>) -> Self {
        Input::Literal(symbol.into())
    }

    pub fn label(&self) -> &str {
        match self {
            Input::Eps => crate::grammar::EPSILON,
            Input::Literal(symbol) => symbol,
        }
    }
}

type Transitions = BTreeMap<Input, BTreeSet<StateId>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub id: StateId,
    pub fin: bool,
    pub transitions: Transitions,
}

impl State {
    fn with_id(id: StateId) -> Self {
        Self {
            id,
            fin: false,
            transitions: Transitions::new(),
        }
    }

    /// `(source, destination, input)` for every edge leaving this state.
    pub fn transition_tuples(&self) -> impl Iterator<Item = (StateId, StateId, &Input)> + '_ {
        self.transitions.iter().flat_map(move |(input, destinations)| {
            destinations.iter().map(move |&dest| (self.id, dest, input))
        })
    }
}

/// A non-deterministic automaton whose states live in one arena, so a
/// `StateId` is also an index into [`Nfa::states`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    start_state: StateId,
    states: Vec<State>,
}

impl Nfa {
    pub fn builder() -> NfaBuilder {
        NfaBuilder::default()
    }

    pub fn start_state(&self) -> StateId {
        self.start_state
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn get_state(&self, id: StateId) -> Option<&State> {
        self.states.get(id)
    }

    pub fn final_state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.iter().filter(|s| s.fin).map(|s| s.id)
    }

    /// Every non-epsilon input label, sorted.
    pub fn alphabet(&self) -> BTreeSet<String> {
        self.states
            .iter()
            .flat_map(|s| s.transitions.keys())
            .filter_map(|input| match input {
                Input::Literal(symbol) => Some(symbol.clone()),
                Input::Eps => None,
            })
            .collect()
    }

    /// States reachable from `states` through epsilon edges only,
    /// `states` included.
    pub fn eps_closure(&self, states: &BTreeSet<StateId>) -> BTreeSet<StateId> {
        let mut closure = states.clone();
        let mut stack: Vec<StateId> = states.iter().cloned().collect();

        while let Some(id) = stack.pop() {
            let Some(state) = self.get_state(id) else {
                continue;
            };
            if let Some(next) = state.transitions.get(&Input::Eps) {
                for &n in next {
                    if closure.insert(n) {
                        stack.push(n);
                    }
                }
            }
        }
        closure
    }

    /// Destinations of `symbol` edges leaving any of `states`, without
    /// closing over epsilon.
    pub fn step(&self, states: &BTreeSet<StateId>, symbol: &str) -> BTreeSet<StateId> {
        let input = Input::literal(symbol);
        states
            .iter()
            .filter_map(|&id| self.get_state(id))
            .filter_map(|state| state.transitions.get(&input))
            .flatten()
            .cloned()
            .collect()
    }

    pub fn is_accepting(&self, states: &BTreeSet<StateId>) -> bool {
        states
            .iter()
            .any(|&id| self.get_state(id).map_or(false, |s| s.fin))
    }

    /// Runs the automaton on `word`, one character per symbol.
    pub fn accepts(&self, word: &str) -> bool {
        let mut current = self.eps_closure(&BTreeSet::from([self.start_state]));
        let mut buf = [0u8; 4];
        for c in word.chars() {
            let next = self.step(&current, c.encode_utf8(&mut buf));
            if next.is_empty() {
                return false;
            }
            current = self.eps_closure(&next);
        }
        self.is_accepting(&current)
    }

    /// Graphviz source for the automaton.
    pub fn to_dot(&self) -> String {
        let finals = self
            .final_state_ids()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let edges = self
            .states
            .iter()
            .flat_map(|s| s.transition_tuples())
            .map(|(from, to, input)| format!("\t{} -> {} [label = \"{}\"];", from, to, input.label()))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "digraph nfa {{\n\trankdir = LR;\n\tnode [shape = doublecircle]; {};\n\tnode [shape = circle];\n\tstart [shape = point];\n\tstart -> {};\n{}\n}}",
            finals, self.start_state, edges
        )
    }
}

/// Owns the id allocator for one automaton under construction.
#[derive(Debug, Default)]
pub struct NfaBuilder {
    states: Vec<State>,
}

impl NfaBuilder {
    pub fn add_state(&mut self) -> StateId {
        let id = self.states.len();
        self.states.push(State::with_id(id));
        id
    }

    /// Both ends must come from [`NfaBuilder::add_state`] on this builder.
    pub fn add_transition(&mut self, start: StateId, end: StateId, input: Input) {
        debug_assert!(end < self.states.len());
        self.states[start]
            .transitions
            .entry(input)
            .or_default()
            .insert(end);
    }

    pub fn set_final(&mut self, id: StateId) {
        self.states[id].fin = true;
    }

    pub fn build(self, start_state: StateId) -> Nfa {
        debug_assert!(start_state < self.states.len());
        Nfa {
            start_state,
            states: self.states,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// `a b*` with an epsilon hop between the two parts.
    fn sample() -> Nfa {
        let mut b = Nfa::builder();
        let s0 = b.add_state();
        let s1 = b.add_state();
        let s2 = b.add_state();
        b.add_transition(s0, s1, Input::literal("a"));
        b.add_transition(s1, s2, Input::Eps);
        b.add_transition(s2, s2, Input::literal("b"));
        b.set_final(s2);
        b.build(s0)
    }

    #[test]
    fn closure_follows_epsilon_edges_only() {
        let nfa = sample();
        assert_eq!(nfa.eps_closure(&BTreeSet::from([1])), BTreeSet::from([1, 2]));
        assert_eq!(nfa.eps_closure(&BTreeSet::from([0])), BTreeSet::from([0]));
    }

    #[test]
    fn accepts_words() {
        let nfa = sample();
        assert!(nfa.accepts("a"));
        assert!(nfa.accepts("abbb"));
        assert!(!nfa.accepts(""));
        assert!(!nfa.accepts("ba"));
    }

    #[test]
    fn alphabet_skips_epsilon() {
        assert_eq!(
            sample().alphabet(),
            BTreeSet::from(["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn dot_lists_edges() {
        let dot = sample().to_dot();
        assert!(dot.contains("0 -> 1 [label = \"a\"];"));
        assert!(dot.contains("1 -> 2 [label = \"ε\"];"));
        assert!(dot.contains("node [shape = doublecircle]; 2;"));
    }
}
