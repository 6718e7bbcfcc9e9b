use crate::{
    automata::{
        nfa::{Input, Nfa, NfaBuilder},
        StateId,
    },
    error::RegexError,
};

use super::parser::{self, Token};

/// A partial automaton with one entry and one exit state.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: StateId,
    end: StateId,
}

/// Thompson construction. The result has exactly one final state.
pub fn compile(regex: &str) -> Result<Nfa, RegexError> {
    let tokens = parser::tokenize(regex)?;
    if tokens.is_empty() {
        return Err(RegexError::Empty);
    }
    let postfix = parser::to_postfix(&parser::insert_concat(&tokens))?;

    let mut builder = Nfa::builder();
    let mut stack: Vec<Fragment> = Vec::new();

    for token in postfix {
        let fragment = match token {
            Token::Symbol(c) => literal(&mut builder, Some(Input::literal(c))),
            Token::Epsilon => literal(&mut builder, Some(Input::Eps)),
            Token::Empty => literal(&mut builder, None),
            Token::Concat => {
                let (first, second) = pop_two(&mut stack, '.')?;
                builder.add_transition(first.end, second.start, Input::Eps);
                Fragment {
                    start: first.start,
                    end: second.end,
                }
            }
            Token::Union => {
                let (first, second) = pop_two(&mut stack, '|')?;
                let start = builder.add_state();
                let end = builder.add_state();
                builder.add_transition(start, first.start, Input::Eps);
                builder.add_transition(start, second.start, Input::Eps);
                builder.add_transition(first.end, end, Input::Eps);
                builder.add_transition(second.end, end, Input::Eps);
                Fragment { start, end }
            }
            Token::Star => {
                let inner = stack
                    .pop()
                    .ok_or(RegexError::MissingOperand { operator: '*' })?;
                let start = builder.add_state();
                let end = builder.add_state();
                builder.add_transition(start, inner.start, Input::Eps);
                builder.add_transition(start, end, Input::Eps);
                builder.add_transition(inner.end, inner.start, Input::Eps);
                builder.add_transition(inner.end, end, Input::Eps);
                Fragment { start, end }
            }
            Token::LeftParen | Token::RightParen => {
                return Err(RegexError::UnbalancedParenthesis);
            }
        };
        stack.push(fragment);
    }

    match stack.as_slice() {
        [result] => {
            let result = *result;
            builder.set_final(result.end);
            let nfa = builder.build(result.start);
            log::debug!("compiled '{}' into {} NFA states", regex, nfa.states().len());
            Ok(nfa)
        }
        fragments => Err(RegexError::LeftoverFragments(fragments.len())),
    }
}

/// Two fresh states joined by `input`, or unconnected for `∅`.
fn literal(builder: &mut NfaBuilder, input: Option<Input>) -> Fragment {
    let start = builder.add_state();
    let end = builder.add_state();
    if let Some(input) = input {
        builder.add_transition(start, end, input);
    }
    Fragment { start, end }
}

fn pop_two(stack: &mut Vec<Fragment>, operator: char) -> Result<(Fragment, Fragment), RegexError> {
    let second = stack.pop();
    let first = stack.pop();
    match (first, second) {
        (Some(first), Some(second)) => Ok((first, second)),
        _ => Err(RegexError::MissingOperand { operator }),
    }
}
