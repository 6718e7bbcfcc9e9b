//! One small grammar per Chomsky type, and a quiz built on them.

use super::{ChomskyType, Grammar};

pub const REGULAR: &str = "S -> a A | b\nA -> a S | c | epsilon";
pub const CONTEXT_FREE: &str = "S -> a S b | a b\nA -> a A | b";
pub const CONTEXT_SENSITIVE: &str = "S A -> A S\nS -> a S | a\nA -> b A | b";
pub const UNRESTRICTED: &str = "S A -> S\nS -> a S | a A\nA -> b A | b";

/// Optional rule the generator may append to the regular example.
pub const REGULAR_EXTRA: &str = "B -> b S | c";

pub fn example(grammar_type: ChomskyType) -> &'static str {
    match grammar_type {
        ChomskyType::Regular => REGULAR,
        ChomskyType::ContextFree => CONTEXT_FREE,
        ChomskyType::ContextSensitive => CONTEXT_SENSITIVE,
        ChomskyType::Unrestricted => UNRESTRICTED,
    }
}

/// A grammar of `grammar_type`. `choose(n)` picks a value in `0..n`; the
/// regular grammar gets [`REGULAR_EXTRA`] when it picks `1` out of `2`.
pub fn generate(grammar_type: ChomskyType, choose: &mut impl FnMut(usize) -> usize) -> String {
    match grammar_type {
        ChomskyType::Regular if choose(2) % 2 == 1 => format!("{}\n{}", REGULAR, REGULAR_EXTRA),
        t => example(t).to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub grammar: String,
    pub answer: ChomskyType,
    pub justification: Vec<String>,
}

/// Quiz on grammar types: draws a grammar of a random type, keeps it only
/// when the classifier agrees, and grades guesses against that verdict.
pub struct Tutor<C> {
    choose: C,
    exercise: Option<Exercise>,
}

impl<C: FnMut(usize) -> usize> Tutor<C> {
    pub fn new(choose: C) -> Self {
        Self {
            choose,
            exercise: None,
        }
    }

    pub fn exercise(&self) -> Option<&Exercise> {
        self.exercise.as_ref()
    }

    /// Replaces the current exercise and returns its grammar text.
    pub fn new_exercise(&mut self) -> &str {
        let exercise = loop {
            let target = (self.choose)(4) % 4;
            let Some(target) = ChomskyType::from_number(target as u8) else {
                continue;
            };
            let text = generate(target, &mut self.choose);
            let Ok(grammar) = Grammar::parse(&text) else {
                continue;
            };
            let c = grammar.classify();
            if c.chomsky_type() == target {
                break Exercise {
                    grammar: text,
                    answer: target,
                    justification: c.justification,
                };
            }
            log::debug!("discarded a Type {} draw classified as {}", target.number(), c.label);
        };
        &self.exercise.insert(exercise).grammar
    }

    /// Grades `answer` (0 to 3) and returns feedback with the justification.
    pub fn check(&self, answer: u8) -> (bool, String) {
        let Some(exercise) = &self.exercise else {
            return (false, "Generate an exercise first.".to_string());
        };

        let correct = answer == exercise.answer.number();
        let mut message = if correct {
            "CORRECT!\n\n".to_string()
        } else {
            format!(
                "INCORRECT. The correct answer was: Type {}\n\n",
                exercise.answer.number()
            )
        };
        message.push_str("Justification:\n");
        if exercise.justification.is_empty() {
            message.push_str("The grammar meets every restriction of the detected type.");
        } else {
            for j in &exercise.justification {
                message.push_str(&format!("- {}\n", j));
            }
        }
        (correct, message)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn each_example_has_its_own_type() {
        for t in [
            ChomskyType::Regular,
            ChomskyType::ContextFree,
            ChomskyType::ContextSensitive,
            ChomskyType::Unrestricted,
        ] {
            let g = Grammar::parse(example(t)).unwrap();
            assert_eq!(g.classify().chomsky_type(), t, "{}", example(t));
        }
    }

    #[test]
    fn regular_generator_may_add_a_rule() {
        let text = generate(ChomskyType::Regular, &mut |_| 1);
        assert!(text.ends_with("\nB -> b S | c"));
        let g = Grammar::parse(&text).unwrap();
        assert_eq!(g.classify().chomsky_type(), ChomskyType::Regular);
        assert_eq!(generate(ChomskyType::Regular, &mut |_| 0), REGULAR);
    }

    #[test]
    fn check_before_any_exercise() {
        let tutor = Tutor::new(|_| 0);
        assert_eq!(tutor.check(3), (false, "Generate an exercise first.".to_string()));
    }

    #[test]
    fn grades_against_the_classifier() {
        let mut draws = vec![2, 3].into_iter();
        let mut tutor = Tutor::new(move |_| draws.next().unwrap_or(0));
        assert_eq!(tutor.new_exercise(), CONTEXT_FREE);

        let (correct, message) = tutor.check(2);
        assert!(correct);
        assert!(message.starts_with("CORRECT!\n\nJustification:\n- "));

        let (correct, message) = tutor.check(3);
        assert!(!correct);
        assert!(message.starts_with("INCORRECT. The correct answer was: Type 2"));

        assert_eq!(tutor.new_exercise(), REGULAR);
        let (correct, message) = tutor.check(3);
        assert!(correct);
        assert!(message.ends_with("The grammar meets every restriction of the detected type."));
    }
}
