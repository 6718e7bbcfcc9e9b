use crate::error::GrammarError;

use super::{
    grammar::{Production, Symbol},
    Grammar,
};

const SEPARATORS: [&str; 3] = ["->", "::=", "→"];
const EPSILON_SPELLINGS: [&str; 5] = ["epsilon", "ε", "E", "eps", "EPS"];

fn find_separator(line: &str) -> Option<(usize, usize)> {
    SEPARATORS
        .iter()
        .filter_map(|sep| line.find(sep).map(|pos| (pos, pos + sep.len())))
        .min()
}

fn parse_alternatives(alpha: &[Symbol], rights: &str) -> Vec<Production> {
    rights
        .split('|')
        .map(|alt| alt.trim())
        .map(|alt| {
            let beta = if alt.is_empty() || EPSILON_SPELLINGS.contains(&alt) {
                Vec::new()
            } else {
                alt.split_whitespace().map(Symbol::from_token).collect()
            };
            Production::new(alpha.to_vec(), beta)
        })
        .collect()
}

impl Grammar {
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        let mut productions: Vec<Production> = Vec::new();
        let mut previous_left: Option<Vec<Symbol>> = None;

        for (i, line) in grammar.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let (alpha, rights) = if let Some((start, end)) = find_separator(line) {
                let left = line[..start].trim();
                let rights = line[end..].trim();
                if left.is_empty() {
                    return Err(GrammarError::EmptyLeftSide { line: i + 1 });
                }
                if rights.is_empty() {
                    return Err(GrammarError::EmptyRightSide { line: i + 1 });
                }
                let alpha: Vec<Symbol> = left.split_whitespace().map(Symbol::from_token).collect();
                (alpha, rights)
            } else if let Some(rest) = line.strip_prefix('|') {
                match &previous_left {
                    Some(alpha) => (alpha.clone(), rest.trim()),
                    None => return Err(GrammarError::MissingPreviousLeft { line: i + 1 }),
                }
            } else {
                return Err(GrammarError::MissingSeparator { line: i + 1 });
            };

            productions.extend(parse_alternatives(&alpha, rights));
            previous_left = Some(alpha);
        }

        if productions.is_empty() {
            return Err(GrammarError::Empty);
        }
        log::debug!("parsed {} productions", productions.len());

        Ok(Grammar::new(productions))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn simple_parse() {
        let g = Grammar::parse("S -> a").unwrap();
        assert_eq!(g.productions.len(), 1);
        assert_eq!(g.productions[0].alpha, vec![Symbol::non_terminal("S")]);
        assert_eq!(g.productions[0].beta, vec![Symbol::terminal("a")]);
    }

    #[test]
    fn alternatives_and_all_separators() {
        let g = Grammar::parse("S -> a S b | a b\nA ::= x\n<b> → y | epsilon").unwrap();
        let rendered: Vec<String> = g.productions.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            rendered,
            vec!["S -> a S b", "S -> a b", "A -> x", "<b> -> y", "<b> -> ε"]
        );
    }

    #[test]
    fn epsilon_spellings_and_empty_alternative() {
        let g = Grammar::parse("S -> a | | eps | EPS | E | ε").unwrap();
        assert_eq!(g.productions.len(), 6);
        assert!(g.productions[1..].iter().all(|p| p.beta.is_empty()));
    }

    #[test]
    fn comments_and_blank_lines() {
        let g = Grammar::parse("# header\n\n  S -> a # trailing\n").unwrap();
        assert_eq!(g.productions.len(), 1);
    }

    #[test]
    fn continuation_line() {
        let g = Grammar::parse("  S -> a \n | b c").unwrap();
        assert_eq!(g.productions.len(), 2);
        assert_eq!(
            g.productions[1].beta,
            vec![Symbol::terminal("b"), Symbol::terminal("c")]
        );
    }

    #[test]
    fn context_sensitive_left_side() {
        let g = Grammar::parse("S A -> A S").unwrap();
        assert_eq!(g.productions[0].alpha.len(), 2);
    }

    #[test]
    fn errors_carry_line_numbers() {
        assert_eq!(Grammar::parse("  \n  "), Err(GrammarError::Empty));
        assert_eq!(
            Grammar::parse("S -> a\nS a"),
            Err(GrammarError::MissingSeparator { line: 2 })
        );
        assert_eq!(
            Grammar::parse("-> a"),
            Err(GrammarError::EmptyLeftSide { line: 1 })
        );
        assert_eq!(
            Grammar::parse("\nS ->  # nothing"),
            Err(GrammarError::EmptyRightSide { line: 2 })
        );
        assert_eq!(
            Grammar::parse("| a b\n S -> a"),
            Err(GrammarError::MissingPreviousLeft { line: 1 })
        );
    }

    #[test]
    fn text_round_trip_groups_alternatives() {
        let g = Grammar::parse("S -> a A\nA -> b\nS -> ε").unwrap();
        assert_eq!(g.to_text(), "S -> a A | epsilon\nA -> b");
        assert_eq!(Grammar::parse(&g.to_text()).unwrap().productions.len(), 3);
    }
}
