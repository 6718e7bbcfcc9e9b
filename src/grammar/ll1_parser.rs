use serde::Serialize;

use crate::error::ParseError;

use super::{
    first_follow::{SymbolEntry, END_MARK_INDEX, EPSILON_INDEX},
    ll1_parsing_table::Ll1Table,
    END_MARK,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub lexeme: String,
    pub kind: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(lexeme: impl Into<String>, kind: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            lexeme: lexeme.into(),
            kind: kind.into(),
            line,
            column,
        }
    }

    /// One token per whitespace-separated word, with the word as both
    /// lexeme and kind. Columns count chars and restart after a newline.
    pub fn words(input: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let (mut line, mut column) = (1, 1);
        let mut word: Option<(usize, usize, usize)> = None;
        for (offset, c) in input.char_indices() {
            if c.is_whitespace() {
                if let Some((start, l, col)) = word.take() {
                    let text = &input[start..offset];
                    tokens.push(Token::new(text, text, l, col));
                }
            } else if word.is_none() {
                word = Some((offset, line, column));
            }
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        if let Some((start, l, col)) = word {
            let text = &input[start..];
            tokens.push(Token::new(text, text, l, col));
        }
        tokens
    }
}

pub const RETRIES_PER_TOKEN: usize = 8;

/// How the parser treats a cell holding more than one alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Always expand the first alternative of the cell.
    FirstAlternative,
    /// Try the alternatives in order, moving on to the next one when an
    /// earlier choice ends in a syntax error. At most
    /// `RETRIES_PER_TOKEN` retries per input token are made; past that the
    /// furthest error so far is returned.
    #[default]
    Ordered,
}

/// An owned derivation tree. Terminal leaves carry the matched lexeme and
/// its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseTree {
    pub symbol: String,
    pub children: Vec<ParseTree>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexeme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl ParseTree {
    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Matched lexemes, left to right.
    pub fn leaves(&self) -> Vec<&str> {
        if let Some(lexeme) = &self.lexeme {
            return vec![lexeme.as_str()];
        }
        self.children.iter().flat_map(|c| c.leaves()).collect()
    }

    pub fn to_plaintext(&self) -> String {
        let mut lines = Vec::new();
        self.render(String::new(), String::new(), &mut lines);
        lines.join("\n")
    }

    fn render(&self, prefix: String, child_prefix: String, lines: &mut Vec<String>) {
        let mut line = format!("{}{}", prefix, self.symbol);
        if let (Some(lexeme), Some(l), Some(c)) = (&self.lexeme, self.line, self.column) {
            line.push_str(&format!(" -> '{}' [L:{}, C:{}]", lexeme, l, c));
        }
        lines.push(line);
        for (i, child) in self.children.iter().enumerate() {
            let last = i + 1 == self.children.len();
            let (connector, extension) = if last { ("└─ ", "   ") } else { ("├─ ", "│  ") };
            child.render(
                format!("{}{}", child_prefix, connector),
                format!("{}{}", child_prefix, extension),
                lines,
            );
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    symbol: usize,
    children: Vec<usize>,
    leaf: Option<(String, usize, usize)>,
}

/// Saved parser state for a cell with untried alternatives.
struct ChoicePoint {
    stack: Vec<(usize, usize)>,
    cursor: usize,
    arena_len: usize,
    node: usize,
    remaining: Vec<usize>,
}

struct Run<'t> {
    table: &'t Ll1Table,
    arena: Vec<Node>,
    stack: Vec<(usize, usize)>,
    cursor: usize,
}

impl<'t> Run<'t> {
    fn new(table: &'t Ll1Table) -> Self {
        let start = table.grammar.start_symbol;
        let arena = vec![
            Node {
                symbol: END_MARK_INDEX,
                children: Vec::new(),
                leaf: None,
            },
            Node {
                symbol: start,
                children: Vec::new(),
                leaf: None,
            },
        ];
        Self {
            table,
            arena,
            stack: vec![(END_MARK_INDEX, 0), (start, 1)],
            cursor: 0,
        }
    }

    fn name(&self, symbol: usize) -> &'t str {
        let table: &'t Ll1Table = self.table;
        table.grammar.get_symbol_name(symbol)
    }

    /// Attaches the children of `alternative` under `node` and pushes them.
    fn expand(&mut self, node: usize, non_terminal: usize, alternative: usize) {
        let production: Vec<usize> = match &self.table.grammar.symbols[non_terminal] {
            SymbolEntry::NonTerminal(nt) => nt.productions[alternative].clone(),
            _ => Vec::new(),
        };
        let production = if production.is_empty() {
            vec![EPSILON_INDEX]
        } else {
            production
        };

        let first_child = self.arena.len();
        for &symbol in &production {
            self.arena.push(Node {
                symbol,
                children: Vec::new(),
                leaf: None,
            });
        }
        let children: Vec<usize> = (first_child..self.arena.len()).collect();
        for (&symbol, &child) in production.iter().zip(children.iter()).rev() {
            self.stack.push((symbol, child));
        }
        self.arena[node].children = children;
    }

    fn resume(&mut self, choice: &mut ChoicePoint) -> Option<usize> {
        self.arena.truncate(choice.arena_len);
        for &(_, node) in &choice.stack {
            self.arena[node].children.clear();
            self.arena[node].leaf = None;
        }
        self.arena[choice.node].children.clear();
        self.stack = choice.stack.clone();
        self.cursor = choice.cursor;
        if choice.remaining.is_empty() {
            None
        } else {
            Some(choice.remaining.remove(0))
        }
    }

    fn run(
        &mut self,
        input: &[Token],
        policy: ConflictPolicy,
        choices: &mut Vec<ChoicePoint>,
    ) -> Result<(), ParseError> {
        let table: &'t Ll1Table = self.table;
        while let Some((x, node)) = self.stack.pop() {
            let token = &input[self.cursor.min(input.len() - 1)];

            if x == EPSILON_INDEX {
                continue;
            }

            if x == END_MARK_INDEX {
                return if token.kind == END_MARK {
                    Ok(())
                } else {
                    Err(ParseError::TrailingInput {
                        line: token.line,
                        column: token.column,
                        found: format!("'{}'", token.lexeme),
                        kind: token.kind.clone(),
                    })
                };
            }

            if !table.grammar.is_non_terminal(x) {
                if self.name(x) == token.kind {
                    self.arena[node].leaf = Some((token.lexeme.clone(), token.line, token.column));
                    self.cursor += 1;
                    continue;
                }
                return Err(ParseError::Mismatch {
                    line: token.line,
                    column: token.column,
                    found: describe(token),
                    kind: token.kind.clone(),
                    expected: self.name(x).to_string(),
                });
            }

            let alternatives: &[usize] = match table.grammar.get_symbol_index(&token.kind) {
                Some(t) => table.cell_indices(x, t),
                None => &[],
            };
            let Some((&chosen, rest)) = alternatives.split_first() else {
                return Err(ParseError::UnexpectedToken {
                    line: token.line,
                    column: token.column,
                    found: describe(token),
                    kind: token.kind.clone(),
                    non_terminal: self.name(x).to_string(),
                    expected: table.expected(x),
                });
            };

            if policy == ConflictPolicy::Ordered && !rest.is_empty() {
                choices.push(ChoicePoint {
                    stack: self.stack.clone(),
                    cursor: self.cursor,
                    arena_len: self.arena.len(),
                    node,
                    remaining: rest.to_vec(),
                });
            }
            self.expand(node, x, chosen);
        }

        Err(ParseError::Internal(
            "symbol stack emptied before the end marker was matched".to_string(),
        ))
    }

    fn into_tree(self, node: usize) -> ParseTree {
        let mut nodes: Vec<Option<Node>> = self.arena.into_iter().map(Some).collect();
        build_tree(&mut nodes, self.table, node)
    }
}

fn build_tree(nodes: &mut [Option<Node>], table: &Ll1Table, id: usize) -> ParseTree {
    let node = nodes[id].take().unwrap_or(Node {
        symbol: EPSILON_INDEX,
        children: Vec::new(),
        leaf: None,
    });
    let children = node
        .children
        .iter()
        .map(|&child| build_tree(nodes, table, child))
        .collect();
    let (lexeme, line, column) = match node.leaf {
        Some((lexeme, line, column)) => (Some(lexeme), Some(line), Some(column)),
        None => (None, None, None),
    };
    ParseTree {
        symbol: table.grammar.get_symbol_name(node.symbol).to_string(),
        children,
        lexeme,
        line,
        column,
    }
}

fn describe(token: &Token) -> String {
    if token.kind == END_MARK {
        "<end>".to_string()
    } else {
        format!("'{}'", token.lexeme)
    }
}

/// Appends the end-of-input token unless the caller already did.
fn with_end_marker(tokens: &[Token]) -> Vec<Token> {
    let mut input = tokens.to_vec();
    if input.last().map_or(true, |t| t.kind != END_MARK) {
        let (line, column) = match input.last() {
            Some(last) => (last.line, last.column + last.lexeme.chars().count().max(1)),
            None => (1, 1),
        };
        input.push(Token::new(END_MARK, END_MARK, line, column));
    }
    input
}

/// Table-driven top-down parser over any [`Ll1Table`].
pub struct Ll1Parser<'t> {
    table: &'t Ll1Table,
    policy: ConflictPolicy,
}

impl<'t> Ll1Parser<'t> {
    pub fn new(table: &'t Ll1Table) -> Self {
        Self {
            table,
            policy: ConflictPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Parses `tokens`; an end token of kind `$` is appended when missing.
    ///
    /// When every alternative fails, or the retry budget runs out, the error
    /// reported is the one reached furthest into the input.
    pub fn parse(&self, tokens: &[Token]) -> Result<ParseTree, ParseError> {
        let input = with_end_marker(tokens);
        let mut run = Run::new(self.table);
        let mut choices: Vec<ChoicePoint> = Vec::new();
        let mut furthest: Option<(usize, ParseError)> = None;
        let budget = RETRIES_PER_TOKEN * input.len();
        let mut retries = 0;

        loop {
            match run.run(&input, self.policy, &mut choices) {
                Ok(()) => return Ok(run.into_tree(1)),
                Err(error) => {
                    if furthest.as_ref().map_or(true, |(at, _)| run.cursor > *at) {
                        furthest = Some((run.cursor, error));
                    }
                }
            }

            let next = loop {
                let Some(choice) = choices.last_mut() else {
                    break None;
                };
                let (node, alternative) = (choice.node, run.resume(choice));
                match alternative {
                    Some(alt) => {
                        if choice.remaining.is_empty() {
                            choices.pop();
                        }
                        break Some((node, alt));
                    }
                    None => {
                        choices.pop();
                    }
                }
            };

            if next.is_some() && retries == budget {
                log::debug!("retry budget of {} exhausted", budget);
            }
            match next {
                Some((node, alt)) if retries < budget => {
                    retries += 1;
                    let non_terminal = run.arena[node].symbol;
                    log::trace!(
                        "retrying <{}> with alternative {}",
                        self.table.grammar.get_symbol_name(non_terminal),
                        alt
                    );
                    run.expand(node, non_terminal, alt);
                }
                _ => {
                    return Err(furthest
                        .map(|(_, e)| e)
                        .unwrap_or_else(|| ParseError::Internal("no parse attempted".to_string())))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Grammar;

    fn table(text: &str) -> Ll1Table {
        let g = Grammar::parse(text).unwrap();
        let start = g.start_symbol().unwrap().value.clone();
        Ll1Table::build(&g.to_rule_map(), &start)
    }

    #[test]
    fn nested_parse_has_depth_two() {
        let t = table("S -> a S b | a b");
        let tree = Ll1Parser::new(&t).parse(&Token::words("a a b b")).unwrap();
        assert_eq!(tree.symbol, "S");
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.leaves(), vec!["a", "a", "b", "b"]);
        let inner = &tree.children[1];
        assert_eq!(inner.symbol, "S");
        assert_eq!(inner.children.len(), 2);
        assert_eq!(tree.children[0].column, Some(1));
        assert_eq!(tree.children[2].column, Some(7));
    }

    #[test]
    fn unbalanced_input_fails_with_position() {
        let t = table("S -> a S b | a b");
        let err = Ll1Parser::new(&t).parse(&Token::words("a b b")).unwrap_err();
        assert_eq!(
            err,
            ParseError::TrailingInput {
                line: 1,
                column: 5,
                found: "'b'".to_string(),
                kind: "b".to_string(),
            }
        );
        assert_eq!(err.position(), Some((1, 5)));
    }

    #[test]
    fn first_alternative_policy_does_not_retry() {
        let t = table("S -> a S b | a b");
        let err = Ll1Parser::new(&t)
            .with_policy(ConflictPolicy::FirstAlternative)
            .parse(&Token::words("a a b b"))
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                line: 1,
                column: 5,
                found: "'b'".to_string(),
                kind: "b".to_string(),
                non_terminal: "S".to_string(),
                expected: vec!["a".to_string()],
            }
        );
    }

    #[test]
    fn epsilon_alternatives_and_end_of_input() {
        let t = table("E -> T X\nX -> + T X | epsilon\nT -> id");
        let parser = Ll1Parser::new(&t).with_policy(ConflictPolicy::FirstAlternative);
        let tree = parser.parse(&Token::words("id + id")).unwrap();
        assert_eq!(tree.leaves(), vec!["id", "+", "id"]);

        let err = parser.parse(&Token::words("id +")).unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                line: 1,
                column: 5,
                found: "<end>".to_string(),
                kind: "$".to_string(),
                non_terminal: "T".to_string(),
                expected: vec!["id".to_string()],
            }
        );
    }

    #[test]
    fn terminal_mismatch() {
        let t = table("S -> a b");
        let err = Ll1Parser::new(&t).parse(&Token::words("a c")).unwrap_err();
        assert_eq!(
            err,
            ParseError::Mismatch {
                line: 1,
                column: 3,
                found: "'c'".to_string(),
                kind: "c".to_string(),
                expected: "b".to_string(),
            }
        );
    }

    #[test]
    fn plaintext_tree() {
        let t = table("S -> a A\nA -> b");
        let tree = Ll1Parser::new(&t).parse(&Token::words("a b")).unwrap();
        assert_eq!(
            tree.to_plaintext(),
            "S\n├─ a -> 'a' [L:1, C:1]\n└─ A\n   └─ b -> 'b' [L:1, C:3]"
        );
    }

    #[test]
    fn ambiguous_table_fails_in_bounded_time() {
        let t = table("S -> a S | a S b | epsilon");
        let input = format!("{}c", "a ".repeat(20));
        let started = Instant::now();
        let err = Ll1Parser::new(&t).parse(&Token::words(&input)).unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(err.position(), Some((1, 41)));
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn ordered_policy_still_backtracks_on_ambiguous_table() {
        let t = table("S -> a S | a S b | epsilon");
        let tree = Ll1Parser::new(&t).parse(&Token::words("a a a b")).unwrap();
        assert_eq!(tree.leaves(), vec!["a", "a", "a", "b"]);
    }

    #[test]
    fn words_split_on_any_whitespace() {
        let tokens = Token::words("a\tb  c\n d");
        let found: Vec<(&str, usize, usize)> = tokens
            .iter()
            .map(|t| (t.kind.as_str(), t.line, t.column))
            .collect();
        assert_eq!(found, vec![("a", 1, 1), ("b", 1, 3), ("c", 1, 6), ("d", 2, 2)]);
    }
}
