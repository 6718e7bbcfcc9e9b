use crate::error::RegexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Token {
    Symbol(char),
    Epsilon,
    Empty,
    Union,
    Concat,
    Star,
    LeftParen,
    RightParen,
}

impl Token {
    fn precedence(self) -> u8 {
        match self {
            Token::Star => 3,
            Token::Concat => 2,
            Token::Union => 1,
            _ => 0,
        }
    }

    /// Can end an operand, so a following operand implies concatenation.
    fn ends_operand(self) -> bool {
        matches!(
            self,
            Token::Symbol(_) | Token::Epsilon | Token::Empty | Token::Star | Token::RightParen
        )
    }

    fn starts_operand(self) -> bool {
        matches!(
            self,
            Token::Symbol(_) | Token::Epsilon | Token::Empty | Token::LeftParen
        )
    }
}

pub(super) fn tokenize(regex: &str) -> Result<Vec<Token>, RegexError> {
    regex
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '|' => Ok(Token::Union),
            '*' => Ok(Token::Star),
            '(' => Ok(Token::LeftParen),
            ')' => Ok(Token::RightParen),
            'ε' => Ok(Token::Epsilon),
            '∅' => Ok(Token::Empty),
            c if c.is_ascii_lowercase() || c.is_ascii_digit() => Ok(Token::Symbol(c)),
            c => Err(RegexError::UnsupportedSymbol(c)),
        })
        .collect()
}

/// Makes every concatenation explicit.
pub(super) fn insert_concat(tokens: &[Token]) -> Vec<Token> {
    let mut result = Vec::with_capacity(tokens.len() * 2);
    for (i, &token) in tokens.iter().enumerate() {
        if i > 0 && tokens[i - 1].ends_operand() && token.starts_operand() {
            result.push(Token::Concat);
        }
        result.push(token);
    }
    result
}

/// Shunting-yard with `*` > concatenation > `|`, all left associative.
pub(super) fn to_postfix(tokens: &[Token]) -> Result<Vec<Token>, RegexError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut operators: Vec<Token> = Vec::new();

    for &token in tokens {
        match token {
            Token::Symbol(_) | Token::Epsilon | Token::Empty => output.push(token),
            Token::LeftParen => operators.push(token),
            Token::RightParen => loop {
                match operators.pop() {
                    Some(Token::LeftParen) => break,
                    Some(op) => output.push(op),
                    None => return Err(RegexError::UnbalancedParenthesis),
                }
            },
            _ => {
                while let Some(&top) = operators.last() {
                    if top == Token::LeftParen || top.precedence() < token.precedence() {
                        break;
                    }
                    output.push(top);
                    operators.pop();
                }
                operators.push(token);
            }
        }
    }

    while let Some(op) = operators.pop() {
        if op == Token::LeftParen {
            return Err(RegexError::UnbalancedParenthesis);
        }
        output.push(op);
    }
    Ok(output)
}
