//! Arithmetic expressions used for computed tag and variable values.
//!
//! The language has numbers, `tag.<name>` and `var.<name>` references, the four binary
//! operators with the usual precedence and parentheses. A minus may open an expression or
//! a parenthesised group; any other operator must follow an operand. Whitespace and
//! operator characters separate tokens.

use smallvec::SmallVec;

use crate::attributes::parse_double;
use crate::error::EvalError;

/// Looks up the values that identifiers in an expression refer to.
pub trait ValueResolver {
    /// Value of the control tag `name`; `None` (or `-1`) when it does not resolve.
    fn tag_for_name(&self, name: &str) -> Option<i32>;

    /// Numeric value of the variable `name`.
    fn variable(&self, name: &str) -> Option<f64>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token<'text> {
    Word(&'text str),
    Add,
    Subtract,
    Multiply,
    Divide,
    Open,
    Close,
}

impl Token<'_> {
    const fn from_operator(character: char) -> Option<Self> {
        match character {
            '+' => Some(Self::Add),
            '-' => Some(Self::Subtract),
            '*' => Some(Self::Multiply),
            '/' => Some(Self::Divide),
            '(' => Some(Self::Open),
            ')' => Some(Self::Close),
            _ => None,
        }
    }
}

type Tokens<'text> = SmallVec<Token<'text>, 16>;

fn tokenize(text: &str) -> Tokens<'_> {
    let mut tokens = Tokens::new();
    let mut word_start = None;
    for (position, character) in text.char_indices() {
        let operator = Token::from_operator(character);
        if character.is_whitespace() || operator.is_some() {
            if let Some(start) = word_start.take() {
                tokens.push(Token::Word(&text[start..position]));
            }
            if let Some(token) = operator {
                tokens.push(token);
            }
        } else if word_start.is_none() {
            word_start = Some(position);
        }
    }
    if let Some(start) = word_start {
        tokens.push(Token::Word(&text[start..]));
    }
    tokens
}

struct Parser<'tokens, 'text, R: ?Sized> {
    tokens: &'tokens [Token<'text>],
    position: usize,
    resolver: &'tokens R,
}

impl<'text, R: ValueResolver + ?Sized> Parser<'_, 'text, R> {
    fn peek(&self) -> Option<Token<'text>> {
        self.tokens.get(self.position).copied()
    }

    /// Sum of products, optionally negated by a leading minus.
    fn sum(&mut self) -> Result<f64, EvalError> {
        let negate = self.peek() == Some(Token::Subtract);
        if negate {
            self.position += 1;
        }
        let first = self.product()?;
        let mut value = if negate { -first } else { first };
        while let Some(operator @ (Token::Add | Token::Subtract)) = self.peek() {
            self.position += 1;
            let operand = self.product()?;
            if operator == Token::Add {
                value += operand;
            } else {
                value -= operand;
            }
        }
        Ok(value)
    }

    fn product(&mut self) -> Result<f64, EvalError> {
        let mut value = self.operand()?;
        while let Some(operator @ (Token::Multiply | Token::Divide)) = self.peek() {
            self.position += 1;
            let operand = self.operand()?;
            if operator == Token::Multiply {
                value *= operand;
            } else {
                value /= operand;
            }
        }
        Ok(value)
    }

    fn operand(&mut self) -> Result<f64, EvalError> {
        let token = self.peek().ok_or(EvalError::MisplacedOperator)?;
        self.position += 1;
        match token {
            Token::Word(word) => self.resolve(word),
            Token::Open => {
                let value = self.sum()?;
                if self.peek() != Some(Token::Close) {
                    return Err(EvalError::UnbalancedParentheses);
                }
                self.position += 1;
                Ok(value)
            }
            Token::Close => Err(EvalError::UnbalancedParentheses),
            Token::Add | Token::Subtract | Token::Multiply | Token::Divide => {
                Err(EvalError::MisplacedOperator)
            }
        }
    }

    fn resolve(&self, word: &str) -> Result<f64, EvalError> {
        if let Some(number) = parse_double(word) {
            return Ok(number);
        }
        let resolved = if let Some(tag_name) = word.strip_prefix("tag.") {
            self.resolver
                .tag_for_name(tag_name)
                .filter(|&tag| tag != -1)
                .map(f64::from)
        } else if let Some(variable_name) = word.strip_prefix("var.") {
            self.resolver.variable(variable_name)
        } else {
            None
        };
        resolved.ok_or_else(|| EvalError::UnknownIdentifier(word.to_owned()))
    }
}

/// Evaluate `text`, resolving identifiers through `resolver`.
///
/// # Errors
/// Fails on empty input, unresolvable identifiers, unbalanced parentheses and operators
/// without operands.
pub fn evaluate<R: ValueResolver + ?Sized>(text: &str, resolver: &R) -> Result<f64, EvalError> {
    if let Some(number) = parse_double(text) {
        return Ok(number);
    }
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return Err(EvalError::Empty);
    }
    let mut parser = Parser {
        tokens: &tokens,
        position: 0,
        resolver,
    };
    let value = parser.sum()?;
    match parser.peek() {
        None => Ok(value),
        Some(Token::Close) => Err(EvalError::UnbalancedParentheses),
        Some(_) => Err(EvalError::MisplacedOperator),
    }
}
