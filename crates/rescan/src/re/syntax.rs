use std::{fmt, iter::Peekable, str::CharIndices};

use crate::alphabet::Symbol;

/// Delimits an escaped literal
pub const ESCAPE: char = '\\';
/// Makes the next character inside an escaped literal verbatim
pub const ESCAPE_ESCAPE: char = '`';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Alt,
    Cat,
    Star,
    Plus,
    Opt,
}

impl Op {
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '|' => Self::Alt,
            '&' => Self::Cat,
            '*' => Self::Star,
            '+' => Self::Plus,
            '?' => Self::Opt,
            _ => return None,
        })
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Alt => '|',
            Self::Cat => '&',
            Self::Star => '*',
            Self::Plus => '+',
            Self::Opt => '?',
        }
    }

    #[inline]
    #[must_use]
    pub fn precedence(self) -> u8 {
        match self {
            Self::Alt => 1,
            Self::Cat => 2,
            Self::Star | Self::Plus | Self::Opt => 3,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_postfix(self) -> bool { matches!(self, Self::Star | Self::Plus | Self::Opt) }

    #[inline]
    #[must_use]
    pub fn arity(self) -> usize { if self.is_postfix() { 1 } else { 2 } }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Alt => "alternation",
            Self::Cat => "concatenation",
            Self::Star => "closure",
            Self::Plus => "positive closure",
            Self::Opt => "optional",
        };

        write!(f, "{name} {:?}", self.as_char())
    }
}

/// Whether `c` is one of the characters with operator meaning
#[inline]
#[must_use]
pub fn is_operator(c: char) -> bool { Op::from_char(c).is_some() || matches!(c, '(' | ')') }

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Regular expression is empty")]
    Empty,
    #[error("Missing operand for {0} at offset {1}")]
    MissingOperand(Op, usize),
    #[error("Found extraneous right parenthesis at offset {0}")]
    TrailingParen(usize),
    #[error("Unclosed parenthesis at offset {0}")]
    UnclosedParen(usize),
    #[error("Empty group at offset {0}")]
    EmptyGroup(usize),
    #[error("Unterminated escape starting at offset {0}")]
    UnterminatedEscape(usize),
    #[error("Empty escape at offset {0}")]
    EmptyEscape(usize),
    #[error("Unknown symbol class {name:?} at offset {pos}")]
    UnknownClass { name: String, pos: usize },
    #[error("Expression left {0} unconnected fragments")]
    Dangling(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Lit(Symbol),
    Op(Op),
    LPar,
    RPar,
}

/// Left-to-right tokenizer that also synthesizes implicit concatenation
#[derive(Debug)]
pub struct Tokens<'a> {
    chars: Peekable<CharIndices<'a>>,
    cat: Option<usize>,
    poisoned: bool,
}

impl<'a> Tokens<'a> {
    #[must_use]
    pub fn new(s: &'a str) -> Self {
        Self {
            chars: s.char_indices().peekable(),
            cat: None,
            poisoned: false,
        }
    }

    /// Queue a concatenation if the next character starts an operand
    fn check_cat(&mut self) {
        if let Some(&(i, c)) = self.chars.peek()
            && (!is_operator(c) || c == '(')
        {
            self.cat = Some(i);
        }
    }

    fn escape(&mut self, start: usize) -> Result<Symbol, ParseError> {
        let mut body = String::new();

        loop {
            match self.chars.next() {
                None => return Err(ParseError::UnterminatedEscape(start)),
                Some((_, ESCAPE)) => break,
                Some((_, ESCAPE_ESCAPE)) => {
                    let (_, c) = self
                        .chars
                        .next()
                        .ok_or(ParseError::UnterminatedEscape(start))?;
                    body.push(c);
                },
                Some((_, c)) => body.push(c),
            }
        }

        Symbol::from_escape(&body).ok_or_else(|| {
            if body.is_empty() {
                ParseError::EmptyEscape(start)
            } else {
                ParseError::UnknownClass {
                    name: body,
                    pos: start,
                }
            }
        })
    }

    fn shift(&mut self, i: usize, c: char) -> Result<Token, ParseError> {
        let tok = match c {
            '(' => return Ok(Token::LPar),
            ')' => Token::RPar,
            ESCAPE => Token::Lit(self.escape(i)?),
            c => match Op::from_char(c) {
                Some(op) if op.is_postfix() => Token::Op(op),
                Some(op) => return Ok(Token::Op(op)),
                None => Token::Lit(Symbol::from_char(c)),
            },
        };

        self.check_cat();
        Ok(tok)
    }
}

impl Iterator for Tokens<'_> {
    type Item = Result<(usize, Token), ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned {
            return None;
        }

        if let Some(i) = self.cat.take() {
            return Some(Ok((i, Token::Op(Op::Cat))));
        }

        let (i, c) = self.chars.next()?;
        let res = self.shift(i, c).map(|t| (i, t));
        self.poisoned = res.is_err();
        Some(res)
    }
}
