//! Operand symbols and the per-compilation alphabet

use std::{
    collections::{BTreeMap, BTreeSet, btree_set},
    fmt,
};

/// One edge label of an automaton
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// A single concrete character
    Char(char),
    /// Any ASCII letter
    Letter,
    /// Any ASCII digit
    Digit,
    /// Any character not matched by another edge of the same state
    Fallback,
}

impl Symbol {
    pub const FALLBACK: char = '~';
    pub const LETTER: &'static str = "letter";
    pub const DIGIT: &'static str = "digit";

    /// Interpret the body of an escaped literal
    #[must_use]
    pub fn from_escape(body: &str) -> Option<Self> {
        match body {
            Self::LETTER => Some(Self::Letter),
            Self::DIGIT => Some(Self::Digit),
            _ => {
                let mut chars = body.chars();
                let c = chars.next()?;
                chars.next().is_none().then(|| Self::from_char(c))
            },
        }
    }

    #[must_use]
    pub fn from_char(c: char) -> Self {
        if c == Self::FALLBACK {
            Self::Fallback
        } else {
            Self::Char(c)
        }
    }

    /// Whether this is a character class that matches `c`, ignoring
    /// precedence between edges
    #[must_use]
    pub fn admits(self, c: char) -> bool {
        match self {
            Self::Char(d) => c == d,
            Self::Letter => c.is_ascii_alphabetic(),
            Self::Digit => c.is_ascii_digit(),
            Self::Fallback => true,
        }
    }

    /// The concrete characters a scanner branch for this symbol enumerates,
    /// or `None` for the fallback
    #[must_use]
    pub fn chars(self) -> Option<Vec<char>> {
        match self {
            Self::Char(c) => Some(vec![c]),
            Self::Letter => Some(('a'..='z').chain('A'..='Z').collect()),
            Self::Digit => Some(('0'..='9').collect()),
            Self::Fallback => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{}", c.escape_default()),
            Self::Letter => f.write_str(Self::LETTER),
            Self::Digit => f.write_str(Self::DIGIT),
            Self::Fallback => write!(f, "{}", Self::FALLBACK),
        }
    }
}

/// Resolve one input character against the outgoing edges of a state.
///
/// Exact characters win over the letter and digit classes, which in turn win
/// over the fallback edge.
#[must_use]
pub fn dispatch(edges: &BTreeMap<Symbol, usize>, c: char) -> Option<usize> {
    edges
        .get(&Symbol::Char(c))
        .or_else(|| {
            [Symbol::Letter, Symbol::Digit]
                .iter()
                .filter(|s| s.admits(c))
                .find_map(|s| edges.get(s))
        })
        .or_else(|| edges.get(&Symbol::Fallback))
        .copied()
}

/// Every distinct operand symbol seen while parsing one expression
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Alphabet(BTreeSet<Symbol>);

impl Alphabet {
    #[inline]
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Register a symbol, returning whether it was new
    #[inline]
    pub fn insert(&mut self, sym: Symbol) -> bool { self.0.insert(sym) }

    #[inline]
    #[must_use]
    pub fn contains(&self, sym: &Symbol) -> bool { self.0.contains(sym) }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    #[inline]
    pub fn iter(&self) -> btree_set::Iter<'_, Symbol> { self.0.iter() }
}

impl<'a> IntoIterator for &'a Alphabet {
    type IntoIter = btree_set::Iter<'a, Symbol>;
    type Item = &'a Symbol;

    #[inline]
    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

impl FromIterator<Symbol> for Alphabet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(it: I) -> Self { Self(it.into_iter().collect()) }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, sym) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{sym}")?;
        }
        f.write_str("}")
    }
}
