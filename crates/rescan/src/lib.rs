//! Compile a single regular expression into a token-scanning program
//!
//! The pipeline runs in four stages, each bounded by [`limits::Limits`]:
//! the expression is parsed into a Thompson [`nfa::Nfa`], determinized by
//! subset construction into a [`dfa::Dfa`], minimized by partition refinement
//! into a [`dfa::minimize::MinDfa`], and finally lowered and rendered as the
//! source of a standalone scanner by [`codegen`].

#![deny(
    clippy::disallowed_methods,
    clippy::suspicious,
    clippy::style,
    clippy::clone_on_ref_ptr,
    missing_debug_implementations,
    missing_copy_implementations
)]
#![warn(clippy::pedantic, missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(missing_docs)] // TODO: document the scanner IR, syntax and error types

use codegen::{Keywords, Scanner};
use limits::{CapacityError, Limits, Stage};
use re::ParseError;

pub mod alphabet;
pub mod autom;
mod closure_builder;
pub mod codegen;
pub mod dfa;
pub mod limits;
pub mod nfa;
pub mod re;

/// Broad category of a compilation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The expression is empty, unbalanced, or missing an operand
    MalformedExpression,
    /// An escaped literal was opened and never closed
    UnterminatedEscape,
    /// A stage needed more states than its limit allows
    CapacityExceeded,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Malformed regular expression")]
    Parse(#[from] ParseError),
    #[error("Automaton too large")]
    Capacity(#[from] CapacityError),
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(ParseError::UnterminatedEscape(_)) => ErrorKind::UnterminatedEscape,
            Self::Parse(_) => ErrorKind::MalformedExpression,
            Self::Capacity(_) => ErrorKind::CapacityExceeded,
        }
    }

    /// The stage that rejected the input
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Parse(_) => Stage::Parse,
            Self::Capacity(c) => c.stage,
        }
    }
}

/// Every intermediate product of one successful compilation
#[derive(Debug, Clone)]
pub struct Compilation {
    alphabet: alphabet::Alphabet,
    nfa: nfa::Nfa,
    dfa: dfa::Dfa,
    min_dfa: dfa::minimize::MinDfa,
}

impl Compilation {
    #[inline]
    #[must_use]
    pub fn alphabet(&self) -> &alphabet::Alphabet { &self.alphabet }

    #[inline]
    #[must_use]
    pub fn nfa(&self) -> &nfa::Nfa { &self.nfa }

    #[inline]
    #[must_use]
    pub fn dfa(&self) -> &dfa::Dfa { &self.dfa }

    #[inline]
    #[must_use]
    pub fn min_dfa(&self) -> &dfa::minimize::MinDfa { &self.min_dfa }

    /// Lower the minimized DFA into scanner IR
    #[inline]
    #[must_use]
    pub fn scanner(&self, keywords: &Keywords) -> Scanner { Scanner::new(&self.min_dfa, keywords) }
}

/// Run every automaton stage on `regex`
///
/// # Errors
/// Returns an error if `regex` is malformed or any stage exceeds its limit.
/// No later stage runs once one has failed.
pub fn compile(regex: &str, limits: &Limits) -> Result<Compilation, Error> {
    let _s = tracing::info_span!("compile").entered();

    let (nfa, alphabet) = re::compile_nfa(regex, limits)?;
    let dfa = nfa.compile(&alphabet, limits)?;
    let min_dfa = dfa::minimize::run(&dfa, &alphabet, limits)?;

    Ok(Compilation {
        alphabet,
        nfa,
        dfa,
        min_dfa,
    })
}

/// Compile `regex` and render the source of its scanner program
///
/// # Errors
/// See [`compile`].
#[inline]
pub fn generate(regex: &str, keywords: &Keywords, limits: &Limits) -> Result<String, Error> {
    compile(regex, limits).map(|c| c.scanner(keywords).to_string())
}

#[cfg(test)]
mod test {
    use super::{Error, ErrorKind, codegen::Keywords};
    use crate::{
        autom::Automaton,
        limits::{CapacityError, Limits, Stage},
        re::ParseError,
    };

    #[test]
    fn error_kinds() {
        let err = super::compile("", &Limits::default()).unwrap_err();
        assert_eq!(err, Error::Parse(ParseError::Empty));
        assert_eq!(err.kind(), ErrorKind::MalformedExpression);
        assert_eq!(err.stage(), Stage::Parse);

        for s in ["a|", "(a", "a)", "*", "()"] {
            let err = super::compile(s, &Limits::default()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedExpression, "{s:?}");
        }

        let err = super::compile(r"a\letter", &Limits::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnterminatedEscape);
    }

    #[test]
    fn capacity_stops_pipeline() {
        let err = super::compile("abc", &Limits::uniform(5)).unwrap_err();

        assert_eq!(
            err,
            Error::Capacity(CapacityError {
                stage: Stage::Nfa,
                limit: 5,
            })
        );
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
        assert_eq!(err.stage(), Stage::Nfa);

        let limits = Limits {
            dfa_states: 1,
            ..Limits::default()
        };
        assert_eq!(
            super::compile("ab", &limits).unwrap_err().stage(),
            Stage::Dfa
        );
    }

    #[test]
    fn pipeline() {
        let comp = super::compile("a(b|c)*d", &Limits::default()).unwrap();

        assert_eq!(comp.nfa().len(), 12);
        assert_eq!(comp.alphabet().len(), 4);
        assert!(comp.dfa().state_count() >= comp.min_dfa().state_count());
        assert_eq!(comp.min_dfa().state_count(), 3);
        assert!(comp.min_dfa().accepts("abcd"));
    }

    #[test]
    fn generate() {
        let src = super::generate(
            r"\letter\(\letter\|\digit\)*",
            &Keywords::parse("if else"),
            &Limits::default(),
        )
        .unwrap();

        assert!(src.contains(r#"&["if", "else"]"#));
        assert!(src.contains("fn scan_token("));
        assert!(src.contains("fn main()"));
    }
}
