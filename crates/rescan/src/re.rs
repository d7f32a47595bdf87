//! Regular expression front end
//!
//! Operands are single characters or escaped literals delimited by `\`
//! (`\letter\`, `\digit\`, `\*\`, ...). The operators are `|` (alternation),
//! `&` (concatenation, usually implicit), and the postfix `*`, `+` and `?`.
//! Parentheses group.

use nfa_builder::NfaBuilder;

pub use self::syntax::{Op, ParseError};
use crate::{Error, alphabet::Alphabet, limits::Limits, nfa::Nfa};

mod nfa_builder;
pub mod syntax;

/// Parse `s` and build its Thompson NFA, registering every operand symbol
/// into a fresh alphabet
///
/// # Errors
/// Returns an error if `s` is malformed or its NFA exceeds
/// [`Limits::nfa_states`].
#[inline]
pub fn compile_nfa(s: &str, limits: &Limits) -> Result<(Nfa, Alphabet), Error> {
    let _s = tracing::debug_span!("compile_nfa").entered();
    let res = NfaBuilder::build(s, limits);

    if let Ok((ref nfa, ref alphabet)) = res {
        tracing::debug!(states = nfa.len(), %alphabet, "Built NFA");
    }

    res
}

#[cfg(any(test, feature = "proptest"))]
pub use prop::*;

#[cfg(any(test, feature = "proptest"))]
mod prop {
    use proptest::prelude::*;

    /// Well-formed, fully parenthesized expressions over `chars`
    pub fn regex(
        depth: u32,
        tree_size: u32,
        branch_size: u32,
        chars: &[char],
    ) -> impl Strategy<Value = String> + use<> {
        prop::sample::select(chars.to_vec())
            .prop_map(String::from)
            .prop_recursive(depth, tree_size, branch_size, |s| {
                prop_oneof![
                    (s.clone(), s.clone()).prop_map(|(l, r)| format!("({l}|{r})")),
                    (s.clone(), s.clone()).prop_map(|(l, r)| format!("({l})({r})")),
                    s.clone().prop_map(|r| format!("({r})*")),
                    s.clone().prop_map(|r| format!("({r})+")),
                    s.prop_map(|r| format!("({r})?")),
                ]
            })
    }
}
