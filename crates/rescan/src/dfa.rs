use std::collections::{BTreeMap, BTreeSet};

use crate::{alphabet::Symbol, autom::Automaton};

pub mod minimize;

/// One subset-construction state: the closed set of NFA states it stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    nfa_states: BTreeSet<usize>,
    edges: BTreeMap<Symbol, usize>,
}

impl State {
    #[inline]
    #[must_use]
    pub fn nfa_states(&self) -> &BTreeSet<usize> { &self.nfa_states }

    #[inline]
    #[must_use]
    pub fn edges(&self) -> &BTreeMap<Symbol, usize> { &self.edges }
}

/// A deterministic automaton whose start state is always state 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    states: Vec<State>,
    accept: BTreeSet<usize>,
}

impl Dfa {
    pub const START: usize = 0;

    pub(crate) fn new(
        states: impl IntoIterator<Item = (BTreeSet<usize>, BTreeMap<Symbol, usize>)>,
        accept: BTreeSet<usize>,
    ) -> Self {
        let states: Vec<_> = states
            .into_iter()
            .map(|(nfa_states, edges)| State { nfa_states, edges })
            .collect();

        debug_assert!(!states.is_empty());
        debug_assert!(accept.iter().all(|&a| a < states.len()));

        Self { states, accept }
    }

    #[inline]
    #[must_use]
    pub fn states(&self) -> &[State] { &self.states }

    #[inline]
    #[must_use]
    pub fn state(&self, id: usize) -> &State { &self.states[id] }

    #[inline]
    #[must_use]
    pub fn accepting(&self) -> &BTreeSet<usize> { &self.accept }
}

impl Automaton for Dfa {
    #[inline]
    fn state_count(&self) -> usize { self.states.len() }

    #[inline]
    fn start(&self) -> usize { Self::START }

    #[inline]
    fn edges(&self, state: usize) -> &BTreeMap<Symbol, usize> { &self.states[state].edges }

    #[inline]
    fn is_accepting(&self, state: usize) -> bool { self.accept.contains(&state) }
}
