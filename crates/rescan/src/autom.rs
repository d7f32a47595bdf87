use std::collections::BTreeMap;

use crate::alphabet::{self, Symbol};

/// Read-only view over a deterministic automaton whose states are numbered
/// `0..state_count()`
pub trait Automaton {
    fn state_count(&self) -> usize;

    fn start(&self) -> usize;

    /// Outgoing transitions of `state`; a missing symbol means no transition
    fn edges(&self, state: usize) -> &BTreeMap<Symbol, usize>;

    fn is_accepting(&self, state: usize) -> bool;

    /// Follow exact edge labels from the start state
    fn accepts_symbols<I: IntoIterator<Item = Symbol>>(&self, input: I) -> bool {
        let mut state = self.start();

        for sym in input {
            let Some(&next) = self.edges(state).get(&sym) else {
                return false;
            };
            state = next;
        }

        self.is_accepting(state)
    }

    /// Run the automaton over concrete characters, resolving each one the
    /// way the generated scanner does
    fn accepts(&self, input: &str) -> bool {
        let mut state = self.start();

        for c in input.chars() {
            let Some(next) = alphabet::dispatch(self.edges(state), c) else {
                return false;
            };
            state = next;
        }

        self.is_accepting(state)
    }
}
