use std::collections::{BTreeMap, BTreeSet, VecDeque};

use indexmap::IndexSet;

use super::Nfa;
use crate::{
    alphabet::{Alphabet, Symbol},
    closure_builder::ClosureBuilder,
    dfa::Dfa,
    limits::{Budget, CapacityError, Limits, Stage},
};

/// Subset construction over a Thompson NFA
#[derive(Debug)]
pub struct DfaBuilder<'a> {
    nfa: &'a Nfa,
    alphabet: &'a Alphabet,
    budget: Budget,
    closure: ClosureBuilder,
}

impl<'a> DfaBuilder<'a> {
    pub fn new(nfa: &'a Nfa, alphabet: &'a Alphabet, limits: &Limits) -> Self {
        Self {
            nfa,
            alphabet,
            budget: limits.budget(Stage::Dfa),
            closure: ClosureBuilder::default(),
        }
    }

    /// Closed set of NFA states reachable from `from` by one `sym` edge
    fn step(&mut self, from: &BTreeSet<usize>, sym: Symbol) -> BTreeSet<usize> {
        let mut set: BTreeSet<_> = from
            .iter()
            .filter_map(|&n| self.nfa.node(n).step(sym))
            .collect();

        if !set.is_empty() {
            self.closure.solve(self.nfa, &mut set);
        }

        set
    }

    pub fn build(&mut self) -> Result<Dfa, CapacityError> {
        let _s = tracing::debug_span!("subset_construction").entered();

        // Index in this set is the DFA state id
        let mut sets: IndexSet<BTreeSet<usize>> = IndexSet::new();
        let mut edges: Vec<BTreeMap<Symbol, usize>> = vec![];
        let mut q = VecDeque::new();

        self.budget.fresh(sets.len())?;
        let start = self.closure.closure(self.nfa, [self.nfa.start()]);
        sets.insert(start);
        edges.push(BTreeMap::new());
        q.push_back(Dfa::START);

        while let Some(state) = q.pop_front() {
            for &sym in self.alphabet {
                let next = self.step(&sets[state], sym);

                if next.is_empty() {
                    continue;
                }

                let id = if let Some(id) = sets.get_index_of(&next) {
                    id
                } else {
                    let id = self.budget.fresh(sets.len())?;
                    assert!(sets.insert(next));
                    edges.push(BTreeMap::new());
                    q.push_back(id);
                    id
                };

                assert!(edges[state].insert(sym, id).is_none());
            }
        }

        let end = self.nfa.end();
        let accept: BTreeSet<_> = sets
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.contains(&end).then_some(i))
            .collect();

        tracing::debug!(
            states = sets.len(),
            accepting = accept.len(),
            "Built DFA"
        );

        Ok(Dfa::new(sets.into_iter().zip(edges), accept))
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use crate::{
        alphabet::Symbol,
        autom::Automaton,
        dfa::Dfa,
        limits::{CapacityError, Limits, Stage},
        re,
    };

    fn dfa(s: &str) -> Dfa {
        let (nfa, alpha) = re::compile_nfa(s, &Limits::default()).unwrap();
        nfa.compile(&alpha, &Limits::default()).unwrap()
    }

    #[test]
    fn start_is_closure() {
        let (nfa, alpha) = re::compile_nfa("a*b", &Limits::default()).unwrap();
        let dfa = nfa.compile(&alpha, &Limits::default()).unwrap();

        let mut start = BTreeSet::from([nfa.start()]);
        nfa.epsilon_closure(&mut start);
        assert_eq!(dfa.state(Dfa::START).nfa_states(), &start);
        assert!(!dfa.is_accepting(Dfa::START));
    }

    #[test]
    fn missing_edges_stay_missing() {
        let dfa = dfa("ab");

        assert_eq!(dfa.state_count(), 3);
        assert_eq!(dfa.edges(Dfa::START).len(), 1);
        assert!(dfa.edges(Dfa::START).contains_key(&Symbol::Char('a')));
        assert_eq!(dfa.accepting().len(), 1);

        let last = *dfa.accepting().first().unwrap();
        assert!(dfa.edges(last).is_empty());
    }

    #[test]
    fn language() {
        let dfa = dfa("a(b|c)*d");

        for s in ["ad", "abd", "acbd", "abcbcbd"] {
            assert!(dfa.accepts(s), "{s:?} should be accepted");
        }

        for s in ["", "a", "abc", "bd", "abdd", "axd"] {
            assert!(!dfa.accepts(s), "{s:?} should be rejected");
        }
    }

    #[test]
    fn capacity() {
        let (nfa, alpha) = re::compile_nfa("abcd", &Limits::default()).unwrap();
        let limits = Limits {
            dfa_states: 4,
            ..Limits::default()
        };

        assert_eq!(
            nfa.compile(&alpha, &limits),
            Err(CapacityError {
                stage: Stage::Dfa,
                limit: 4,
            })
        );
    }

    proptest! {
        #[test]
        fn unique_subsets(s in re::regex(4, 24, 3, &['a', 'b', 'c'])) {
            let dfa = dfa(&s);
            let sets: BTreeSet<_> = dfa.states().iter().map(|s| s.nfa_states()).collect();

            prop_assert_eq!(sets.len(), dfa.state_count());
        }

        #[test]
        fn reproducible(s in re::regex(4, 24, 3, &['a', 'b', 'c'])) {
            prop_assert_eq!(dfa(&s), dfa(&s));
        }

        #[test]
        fn matches_nfa(
            s in re::regex(4, 24, 3, &['a', 'b']),
            inputs in prop::collection::vec(
                prop::collection::vec(prop::sample::select(vec!['a', 'b']), 0..8),
                16,
            ),
        ) {
            let (nfa, alpha) = re::compile_nfa(&s, &Limits::default()).unwrap();
            let dfa = nfa.compile(&alpha, &Limits::default()).unwrap();

            for input in inputs {
                let syms = || input.iter().copied().map(Symbol::Char);
                prop_assert_eq!(nfa.accepts_symbols(syms()), dfa.accepts_symbols(syms()));
            }
        }
    }
}
