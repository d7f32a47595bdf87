use std::collections::{BTreeSet, VecDeque};

use crate::nfa::Nfa;

/// Breadth-first epsilon-closure solver.
///
/// The worklist is kept between calls so repeated closures during subset
/// construction don't reallocate it.
#[derive(Debug, Default)]
pub struct ClosureBuilder(VecDeque<usize>);

impl ClosureBuilder {
    /// Extend `set` in place with every NFA state reachable from it over
    /// epsilon edges
    pub fn solve(&mut self, nfa: &Nfa, set: &mut BTreeSet<usize>) {
        assert!(self.0.is_empty());
        self.0.extend(set.iter().copied());

        while let Some(state) = self.0.pop_front() {
            for &next in nfa.node(state).epsilon() {
                if set.insert(next) {
                    self.0.push_back(next);
                }
            }
        }
    }

    #[inline]
    pub fn closure(&mut self, nfa: &Nfa, seed: impl IntoIterator<Item = usize>) -> BTreeSet<usize> {
        let mut set = seed.into_iter().collect();
        self.solve(nfa, &mut set);
        set
    }
}
