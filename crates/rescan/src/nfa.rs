use std::collections::BTreeSet;

use self::dfa_builder::DfaBuilder;
use crate::{
    alphabet::{Alphabet, Symbol},
    closure_builder::ClosureBuilder,
    dfa::Dfa,
    limits::{CapacityError, Limits},
};

pub(crate) mod dfa_builder;

/// A single Thompson NFA state
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Node {
    edge: Option<(Symbol, usize)>,
    eps: BTreeSet<usize>,
}

impl Node {
    /// The one symbol-labeled transition out of this state, if any
    #[inline]
    #[must_use]
    pub fn edge(&self) -> Option<(Symbol, usize)> { self.edge }

    #[inline]
    #[must_use]
    pub fn epsilon(&self) -> &BTreeSet<usize> { &self.eps }

    /// Follow the symbol edge if it is labeled `sym`
    #[inline]
    #[must_use]
    pub fn step(&self, sym: Symbol) -> Option<usize> {
        self.edge.and_then(|(s, t)| (s == sym).then_some(t))
    }
}

/// The entry and accepting state of a sub-automaton under construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub start: usize,
    pub end: usize,
}

/// An arena of NFA states addressed by contiguous ids
#[derive(Debug, Clone)]
pub struct Nfa {
    nodes: Vec<Node>,
    start: usize,
    end: usize,
}

impl Nfa {
    #[inline]
    pub(crate) fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            start: 0,
            end: 0,
        }
    }

    #[inline]
    pub(crate) fn push(&mut self) -> usize {
        self.nodes.push(Node::default());
        self.nodes.len() - 1
    }

    pub(crate) fn connect(&mut self, from: usize, to: usize, by: Symbol) {
        assert!(to < self.nodes.len());
        let prev = self.nodes[from].edge.replace((by, to));
        assert!(prev.is_none(), "NFA state {from} already has a symbol edge");
    }

    pub(crate) fn connect_eps(&mut self, from: usize, to: usize) {
        assert!(to < self.nodes.len());
        self.nodes[from].eps.insert(to);
    }

    pub(crate) fn finish(mut self, Fragment { start, end }: Fragment) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> usize { self.start }

    #[inline]
    #[must_use]
    pub fn end(&self) -> usize { self.end }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize { self.nodes.len() }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    #[inline]
    #[must_use]
    pub fn node(&self, id: usize) -> &Node { &self.nodes[id] }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] { &self.nodes }

    /// Close `set` over epsilon edges in place
    #[inline]
    pub fn epsilon_closure(&self, set: &mut BTreeSet<usize>) {
        ClosureBuilder::default().solve(self, set);
    }

    /// Simulate the automaton on a sequence of edge labels
    pub fn accepts_symbols<I: IntoIterator<Item = Symbol>>(&self, input: I) -> bool {
        let mut closure = ClosureBuilder::default();
        let mut curr = closure.closure(self, [self.start]);

        for sym in input {
            curr = closure.closure(
                self,
                curr.iter().filter_map(|&s| self.nodes[s].step(sym)),
            );

            if curr.is_empty() {
                return false;
            }
        }

        curr.contains(&self.end)
    }

    /// Run subset construction over the given alphabet
    ///
    /// # Errors
    /// Returns an error if the DFA would need more states than `limits`
    /// allows.
    #[inline]
    pub fn compile(&self, alphabet: &Alphabet, limits: &Limits) -> Result<Dfa, CapacityError> {
        DfaBuilder::new(self, alphabet, limits).build()
    }
}
