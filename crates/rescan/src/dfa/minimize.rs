//! Partition-refinement DFA minimization

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::HashMap;

use crate::{
    alphabet::{Alphabet, Symbol},
    autom::Automaton,
    limits::{Budget, CapacityError, Limits, Stage},
};

/// An equivalence class of DFA states, one state of the minimized DFA
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    dfa_states: BTreeSet<usize>,
    edges: BTreeMap<Symbol, usize>,
}

impl Block {
    #[inline]
    #[must_use]
    pub fn dfa_states(&self) -> &BTreeSet<usize> { &self.dfa_states }

    #[inline]
    #[must_use]
    pub fn edges(&self) -> &BTreeMap<Symbol, usize> { &self.edges }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinDfa {
    blocks: Vec<Block>,
    start: usize,
    accept: BTreeSet<usize>,
}

impl MinDfa {
    #[inline]
    #[must_use]
    pub fn blocks(&self) -> &[Block] { &self.blocks }

    #[inline]
    #[must_use]
    pub fn block(&self, id: usize) -> &Block { &self.blocks[id] }

    #[inline]
    #[must_use]
    pub fn accepting(&self) -> &BTreeSet<usize> { &self.accept }
}

impl Automaton for MinDfa {
    #[inline]
    fn state_count(&self) -> usize { self.blocks.len() }

    #[inline]
    fn start(&self) -> usize { self.start }

    #[inline]
    fn edges(&self, state: usize) -> &BTreeMap<Symbol, usize> { &self.blocks[state].edges }

    #[inline]
    fn is_accepting(&self, state: usize) -> bool { self.accept.contains(&state) }
}

/// The current partition of DFA states into blocks
#[derive(Debug)]
struct Partition {
    blocks: Vec<BTreeSet<usize>>,
    owner: HashMap<usize, usize>,
    budget: Budget,
}

impl Partition {
    fn new<A: Automaton>(dfa: &A, budget: Budget) -> Result<Self, CapacityError> {
        let (accept, reject): (BTreeSet<_>, BTreeSet<_>) =
            (0..dfa.state_count()).partition(|&s| dfa.is_accepting(s));

        let mut me = Self {
            blocks: vec![],
            owner: HashMap::new(),
            budget,
        };

        for block in [accept, reject] {
            if !block.is_empty() {
                me.push(block)?;
            }
        }

        Ok(me)
    }

    fn push(&mut self, block: BTreeSet<usize>) -> Result<usize, CapacityError> {
        let id = self.budget.fresh(self.blocks.len())?;

        for &state in &block {
            self.owner.insert(state, id);
        }
        self.blocks.push(block);

        Ok(id)
    }

    /// Look up the block currently containing `state`.
    ///
    /// # Panics
    /// Every DFA state belongs to exactly one block at all times, so a miss
    /// means the partition was corrupted.
    fn block_of(&self, state: usize) -> usize {
        *self
            .owner
            .get(&state)
            .unwrap_or_else(|| panic!("DFA state {state} is not in any minimization block"))
    }

    /// Group the members of `block` by the block their `sym` transition
    /// leads into, with `None` standing for "no transition"
    fn classify<A: Automaton>(
        &self,
        dfa: &A,
        block: usize,
        sym: Symbol,
    ) -> Vec<(Option<usize>, BTreeSet<usize>)> {
        let mut groups: Vec<(Option<usize>, BTreeSet<usize>)> = vec![];

        for &state in &self.blocks[block] {
            let key = dfa.edges(state).get(&sym).map(|&t| self.block_of(t));

            if let Some((_, members)) = groups.iter_mut().find(|(k, _)| *k == key) {
                members.insert(state);
            } else {
                groups.push((key, BTreeSet::from([state])));
            }
        }

        groups
    }

    /// Split `block` on `sym`, returning whether it was split
    fn split<A: Automaton>(
        &mut self,
        dfa: &A,
        block: usize,
        sym: Symbol,
    ) -> Result<bool, CapacityError> {
        let mut groups = self.classify(dfa, block, sym);

        if groups.len() <= 1 {
            return Ok(false);
        }

        // The first group keeps the block's id
        for (key, members) in groups.drain(1..) {
            for state in &members {
                self.blocks[block].remove(state);
            }

            let id = self.push(members)?;
            tracing::trace!(block, %sym, ?key, new_block = id, "Split block");
        }

        Ok(true)
    }
}

/// Collapse transition-equivalent states of `dfa` into blocks
///
/// # Errors
/// Returns an error if refinement needs more blocks than
/// [`Limits::min_dfa_states`] allows.
///
/// # Panics
/// Panics if refinement loses track of a DFA state, which indicates a bug
/// rather than bad input.
pub fn run<A: Automaton>(
    dfa: &A,
    alphabet: &Alphabet,
    limits: &Limits,
) -> Result<MinDfa, CapacityError> {
    let _s = tracing::debug_span!("minimize").entered();
    let mut part = Partition::new(dfa, limits.budget(Stage::Minimize))?;

    let mut passes = 0_usize;
    loop {
        passes += 1;
        let mut any = false;

        // Blocks appended during this pass are visited in this pass too
        let mut block = 0;
        while block < part.blocks.len() {
            for &sym in alphabet {
                any |= part.split(dfa, block, sym)?;
            }

            block += 1;
        }

        if !any {
            break;
        }
    }

    let Partition { blocks, .. } = &part;

    let blocks: Vec<_> = blocks
        .iter()
        .map(|members| {
            let rep = *members
                .first()
                .unwrap_or_else(|| unreachable!("Refinement produced an empty block"));

            let edges: BTreeMap<_, _> = dfa
                .edges(rep)
                .iter()
                .map(|(&sym, &to)| (sym, part.block_of(to)))
                .collect();

            debug_assert!(members.iter().all(|&m| {
                dfa.edges(m)
                    .iter()
                    .map(|(&sym, &to)| (sym, part.block_of(to)))
                    .eq(edges.iter().map(|(&s, &t)| (s, t)))
            }));

            Block {
                dfa_states: members.clone(),
                edges,
            }
        })
        .collect();

    let start = part.block_of(dfa.start());
    let accept: BTreeSet<_> = blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.dfa_states.iter().any(|&s| dfa.is_accepting(s)))
        .map(|(i, _)| i)
        .collect();

    tracing::debug!(
        states = blocks.len(),
        from = dfa.state_count(),
        passes,
        "Minimized DFA"
    );

    Ok(MinDfa {
        blocks,
        start,
        accept,
    })
}
