//! State-count bounds for each stage of a compilation

use std::fmt;

/// A stage of the regex-to-scanner pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Parse,
    Nfa,
    Dfa,
    Minimize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Parse => "regex parsing",
            Self::Nfa => "NFA construction",
            Self::Dfa => "subset construction",
            Self::Minimize => "DFA minimization",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{stage} needs more than the configured maximum of {limit} states")]
pub struct CapacityError {
    pub stage: Stage,
    pub limit: usize,
}

/// Upper bounds on the number of states allocated by each automaton stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub nfa_states: usize,
    pub dfa_states: usize,
    pub min_dfa_states: usize,
}

impl Limits {
    pub const DEFAULT_STATES: usize = 1024;

    #[must_use]
    pub const fn uniform(states: usize) -> Self {
        Self {
            nfa_states: states,
            dfa_states: states,
            min_dfa_states: states,
        }
    }

    #[inline]
    pub(crate) fn budget(&self, stage: Stage) -> Budget {
        Budget {
            stage,
            limit: match stage {
                Stage::Parse | Stage::Nfa => self.nfa_states,
                Stage::Dfa => self.dfa_states,
                Stage::Minimize => self.min_dfa_states,
            },
        }
    }
}

impl Default for Limits {
    fn default() -> Self { Self::uniform(Self::DEFAULT_STATES) }
}

/// Capacity guard for a monotonic, index-addressed arena
#[derive(Debug, Clone, Copy)]
pub(crate) struct Budget {
    stage: Stage,
    limit: usize,
}

impl Budget {
    /// Returns the id the next allocation will receive, given the number of
    /// states allocated so far
    pub fn fresh(self, len: usize) -> Result<usize, CapacityError> {
        if len < self.limit {
            Ok(len)
        } else {
            Err(CapacityError {
                stage: self.stage,
                limit: self.limit,
            })
        }
    }
}
