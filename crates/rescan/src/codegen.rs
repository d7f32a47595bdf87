//! Scanner code generation
//!
//! The minimized DFA is first lowered to a [`Scanner`], a small structured
//! description of the branch tables of the token-scanning program, which is
//! then rendered to Rust source through its [`Display`](std::fmt::Display)
//! implementation.

use std::collections::BTreeSet;

pub use self::keywords::Keywords;
use crate::{alphabet::Symbol, autom::Automaton, dfa::minimize::MinDfa};

mod keywords;
mod render;

/// Classification flag raised when a branch is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mark {
    Identifier,
    Digit,
}

/// A set of characters that all move the scanner to `target`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arm {
    pub chars: Vec<char>,
    pub target: usize,
    pub mark: Option<Mark>,
}

/// The dispatch table of one minimized state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateCode {
    pub id: usize,
    pub arms: Vec<Arm>,
    /// Target of the branch taken by any unlisted character; taking it marks
    /// the lexeme as an annotation
    pub fallback: Option<usize>,
}

impl StateCode {
    fn new(id: usize, dfa: &MinDfa) -> Self {
        let edges = dfa.edges(id);
        let mut claimed = BTreeSet::new();
        let mut arms = vec![];

        // Concrete characters first so the class arms only get what's left
        let order = edges
            .iter()
            .filter(|(s, _)| matches!(s, Symbol::Char(_)))
            .chain(edges.iter().filter(|(s, _)| matches!(s, Symbol::Letter | Symbol::Digit)));

        for (&sym, &target) in order {
            let chars: Vec<_> = sym
                .chars()
                .unwrap_or_else(|| unreachable!())
                .into_iter()
                .filter(|&c| claimed.insert(c))
                .collect();

            if chars.is_empty() {
                continue;
            }

            arms.push(Arm {
                chars,
                target,
                mark: match sym {
                    Symbol::Letter => Some(Mark::Identifier),
                    Symbol::Digit => Some(Mark::Digit),
                    Symbol::Char(_) | Symbol::Fallback => None,
                },
            });
        }

        Self {
            id,
            arms,
            fallback: edges.get(&Symbol::Fallback).copied(),
        }
    }

    /// Where the character `c` leads from this state
    #[must_use]
    pub fn step(&self, c: char) -> Option<(usize, Option<Mark>, bool)> {
        self.arms
            .iter()
            .find(|a| a.chars.contains(&c))
            .map(|a| (a.target, a.mark, false))
            .or_else(|| self.fallback.map(|t| (t, None, true)))
    }
}

/// The maximal-munch check run after entering an accepting state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookahead {
    pub state: usize,
    /// Characters that continue the token.  The fallback branch never does.
    pub chars: Vec<char>,
    /// Whether ending the token here marks it as an identifier, which happens
    /// when the state has a letter edge
    pub identifier: bool,
}

impl Lookahead {
    /// Whether the token continues given the next input character
    #[must_use]
    pub fn continues(&self, next: Option<char>) -> bool {
        next.is_some_and(|c| self.chars.contains(&c))
    }
}

/// Intermediate representation of a generated single-token scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scanner {
    start: usize,
    keywords: Keywords,
    states: Vec<StateCode>,
    lookaheads: Vec<Lookahead>,
}

impl Scanner {
    #[must_use]
    pub fn new(dfa: &MinDfa, keywords: &Keywords) -> Self {
        let _s = tracing::debug_span!("lower_scanner").entered();

        let states: Vec<_> = (0..dfa.state_count())
            .map(|i| StateCode::new(i, dfa))
            .filter(|s| !s.arms.is_empty() || s.fallback.is_some())
            .collect();

        let lookaheads = dfa
            .accepting()
            .iter()
            .map(|&state| {
                let code = states.iter().find(|s| s.id == state);

                Lookahead {
                    state,
                    chars: code
                        .into_iter()
                        .flat_map(|s| &s.arms)
                        .flat_map(|a| a.chars.iter().copied())
                        .collect(),
                    identifier: dfa.edges(state).contains_key(&Symbol::Letter),
                }
            })
            .collect();

        tracing::debug!(
            states = states.len(),
            keywords = keywords.len(),
            "Lowered scanner"
        );

        Self {
            start: dfa.start(),
            keywords: keywords.clone(),
            states,
            lookaheads,
        }
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> usize { self.start }

    #[inline]
    #[must_use]
    pub fn keywords(&self) -> &Keywords { &self.keywords }

    #[inline]
    #[must_use]
    pub fn states(&self) -> &[StateCode] { &self.states }

    #[inline]
    #[must_use]
    pub fn lookaheads(&self) -> &[Lookahead] { &self.lookaheads }

    #[inline]
    #[must_use]
    pub fn state(&self, id: usize) -> Option<&StateCode> { self.states.iter().find(|s| s.id == id) }

    #[inline]
    #[must_use]
    pub fn lookahead(&self, state: usize) -> Option<&Lookahead> {
        self.lookaheads.iter().find(|l| l.state == state)
    }
}

#[cfg(test)]
mod test {
    use super::{Keywords, Mark, Scanner};
    use crate::limits::Limits;

    /// Mirror of the control flow emitted by the renderer, run directly on
    /// the IR
    fn run(scanner: &Scanner, input: &str) -> String {
        let chars: Vec<char> = input.chars().collect();
        let mut pos = 0;
        let mut out = String::new();

        while pos < chars.len() {
            let c = chars[pos];
            if matches!(c, ' ' | '\t' | '\n') {
                out.push(c);
                pos += 1;
                continue;
            }

            let mut state = scanner.start();
            let mut value = String::new();
            let (mut ident, mut digit, mut annotation) = (false, false, false);

            while let Some(&c) = chars.get(pos) {
                pos += 1;
                value.push(c);

                let Some((next, mark, fallback)) = scanner.state(state).and_then(|s| s.step(c))
                else {
                    break;
                };

                state = next;
                match mark {
                    Some(Mark::Identifier) => ident = true,
                    Some(Mark::Digit) => digit = true,
                    None => (),
                }
                annotation |= fallback;

                if let Some(la) = scanner.lookahead(state)
                    && !la.continues(chars.get(pos).copied())
                {
                    ident |= la.identifier;
                    break;
                }
            }

            if scanner.keywords().contains(&value) {
                out.push_str(&format!("Keyword:{value} "));
            } else if ident {
                out.push_str(&format!("ID:{value} "));
            } else if digit {
                out.push_str(&format!("Digit:{value} "));
            } else if !annotation {
                out.push_str(&format!("{value} "));
            }
        }

        out
    }

    fn scanner(re: &str, keywords: &str) -> Scanner {
        let comp = crate::compile(re, &Limits::default()).unwrap();
        comp.scanner(&Keywords::parse(keywords))
    }

    #[test]
    fn identifiers() {
        let s = scanner(r"\letter\(\letter\|\digit\)*", "");
        assert_eq!(run(&s, "foo1 bar"), "ID:foo1  ID:bar ");
    }

    #[test]
    fn keyword_beats_identifier() {
        let s = scanner(r"\letter\(\letter\|\digit\)*", "if");
        assert_eq!(run(&s, "if x"), "Keyword:if  ID:x ");
        assert_eq!(run(&s, "iffy"), "ID:iffy ");
    }

    #[test]
    fn digits() {
        let s = scanner(r"\digit\+|\letter\+", "");
        assert_eq!(run(&s, "42\tabc\n7"), "Digit:42 \tID:abc \nDigit:7 ");
    }

    #[test]
    fn operators_untagged() {
        let s = scanner("<=|<|=", "");
        assert_eq!(run(&s, "<= < ="), "<=  <  = ");
        assert_eq!(run(&s, "<<"), "< < ");
    }

    #[test]
    fn annotations_suppressed() {
        // Brace comments with an arbitrary body
        let s = scanner(r"{~*}|\letter\+", "");
        assert_eq!(run(&s, "a{ note }b"), "ID:a ID:b ");
    }

    #[test]
    fn stuck_characters_make_progress() {
        let s = scanner("ab", "");
        assert_eq!(run(&s, "ax"), "ax ");
        assert_eq!(run(&s, "?"), "? ");
        assert_eq!(run(&s, "a"), "a ");
    }

    #[test]
    fn class_arms_skip_claimed_chars() {
        let s = scanner(r"\letter\|x1", "");
        let start = s.state(s.start()).unwrap();

        assert_eq!(start.arms.len(), 2);
        assert_eq!(start.arms[0].chars, ['x']);
        assert_eq!(start.arms[0].mark, None);

        let letters = &start.arms[1];
        assert_eq!(letters.chars.len(), 51);
        assert!(!letters.chars.contains(&'x'));
        assert_eq!(letters.mark, Some(Mark::Identifier));
        assert_ne!(letters.target, start.arms[0].target);
        assert!(start.fallback.is_none());
    }

    #[test]
    fn lookahead_per_accepting_state() {
        let s = scanner(r"a~*|b", "");

        assert_eq!(s.lookaheads().len(), 2);
        assert!(s.lookaheads().iter().all(|l| l.chars.is_empty()));
        assert!(s.lookaheads().iter().all(|l| !l.identifier));
        assert!(s.lookaheads().iter().all(|l| !l.continues(Some('x'))));
        assert!(s.lookaheads().iter().all(|l| !l.continues(None)));
    }

    #[test]
    fn fallback_does_not_extend_accepted_token() {
        let s = scanner("a~*", "");
        assert_eq!(run(&s, "abc def"), "a b c  d e f ");

        let s = scanner(r"//~*|\letter\+", "");
        assert_eq!(run(&s, "// hi\nx"), "//  ID:hi \nID:x ");
    }

    #[test]
    fn lookahead_marks_identifier() {
        let s = scanner(r"x\letter\*", "");

        assert!(s.lookahead(s.state(s.start()).unwrap().arms[0].target).unwrap().identifier);
        assert_eq!(run(&s, "x"), "ID:x ");
        assert_eq!(run(&s, "xy 1"), "ID:xy  1 ");
    }
}
