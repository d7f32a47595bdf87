use super::syntax::{Op, ParseError, Token, Tokens};
use crate::{
    Error,
    alphabet::Alphabet,
    limits::{Budget, CapacityError, Limits, Stage},
    nfa::{Fragment, Nfa},
};

#[derive(Debug, Clone, Copy)]
enum StackOp {
    Op(Op, usize),
    /// An open group, remembering how many operands were below it
    LPar { pos: usize, depth: usize },
}

/// Operator-precedence evaluator turning a regex into a Thompson NFA
#[derive(Debug)]
pub struct NfaBuilder {
    nfa: Nfa,
    alphabet: Alphabet,
    budget: Budget,
    operands: Vec<Fragment>,
    ops: Vec<StackOp>,
}

impl NfaBuilder {
    fn new(limits: &Limits) -> Self {
        Self {
            nfa: Nfa::empty(),
            alphabet: Alphabet::new(),
            budget: limits.budget(Stage::Nfa),
            operands: vec![],
            ops: vec![],
        }
    }

    pub fn build(s: &str, limits: &Limits) -> Result<(Nfa, Alphabet), Error> {
        if s.is_empty() {
            return Err(ParseError::Empty.into());
        }

        let mut me = Self::new(limits);
        for tok in Tokens::new(s) {
            let (pos, tok) = tok?;
            me.shift(pos, tok)?;
        }

        me.finish()
    }

    #[inline]
    fn fresh(&mut self) -> Result<usize, CapacityError> {
        self.budget.fresh(self.nfa.len())?;
        Ok(self.nfa.push())
    }

    #[inline]
    fn fresh_pair(&mut self) -> Result<Fragment, CapacityError> {
        let start = self.fresh()?;
        let end = self.fresh()?;
        Ok(Fragment { start, end })
    }

    /// Number of operands belonging to enclosing groups, which no operator
    /// inside the innermost open group may consume
    fn floor(&self) -> usize {
        self.ops
            .iter()
            .rev()
            .find_map(|o| match *o {
                StackOp::LPar { depth, .. } => Some(depth),
                StackOp::Op(..) => None,
            })
            .unwrap_or(0)
    }

    fn shift(&mut self, pos: usize, tok: Token) -> Result<(), Error> {
        match tok {
            Token::Lit(sym) => {
                self.alphabet.insert(sym);
                let frag = self.fresh_pair()?;
                self.nfa.connect(frag.start, frag.end, sym);
                self.operands.push(frag);
            },
            Token::Op(op) if op.is_postfix() => self.apply(op, pos)?,
            Token::Op(op) => {
                while let Some(&StackOp::Op(top, top_pos)) = self.ops.last()
                    && top.precedence() >= op.precedence()
                {
                    self.ops.pop();
                    self.apply(top, top_pos)?;
                }

                self.ops.push(StackOp::Op(op, pos));
            },
            Token::LPar => self.ops.push(StackOp::LPar {
                pos,
                depth: self.operands.len(),
            }),
            Token::RPar => loop {
                match self.ops.pop() {
                    Some(StackOp::Op(op, op_pos)) => self.apply(op, op_pos)?,
                    Some(StackOp::LPar { pos: open, depth }) => {
                        if self.operands.len() == depth {
                            return Err(ParseError::EmptyGroup(open).into());
                        }

                        break;
                    },
                    None => return Err(ParseError::TrailingParen(pos).into()),
                }
            },
        }

        Ok(())
    }

    #[inline]
    fn pop(&mut self) -> Fragment { self.operands.pop().unwrap_or_else(|| unreachable!()) }

    fn apply(&mut self, op: Op, pos: usize) -> Result<(), Error> {
        if self.operands.len() < self.floor() + op.arity() {
            return Err(ParseError::MissingOperand(op, pos).into());
        }

        let n1 = self.pop();

        let frag = match op {
            Op::Alt => {
                let n2 = self.pop();
                let frag = self.fresh_pair()?;
                self.nfa.connect_eps(frag.start, n2.start);
                self.nfa.connect_eps(frag.start, n1.start);
                self.nfa.connect_eps(n2.end, frag.end);
                self.nfa.connect_eps(n1.end, frag.end);
                frag
            },
            Op::Cat => {
                let n2 = self.pop();
                self.nfa.connect_eps(n2.end, n1.start);
                Fragment {
                    start: n2.start,
                    end: n1.end,
                }
            },
            Op::Star => {
                let frag = self.fresh_pair()?;
                self.nfa.connect_eps(frag.start, n1.start);
                self.nfa.connect_eps(frag.start, frag.end);
                self.nfa.connect_eps(n1.end, n1.start);
                self.nfa.connect_eps(n1.end, frag.end);
                frag
            },
            Op::Plus => {
                let end = self.fresh()?;
                self.nfa.connect_eps(n1.end, n1.start);
                self.nfa.connect_eps(n1.end, end);
                Fragment {
                    start: n1.start,
                    end,
                }
            },
            Op::Opt => {
                let start = self.fresh()?;
                self.nfa.connect_eps(start, n1.start);
                self.nfa.connect_eps(start, n1.end);
                Fragment { start, end: n1.end }
            },
        };

        self.operands.push(frag);
        Ok(())
    }

    fn finish(mut self) -> Result<(Nfa, Alphabet), Error> {
        while let Some(op) = self.ops.pop() {
            match op {
                StackOp::Op(op, pos) => self.apply(op, pos)?,
                StackOp::LPar { pos, .. } => return Err(ParseError::UnclosedParen(pos).into()),
            }
        }

        match *self.operands {
            [frag] => Ok((self.nfa.finish(frag), self.alphabet)),
            [] => Err(ParseError::Empty.into()),
            ref rest => Err(ParseError::Dangling(rest.len()).into()),
        }
    }
}
