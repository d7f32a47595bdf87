use arbitrary::Arbitrary;
use rescan::{Error, alphabet::Symbol, autom::Automaton, codegen::Keywords, limits::Limits};

const LIMITS: Limits = Limits::uniform(256);

#[derive(Debug, Clone, Copy, Arbitrary)]
pub enum Lit {
    A,
    B,
    C,
    Letter,
    Digit,
    Fallback,
}

impl Lit {
    fn as_str(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::Letter => r"\letter\",
            Self::Digit => r"\digit\",
            Self::Fallback => "~",
        }
    }

    fn symbol(self) -> Symbol {
        match self {
            Self::A => Symbol::Char('a'),
            Self::B => Symbol::Char('b'),
            Self::C => Symbol::Char('c'),
            Self::Letter => Symbol::Letter,
            Self::Digit => Symbol::Digit,
            Self::Fallback => Symbol::Fallback,
        }
    }
}

/// A well-formed expression tree
#[derive(Debug, Clone, Arbitrary)]
pub enum Regex {
    Lit(Lit),
    Alt(Box<Regex>, Box<Regex>),
    Cat(Box<Regex>, Box<Regex>),
    Star(Box<Regex>),
    Plus(Box<Regex>),
    Opt(Box<Regex>),
}

impl Regex {
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Lit(l) => l.as_str().into(),
            Self::Alt(l, r) => format!("({}|{})", l.render(), r.render()),
            Self::Cat(l, r) => format!("({})({})", l.render(), r.render()),
            Self::Star(r) => format!("({})*", r.render()),
            Self::Plus(r) => format!("({})+", r.render()),
            Self::Opt(r) => format!("({})?", r.render()),
        }
    }
}

/// Arbitrary text must either compile or fail cleanly
pub fn run_text(s: &str) {
    match rescan::generate(s, &Keywords::default(), &LIMITS) {
        Ok(src) => assert!(src.contains("fn scan_token(")),
        Err(Error::Parse(_) | Error::Capacity(_)) => (),
    }
}

/// Every stage of a well-formed expression must agree on its language
pub fn run_differential(re: &Regex, inputs: &[Vec<Lit>]) {
    let s = re.render();
    let comp = match rescan::compile(&s, &LIMITS) {
        Ok(c) => c,
        Err(Error::Capacity(_)) => return,
        Err(e) => panic!("{s:?} failed to compile: {e}"),
    };

    for input in inputs {
        let syms = || input.iter().map(|l| l.symbol());
        let nfa = comp.nfa().accepts_symbols(syms());

        assert_eq!(nfa, comp.dfa().accepts_symbols(syms()), "{s:?} on {input:?}");
        assert_eq!(nfa, comp.min_dfa().accepts_symbols(syms()), "{s:?} on {input:?}");
    }

    let again = rescan::dfa::minimize::run(comp.min_dfa(), comp.alphabet(), &LIMITS)
        .unwrap_or_else(|e| panic!("{s:?} failed to re-minimize: {e}"));
    assert_eq!(again.state_count(), comp.min_dfa().state_count(), "{s:?}");
}
