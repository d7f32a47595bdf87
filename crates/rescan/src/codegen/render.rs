use std::fmt::{self, Display};

use super::{Arm, Lookahead, Mark, Scanner, StateCode};

const PRELUDE: &str = r"#![allow(
    unused_mut,
    unused_assignments,
    unreachable_code,
    unreachable_patterns
)]

use std::io::{self, BufWriter, Read, Write};
";

const INPUT: &str = r"
struct Input {
    buf: Vec<u8>,
    pos: usize,
}

impl Input {
    fn getc(&mut self) -> Option<char> {
        let c = self.buf.get(self.pos).copied()?;
        self.pos += 1;
        Some(char::from(c))
    }

    fn peek(&self) -> Option<char> { self.buf.get(self.pos).copied().map(char::from) }

    fn is_eof(&self) -> bool { self.pos >= self.buf.len() }
}
";

const CLASSIFY: &str = r#"
    if KEYWORDS.contains(&value.as_str()) {
        write!(out, "Keyword:{value} ")
    } else if is_identifier {
        write!(out, "ID:{value} ")
    } else if is_digit {
        write!(out, "Digit:{value} ")
    } else if is_annotation {
        Ok(())
    } else {
        write!(out, "{value} ")
    }
}
"#;

const MAIN: &str = r"
fn main() -> io::Result<()> {
    let mut buf = Vec::new();
    io::stdin().lock().read_to_end(&mut buf)?;

    let mut input = Input { buf, pos: 0 };
    let mut out = BufWriter::new(io::stdout().lock());

    while !input.is_eof() {
        scan_token(&mut input, &mut out)?;
    }

    out.flush()
}
";

/// A character set rendered as a match pattern, with consecutive runs
/// collapsed into ranges
struct Pattern(Vec<char>);

impl Pattern {
    fn new(chars: impl IntoIterator<Item = char>) -> Self {
        let mut chars: Vec<_> = chars.into_iter().collect();
        chars.sort_unstable();
        chars.dedup();
        Self(chars)
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = &*self.0;
        let mut first = true;

        while let Some(&lo) = rest.first() {
            let len = rest
                .iter()
                .zip(u32::from(lo)..)
                .take_while(|&(&c, n)| u32::from(c) == n)
                .count();
            let hi = rest[len - 1];
            rest = &rest[len..];

            if !first {
                f.write_str(" | ")?;
            }
            first = false;

            match len {
                1 => write!(f, "{lo:?}")?,
                2 => write!(f, "{lo:?} | {hi:?}")?,
                _ => write!(f, "{lo:?}..={hi:?}")?,
            }
        }

        Ok(())
    }
}

impl Display for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            chars,
            target,
            mark,
        } = self;

        write!(f, "            {} => ", Pattern::new(chars.iter().copied()))?;

        match mark {
            Some(Mark::Identifier) => writeln!(f, "{{ is_identifier = true; {target} }},"),
            Some(Mark::Digit) => writeln!(f, "{{ is_digit = true; {target} }},"),
            None => writeln!(f, "{target},"),
        }
    }
}

impl Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { id, arms, fallback } = self;

        writeln!(f, "        {id} => match c {{")?;

        for arm in arms {
            write!(f, "{arm}")?;
        }

        if let Some(target) = fallback {
            writeln!(f, "            _ => {{ is_annotation = true; {target} }},")?;
        } else {
            writeln!(f, "            _ => break,")?;
        }

        writeln!(f, "        }},")
    }
}

impl Display for Lookahead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            state,
            chars,
            identifier,
        } = self;

        let done = if chars.is_empty() {
            "true".to_owned()
        } else {
            format!(
                "!matches!(input.peek(), Some({}))",
                Pattern::new(chars.iter().copied())
            )
        };

        if *identifier {
            writeln!(f, "        {state} => {{")?;
            writeln!(f, "            let done = {done};")?;
            writeln!(f, "            is_identifier |= done;")?;
            writeln!(f, "            done")?;
            writeln!(f, "        }},")
        } else {
            writeln!(f, "        {state} => {done},")
        }
    }
}

impl Display for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            start,
            keywords,
            states,
            lookaheads,
        } = self;

        writeln!(f, "// @generated by re2scan")?;
        writeln!(f)?;
        f.write_str(PRELUDE)?;
        writeln!(f)?;

        f.write_str("const KEYWORDS: &[&str] = &[")?;
        for (i, kw) in keywords.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{kw:?}")?;
        }
        writeln!(f, "];")?;
        writeln!(f, "const START: usize = {start};")?;

        f.write_str(INPUT)?;

        writeln!(f)?;
        writeln!(
            f,
            "fn scan_token(input: &mut Input, out: &mut impl Write) -> io::Result<()> {{"
        )?;
        writeln!(f, "    let Some(c) = input.peek() else {{ return Ok(()) }};")?;
        writeln!(f, "    if matches!(c, ' ' | '\\t' | '\\n') {{")?;
        writeln!(f, "        input.getc();")?;
        writeln!(f, "        return write!(out, \"{{c}}\");")?;
        writeln!(f, "    }}")?;
        writeln!(f)?;
        writeln!(f, "    let mut state = START;")?;
        writeln!(f, "    let mut value = String::new();")?;
        writeln!(f, "    let mut is_identifier = false;")?;
        writeln!(f, "    let mut is_digit = false;")?;
        writeln!(f, "    let mut is_annotation = false;")?;
        writeln!(f)?;
        writeln!(f, "    while let Some(c) = input.getc() {{")?;
        writeln!(f, "        value.push(c);")?;
        writeln!(f)?;
        writeln!(f, "        state = match state {{")?;

        for state in states {
            write!(f, "{state}")?;
        }

        writeln!(f, "        _ => break,")?;
        writeln!(f, "        }};")?;
        writeln!(f)?;
        writeln!(f, "        let done = match state {{")?;

        for la in lookaheads {
            write!(f, "{la}")?;
        }

        writeln!(f, "        _ => false,")?;
        writeln!(f, "        }};")?;
        writeln!(f)?;
        writeln!(f, "        if done {{")?;
        writeln!(f, "            break;")?;
        writeln!(f, "        }}")?;
        writeln!(f, "    }}")?;

        f.write_str(CLASSIFY)?;
        f.write_str(MAIN)
    }
}

#[cfg(test)]
mod test {
    use std::{
        fs,
        io::Write,
        process::{Command, Stdio},
    };

    use super::Pattern;
    use crate::{codegen::Keywords, limits::Limits};

    fn render(re: &str, keywords: &str) -> String {
        crate::generate(re, &Keywords::parse(keywords), &Limits::default()).unwrap()
    }

    #[test]
    fn patterns() {
        assert_eq!(Pattern::new(['x']).to_string(), "'x'");
        assert_eq!(Pattern::new(['b', 'a']).to_string(), "'a' | 'b'");
        assert_eq!(
            Pattern::new(('a'..='z').chain('0'..='9').chain(['_'])).to_string(),
            "'0'..='9' | '_' | 'a'..='z'"
        );
        assert_eq!(Pattern::new(['\'', '\n']).to_string(), r"'\n' | '\''");
    }

    #[test]
    fn keywords_table() {
        let src = render(r"\letter\+", "if|else");
        assert!(src.contains(r#"const KEYWORDS: &[&str] = &["if", "else"];"#));

        let src = render("a", "");
        assert!(src.contains("const KEYWORDS: &[&str] = &[];"));
    }

    #[test]
    fn state_machine() {
        let src = render(r"\letter\(\letter\|\digit\)*", "");

        assert!(src.starts_with("// @generated"));
        assert!(src.contains("const START: usize = "));
        assert!(src.contains("'A'..='Z' | 'a'..='z' => { is_identifier = true; "));
        assert!(src.contains("'0'..='9' => { is_digit = true; "));
        assert!(src.contains(
            "let done = !matches!(input.peek(), Some('0'..='9' | 'A'..='Z' | 'a'..='z'));"
        ));
        assert!(src.contains("is_identifier |= done;"));
        assert!(src.contains("fn main() -> io::Result<()>"));
        assert!(!src.contains("is_annotation = true"));
    }

    #[test]
    fn fallback_branch() {
        let src = render("{~*}", "");

        assert!(src.contains("_ => { is_annotation = true; "));
        assert!(src.contains("'}' => "));
    }

    #[test]
    fn whitespace_echo() {
        let src = render("a", "");
        assert!(src.contains(r"if matches!(c, ' ' | '\t' | '\n') {"));
        assert!(src.contains(r#"return write!(out, "{c}");"#));
    }

    #[test]
    fn fallback_never_continues_lookahead() {
        let src = render("a~*", "");

        assert!(!src.contains("is_eof(),"));
        assert!(src.contains(" => true,"));
    }

    /// Compile the rendered scanner with `rustc` and feed it `input`
    fn scan(name: &str, re: &str, keywords: &str, input: &str) -> String {
        let dir = std::env::temp_dir().join(format!("rescan-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let src = dir.join("scanner.rs");
        let bin = dir.join("scanner");
        fs::write(&src, render(re, keywords)).unwrap();

        let status = Command::new("rustc")
            .args(["--edition", "2021", "-o"])
            .arg(&bin)
            .arg(&src)
            .status()
            .unwrap();
        assert!(status.success(), "generated scanner for {re:?} failed to compile");

        let mut child = Command::new(&bin)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();
        child
            .stdin
            .take()
            .unwrap()
            .write_all(input.as_bytes())
            .unwrap();
        let out = child.wait_with_output().unwrap();
        assert!(out.status.success());

        fs::remove_dir_all(&dir).unwrap();
        String::from_utf8(out.stdout).unwrap()
    }

    #[test]
    #[ignore = "invokes rustc"]
    fn compiled_scanner() {
        let ident = r"\letter\(\letter\|\digit\)*";

        assert_eq!(scan("ident", ident, "", "foo1 bar"), "ID:foo1  ID:bar ");
        assert_eq!(scan("keyword", ident, "if", "if x"), "Keyword:if  ID:x ");
        assert_eq!(
            scan("digit", r"\digit\+|\letter\+", "", "42\tabc\n7"),
            "Digit:42 \tID:abc \nDigit:7 "
        );
        assert_eq!(scan("ops", "<=|<|=", "", "<= < ="), "<=  <  = ");
        assert_eq!(
            scan("comment", r"{~*}|\letter\+", "", "a{ note }b"),
            "ID:a ID:b "
        );
        assert_eq!(scan("fallback", "a~*", "", "abc def"), "a b c  d e f ");
        assert_eq!(scan("stuck", "ab", "", "ax?"), "ax ? ");
        assert_eq!(scan("letter-edge", r"x\letter\*", "", "x"), "ID:x ");
    }
}
