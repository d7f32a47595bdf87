//! Convert a regular expression to a maximal-munch scanner program

#![deny(
    clippy::disallowed_methods,
    clippy::suspicious,
    clippy::style,
    clippy::clone_on_ref_ptr,
    missing_debug_implementations,
    missing_copy_implementations
)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

fn main() { entry::main(); }

mod entry {
    use std::{fs, io::prelude::*, path::PathBuf};

    use anyhow::{Context, Result};
    use clap::Parser;
    use rescan::{Compilation, autom::Automaton, codegen::Keywords, limits::Limits};
    use tracing_subscriber::{filter::LevelFilter, prelude::*};

    #[derive(Debug, Parser)]
    #[command(version, author, about)]
    struct Opts {
        /// Print more verbose logs
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,

        /// Words to tag as keywords, separated by '|', ',' or whitespace
        #[arg(short, long, env = "RESCAN_KEYWORDS", conflicts_with = "keyword_file")]
        keywords: Option<String>,

        /// Read the keyword list from a file
        #[arg(long)]
        keyword_file: Option<PathBuf>,

        /// Write the generated scanner here instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum number of states each automaton stage may allocate
        #[arg(long, env = "RESCAN_MAX_STATES", default_value_t = Limits::DEFAULT_STATES)]
        max_states: usize,

        /// Log the alphabet and state tables of every stage
        #[arg(long)]
        summary: bool,

        /// The token expression to compile
        regex: String,
    }

    #[inline]
    pub fn main() {
        let opts = Opts::parse();

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(match (cfg!(debug_assertions), opts.verbose) {
                (false, 0) => LevelFilter::INFO,
                (false, 1) | (true, 0) => LevelFilter::DEBUG,
                _ => LevelFilter::TRACE,
            })
            .init();

        tracing::debug!("{opts:#?}");

        std::process::exit(run(opts).map_or_else(
            |e| {
                tracing::error!("{e:?}");
                1
            },
            |()| 0,
        ));
    }

    #[inline]
    fn run(
        Opts {
            verbose: _,
            keywords,
            keyword_file,
            output,
            max_states,
            summary,
            regex,
        }: Opts,
    ) -> Result<()> {
        let keywords = if let Some(path) = keyword_file {
            let s = fs::read_to_string(&path)
                .with_context(|| format!("Error reading keyword file {}", path.display()))?;
            Keywords::parse(&s)
        } else {
            keywords.as_deref().map(Keywords::parse).unwrap_or_default()
        };

        let comp = rescan::compile(&regex, &Limits::uniform(max_states))
            .with_context(|| format!("Error compiling {regex:?}"))?;

        if summary {
            log_summary(&comp);
        }

        let src = comp.scanner(&keywords).to_string();

        if let Some(path) = output {
            fs::write(&path, src)
                .with_context(|| format!("Error writing scanner to {}", path.display()))?;
        } else {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(src.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Error writing scanner to stdout")?;
        }

        Ok(())
    }

    fn log_summary(comp: &Compilation) {
        let nfa = comp.nfa();
        tracing::info!(
            alphabet = %comp.alphabet(),
            states = nfa.len(),
            start = nfa.start(),
            end = nfa.end(),
            "NFA"
        );

        let dfa = comp.dfa();
        tracing::info!(
            states = dfa.state_count(),
            accepting = ?dfa.accepting(),
            "DFA"
        );
        for (id, state) in dfa.states().iter().enumerate() {
            tracing::info!(
                id,
                nfa_states = ?state.nfa_states(),
                transitions = state.edges().len(),
                "DFA state"
            );
        }

        let min = comp.min_dfa();
        tracing::info!(
            states = min.state_count(),
            start = min.start(),
            accepting = ?min.accepting(),
            "Minimized DFA"
        );
        for (id, block) in min.blocks().iter().enumerate() {
            tracing::info!(
                id,
                dfa_states = ?block.dfa_states(),
                transitions = block.edges().len(),
                "Minimized DFA state"
            );
        }
    }
}
