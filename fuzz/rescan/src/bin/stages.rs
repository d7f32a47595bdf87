use fuzz_rescan::regex::{Lit, Regex, run_differential};

fn main() {
    afl::fuzz!(|data: (Regex, Vec<Vec<Lit>>)| {
        let (re, inputs) = data;
        run_differential(&re, &inputs);
    });
}
