//! 3.x declaration and measurement syntax rewritten to 2.x.

use std::sync::OnceLock;

use regex::{Captures, Regex};

fn declaration_re() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"(?m)^([ \t]*)(qubit|bit)(?:\s*\[\s*([0-9]+)\s*\])?\s+([A-Za-z_][A-Za-z0-9_]*)\s*;")
            .unwrap()
    })
}

fn measure_assignment_re() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"(?m)^([ \t]*)([A-Za-z_][A-Za-z0-9_]*(?:\s*\[[^\]]*\])?)\s*=\s*measure\s+([^;]+?)\s*;")
            .unwrap()
    })
}

/// Rewrite `qubit[n] q;` to `qreg q[n];`, `bit[n] c;` to `creg c[n];` and
/// `c = measure q;` to `measure q -> c;`. Unsized declarations become
/// one-element registers.
pub fn declarations_to_qasm2(qasm: &str) -> String {
    let declared = declaration_re().replace_all(qasm, |caps: &Captures<'_>| {
        let keyword = if &caps[2] == "qubit" { "qreg" } else { "creg" };
        let size = caps.get(3).map_or("1", |m| m.as_str());
        format!("{}{keyword} {}[{size}];", &caps[1], &caps[4])
    });

    measure_assignment_re()
        .replace_all(&declared, |caps: &Captures<'_>| {
            format!("{}measure {} -> {};", &caps[1], &caps[3], &caps[2])
        })
        .into_owned()
}
