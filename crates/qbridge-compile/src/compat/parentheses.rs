//! Redundant parentheses around numeric gate parameters.

use std::sync::OnceLock;

use regex::Regex;

fn gate_params_re() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"^(\s*(?:[A-Za-z_][A-Za-z0-9_]*\s*(?:\([^()]*\))?\s*@\s*)*[A-Za-z_][A-Za-z0-9_]*\s*)\((.*)\)(\s+[^;]*;.*)$")
            .unwrap()
    })
}

fn doubled_re() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"\(\s*\(\s*(-?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)\s*\)\s*\)")
            .unwrap()
    })
}

fn negated_re() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"-\s*\(\s*((?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)\s*\)")
            .unwrap()
    })
}

/// Whether any gate parameter list contains `((num))` or `-(num)`.
pub fn has_redundant_parentheses(qasm: &str) -> bool {
    qasm.lines().any(|line| {
        gate_params_re().captures(line).is_some_and(|caps| {
            let params = &caps[2];
            doubled_re().is_match(params) || negated_re().is_match(params)
        })
    })
}

/// Rewrite `((num))` to `(num)` and `-(num)` to `-num` inside gate parameter
/// lists, line by line. Lines that are not gate calls are copied verbatim.
pub fn simplify_parentheses(qasm: &str) -> String {
    let mut out = String::with_capacity(qasm.len());

    for (i, line) in qasm.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match gate_params_re().captures(line) {
            Some(caps) => {
                let params = simplify_params(&caps[2]);
                out.push_str(&caps[1]);
                out.push('(');
                out.push_str(&params);
                out.push(')');
                out.push_str(&caps[3]);
            }
            None => out.push_str(line),
        }
    }

    out
}

fn simplify_params(params: &str) -> String {
    let mut current = params.to_string();
    loop {
        let next = doubled_re().replace_all(&current, "($1)");
        let next = negated_re().replace_all(&next, "-$1").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubled_parentheses() {
        assert_eq!(
            simplify_parentheses("rx(((0.5))) q[0];"),
            "rx((0.5)) q[0];"
        );
        assert_eq!(
            simplify_parentheses("u(((1)), 0, ((-2))) q[0];"),
            "u((1), 0, (-2)) q[0];"
        );
    }

    #[test]
    fn test_negated_parentheses() {
        assert_eq!(simplify_parentheses("rz(-(0.25)) q[0];"), "rz(-0.25) q[0];");
        assert_eq!(simplify_parentheses("rz(-((3))) q[0];"), "rz(-3) q[0];");
    }

    #[test]
    fn test_other_lines_untouched() {
        let qasm = "OPENQASM 3.0;\nqubit[2] q;\nx = -(1);\nh q[0];\n";
        assert_eq!(simplify_parentheses(qasm), qasm);
        assert!(!has_redundant_parentheses(qasm));
    }

    #[test]
    fn test_detection() {
        assert!(has_redundant_parentheses("OPENQASM 3.0;\nrz(-(1)) q;\n"));
        assert!(has_redundant_parentheses("ctrl @ rz(((1))) q[0], q[1];"));
        assert!(!has_redundant_parentheses("rz(-1) q;\nrz((a)) q;"));
    }
}
