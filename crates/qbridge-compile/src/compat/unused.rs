//! Removal of gate definitions nothing uses.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

fn definition_re() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(r"(?m)(?:^|[;}])([ \t]*(gate|opaque)[ \t]+([A-Za-z_][A-Za-z0-9_]*))").unwrap()
    })
}

/// A `gate`/`opaque` definition located in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDefinition {
    pub name: String,
    /// Byte range of the whole definition, including a trailing newline.
    pub span: std::ops::Range<usize>,
}

/// Locate every gate definition. Unbalanced definitions are skipped.
pub fn find_gate_definitions(qasm: &str) -> Vec<GateDefinition> {
    definition_re()
        .captures_iter(qasm)
        .filter_map(|caps| {
            let whole = caps.get(1)?;
            let terminator = if &caps[2] == "gate" { '{' } else { ';' };
            let end = definition_end(qasm, whole.end(), terminator)?;
            let end = if qasm[end..].starts_with('\n') {
                end + 1
            } else {
                end
            };
            Some(GateDefinition {
                name: caps[3].to_string(),
                span: whole.start()..end,
            })
        })
        .collect()
}

/// Byte offset just past the closing brace (for `gate`) or semicolon (for
/// `opaque`).
fn definition_end(qasm: &str, from: usize, terminator: char) -> Option<usize> {
    let rest = &qasm[from..];
    if terminator == ';' {
        return rest.find(';').map(|i| from + i + 1);
    }

    let open = rest.find('{')?;
    let mut depth = 0usize;
    for (i, c) in rest[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(from + open + i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Occurrences of `name` as a whole identifier.
pub fn count_identifier(text: &str, name: &str) -> usize {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    text.match_indices(name)
        .filter(|(i, _)| {
            let before = text[..*i].chars().next_back();
            let after = text[i + name.len()..].chars().next();
            !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
        })
        .count()
}

/// Remove gate definitions whose name is never used, repeating until no
/// more can be removed. A definition's own header does not count as a use,
/// so a gate used only inside another unused gate goes away on a later round.
pub fn remove_unused_gates(qasm: &str) -> String {
    let mut text = qasm.to_string();

    loop {
        let unused = find_gate_definitions(&text)
            .into_iter()
            .find(|def| count_identifier(&text, &def.name).saturating_sub(1) == 0);

        match unused {
            Some(def) => {
                debug!("Removing unused gate definition '{}'", def.name);
                text.replace_range(def.span, "");
            }
            None => return text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_identifier() {
        assert_eq!(count_identifier("h q; ch q; h_1 q; h q;", "h"), 2);
        assert_eq!(count_identifier("gate a x { }", "a"), 1);
    }

    #[test]
    fn test_used_gate_kept() {
        let qasm = "OPENQASM 3.0;\ngate g a { h a; }\nqubit q;\ng q;\n";
        assert_eq!(remove_unused_gates(qasm), qasm);
    }

    #[test]
    fn test_unused_gate_removed() {
        let qasm = "OPENQASM 3.0;\ngate g a {\n  h a;\n}\nqubit q;\nh q;\n";
        assert_eq!(
            remove_unused_gates(qasm),
            "OPENQASM 3.0;\nqubit q;\nh q;\n"
        );
    }

    #[test]
    fn test_nested_definitions_reach_fixed_point() {
        let qasm = "OPENQASM 3.0;\ngate b x { h x; }\ngate a x { b x; }\nqubit q;\nx q;\n";
        assert_eq!(remove_unused_gates(qasm), "OPENQASM 3.0;\nqubit q;\nx q;\n");
    }

    #[test]
    fn test_definitions_after_other_statements_on_a_line() {
        let qasm = "OPENQASM 3.0; gate g a { h a; } qubit q; h q;";
        assert_eq!(remove_unused_gates(qasm), "OPENQASM 3.0; qubit q; h q;");

        let qasm = "OPENQASM 2.0;\ngate a x { h x; } gate b x { x x; }\nqreg q[1];\nb q[0];\n";
        assert_eq!(
            remove_unused_gates(qasm),
            "OPENQASM 2.0;\n gate b x { x x; }\nqreg q[1];\nb q[0];\n"
        );
    }

    #[test]
    fn test_opaque_definitions() {
        let qasm = "OPENQASM 2.0;\nopaque magic a;\nqreg q[1];\n";
        assert_eq!(remove_unused_gates(qasm), "OPENQASM 2.0;\nqreg q[1];\n");
    }
}
