//! Vendor gate-name substitution.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Vendor spelling, OpenQASM spelling, whether the gate takes parameters.
pub const GATE_NAME_PAIRS: [(&str, &str, bool); 7] = [
    ("cnot", "cx", false),
    ("si", "sdg", false),
    ("ti", "tdg", false),
    ("v", "sx", false),
    ("vi", "sxdg", false),
    ("phaseshift", "p", true),
    ("cphaseshift", "cp", true),
];

/// Which spelling to rename towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameDirection {
    /// `cnot` -> `cx`, `v` -> `sx`, ...
    ToStandard,
    /// `cx` -> `cnot`, `sx` -> `v`, ...
    ToVendor,
}

struct Rename {
    from: &'static str,
    to: &'static str,
    call: Regex,
    definition: Regex,
}

fn renames(direction: RenameDirection) -> &'static [Rename] {
    static STANDARD: OnceLock<Vec<Rename>> = OnceLock::new();
    static VENDOR: OnceLock<Vec<Rename>> = OnceLock::new();

    let cell = match direction {
        RenameDirection::ToStandard => &STANDARD,
        RenameDirection::ToVendor => &VENDOR,
    };
    cell.get_or_init(|| {
        GATE_NAME_PAIRS
            .iter()
            .map(|&(vendor, standard, parameterized)| {
                let (from, to) = match direction {
                    RenameDirection::ToStandard => (vendor, standard),
                    RenameDirection::ToVendor => (standard, vendor),
                };
                // Parameterized gates are followed by "(", the rest by blanks,
                // so "v " never matches the start of "vi ".
                let delimiter = if parameterized { r"\(" } else { r"[ \t]" };
                Rename {
                    from,
                    to,
                    call: Regex::new(&format!(r"(?m)(^|[;{{}}@])(\s*){from}({delimiter})"))
                        .unwrap(),
                    definition: Regex::new(&format!(
                        r"(?m)(^|[;{{}}])(\s*(?:gate|opaque)\s+){from}(\s|\()"
                    ))
                    .unwrap(),
                }
            })
            .collect()
    })
}

/// Rename every gate in [`GATE_NAME_PAIRS`] in the given direction.
///
/// Gates the program defines itself (`gate v a { ... }`) keep their name
/// unless `force_replace` is set, in which case calls and the definition
/// header are both renamed.
pub fn replace_gate_names(qasm: &str, direction: RenameDirection, force_replace: bool) -> String {
    renames(direction)
        .iter()
        .fold(qasm.to_string(), |text, rename| {
            apply_rename(&text, rename, force_replace)
        })
}

/// Rename a single gate, matching calls at statement starts only.
pub fn replace_gate_name(
    qasm: &str,
    from: &str,
    to: &str,
    parameterized: bool,
    force_replace: bool,
) -> String {
    let delimiter = if parameterized { r"\(" } else { r"[ \t]" };
    let from_escaped = regex::escape(from);
    let (Ok(call), Ok(definition)) = (
        Regex::new(&format!(
            r"(?m)(^|[;{{}}@])(\s*){from_escaped}({delimiter})"
        )),
        Regex::new(&format!(
            r"(?m)(^|[;{{}}])(\s*(?:gate|opaque)\s+){from_escaped}(\s|\()"
        )),
    ) else {
        return qasm.to_string();
    };

    let rename = Rename {
        from: "",
        to: "",
        call,
        definition,
    };
    rename_with(qasm, &rename, to, force_replace)
}

fn apply_rename(text: &str, rename: &Rename, force_replace: bool) -> String {
    if !text.contains(rename.from) {
        return text.to_string();
    }
    rename_with(text, rename, rename.to, force_replace)
}

fn rename_with(text: &str, rename: &Rename, to: &str, force_replace: bool) -> String {
    let defined = rename.definition.is_match(text);
    if defined && !force_replace {
        return text.to_string();
    }

    let replace = |caps: &Captures<'_>| format!("{}{}{to}{}", &caps[1], &caps[2], &caps[3]);
    let renamed = rename.call.replace_all(text, replace).into_owned();
    if defined {
        rename.definition.replace_all(&renamed, replace).into_owned()
    } else {
        renamed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_standard() {
        let qasm = "OPENQASM 3.0;\nqubit[2] q;\ncnot q[0], q[1];\nv q[0];\nvi q[1];\nphaseshift(0.5) q[0];\n";
        let out = replace_gate_names(qasm, RenameDirection::ToStandard, false);
        assert_eq!(
            out,
            "OPENQASM 3.0;\nqubit[2] q;\ncx q[0], q[1];\nsx q[0];\nsxdg q[1];\np(0.5) q[0];\n"
        );
    }

    #[test]
    fn test_to_vendor() {
        let qasm = "OPENQASM 3.0;\nqubit[2] q;\nsxdg q[0];\nsx q[1];\ncp(0.1) q[0], q[1];\np(0.2) q[0];\n";
        let out = replace_gate_names(qasm, RenameDirection::ToVendor, false);
        assert_eq!(
            out,
            "OPENQASM 3.0;\nqubit[2] q;\nvi q[0];\nv q[1];\ncphaseshift(0.1) q[0], q[1];\nphaseshift(0.2) q[0];\n"
        );
    }

    #[test]
    fn test_only_statement_starts_match() {
        let qasm = "OPENQASM 3.0;\nqubit v;\nmeasure v;\nh v;\n";
        assert_eq!(
            replace_gate_names(qasm, RenameDirection::ToStandard, false),
            qasm
        );
    }

    #[test]
    fn test_same_line_statements() {
        let out = replace_gate_names(
            "OPENQASM 3.0; qubit[2] q; si q[0]; ti q[1];",
            RenameDirection::ToStandard,
            false,
        );
        assert_eq!(out, "OPENQASM 3.0; qubit[2] q; sdg q[0]; tdg q[1];");
    }

    #[test]
    fn test_user_defined_gate_respects_force_flag() {
        let qasm = "OPENQASM 3.0;\ngate v a { h a; }\nqubit q;\nv q;\n";

        assert_eq!(
            replace_gate_names(qasm, RenameDirection::ToStandard, false),
            qasm
        );
        assert_eq!(
            replace_gate_names(qasm, RenameDirection::ToStandard, true),
            "OPENQASM 3.0;\ngate sx a { h a; }\nqubit q;\nsx q;\n"
        );
    }

    #[test]
    fn test_single_rename() {
        let out = replace_gate_name("OPENQASM 3.0;\nfoo q;\n", "foo", "bar", false, false);
        assert_eq!(out, "OPENQASM 3.0;\nbar q;\n");
    }
}
