//! Replace `pi` expressions with decimal literals.

use std::sync::OnceLock;

use regex::{Captures, Regex};

const NUMBER: &str = r"(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?";

fn pi_expression_re() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| {
        Regex::new(&format!(
            r"(?:({NUMBER})\s*([*/+-])\s*)?\bpi\b(?:\s*([*/+-])\s*({NUMBER}))?"
        ))
        .unwrap()
    })
}

/// String literals and comments.
fn verbatim_re() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r#""[^"]*"|//[^\n]*|(?s:/\*.*?\*/)"#).unwrap())
}

/// Replace `pi`, optionally with one leading `a op` and one trailing `op b`
/// scalar term, by its decimal value. String literals and comments are
/// copied unchanged.
///
/// A match is left untouched when folding it would change how the
/// surrounding expression groups (`1 / 2 * pi`, `pi + 1 * 3`) or when the
/// numbers run into neighbouring identifiers.
pub fn convert_pi_to_decimal(qasm: &str) -> String {
    let mut out = String::with_capacity(qasm.len());
    let mut last = 0;

    for skipped in verbatim_re().find_iter(qasm) {
        fold_code(&qasm[last..skipped.start()], &mut out);
        out.push_str(skipped.as_str());
        last = skipped.end();
    }

    fold_code(&qasm[last..], &mut out);
    out
}

fn fold_code(code: &str, out: &mut String) {
    let mut last = 0;

    for caps in pi_expression_re().captures_iter(code) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&code[last..whole.start()]);
        last = whole.end();

        let before = code[..whole.start()].trim_end();
        let after = code[whole.end()..].trim_start();
        match fold(&caps, before, after) {
            Some(value) => out.push_str(&format_decimal(value)),
            None => out.push_str(whole.as_str()),
        }
    }

    out.push_str(&code[last..]);
}

fn fold(caps: &Captures<'_>, before: &str, after: &str) -> Option<f64> {
    let pi = std::f64::consts::PI;
    let leading = match (caps.get(1), caps.get(2)) {
        (Some(num), Some(op)) => Some((num.as_str().parse::<f64>().ok()?, op_char(op.as_str())?)),
        _ => None,
    };
    let trailing = match (caps.get(3), caps.get(4)) {
        (Some(op), Some(num)) => Some((op_char(op.as_str())?, num.as_str().parse::<f64>().ok()?)),
        _ => None,
    };

    let prev = before.chars().last();
    let next = after.chars().next();
    if leading.is_some() && prev.is_some_and(|c| c.is_ascii_alphanumeric() || "_.]".contains(c)) {
        return None;
    }
    if trailing.is_some() && next.is_some_and(|c| c.is_ascii_alphanumeric() || "_.[".contains(c)) {
        return None;
    }

    // The folded span must bind at least as tightly as its neighbours.
    let weakest = [leading.map(|(_, op)| op), trailing.map(|(op, _)| op)]
        .into_iter()
        .flatten()
        .map(precedence)
        .min();
    if let Some(weakest) = weakest {
        if prev.is_some_and(|c| binds_left_at_least(c, before, weakest)) {
            return None;
        }
        if next.is_some_and(|c| binds_right_at_least(c, after, weakest)) {
            return None;
        }
    }

    Some(match (leading, trailing) {
        (None, None) => pi,
        (Some((a, op)), None) => apply(a, op, pi),
        (None, Some((op, b))) => apply(pi, op, b),
        (Some((a, op1)), Some((op2, b))) => {
            if precedence(op2) > precedence(op1) {
                apply(a, op1, apply(pi, op2, b))
            } else {
                apply(apply(a, op1, pi), op2, b)
            }
        }
    })
}

fn op_char(op: &str) -> Option<char> {
    op.chars().next()
}

fn precedence(op: char) -> u8 {
    match op {
        '*' | '/' => 2,
        _ => 1,
    }
}

fn apply(a: f64, op: char, b: f64) -> f64 {
    match op {
        '+' => a + b,
        '-' => a - b,
        '*' => a * b,
        _ => a / b,
    }
}

/// Whether the operator ending `before` would steal the folded span's left
/// operand.
fn binds_left_at_least(c: char, before: &str, weakest: u8) -> bool {
    match c {
        '*' if before.ends_with("**") => true,
        '^' | '%' | '/' => true,
        '*' => weakest < 2,
        '-' => weakest < 2 && !is_unary_minus(before),
        _ => false,
    }
}

/// Whether the operator starting `after` would steal the folded span's right
/// operand.
fn binds_right_at_least(c: char, after: &str, weakest: u8) -> bool {
    match c {
        '*' if after.starts_with("**") => true,
        '^' => true,
        '*' | '/' | '%' => weakest < 2,
        _ => false,
    }
}

fn is_unary_minus(before: &str) -> bool {
    let head = before[..before.len() - 1].trim_end();
    head.chars()
        .last()
        .is_none_or(|c| "(,=+-*/".contains(c))
}

fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn param(line: &str) -> f64 {
        let start = line.find('(').unwrap() + 1;
        let end = line.find(')').unwrap();
        line[start..end].trim().parse().unwrap()
    }

    #[test]
    fn test_bare_pi() {
        assert_eq!(
            convert_pi_to_decimal("rz(pi) q[0];"),
            format!("rz({PI}) q[0];")
        );
    }

    #[test]
    fn test_scalar_terms() {
        let out = convert_pi_to_decimal("rx(pi / 2) q[0];");
        assert!((param(&out) - PI / 2.0).abs() < 1e-12);

        let out = convert_pi_to_decimal("rx(3*pi/4) q[0];");
        assert!((param(&out) - 3.0 * PI / 4.0).abs() < 1e-12);

        let out = convert_pi_to_decimal("rx(1 + pi*2) q[0];");
        assert!((param(&out) - (1.0 + PI * 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_negated_pi() {
        let out = convert_pi_to_decimal("rz(-pi/2) q[0];");
        assert!((param(&out) + PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_ambiguous_groupings_left_untouched() {
        assert_eq!(
            convert_pi_to_decimal("rx(1/2*pi) q;"),
            "rx(1/2*pi) q;"
        );
        assert_eq!(
            convert_pi_to_decimal("rx(pi+1*3) q;"),
            "rx(pi+1*3) q;"
        );
        assert_eq!(convert_pi_to_decimal("rx(x2*pi) q;"), "rx(x2*pi) q;");
    }

    #[test]
    fn test_strings_and_comments_untouched() {
        let qasm = "include \"pi.inc\";\n// rotate by pi / 2\n/* pi */ rz(pi) q[0]; // pi\n";
        assert_eq!(
            convert_pi_to_decimal(qasm),
            format!("include \"pi.inc\";\n// rotate by pi / 2\n/* pi */ rz({PI}) q[0]; // pi\n")
        );
        assert_eq!(convert_pi_to_decimal("include \"pi.inc\";"), "include \"pi.inc\";");
    }

    #[test]
    fn test_identifiers_containing_pi_untouched() {
        let qasm = "gate spin(pival) a { rz(pival) a; }";
        assert_eq!(convert_pi_to_decimal(qasm), qasm);
    }
}
