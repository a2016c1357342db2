//! Conversions between the OpenQASM representations.

use std::any::{Any, type_name};

use qbridge_compile::compat::declarations_to_qasm2;
use qbridge_qasm::syntax::{self, BinOp, Expression, Statement};

use crate::error::BoxError;
use crate::program::{Program, Qasm2, Qasm3};

pub(crate) fn payload<T: Any>(program: Program) -> Result<T, BoxError> {
    let found = program.type_name();
    program
        .downcast::<T>()
        .ok_or_else(|| format!("expected a {} payload, found {found}", type_name::<T>()).into())
}

/// OpenQASM 2 text to OpenQASM 3 text.
pub fn qasm2_to_qasm3(program: Program) -> Result<Program, BoxError> {
    let Qasm2(text) = payload(program)?;
    let mut ast = qbridge_qasm::parse(&text)?;
    if !ast.is_qasm2() {
        return Err(format!("expected an OpenQASM 2 program, found version {}", ast.version).into());
    }

    ast.version = "3.0".to_string();
    rewrite_statements(&mut ast.statements, &|statement| match statement {
        Statement::Include(path) if path.as_str() == "qelib1.inc" => {
            *path = "stdgates.inc".to_string();
        }
        Statement::Gate(call) if call.name == "CX" => call.name = "cx".to_string(),
        _ => {}
    });

    Ok(Program::new(Qasm3(qbridge_qasm::emit(&ast))))
}

/// OpenQASM 3 text to OpenQASM 2 text. Fails on constructs 2.0 cannot
/// express, such as loops, classical declarations and assignments, delays,
/// gate modifiers, and conditionals other than `if (creg == n) <op>;`.
pub fn qasm3_to_qasm2(program: Program) -> Result<Program, BoxError> {
    let Qasm3(text) = payload(program)?;
    let mut ast = qbridge_qasm::parse(&text)?;

    if let Some(construct) = first_qasm3_only(&ast.statements) {
        return Err(format!("{construct} cannot be expressed in OpenQASM 2").into());
    }

    ast.version = "2.0".to_string();
    rewrite_statements(&mut ast.statements, &|statement| {
        if let Statement::Include(path) = statement {
            if path.as_str() == "stdgates.inc" {
                *path = "qelib1.inc".to_string();
            }
        }
    });

    Ok(Program::new(Qasm2(declarations_to_qasm2(
        &qbridge_qasm::emit(&ast),
    ))))
}

/// OpenQASM 3 text to its syntax tree.
pub fn qasm3_to_openqasm3(program: Program) -> Result<Program, BoxError> {
    let Qasm3(text) = payload(program)?;
    Ok(Program::new(qbridge_qasm::parse(&text)?))
}

/// Syntax tree back to OpenQASM 3 text.
pub fn openqasm3_to_qasm3(program: Program) -> Result<Program, BoxError> {
    let ast: syntax::Program = payload(program)?;
    Ok(Program::new(Qasm3(qbridge_qasm::emit(&ast))))
}

/// Expand every controlled rotation of an OpenQASM 3 program.
pub fn decompose_qasm3(program: Program) -> Result<Program, BoxError> {
    let Qasm3(text) = payload(program)?;
    Ok(Program::new(Qasm3(qbridge_compile::decompose_qasm3(&text)?)))
}

/// Expand every controlled rotation of an OpenQASM 2 program.
pub fn decompose_qasm2(program: Program) -> Result<Program, BoxError> {
    let Qasm2(text) = payload(program)?;
    Ok(Program::new(Qasm2(qbridge_compile::decompose_qasm3(&text)?)))
}

fn rewrite_statements(statements: &mut [Statement], rewrite: &dyn Fn(&mut Statement)) {
    for statement in statements {
        rewrite(statement);
        match statement {
            Statement::GateDef { body, .. } | Statement::For { body, .. } => {
                rewrite_statements(body, rewrite);
            }
            Statement::If {
                then_body,
                else_body,
                ..
            } => {
                rewrite_statements(then_body, rewrite);
                if let Some(body) = else_body {
                    rewrite_statements(body, rewrite);
                }
            }
            _ => {}
        }
    }
}

fn first_qasm3_only(statements: &[Statement]) -> Option<&'static str> {
    statements.iter().find_map(|statement| match statement {
        Statement::For { .. } => Some("a for loop"),
        Statement::Assignment { .. } => Some("a classical assignment"),
        Statement::ClassicalDecl { .. } => Some("a classical declaration"),
        Statement::Delay { .. } => Some("a delay"),
        Statement::If {
            condition,
            then_body,
            else_body: None,
        } if is_register_comparison(condition) => match then_body.as_slice() {
            [Statement::Gate(_) | Statement::Measure { .. } | Statement::Reset { .. }] => {
                first_qasm3_only(then_body)
            }
            _ => Some("a conditional block"),
        },
        Statement::If { .. } => Some("a conditional block"),
        Statement::Gate(call) if !call.modifiers.is_empty() => Some("a gate modifier"),
        Statement::GateDef { body, .. } => first_qasm3_only(body),
        _ => None,
    })
}

/// `creg == n`, the only condition OpenQASM 2 has.
fn is_register_comparison(condition: &Expression) -> bool {
    matches!(
        condition,
        Expression::BinOp { left, op: BinOp::Eq, right }
            if matches!(**left, Expression::Identifier(_))
                && matches!(**right, Expression::Int(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BELL2: &str = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\ncreg c[2];\nh q[0];\nCX q[0], q[1];\nmeasure q -> c;\n";

    #[test]
    fn test_qasm2_to_qasm3() {
        let out = qasm2_to_qasm3(Program::new(Qasm2(BELL2.into()))).unwrap();
        let Qasm3(text) = out.downcast::<Qasm3>().unwrap();
        assert_eq!(
            text,
            "OPENQASM 3.0;\ninclude \"stdgates.inc\";\nqubit[2] q;\nbit[2] c;\nh q[0];\ncx q[0], q[1];\nc = measure q;\n"
        );
    }

    #[test]
    fn test_qasm3_to_qasm2_round_trip() {
        let up = qasm2_to_qasm3(Program::new(Qasm2(BELL2.into()))).unwrap();
        let Qasm2(text) = qasm3_to_qasm2(up).unwrap().downcast::<Qasm2>().unwrap();
        assert_eq!(
            text,
            "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\ncreg c[2];\nh q[0];\ncx q[0], q[1];\nmeasure q -> c;\n"
        );
    }

    #[test]
    fn test_qasm3_only_constructs_rejected() {
        for body in [
            "for i in [0:2] { h q; }",
            "ctrl @ x q[0], q[1];",
            "delay[100] q;",
        ] {
            let text = format!("OPENQASM 3.0;\nqubit[2] q;\n{body}\n");
            let err = qasm3_to_qasm2(Program::new(Qasm3(text))).unwrap_err();
            assert!(err.to_string().contains("cannot be expressed"));
        }
    }

    #[test]
    fn test_qasm2_conditional_round_trip() {
        let text = "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\ncreg c[2];\nif (c == 1) x q[0];\nh q[1];\n";
        let up = qasm2_to_qasm3(Program::new(Qasm2(text.into()))).unwrap();
        let Qasm2(back) = qasm3_to_qasm2(up).unwrap().downcast::<Qasm2>().unwrap();
        assert_eq!(back, text);
    }

    #[test]
    fn test_conditionals_beyond_qasm2_rejected() {
        for body in [
            "if (c == 1) { x q[0]; h q[1]; }",
            "if (c == 1) x q[0]; else x q[1];",
            "if (c[0] == 1) x q[0];",
            "if (c == 1) ctrl @ x q[0], q[1];",
        ] {
            let text = format!("OPENQASM 3.0;\nqubit[2] q;\nbit[2] c;\n{body}\n");
            let err = qasm3_to_qasm2(Program::new(Qasm3(text))).unwrap_err();
            assert!(err.to_string().contains("cannot be expressed"), "{body}");
        }
    }

    #[test]
    fn test_classical_declaration_rejected_for_qasm2() {
        let text = "OPENQASM 3.0;\nqubit[2] q;\ninput float theta;\nrx(theta) q[0];\n";
        let err = qasm3_to_qasm2(Program::new(Qasm3(text.into()))).unwrap_err();
        assert!(err.to_string().contains("a classical declaration"));
    }

    #[test]
    fn test_decompose_qasm2_keeps_one_line_conditional() {
        let text = "OPENQASM 2.0;\nqreg q[2];\ncreg c[2];\nif (c == 1) x q[0];\ncz q[0], q[1];\n";
        let out = decompose_qasm2(Program::new(Qasm2(text.into()))).unwrap();
        let Qasm2(text) = out.downcast::<Qasm2>().unwrap();
        assert!(text.contains("\nif (c == 1) x q[0];\n"));
        assert!(!text.contains("if (c == 1) {"));
        assert!(!text.contains("cz"));
    }

    #[test]
    fn test_ast_round_trip() {
        let text = "OPENQASM 3.0;\nqubit[2] q;\ncrx(pi / 2) q[0], q[1];\n";
        let ast = qasm3_to_openqasm3(Program::new(Qasm3(text.into()))).unwrap();
        assert!(ast.is::<syntax::Program>());
        let Qasm3(back) = openqasm3_to_qasm3(ast).unwrap().downcast::<Qasm3>().unwrap();
        assert_eq!(back, text);
    }

    #[test]
    fn test_wrong_payload() {
        let err = qasm2_to_qasm3(Program::new(Qasm3(String::new()))).unwrap_err();
        assert!(err.to_string().contains("expected a"));
    }

    #[test]
    fn test_decomposers_keep_text_type() {
        let text = "OPENQASM 2.0;\nqreg q[2];\ncz q[0], q[1];\n";
        let out = decompose_qasm2(Program::new(Qasm2(text.into()))).unwrap();
        let Qasm2(text) = out.downcast::<Qasm2>().unwrap();
        assert!(text.contains("qreg q[2];"));
        assert!(!text.contains("cz"));
    }
}
