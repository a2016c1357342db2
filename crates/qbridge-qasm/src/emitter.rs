//! OpenQASM emitter for serializing ASTs.
//!
//! Declarations always use the 3.x syntax (`qubit[n] q;`). Callers that
//! need 2.x text rewrite them afterwards. Programs with a 2.x header get
//! `measure q -> c;` measurements and one-line conditionals
//! (`if (c == 1) x q[0];`), which have no line-based rewrite.

use std::fmt::Write;

use crate::ast::{BitRef, Expression, GateCall, GateModifier, Program, QubitRef, Statement};

/// Emit a program as OpenQASM source code.
pub fn emit(program: &Program) -> String {
    let mut emitter = Emitter::new();
    emitter.emit_program(program);
    emitter.output
}

/// Render a single expression with the minimal parentheses needed to
/// reparse to the same tree.
pub fn emit_expression(expr: &Expression) -> String {
    let mut out = String::new();
    write_expression(&mut out, expr);
    out
}

/// Render a gate call without the trailing semicolon.
pub fn emit_gate_call(call: &GateCall) -> String {
    let mut out = String::new();
    write_gate_call(&mut out, call);
    out
}

struct Emitter {
    output: String,
    indent: usize,
    qasm2: bool,
}

impl Emitter {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
            qasm2: false,
        }
    }

    fn writeln(&mut self, line: &str) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn emit_program(&mut self, program: &Program) {
        self.qasm2 = program.is_qasm2();
        self.writeln(&format!("OPENQASM {};", program.version));
        for statement in &program.statements {
            self.emit_statement(statement);
        }
    }

    fn emit_block(&mut self, header: &str, body: &[Statement]) {
        self.writeln(&format!("{header} {{"));
        self.indent += 1;
        for statement in body {
            self.emit_statement(statement);
        }
        self.indent -= 1;
    }

    /// Render one statement on a single line, without indentation.
    fn inline(&self, statement: &Statement) -> String {
        let mut inner = Emitter {
            output: String::new(),
            indent: 0,
            qasm2: self.qasm2,
        };
        inner.emit_statement(statement);
        inner.output.trim_end().to_string()
    }

    fn emit_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Include(path) => self.writeln(&format!("include \"{path}\";")),

            Statement::QubitDecl { name, size } => match size {
                Some(n) => self.writeln(&format!("qubit[{n}] {name};")),
                None => self.writeln(&format!("qubit {name};")),
            },

            Statement::BitDecl { name, size } => match size {
                Some(n) => self.writeln(&format!("bit[{n}] {name};")),
                None => self.writeln(&format!("bit {name};")),
            },

            Statement::Gate(call) => {
                let mut line = String::new();
                write_gate_call(&mut line, call);
                line.push(';');
                self.writeln(&line);
            }

            Statement::Measure { qubits, bits } => {
                let qubits = join_qubits(qubits);
                match bits.as_slice() {
                    [] => self.writeln(&format!("measure {qubits};")),
                    [bit] if !self.qasm2 => {
                        self.writeln(&format!("{} = measure {qubits};", bit_ref(bit)));
                    }
                    bits => {
                        let bits: Vec<_> = bits.iter().map(bit_ref).collect();
                        self.writeln(&format!("measure {qubits} -> {};", bits.join(", ")));
                    }
                }
            }

            Statement::Reset { qubits } => {
                self.writeln(&format!("reset {};", join_qubits(qubits)));
            }

            Statement::Barrier { qubits } => {
                if qubits.is_empty() {
                    self.writeln("barrier;");
                } else {
                    self.writeln(&format!("barrier {};", join_qubits(qubits)));
                }
            }

            Statement::Delay { duration, qubits } => {
                self.writeln(&format!(
                    "delay[{}] {};",
                    emit_expression(duration),
                    join_qubits(qubits)
                ));
            }

            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                let header = format!("if ({})", emit_expression(condition));
                if let (true, None, [single]) = (self.qasm2, else_body, then_body.as_slice()) {
                    let line = format!("{header} {}", self.inline(single));
                    self.writeln(&line);
                    return;
                }
                self.emit_block(&header, then_body);
                if let Some(body) = else_body {
                    self.emit_block("} else", body);
                }
                self.writeln("}");
            }

            Statement::For {
                variable,
                range,
                body,
            } => {
                let mut header = format!(
                    "for {variable} in [{}:",
                    emit_expression(&range.start)
                );
                if let Some(step) = &range.step {
                    let _ = write!(header, "{}:", emit_expression(step));
                }
                let _ = write!(header, "{}]", emit_expression(&range.end));
                self.emit_block(&header, body);
                self.writeln("}");
            }

            Statement::GateDef {
                name,
                params,
                qubits,
                body,
            } => {
                self.emit_block(&format!("gate {}", signature(name, params, qubits)), body);
                self.writeln("}");
            }

            Statement::Opaque {
                name,
                params,
                qubits,
            } => self.writeln(&format!("opaque {};", signature(name, params, qubits))),

            Statement::Assignment {
                target,
                index,
                value,
            } => {
                let value = emit_expression(value);
                match index {
                    Some(i) => self.writeln(&format!("{target}[{i}] = {value};")),
                    None => self.writeln(&format!("{target} = {value};")),
                }
            }

            Statement::ClassicalDecl {
                ty,
                size,
                name,
                init,
                io,
                constant,
            } => {
                let mut line = String::new();
                if *constant {
                    line.push_str("const ");
                }
                if let Some(io) = io {
                    let _ = write!(line, "{} ", io.keyword());
                }
                line.push_str(ty.keyword());
                if let Some(n) = size {
                    let _ = write!(line, "[{n}]");
                }
                let _ = write!(line, " {name}");
                if let Some(init) = init {
                    let _ = write!(line, " = {}", emit_expression(init));
                }
                line.push(';');
                self.writeln(&line);
            }
        }
    }
}

fn signature(name: &str, params: &[String], qubits: &[String]) -> String {
    if params.is_empty() {
        format!("{name} {}", qubits.join(", "))
    } else {
        format!("{name}({}) {}", params.join(", "), qubits.join(", "))
    }
}

fn write_gate_call(out: &mut String, call: &GateCall) {
    for modifier in &call.modifiers {
        match modifier {
            GateModifier::Ctrl(None) => out.push_str("ctrl @ "),
            GateModifier::Ctrl(Some(n)) => {
                let _ = write!(out, "ctrl({n}) @ ");
            }
            GateModifier::NegCtrl(None) => out.push_str("negctrl @ "),
            GateModifier::NegCtrl(Some(n)) => {
                let _ = write!(out, "negctrl({n}) @ ");
            }
            GateModifier::Inv => out.push_str("inv @ "),
            GateModifier::Pow(exponent) => {
                let _ = write!(out, "pow({}) @ ", emit_expression(exponent));
            }
        }
    }

    out.push_str(&call.name);
    if !call.params.is_empty() {
        let params: Vec<_> = call.params.iter().map(emit_expression).collect();
        let _ = write!(out, "({})", params.join(", "));
    }
    let _ = write!(out, " {}", join_qubits(&call.qubits));
}

fn join_qubits(qubits: &[QubitRef]) -> String {
    qubits.iter().map(qubit_ref).collect::<Vec<_>>().join(", ")
}

fn qubit_ref(qubit: &QubitRef) -> String {
    match qubit {
        QubitRef::Single {
            register,
            index: Some(i),
        } => format!("{register}[{i}]"),
        QubitRef::Single {
            register,
            index: None,
        } => register.clone(),
        QubitRef::Range {
            register,
            start,
            end,
        } => format!("{register}[{start}:{end}]"),
    }
}

fn bit_ref(bit: &BitRef) -> String {
    match bit {
        BitRef::Single {
            register,
            index: Some(i),
        } => format!("{register}[{i}]"),
        BitRef::Single {
            register,
            index: None,
        } => register.clone(),
        BitRef::Range {
            register,
            start,
            end,
        } => format!("{register}[{start}:{end}]"),
    }
}

fn write_expression(out: &mut String, expr: &Expression) {
    match expr {
        Expression::Int(v) => {
            let _ = write!(out, "{v}");
        }
        Expression::Float(v) => {
            if v.is_finite() && v.fract() == 0.0 {
                let _ = write!(out, "{v:.1}");
            } else {
                let _ = write!(out, "{v}");
            }
        }
        Expression::Bool(v) => {
            let _ = write!(out, "{v}");
        }
        Expression::Identifier(name) => out.push_str(name),
        Expression::Pi => out.push_str("pi"),
        Expression::Tau => out.push_str("tau"),
        Expression::Euler => out.push_str("euler"),
        Expression::Neg(inner) => {
            out.push('-');
            write_operand(out, inner, inner.is_atomic());
        }
        Expression::Not(inner) => {
            out.push('!');
            write_operand(out, inner, inner.is_atomic());
        }
        Expression::BinOp { left, op, right } => {
            let prec = op.precedence();
            // Operators parse left-associative, so an equal-precedence child
            // on the right needs brackets and one on the left does not.
            let left_bare = binop_precedence(left).is_none_or(|p| p >= prec);
            let right_bare = binop_precedence(right).is_none_or(|p| p > prec);
            write_operand(out, left, left_bare);
            let _ = write!(out, " {} ", op.symbol());
            write_operand(out, right, right_bare);
        }
        Expression::FnCall { name, args } => {
            out.push_str(name);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expression(out, arg);
            }
            out.push(')');
        }
        Expression::Index { target, index } => {
            write_operand(out, target, target.is_atomic());
            out.push('[');
            write_expression(out, index);
            out.push(']');
        }
        Expression::Paren(inner) => {
            out.push('(');
            write_expression(out, inner);
            out.push(')');
        }
    }
}

fn write_operand(out: &mut String, expr: &Expression, bare: bool) {
    if bare {
        write_expression(out, expr);
    } else {
        out.push('(');
        write_expression(out, expr);
        out.push(')');
    }
}

fn binop_precedence(expr: &Expression) -> Option<u8> {
    match expr {
        Expression::BinOp { op, .. } => Some(op.precedence()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinOp;
    use crate::parse;

    #[test]
    fn test_emit_bell() {
        let source = r#"
            OPENQASM 3.0;
            include "stdgates.inc";
            qubit[2] q;
            bit[2] c;
            h q[0];
            cx q[0], q[1];
            c = measure q;
        "#;

        let emitted = emit(&parse(source).unwrap());
        assert_eq!(
            emitted,
            "OPENQASM 3.0;\ninclude \"stdgates.inc\";\nqubit[2] q;\nbit[2] c;\nh q[0];\ncx q[0], q[1];\nc = measure q;\n"
        );
    }

    #[test]
    fn test_emit_qasm2_registers_as_declarations() {
        let emitted = emit(&parse("OPENQASM 2.0; qreg q[1]; creg c[1]; measure q[0] -> c[0];").unwrap());
        assert!(emitted.starts_with("OPENQASM 2.0;\n"));
        assert!(emitted.contains("qubit[1] q;"));
        assert!(emitted.contains("bit[1] c;"));
        assert!(emitted.contains("measure q[0] -> c[0];"));
    }

    #[test]
    fn test_emit_qasm2_conditional_on_one_line() {
        let source = "OPENQASM 2.0;\nqreg q[2];\ncreg c[2];\nif (c == 1) x q[0];\nif (c == 2) measure q[1] -> c[1];\n";

        let emitted = emit(&parse(source).unwrap());
        assert!(emitted.contains("\nif (c == 1) x q[0];\n"));
        assert!(emitted.contains("\nif (c == 2) measure q[1] -> c[1];\n"));
        assert!(!emitted.contains('{'));
    }

    #[test]
    fn test_emit_qasm3_conditional_keeps_block() {
        let emitted = emit(&parse("OPENQASM 3.0;\nqubit q;\nbit c;\nif (c == 1) x q;\n").unwrap());
        assert!(emitted.contains("if (c == 1) {\n  x q;\n}\n"));
    }

    #[test]
    fn test_emit_classical_declarations() {
        let source = "OPENQASM 3.0;\ninput float theta;\nconst int[8] n = 2;\noutput bit r;\nangle phi = pi / 4;\nbool flag;\n";
        assert_eq!(emit(&parse(source).unwrap()), source);
    }

    #[test]
    fn test_emit_expression_parentheses() {
        let a = Expression::Identifier("a".into());
        let b = Expression::Identifier("b".into());
        let sum = Expression::binary(a.clone(), BinOp::Add, b.clone());

        assert_eq!(emit_expression(&sum.halved()), "(a + b) / 2");
        assert_eq!(emit_expression(&sum.negated_half()), "-(a + b) / 2");
        assert_eq!(emit_expression(&a.negated_half()), "-a / 2");
        assert_eq!(
            emit_expression(&Expression::binary(a, BinOp::Sub, sum)),
            "a - (a + b)"
        );
    }

    #[test]
    fn test_emit_floats() {
        assert_eq!(emit_expression(&Expression::Float(3.0)), "3.0");
        assert_eq!(emit_expression(&Expression::Float(0.25)), "0.25");
        assert_eq!(
            emit_expression(&Expression::Neg(Box::new(Expression::Float(1.5)))),
            "-1.5"
        );
    }

    #[test]
    fn test_emit_gate_definition_and_modifiers() {
        let source = r"
            OPENQASM 3.0;
            gate g(theta) a, b { rz(theta) a; cx a, b; }
            qubit[2] q;
            ctrl @ g(pi/4) q[0], q[1];
        ";

        let emitted = emit(&parse(source).unwrap());
        assert!(emitted.contains("gate g(theta) a, b {\n  rz(theta) a;\n  cx a, b;\n}\n"));
        assert!(emitted.contains("ctrl @ g(pi / 4) q[0], q[1];"));
    }

    #[test]
    fn test_emit_is_reparseable() {
        let source = r"
            OPENQASM 3.0;
            qubit[2] q;
            bit[2] c;
            if (c[0] == 1) { x q[1]; } else { h q[1]; }
            for i in [0:2:4] { rz(-(pi/2)*2) q[0]; }
            delay[100] q[0];
        ";

        let program = parse(source).unwrap();
        let reparsed = parse(&emit(&program)).unwrap();
        assert_eq!(program, reparsed);
    }
}
