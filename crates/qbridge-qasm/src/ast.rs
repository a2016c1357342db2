//! Abstract Syntax Tree for `OpenQASM` 2 and 3.

use serde::{Deserialize, Serialize};

/// A complete OpenQASM program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// QASM version (e.g., "3.0").
    pub version: String,
    /// Statements in the program.
    pub statements: Vec<Statement>,
}

impl Program {
    /// Major language version, if the version string starts with one.
    pub fn major_version(&self) -> Option<u32> {
        self.version.split('.').next()?.trim().parse().ok()
    }

    /// Whether the program declared an `OPENQASM 2.x` header.
    pub fn is_qasm2(&self) -> bool {
        self.major_version() == Some(2)
    }

    /// Iterate over the top-level gate applications.
    pub fn gate_calls(&self) -> impl Iterator<Item = &GateCall> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Gate(call) => Some(call),
            _ => None,
        })
    }

    /// Names of gates defined by `gate` or `opaque` statements.
    pub fn defined_gates(&self) -> Vec<&str> {
        self.statements
            .iter()
            .filter_map(|s| match s {
                Statement::GateDef { name, .. } | Statement::Opaque { name, .. } => {
                    Some(name.as_str())
                }
                _ => None,
            })
            .collect()
    }
}

/// A statement in an OpenQASM program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// Include statement.
    Include(String),

    /// Qubit declaration: `qubit[n] name;`, `qubit name;` or `qreg name[n];`
    QubitDecl { name: String, size: Option<u32> },

    /// Classical bit declaration: `bit[n] name;`, `bit name;` or `creg name[n];`
    BitDecl { name: String, size: Option<u32> },

    /// Gate application.
    Gate(GateCall),

    /// Measurement: `measure q -> c;` or `c = measure q;`
    Measure {
        qubits: Vec<QubitRef>,
        bits: Vec<BitRef>,
    },

    /// Reset: `reset q;`
    Reset { qubits: Vec<QubitRef> },

    /// Barrier: `barrier q;`
    Barrier { qubits: Vec<QubitRef> },

    /// Delay: `delay[duration] q;`
    Delay {
        duration: Expression,
        qubits: Vec<QubitRef>,
    },

    /// If statement.
    If {
        condition: Expression,
        then_body: Vec<Statement>,
        else_body: Option<Vec<Statement>>,
    },

    /// For loop.
    For {
        variable: String,
        range: Range,
        body: Vec<Statement>,
    },

    /// Gate definition.
    GateDef {
        name: String,
        params: Vec<String>,
        qubits: Vec<String>,
        body: Vec<Statement>,
    },

    /// Opaque gate declaration (OpenQASM 2).
    Opaque {
        name: String,
        params: Vec<String>,
        qubits: Vec<String>,
    },

    /// Classical assignment.
    Assignment {
        target: String,
        index: Option<u32>,
        value: Expression,
    },

    /// Classical variable declaration: `float theta;`, `const int[8] n = 2;`,
    /// `input angle a;` or `output bit r;`
    ClassicalDecl {
        ty: ClassicalType,
        size: Option<u32>,
        name: String,
        init: Option<Expression>,
        io: Option<IoModifier>,
        constant: bool,
    },
}

/// Type of a classical variable declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassicalType {
    Int,
    Uint,
    Float,
    Angle,
    Bool,
    Bit,
}

impl ClassicalType {
    /// The type's keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            ClassicalType::Int => "int",
            ClassicalType::Uint => "uint",
            ClassicalType::Float => "float",
            ClassicalType::Angle => "angle",
            ClassicalType::Bool => "bool",
            ClassicalType::Bit => "bit",
        }
    }
}

/// `input` or `output` on a top-level declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IoModifier {
    Input,
    Output,
}

impl IoModifier {
    pub fn keyword(self) -> &'static str {
        match self {
            IoModifier::Input => "input",
            IoModifier::Output => "output",
        }
    }
}

/// A gate call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateCall {
    /// Gate name.
    pub name: String,
    /// Gate parameters (angles, etc.).
    pub params: Vec<Expression>,
    /// Qubits the gate acts on.
    pub qubits: Vec<QubitRef>,
    /// Modifiers in source order (ctrl, inv, pow).
    pub modifiers: Vec<GateModifier>,
}

impl GateCall {
    /// A modifier-free gate call.
    pub fn new(name: impl Into<String>, params: Vec<Expression>, qubits: Vec<QubitRef>) -> Self {
        Self {
            name: name.into(),
            params,
            qubits,
            modifiers: vec![],
        }
    }
}

/// Gate modifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateModifier {
    /// Control modifier: `ctrl @ gate`
    Ctrl(Option<u32>),
    /// Negated control: `negctrl @ gate`
    NegCtrl(Option<u32>),
    /// Inverse: `inv @ gate`
    Inv,
    /// Power: `pow(n) @ gate`
    Pow(Expression),
}

/// Reference to a qubit or qubit register element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QubitRef {
    /// Single qubit: `q` (entire register) or `q[i]` (single element).
    Single {
        register: String,
        index: Option<u32>,
    },
    /// Range of qubits: `q[start:end]`.
    Range {
        register: String,
        start: u32,
        end: u32,
    },
}

impl QubitRef {
    /// Create a reference to a single qubit.
    pub fn single(register: impl Into<String>, index: u32) -> Self {
        QubitRef::Single {
            register: register.into(),
            index: Some(index),
        }
    }

    /// Create a reference to an entire register.
    pub fn register(register: impl Into<String>) -> Self {
        QubitRef::Single {
            register: register.into(),
            index: None,
        }
    }

    /// Get the register name.
    pub fn register_name(&self) -> &str {
        match self {
            QubitRef::Single { register, .. } | QubitRef::Range { register, .. } => register,
        }
    }
}

/// Reference to a classical bit or bit register element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitRef {
    /// Single bit: `c` or `c[i]`.
    Single {
        register: String,
        index: Option<u32>,
    },
    /// Range of bits: `c[start:end]`.
    Range {
        register: String,
        start: u32,
        end: u32,
    },
}

impl BitRef {
    /// Create a reference to a single bit.
    pub fn single(register: impl Into<String>, index: u32) -> Self {
        BitRef::Single {
            register: register.into(),
            index: Some(index),
        }
    }

    /// Create a reference to an entire register.
    pub fn register(register: impl Into<String>) -> Self {
        BitRef::Single {
            register: register.into(),
            index: None,
        }
    }
}

/// A range for iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub start: Expression,
    pub end: Expression,
    pub step: Option<Expression>,
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
    /// Identifier.
    Identifier(String),
    /// Pi constant.
    Pi,
    /// Tau constant (2π).
    Tau,
    /// Euler's number.
    Euler,
    /// Arithmetic negation.
    Neg(Box<Expression>),
    /// Logical not.
    Not(Box<Expression>),
    /// Binary operation.
    BinOp {
        left: Box<Expression>,
        op: BinOp,
        right: Box<Expression>,
    },
    /// Function call.
    FnCall { name: String, args: Vec<Expression> },
    /// Index expression: `arr[i]`.
    Index {
        target: Box<Expression>,
        index: Box<Expression>,
    },
    /// Parenthesized expression.
    Paren(Box<Expression>),
}

impl Expression {
    /// Create a constant expression.
    pub fn constant(value: f64) -> Self {
        Expression::Float(value)
    }

    /// Create a pi expression.
    pub fn pi() -> Self {
        Expression::Pi
    }

    /// Build `left op right`.
    pub fn binary(left: Expression, op: BinOp, right: Expression) -> Self {
        Expression::BinOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// `self / 2`, kept symbolic.
    pub fn halved(&self) -> Self {
        Expression::binary(self.clone(), BinOp::Div, Expression::Int(2))
    }

    /// `-self / 2`, kept symbolic.
    pub fn negated_half(&self) -> Self {
        Expression::binary(
            Expression::Neg(Box::new(self.clone())),
            BinOp::Div,
            Expression::Int(2),
        )
    }

    /// Whether the expression prints as a single token or a bracketed unit.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            Expression::Int(_)
                | Expression::Bool(_)
                | Expression::Identifier(_)
                | Expression::Pi
                | Expression::Tau
                | Expression::Euler
                | Expression::FnCall { .. }
                | Expression::Index { .. }
                | Expression::Paren(_)
        ) || matches!(self, Expression::Float(v) if *v >= 0.0)
    }

    /// Try to evaluate as a constant f64.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Expression::Int(v) => Some(*v as f64),
            Expression::Float(v) => Some(*v),
            Expression::Pi => Some(std::f64::consts::PI),
            Expression::Tau => Some(std::f64::consts::TAU),
            Expression::Euler => Some(std::f64::consts::E),
            Expression::Neg(e) => e.as_f64().map(|v| -v),
            Expression::BinOp { left, op, right } => {
                let l = left.as_f64()?;
                let r = right.as_f64()?;
                Some(match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                    BinOp::Pow => l.powf(r),
                    BinOp::Mod => l % r,
                    _ => return None,
                })
            }
            Expression::FnCall { name, args } if args.len() == 1 => {
                let x = args[0].as_f64()?;
                match name.as_str() {
                    "sin" => Some(x.sin()),
                    "cos" => Some(x.cos()),
                    "tan" => Some(x.tan()),
                    "exp" => Some(x.exp()),
                    "ln" => Some(x.ln()),
                    "sqrt" => Some(x.sqrt()),
                    _ => None,
                }
            }
            Expression::Paren(e) => e.as_f64(),
            _ => None,
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    LShift,
    RShift,
}

impl BinOp {
    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::BitOr => 3,
            BinOp::BitXor => 4,
            BinOp::BitAnd => 5,
            BinOp::Eq | BinOp::NotEq => 6,
            BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => 7,
            BinOp::LShift | BinOp::RShift => 8,
            BinOp::Add | BinOp::Sub => 9,
            BinOp::Mul | BinOp::Div | BinOp::Mod => 10,
            BinOp::Pow => 11,
        }
    }

    /// Source spelling of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Lt => "<",
            BinOp::LtEq => "<=",
            BinOp::Gt => ">",
            BinOp::GtEq => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::LShift => "<<",
            BinOp::RShift => ">>",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_expression_eval() {
        let expr = Expression::binary(Expression::Pi, BinOp::Div, Expression::Int(2));

        let result = expr.as_f64().unwrap();
        assert!((result - PI / 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_symbolic_halves() {
        let theta = Expression::Identifier("theta".into());

        assert_eq!(theta.halved().as_f64(), None);
        assert!((Expression::Pi.negated_half().as_f64().unwrap() + PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_fn_call_eval() {
        let expr = Expression::FnCall {
            name: "cos".into(),
            args: vec![Expression::Int(0)],
        };
        assert_eq!(expr.as_f64(), Some(1.0));
    }

    #[test]
    fn test_version_helpers() {
        let program = Program {
            version: "2.0".into(),
            statements: vec![],
        };
        assert_eq!(program.major_version(), Some(2));
        assert!(program.is_qasm2());
    }

    #[test]
    fn test_qubit_ref() {
        let qr = QubitRef::single("q", 0);
        assert_eq!(qr.register_name(), "q");
    }
}
