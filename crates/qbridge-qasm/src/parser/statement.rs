//! Statement parsing for OpenQASM.

use super::Parser;
use crate::ast::{
    BitRef, ClassicalType, GateCall, GateModifier, IoModifier, QubitRef, Range, Statement,
};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    /// Parse a statement.
    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ParseError::UnexpectedEof("statement".into()))?;

        match token {
            Token::Include => self.parse_include(),
            Token::Qubit => self.parse_qubit_decl(),
            Token::Bit => self.parse_bit_decl(),
            Token::Qreg | Token::Creg => self.parse_register_decl(),
            Token::Int | Token::Uint | Token::Float | Token::Angle | Token::Bool => {
                self.parse_classical_decl(None, false)
            }
            Token::Const => {
                self.advance();
                self.parse_classical_decl(None, true)
            }
            Token::Input => {
                self.advance();
                self.parse_classical_decl(Some(IoModifier::Input), false)
            }
            Token::Output => {
                self.advance();
                self.parse_classical_decl(Some(IoModifier::Output), false)
            }
            Token::Measure => self.parse_measure(),
            Token::Reset => self.parse_reset(),
            Token::Barrier => self.parse_barrier(),
            Token::Delay => self.parse_delay(),
            Token::If => self.parse_if(),
            Token::For => self.parse_for(),
            Token::Gate => self.parse_gate_def(),
            Token::Opaque => self.parse_opaque(),
            Token::GateU => {
                self.advance();
                self.parse_gate_call("U".into(), vec![])
            }
            Token::GateCX => {
                self.advance();
                self.parse_gate_call("CX".into(), vec![])
            }
            Token::Ctrl | Token::NegCtrl | Token::Inv | Token::Pow => self.parse_modified_gate(),
            Token::Identifier(_) => self.parse_identifier_statement(),
            _ => Err(self.unexpected("statement", &token)),
        }
    }

    /// Parse include statement.
    fn parse_include(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Include)?;
        let path = match self.advance() {
            Some(Token::StringLiteral(s)) => s,
            Some(other) => return Err(self.unexpected("string literal", &other)),
            None => return Err(ParseError::UnexpectedEof("include path".into())),
        };
        self.expect(Token::Semicolon)?;
        Ok(Statement::Include(path))
    }

    /// Parse `[n]` if present.
    fn parse_optional_size(&mut self) -> ParseResult<Option<u32>> {
        if self.consume(&Token::LBracket) {
            let size = self.parse_u32()?;
            self.expect(Token::RBracket)?;
            Ok(Some(size))
        } else {
            Ok(None)
        }
    }

    /// Parse qubit declaration.
    fn parse_qubit_decl(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Qubit)?;
        let size = self.parse_optional_size()?;
        let name = self.parse_identifier()?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::QubitDecl { name, size })
    }

    /// Parse bit declaration. An initialized `bit c = ...;` is a classical
    /// declaration.
    fn parse_bit_decl(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Bit)?;
        let size = self.parse_optional_size()?;
        let name = self.parse_identifier()?;

        if self.consume(&Token::Eq) {
            let init = self.parse_expression()?;
            self.expect(Token::Semicolon)?;
            return Ok(Statement::ClassicalDecl {
                ty: ClassicalType::Bit,
                size,
                name,
                init: Some(init),
                io: None,
                constant: false,
            });
        }

        self.expect(Token::Semicolon)?;
        Ok(Statement::BitDecl { name, size })
    }

    /// Parse `type[n] name;` or `type[n] name = expr;` after any `const`,
    /// `input` or `output` keyword. Constants need an initializer.
    fn parse_classical_decl(
        &mut self,
        io: Option<IoModifier>,
        constant: bool,
    ) -> ParseResult<Statement> {
        let ty = match self.advance() {
            Some(Token::Int) => ClassicalType::Int,
            Some(Token::Uint) => ClassicalType::Uint,
            Some(Token::Float) => ClassicalType::Float,
            Some(Token::Angle) => ClassicalType::Angle,
            Some(Token::Bool) => ClassicalType::Bool,
            Some(Token::Bit) => ClassicalType::Bit,
            Some(other) => return Err(self.unexpected("classical type", &other)),
            None => return Err(ParseError::UnexpectedEof("classical type".into())),
        };
        let size = self.parse_optional_size()?;
        let name = self.parse_identifier()?;

        let init = if constant {
            self.expect(Token::Eq)?;
            Some(self.parse_expression()?)
        } else if io != Some(IoModifier::Input) && self.consume(&Token::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(Token::Semicolon)?;

        Ok(Statement::ClassicalDecl {
            ty,
            size,
            name,
            init,
            io,
            constant,
        })
    }

    /// Parse `qreg name[n];` / `creg name[n];`.
    fn parse_register_decl(&mut self) -> ParseResult<Statement> {
        let quantum = matches!(self.advance(), Some(Token::Qreg));
        let name = self.parse_identifier()?;
        let size = self.parse_optional_size()?;
        self.expect(Token::Semicolon)?;

        Ok(if quantum {
            Statement::QubitDecl { name, size }
        } else {
            Statement::BitDecl { name, size }
        })
    }

    /// Parse measure statement.
    fn parse_measure(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Measure)?;

        let qubits = self.parse_qubit_refs()?;

        // Arrow syntax: measure q -> c;
        let bits = if self.consume(&Token::Arrow) {
            self.parse_bit_refs()?
        } else {
            vec![]
        };

        self.expect(Token::Semicolon)?;

        Ok(Statement::Measure { qubits, bits })
    }

    /// Parse reset statement.
    fn parse_reset(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Reset)?;
        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Reset { qubits })
    }

    /// Parse barrier statement.
    fn parse_barrier(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Barrier)?;
        let qubits = if self.check(&Token::Semicolon) {
            vec![]
        } else {
            self.parse_qubit_refs()?
        };
        self.expect(Token::Semicolon)?;
        Ok(Statement::Barrier { qubits })
    }

    /// Parse `delay[duration] q;`.
    fn parse_delay(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Delay)?;
        self.expect(Token::LBracket)?;
        let duration = self.parse_expression()?;
        self.expect(Token::RBracket)?;
        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Delay { duration, qubits })
    }

    /// Parse if statement.
    fn parse_if(&mut self) -> ParseResult<Statement> {
        self.expect(Token::If)?;
        self.expect(Token::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(Token::RParen)?;

        let then_body = self.parse_block_or_statement()?;

        let else_body = if self.consume(&Token::Else) {
            Some(self.parse_block_or_statement()?)
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            then_body,
            else_body,
        })
    }

    /// Parse for loop.
    fn parse_for(&mut self) -> ParseResult<Statement> {
        self.expect(Token::For)?;
        let variable = self.parse_identifier()?;
        self.expect(Token::In)?;
        self.expect(Token::LBracket)?;
        let start = self.parse_expression()?;
        self.expect(Token::Colon)?;
        let second = self.parse_expression()?;
        // [start:end] or [start:step:end]
        let (step, end) = if self.consume(&Token::Colon) {
            (Some(second), self.parse_expression()?)
        } else {
            (None, second)
        };
        self.expect(Token::RBracket)?;

        let body = self.parse_block_or_statement()?;

        Ok(Statement::For {
            variable,
            range: Range { start, end, step },
            body,
        })
    }

    /// Parse `name(params) a, b` shared by `gate` and `opaque`.
    fn parse_gate_signature(&mut self) -> ParseResult<(String, Vec<String>, Vec<String>)> {
        let name = self.parse_identifier()?;

        let params = if self.consume(&Token::LParen) {
            let p = if self.check(&Token::RParen) {
                vec![]
            } else {
                self.parse_identifier_list()?
            };
            self.expect(Token::RParen)?;
            p
        } else {
            vec![]
        };

        let qubits = self.parse_identifier_list()?;
        Ok((name, params, qubits))
    }

    /// Parse gate definition.
    fn parse_gate_def(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Gate)?;
        let (name, params, qubits) = self.parse_gate_signature()?;

        self.expect(Token::LBrace)?;
        let body = self.parse_block_body()?;

        Ok(Statement::GateDef {
            name,
            params,
            qubits,
            body,
        })
    }

    /// Parse opaque gate declaration.
    fn parse_opaque(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Opaque)?;
        let (name, params, qubits) = self.parse_gate_signature()?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::Opaque {
            name,
            params,
            qubits,
        })
    }

    /// Parse `ctrl @ ...`, `inv @ ...` and friends followed by a gate call.
    fn parse_modified_gate(&mut self) -> ParseResult<Statement> {
        let mut modifiers = Vec::new();

        loop {
            let modifier = match self.peek() {
                Some(Token::Ctrl) => {
                    self.advance();
                    GateModifier::Ctrl(self.parse_modifier_count()?)
                }
                Some(Token::NegCtrl) => {
                    self.advance();
                    GateModifier::NegCtrl(self.parse_modifier_count()?)
                }
                Some(Token::Inv) => {
                    self.advance();
                    GateModifier::Inv
                }
                Some(Token::Pow) => {
                    self.advance();
                    self.expect(Token::LParen)?;
                    let exponent = self.parse_expression()?;
                    self.expect(Token::RParen)?;
                    GateModifier::Pow(exponent)
                }
                _ => break,
            };
            self.expect(Token::At)?;
            modifiers.push(modifier);
        }

        let name = match self.advance() {
            Some(Token::Identifier(name)) => name,
            Some(Token::GateU) => "U".into(),
            Some(Token::GateCX) => "CX".into(),
            Some(other) => return Err(self.unexpected("gate name", &other)),
            None => return Err(ParseError::UnexpectedEof("gate name".into())),
        };

        self.parse_gate_call(name, modifiers)
    }

    /// Parse the optional `(n)` after `ctrl`/`negctrl`.
    fn parse_modifier_count(&mut self) -> ParseResult<Option<u32>> {
        if self.consume(&Token::LParen) {
            let count = self.parse_u32()?;
            self.expect(Token::RParen)?;
            Ok(Some(count))
        } else {
            Ok(None)
        }
    }

    /// Parse statement starting with identifier (gate call or assignment).
    fn parse_identifier_statement(&mut self) -> ParseResult<Statement> {
        let name = self.parse_identifier()?;

        // Assignment: c = measure q; or c[0] = expr;
        if self.check(&Token::Eq) || self.check(&Token::LBracket) {
            return self.parse_assignment(name);
        }

        self.parse_gate_call(name, vec![])
    }

    /// Parse assignment statement.
    fn parse_assignment(&mut self, target: String) -> ParseResult<Statement> {
        let index = if self.consume(&Token::LBracket) {
            let idx = self.parse_u32()?;
            self.expect(Token::RBracket)?;
            Some(idx)
        } else {
            None
        };

        self.expect(Token::Eq)?;

        if self.consume(&Token::Measure) {
            let qubits = self.parse_qubit_refs()?;
            self.expect(Token::Semicolon)?;

            let bits = match index {
                Some(idx) => vec![BitRef::single(&target, idx)],
                None => vec![BitRef::register(&target)],
            };

            return Ok(Statement::Measure { qubits, bits });
        }

        let value = self.parse_expression()?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::Assignment {
            target,
            index,
            value,
        })
    }

    /// Parse gate call.
    fn parse_gate_call(
        &mut self,
        name: String,
        modifiers: Vec<GateModifier>,
    ) -> ParseResult<Statement> {
        let params = if self.consume(&Token::LParen) {
            let p = self.parse_expression_list()?;
            self.expect(Token::RParen)?;
            p
        } else {
            vec![]
        };

        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::Gate(GateCall {
            name,
            params,
            qubits,
            modifiers,
        }))
    }

    /// Parse a block or single statement.
    pub(super) fn parse_block_or_statement(&mut self) -> ParseResult<Vec<Statement>> {
        if self.consume(&Token::LBrace) {
            self.parse_block_body()
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    /// Parse statements up to and including the closing brace.
    fn parse_block_body(&mut self) -> ParseResult<Vec<Statement>> {
        let mut stmts = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.is_eof() {
                return Err(ParseError::UnexpectedEof("'}'".into()));
            }
            stmts.push(self.parse_statement()?);
        }
        self.expect(Token::RBrace)?;
        Ok(stmts)
    }

    /// Parse qubit references.
    fn parse_qubit_refs(&mut self) -> ParseResult<Vec<QubitRef>> {
        let mut refs = vec![self.parse_qubit_ref()?];
        while self.consume(&Token::Comma) {
            refs.push(self.parse_qubit_ref()?);
        }
        Ok(refs)
    }

    /// Parse a single qubit reference.
    fn parse_qubit_ref(&mut self) -> ParseResult<QubitRef> {
        let (register, selector) = self.parse_reference()?;
        Ok(match selector {
            Selector::All => QubitRef::register(register),
            Selector::Index(index) => QubitRef::single(register, index),
            Selector::Range(start, end) => QubitRef::Range {
                register,
                start,
                end,
            },
        })
    }

    /// Parse bit references.
    fn parse_bit_refs(&mut self) -> ParseResult<Vec<BitRef>> {
        let mut refs = vec![self.parse_bit_ref()?];
        while self.consume(&Token::Comma) {
            refs.push(self.parse_bit_ref()?);
        }
        Ok(refs)
    }

    /// Parse a single bit reference.
    fn parse_bit_ref(&mut self) -> ParseResult<BitRef> {
        let (register, selector) = self.parse_reference()?;
        Ok(match selector {
            Selector::All => BitRef::register(register),
            Selector::Index(index) => BitRef::single(register, index),
            Selector::Range(start, end) => BitRef::Range {
                register,
                start,
                end,
            },
        })
    }

    /// Parse `name`, `name[i]` or `name[a:b]`.
    fn parse_reference(&mut self) -> ParseResult<(String, Selector)> {
        let register = self.parse_identifier()?;

        if !self.consume(&Token::LBracket) {
            return Ok((register, Selector::All));
        }

        let first = self.parse_u32()?;
        let selector = if self.consume(&Token::Colon) {
            Selector::Range(first, self.parse_u32()?)
        } else {
            Selector::Index(first)
        };
        self.expect(Token::RBracket)?;

        Ok((register, selector))
    }
}

enum Selector {
    All,
    Index(u32),
    Range(u32, u32),
}
