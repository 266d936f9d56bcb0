//! Expression parsing, lowest precedence first:
//! `||`, `&&`, comparisons, `+ -`, `* / %`, unary `- !`, primary.

use super::{
    driver::Compiler,
    error::{CompileError, CompileErrorKind},
};
use crate::{
    op::{BinOp, UnaryOp},
    token::Token,
    vm::Op,
};

impl Compiler<'_> {
    pub(super) fn expr(&mut self) -> Result<(), CompileError> {
        self.or_expr()
    }

    // Both sides of `||` and `&&` are always evaluated.
    fn or_expr(&mut self) -> Result<(), CompileError> {
        self.and_expr()?;
        while self.accept(Token::Or)? {
            self.and_expr()?;
            self.emit_binary(BinOp::Or);
        }
        Ok(())
    }

    fn and_expr(&mut self) -> Result<(), CompileError> {
        self.cmp_expr()?;
        while self.accept(Token::And)? {
            self.cmp_expr()?;
            self.emit_binary(BinOp::And);
        }
        Ok(())
    }

    fn cmp_expr(&mut self) -> Result<(), CompileError> {
        self.add_expr()?;
        loop {
            let op = match self.tok {
                Token::Eq => BinOp::Eq,
                Token::Ne => BinOp::Ne,
                Token::Lt => BinOp::Lt,
                Token::Le => BinOp::Le,
                Token::Gt => BinOp::Gt,
                Token::Ge => BinOp::Ge,
                _ => return Ok(()),
            };
            self.advance()?;
            self.add_expr()?;
            self.emit_binary(op);
        }
    }

    fn add_expr(&mut self) -> Result<(), CompileError> {
        self.mul_expr()?;
        loop {
            let op = match self.tok {
                Token::Add => BinOp::Add,
                Token::Sub => BinOp::Sub,
                _ => return Ok(()),
            };
            self.advance()?;
            self.mul_expr()?;
            self.emit_binary(op);
        }
    }

    fn mul_expr(&mut self) -> Result<(), CompileError> {
        self.unary_expr()?;
        loop {
            let op = match self.tok {
                Token::Mul => BinOp::Mul,
                Token::Div => BinOp::Div,
                Token::Mod => BinOp::Mod,
                _ => return Ok(()),
            };
            self.advance()?;
            self.unary_expr()?;
            self.emit_binary(op);
        }
    }

    fn unary_expr(&mut self) -> Result<(), CompileError> {
        if self.accept(Token::Sub)? {
            // -x => 0 - x
            self.emit_push_int(0);
            self.unary_expr()?;
            self.emit_binary(BinOp::Sub);
            return Ok(());
        }
        if self.accept(Token::Not)? {
            self.unary_expr()?;
            self.code.emit_op(UnaryOp::Not.opcode());
            return Ok(());
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<(), CompileError> {
        let line = self.tok_line;
        match self.advance()? {
            // Literals wider than 32 bits keep their low bits.
            Token::Int(value) => {
                self.emit_push_int(value as i32);
                Ok(())
            }
            Token::Str(bytes) => {
                let id = self
                    .env
                    .add_string(bytes)
                    .map_err(|full| CompileError::new(full.into(), line))?;
                self.code.emit_op(Op::PushStr);
                self.code.emit_u32(id);
                Ok(())
            }
            Token::Id(name) => {
                if self.tok == Token::LParen {
                    return self.call(name, line);
                }
                self.variable(&name, line)
            }
            Token::LParen => {
                self.expr()?;
                self.expect(Token::RParen)
            }
            found => Err(CompileError::new(CompileErrorKind::ExpectedPrimary { found }, line)),
        }
    }

    /// A parameter of the enclosing function shadows any global of the same name.
    fn variable(&mut self, name: &str, line: u32) -> Result<(), CompileError> {
        let param = self
            .params
            .as_ref()
            .and_then(|params| params.iter().position(|p| p == name));
        if let Some(idx) = param {
            self.code.emit_op(Op::Arg);
            self.code.emit_u32(idx as u32);
            return Ok(());
        }
        let Some(slot) = self.env.find_var(name) else {
            return Err(CompileError::new(CompileErrorKind::UndefinedVariable(name.to_string()), line));
        };
        self.code.emit_op(Op::Load);
        self.code.emit_u32(slot);
        Ok(())
    }

    /// `name(arg, ...)`: arguments left to right, then `CALL addr argc`.
    /// `line` is where the callee name starts.
    fn call(&mut self, name: String, line: u32) -> Result<(), CompileError> {
        self.expect(Token::LParen)?;
        let mut argc: u32 = 0;
        if self.tok != Token::RParen {
            loop {
                self.expr()?;
                argc += 1;
                if !self.accept(Token::Comma)? {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;
        let Some(addr) = self.env.find_func(&name, argc) else {
            return Err(CompileError::new(
                CompileErrorKind::UndefinedFunction { name, arity: argc },
                line,
            ));
        };
        self.code.emit_op(Op::Call);
        self.code.emit_u32(addr);
        self.code.emit_u32(argc);
        Ok(())
    }

    fn emit_binary(&mut self, op: BinOp) {
        self.code.emit_op(op.opcode());
    }

    fn emit_push_int(&mut self, value: i32) {
        self.code.emit_op(Op::PushI);
        self.code.emit_i32(value);
    }
}
