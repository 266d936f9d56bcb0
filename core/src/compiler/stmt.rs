use super::{
    driver::Compiler,
    error::{CompileError, CompileErrorKind},
};
use crate::{token::Token, vm::Op};

impl Compiler<'_> {
    pub(super) fn statement(&mut self) -> Result<(), CompileError> {
        match self.tok {
            Token::Let => self.let_stmt(),
            Token::Id(_) => self.assign_stmt(),
            Token::Print => self.print_stmt(Op::Print),
            Token::Println => self.print_stmt(Op::Println),
            Token::If => self.if_stmt(),
            Token::While => self.while_stmt(),
            Token::Return => self.return_stmt(),
            Token::LBrace => self.block(),
            Token::Func => Err(self.error(CompileErrorKind::NestedFunction)),
            _ => Err(self.error(CompileErrorKind::UnknownStatement { found: self.tok.clone() })),
        }
    }

    /// `{ stmt* }`. Braces never open a scope.
    pub(super) fn block(&mut self) -> Result<(), CompileError> {
        self.expect(Token::LBrace)?;
        while self.tok != Token::RBrace && self.tok != Token::Eof {
            self.statement()?;
            self.check_code_size()?;
        }
        self.expect(Token::RBrace)
    }

    fn let_stmt(&mut self) -> Result<(), CompileError> {
        self.expect(Token::Let)?;
        let name = self.expect_id()?;
        self.expect(Token::Assign)?;
        // The initializer is compiled before the slot exists, so `let x = x`
        // reads an earlier `x`.
        self.expr()?;
        let slot = self.env.add_var(&name).map_err(|full| self.error(full))?;
        self.emit_store(slot);
        Ok(())
    }

    fn assign_stmt(&mut self) -> Result<(), CompileError> {
        let line = self.tok_line;
        let name = self.expect_id()?;
        self.expect(Token::Assign)?;
        self.expr()?;
        let slot = self
            .env
            .find_var(&name)
            .ok_or_else(|| CompileError::new(CompileErrorKind::UndefinedVariable(name), line))?;
        self.emit_store(slot);
        Ok(())
    }

    fn print_stmt(&mut self, op: Op) -> Result<(), CompileError> {
        self.advance()?;
        self.expect(Token::LParen)?;
        self.expr()?;
        self.expect(Token::RParen)?;
        self.code.emit_op(op);
        Ok(())
    }

    /// JZ else; then; JMP end; else: [else-block]; end:
    fn if_stmt(&mut self) -> Result<(), CompileError> {
        self.expect(Token::If)?;
        self.expect(Token::LParen)?;
        self.expr()?;
        self.expect(Token::RParen)?;

        let to_else = self.code.emit_jump(Op::Jz);
        self.block()?;
        let to_end = self.code.emit_jump(Op::Jmp);
        self.code.patch_here(to_else).map_err(|kind| self.error(kind))?;
        if self.accept(Token::Else)? {
            self.block()?;
        }
        self.code.patch_here(to_end).map_err(|kind| self.error(kind))
    }

    /// cond: <expr>; JZ end; body; JMP cond; end:
    fn while_stmt(&mut self) -> Result<(), CompileError> {
        self.expect(Token::While)?;
        self.expect(Token::LParen)?;
        let cond = self.code.len();
        self.expr()?;
        self.expect(Token::RParen)?;

        let to_end = self.code.emit_jump(Op::Jz);
        self.block()?;
        self.code
            .emit_jump_back(Op::Jmp, cond)
            .map_err(|kind| self.error(kind))?;
        self.code.patch_here(to_end).map_err(|kind| self.error(kind))
    }

    /// `return` carries a value only when the next token can start an expression.
    fn return_stmt(&mut self) -> Result<(), CompileError> {
        if self.params.is_none() {
            return Err(self.error(CompileErrorKind::ReturnOutsideFunction));
        }
        self.expect(Token::Return)?;
        let has_value = matches!(
            self.tok,
            Token::Int(_) | Token::Str(_) | Token::Id(_) | Token::LParen | Token::Sub | Token::Not
        );
        if has_value {
            self.expr()?;
        }
        self.code.emit_op(Op::Ret);
        self.code.emit_u32(u32::from(has_value));
        Ok(())
    }

    fn emit_store(&mut self, slot: u32) {
        self.code.emit_op(Op::Store);
        self.code.emit_u32(slot);
    }
}
