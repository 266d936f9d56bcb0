use tracing::debug;

use super::{
    builder::CodeBuffer,
    error::{CompileError, CompileErrorKind},
};
use crate::{
    resolve::Environment,
    token::{Lexer, Token},
    vm::{BytecodeModule, Op},
};

/// Fixed capacities enforced while compiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_vars: usize,
    pub max_strings: usize,
    pub max_functions: usize,
    pub max_params: usize,
    /// Upper bound on the emitted code section, in bytes.
    pub max_code: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_vars: 256,
            max_strings: 4096,
            max_functions: 256,
            max_params: 255,
            max_code: 1 << 20,
        }
    }
}

/// Compile a whole program with default limits.
pub fn compile_source(src: impl AsRef<[u8]>) -> Result<BytecodeModule, CompileError> {
    Compiler::new(src.as_ref()).compile()
}

/// Parser state for one compilation. The current token is always one ahead of
/// what has been emitted.
pub struct Compiler<'src> {
    lexer: Lexer<'src>,
    pub(super) tok: Token,
    /// Line on which `tok` starts.
    pub(super) tok_line: u32,
    pub(super) code: CodeBuffer,
    pub(super) env: Environment,
    pub(super) limits: Limits,
    /// Parameter names of the function being compiled, `None` at top level.
    pub(super) params: Option<Vec<String>>,
}

impl<'src> Compiler<'src> {
    pub fn new(src: &'src [u8]) -> Self {
        Self::with_limits(src, Limits::default())
    }

    pub fn with_limits(src: &'src [u8], limits: Limits) -> Self {
        Self {
            lexer: Lexer::new(src),
            tok: Token::Eof,
            tok_line: 1,
            code: CodeBuffer::new(),
            env: Environment::new(limits.max_vars, limits.max_strings, limits.max_functions),
            limits,
            params: None,
        }
    }

    /// Parse and emit the whole program.
    ///
    /// Leading `func` declarations are compiled first behind a jump to the
    /// first top-level statement. A declaration that shows up after
    /// statements is compiled in place behind its own skip jump so straight-line
    /// execution never falls into a function body.
    pub fn compile(mut self) -> Result<BytecodeModule, CompileError> {
        self.advance()?;

        let entry = self.code.emit_jump(Op::Jmp);
        while self.tok == Token::Func {
            self.function_decl()?;
        }
        self.code.patch_here(entry).map_err(|kind| self.error(kind))?;
        let hoisted = self.env.funcs().len();

        while self.tok != Token::Eof {
            if self.tok == Token::Func {
                let skip = self.code.emit_jump(Op::Jmp);
                self.function_decl()?;
                self.code.patch_here(skip).map_err(|kind| self.error(kind))?;
            } else {
                self.statement()?;
            }
            self.check_code_size()?;
        }
        self.code.emit_op(Op::Halt);
        self.check_code_size()?;

        debug!(
            functions = self.env.funcs().len(),
            hoisted,
            variables = self.env.vars().len(),
            strings = self.env.strings().len(),
            code_len = self.code.len(),
            "compiled module"
        );
        let code = self.code.into_bytes();
        Ok(BytecodeModule::new(self.env.into_strings(), code))
    }

    /// `func name(p0, p1, ...) { ... }`
    fn function_decl(&mut self) -> Result<(), CompileError> {
        self.expect(Token::Func)?;
        let name_line = self.tok_line;
        let name = self.expect_id()?;
        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        if self.tok != Token::RParen {
            loop {
                let param = self.expect_id()?;
                if params.len() >= self.limits.max_params {
                    return Err(self.error(CompileErrorKind::TooManyParameters(self.limits.max_params)));
                }
                params.push(param);
                if !self.accept(Token::Comma)? {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;

        let arity = params.len() as u32;
        if self.env.find_func(&name, arity).is_some() {
            return Err(CompileError::new(CompileErrorKind::DuplicateFunction { name, arity }, name_line));
        }
        let addr = self.code_addr()?;
        // Registered before the body so the function can call itself.
        self.env.add_func(&name, arity, addr).map_err(|full| self.error(full))?;

        self.params = Some(params);
        let body = self.block();
        self.params = None;
        body?;

        self.code.emit_op(Op::Ret);
        self.code.emit_u32(0);
        debug!(name = %name, arity, addr, end = self.code.len(), "compiled function");
        Ok(())
    }

    /// Move to the next token, returning the one just consumed.
    pub(super) fn advance(&mut self) -> Result<Token, CompileError> {
        let next = self.lexer.next_token()?;
        self.tok_line = self.lexer.token_line();
        Ok(std::mem::replace(&mut self.tok, next))
    }

    /// Consume the current token if it equals `tok`.
    pub(super) fn accept(&mut self, tok: Token) -> Result<bool, CompileError> {
        if self.tok == tok {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(super) fn expect(&mut self, tok: Token) -> Result<(), CompileError> {
        if self.accept(tok.clone())? {
            return Ok(());
        }
        Err(self.error(CompileErrorKind::Expected {
            expected: tok,
            found: self.tok.clone(),
        }))
    }

    pub(super) fn expect_id(&mut self) -> Result<String, CompileError> {
        let Token::Id(name) = &self.tok else {
            return Err(self.error(CompileErrorKind::ExpectedIdentifier { found: self.tok.clone() }));
        };
        let name = name.clone();
        self.advance()?;
        Ok(name)
    }

    /// Error located at the start of the current token.
    pub(super) fn error(&self, kind: impl Into<CompileErrorKind>) -> CompileError {
        CompileError::new(kind.into(), self.tok_line)
    }

    /// Current end of the code buffer as an absolute call target.
    fn code_addr(&self) -> Result<u32, CompileError> {
        u32::try_from(self.code.len()).map_err(|_| self.error(CompileErrorKind::CodeTooLarge(self.limits.max_code)))
    }

    pub(super) fn check_code_size(&self) -> Result<(), CompileError> {
        if self.code.len() > self.limits.max_code {
            return Err(self.error(CompileErrorKind::CodeTooLarge(self.limits.max_code)));
        }
        Ok(())
    }
}
