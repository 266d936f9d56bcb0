use std::fmt;

use crate::{
    resolve::TableFull,
    token::{LexError, LexErrorKind, Token},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileErrorKind {
    Lex(LexErrorKind),
    Expected { expected: Token, found: Token },
    ExpectedIdentifier { found: Token },
    ExpectedPrimary { found: Token },
    UnknownStatement { found: Token },
    NestedFunction,
    ReturnOutsideFunction,
    UndefinedVariable(String),
    UndefinedFunction { name: String, arity: u32 },
    DuplicateFunction { name: String, arity: u32 },
    TooManyParameters(usize),
    TableFull(TableFull),
    CodeTooLarge(usize),
}

/// First error hit while compiling; compilation stops there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub line: u32,
}

impl CompileError {
    pub fn new(kind: CompileErrorKind, line: u32) -> Self {
        Self { kind, line }
    }
}

impl From<LexError> for CompileError {
    fn from(err: LexError) -> Self {
        Self::new(CompileErrorKind::Lex(err.kind), err.line)
    }
}

impl fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileErrorKind::Lex(kind) => write!(f, "{}", kind),
            CompileErrorKind::Expected { expected, found } => write!(f, "expected {}, found {}", expected, found),
            CompileErrorKind::ExpectedIdentifier { found } => write!(f, "expected identifier, found {}", found),
            CompileErrorKind::ExpectedPrimary { found } => write!(f, "expected primary expression, found {}", found),
            CompileErrorKind::UnknownStatement { found } => write!(f, "unknown statement starting with {}", found),
            CompileErrorKind::NestedFunction => write!(f, "functions can only be declared at top level"),
            CompileErrorKind::ReturnOutsideFunction => write!(f, "'return' outside of a function"),
            CompileErrorKind::UndefinedVariable(name) => write!(f, "undefined variable '{}'", name),
            CompileErrorKind::UndefinedFunction { name, arity } => {
                write!(f, "undefined function '{}' taking {} argument(s)", name, arity)
            }
            CompileErrorKind::DuplicateFunction { name, arity } => {
                write!(f, "function '{}' taking {} argument(s) is already defined", name, arity)
            }
            CompileErrorKind::TooManyParameters(limit) => write!(f, "too many parameters (limit {})", limit),
            CompileErrorKind::TableFull(full) => write!(f, "{}", full),
            CompileErrorKind::CodeTooLarge(limit) => write!(f, "code exceeds {} bytes", limit),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for CompileError {}

impl From<TableFull> for CompileErrorKind {
    fn from(full: TableFull) -> Self {
        CompileErrorKind::TableFull(full)
    }
}
