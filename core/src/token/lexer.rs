use std::fmt;

use super::{LexError, LexErrorKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Eof,
    Id(String), // identifier
    Int(i64),   // 1 (accumulated without overflow checks, truncated on emission)
    Str(Vec<u8>), // "abc" with escapes already resolved
    LParen,     // (
    RParen,     // )
    LBrace,     // {
    RBrace,     // }
    Comma,      // ,
    Assign,     // =
    Add,        // +
    Sub,        // -
    Mul,        // *
    Div,        // /
    Mod,        // %
    Lt,         // <
    Gt,         // >
    Not,        // !
    Eq,         // ==
    Ne,         // !=
    Le,         // <=
    Ge,         // >=
    And,        // &&
    Or,         // ||
    // Keywords
    Let,
    If,
    Else,
    While,
    Print,
    Println,
    Func,
    Return,
}

impl Token {
    fn keyword(ident: &str) -> Option<Token> {
        let kw = match ident {
            "let" => Token::Let,
            "if" => Token::If,
            "else" => Token::Else,
            "while" => Token::While,
            "print" => Token::Print,
            "println" => Token::Println,
            "func" => Token::Func,
            "return" => Token::Return,
            _ => return None,
        };
        Some(kw)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let punct = match self {
            Token::Eof => return write!(f, "end of input"),
            Token::Id(name) => return write!(f, "identifier '{}'", name),
            Token::Int(v) => return write!(f, "integer {}", v),
            Token::Str(_) => return write!(f, "string literal"),
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Comma => ",",
            Token::Assign => "=",
            Token::Add => "+",
            Token::Sub => "-",
            Token::Mul => "*",
            Token::Div => "/",
            Token::Mod => "%",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Not => "!",
            Token::Eq => "==",
            Token::Ne => "!=",
            Token::Le => "<=",
            Token::Ge => ">=",
            Token::And => "&&",
            Token::Or => "||",
            Token::Let => "let",
            Token::If => "if",
            Token::Else => "else",
            Token::While => "while",
            Token::Print => "print",
            Token::Println => "println",
            Token::Func => "func",
            Token::Return => "return",
        };
        write!(f, "'{}'", punct)
    }
}

const ASCII_WHITESPACE: u8 = 1 << 0;
const ASCII_DIGIT: u8 = 1 << 1;
const ASCII_IDENT_START: u8 = 1 << 2;
const ASCII_IDENT_CONT: u8 = 1 << 3;

const fn build_ascii_class() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let c = i as u8;
        // Same set as C's isspace() in the "C" locale.
        if matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C) {
            table[i] |= ASCII_WHITESPACE;
        }
        if c >= b'0' && c <= b'9' {
            table[i] |= ASCII_DIGIT | ASCII_IDENT_CONT;
        }
        if (c >= b'a' && c <= b'z') || (c >= b'A' && c <= b'Z') || c == b'_' {
            table[i] |= ASCII_IDENT_START | ASCII_IDENT_CONT;
        }
        i += 1;
    }
    table
}

const ASCII_CLASS: [u8; 256] = build_ascii_class();

#[inline]
fn has_class(c: u8, class: u8) -> bool {
    ASCII_CLASS[c as usize] & class != 0
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const LATIN1_NBSP: u8 = 0xA0;
const UTF8_NBSP: &[u8] = &[0xC2, 0xA0];

/// Pull-based scanner over raw source bytes.
///
/// Tokens are produced one at a time by [`Lexer::next_token`]; the lexer keeps no
/// state beyond its cursor and the current line, which callers use for diagnostics.
pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
    // line the most recent token started on
    token_line: u32,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        let pos = if src.starts_with(UTF8_BOM) { UTF8_BOM.len() } else { 0 };
        Self {
            src,
            pos,
            line: 1,
            token_line: 1,
            finished: false,
        }
    }

    /// Line the cursor is currently on (1-based).
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Line on which the token last returned by [`Lexer::next_token`] begins.
    pub fn token_line(&self) -> u32 {
        self.token_line
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        if c == b'\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn eat(&mut self, next: u8) -> bool {
        if self.peek() == Some(next) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn err(&self, kind: LexErrorKind) -> LexError {
        LexError::new(kind, self.line)
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c == LATIN1_NBSP || has_class(c, ASCII_WHITESPACE) {
                self.bump();
            } else if self.src[self.pos..].starts_with(UTF8_NBSP) {
                self.pos += UTF8_NBSP.len();
            } else if c == b'/' && self.peek_at(1) == Some(b'/') {
                // Line comment runs through the newline.
                while let Some(c) = self.bump() {
                    if c == b'\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Scan the next token, returning [`Token::Eof`] once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();
        self.token_line = self.line;
        let Some(c) = self.peek() else {
            return Ok(Token::Eof);
        };

        if c == b'"' {
            return self.scan_string();
        }
        if has_class(c, ASCII_DIGIT) {
            return Ok(self.scan_int());
        }
        if has_class(c, ASCII_IDENT_START) {
            return Ok(self.scan_ident());
        }
        self.scan_punct()
    }

    fn scan_string(&mut self) -> Result<Token, LexError> {
        self.bump(); // opening quote
        let mut content = Vec::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(self.err(LexErrorKind::UnterminatedString));
            };
            match c {
                b'"' => return Ok(Token::Str(content)),
                b'\\' => {
                    let escaped = match self.bump() {
                        Some(b'n') => b'\n',
                        Some(b't') => b'\t',
                        Some(b'"') => b'"',
                        Some(b'\\') => b'\\',
                        other => return Err(self.err(LexErrorKind::UnknownEscape(other))),
                    };
                    content.push(escaped);
                }
                _ => content.push(c),
            }
        }
    }

    fn scan_int(&mut self) -> Token {
        let mut value: i64 = 0;
        while let Some(c) = self.peek().filter(|c| has_class(*c, ASCII_DIGIT)) {
            self.bump();
            value = value.wrapping_mul(10).wrapping_add(i64::from(c - b'0'));
        }
        Token::Int(value)
    }

    fn scan_ident(&mut self) -> Token {
        let start = self.pos;
        while self.peek().is_some_and(|c| has_class(c, ASCII_IDENT_CONT)) {
            self.bump();
        }
        // Identifier bytes are ASCII by construction.
        let ident: String = self.src[start..self.pos].iter().map(|&b| b as char).collect();
        Token::keyword(&ident).unwrap_or(Token::Id(ident))
    }

    fn scan_punct(&mut self) -> Result<Token, LexError> {
        let Some(c) = self.bump() else {
            return Ok(Token::Eof);
        };
        let tok = match c {
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b'{' => Token::LBrace,
            b'}' => Token::RBrace,
            b',' => Token::Comma,
            b'+' => Token::Add,
            b'-' => Token::Sub,
            b'*' => Token::Mul,
            b'/' => Token::Div,
            b'%' => Token::Mod,
            b'!' if self.eat(b'=') => Token::Ne,
            b'!' => Token::Not,
            b'=' if self.eat(b'=') => Token::Eq,
            b'=' => Token::Assign,
            b'<' if self.eat(b'=') => Token::Le,
            b'<' => Token::Lt,
            b'>' if self.eat(b'=') => Token::Ge,
            b'>' => Token::Gt,
            b'&' if self.eat(b'&') => Token::And,
            b'&' => return Err(self.err(LexErrorKind::LoneAmpersand)),
            b'|' if self.eat(b'|') => Token::Or,
            b'|' => return Err(self.err(LexErrorKind::LonePipe)),
            other => return Err(self.err(LexErrorKind::UnexpectedChar(other))),
        };
        Ok(tok)
    }
}

/// Yields tokens up to (not including) [`Token::Eof`]; stops after the first error.
impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(Token::Eof) => {
                self.finished = true;
                None
            }
            Ok(tok) => Some(Ok(tok)),
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
