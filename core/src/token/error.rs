use std::fmt;

/// What went wrong while scanning source bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    UnterminatedString,
    /// Escape sequence other than `\n \t \" \\`; `None` when the source ends after the backslash.
    UnknownEscape(Option<u8>),
    UnexpectedChar(u8),
    LoneAmpersand,
    LonePipe,
}

/// Lexical error with the line the scanner was on when it gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: u32,
}

impl LexError {
    pub fn new(kind: LexErrorKind, line: u32) -> Self {
        Self { kind, line }
    }
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexErrorKind::UnterminatedString => write!(f, "unterminated string"),
            LexErrorKind::UnknownEscape(Some(c)) if c.is_ascii_graphic() => {
                write!(f, "unknown escape '\\{}'", *c as char)
            }
            LexErrorKind::UnknownEscape(_) => write!(f, "unknown escape"),
            LexErrorKind::UnexpectedChar(c) => {
                let shown = if (32..127).contains(c) { *c as char } else { '?' };
                write!(f, "unexpected character '{}' (0x{:02X})", shown, c)
            }
            LexErrorKind::LoneAmpersand => write!(f, "single '&' not supported"),
            LexErrorKind::LonePipe => write!(f, "single '|' not supported"),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at line {}", self.kind, self.line)
    }
}

impl std::error::Error for LexError {}
