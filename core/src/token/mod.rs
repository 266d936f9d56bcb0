mod error;
mod lexer;

pub use error::{LexError, LexErrorKind};
pub use lexer::{Lexer, Token};
