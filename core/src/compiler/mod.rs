//! Single-pass compiler: recursive-descent parsing fused with bytecode emission.
//!
//! There is no syntax tree. Each grammar rule writes its instructions straight
//! into a [`CodeBuffer`]; forward branches are emitted with a placeholder
//! offset and resolved through a [`Fixup`] once the target is reached.

mod builder;
mod driver;
mod error;
mod expr;
mod stmt;

pub use builder::{CodeBuffer, Fixup};
pub use driver::{Compiler, Limits, compile_source};
pub use error::{CompileError, CompileErrorKind};
