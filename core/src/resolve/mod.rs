//! Name resolution for the single-pass compiler: variable slots, function entry
//! points and the string-literal pool.

mod env;

pub use env::{Environment, FuncEntry, TableFull, VarEntry};
