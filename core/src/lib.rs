pub mod compiler;
mod op;
pub mod resolve;
pub mod token;
pub mod val;
pub mod vm;

pub use compiler::{CompileError, compile_source};
pub use vm::{BytecodeModule, Vm, VmError};
