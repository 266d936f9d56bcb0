//! Stack bytecode VM subsystem
//!
//! Opcode definitions, the `NOVABC` module container, a disassembler and the
//! execution engine that interprets compiled modules.

mod bytecode;
mod disasm;
mod error;
mod novabc;
#[allow(clippy::module_inception)]
mod vm;

pub use bytecode::*;
pub use disasm::*;
pub use error::{ModuleError, VmError};
pub use novabc::*;
pub use vm::*;

#[cfg(test)]
mod vm_test;
