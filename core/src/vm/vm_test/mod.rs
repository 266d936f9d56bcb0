pub(super) use crate::{
    compiler::compile_source,
    val::Value,
    vm::{BytecodeModule, Op, Vm, VmError, VmLimits},
};

/// Run `module` on a fresh VM, returning everything printed and the outcome.
pub(super) fn exec_module(module: &BytecodeModule, limits: VmLimits) -> (String, Result<(), VmError>) {
    let mut vm = Vm::with_limits(limits);
    let mut out = Vec::new();
    let result = vm.run(module, &mut out);
    (String::from_utf8(out).expect("utf8 output"), result)
}

pub(super) fn exec_source(src: &str) -> (String, Result<(), VmError>) {
    let module = compile_source(src).expect("compile");
    exec_module(&module, VmLimits::default())
}

/// Output of a program that is expected to halt normally.
pub(super) fn output_of(src: &str) -> String {
    let (out, result) = exec_source(src);
    result.expect("run");
    out
}

/// Minimal assembler for hand-written instruction streams.
#[derive(Default)]
pub(super) struct Asm {
    code: Vec<u8>,
}

impl Asm {
    pub(super) fn op(mut self, op: Op) -> Self {
        self.code.push(op.byte());
        self
    }

    pub(super) fn i32(mut self, v: i32) -> Self {
        self.code.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub(super) fn u32(mut self, v: u32) -> Self {
        self.code.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub(super) fn module(self, strings: Vec<Vec<u8>>) -> BytecodeModule {
        BytecodeModule::new(strings, self.code)
    }
}

mod bytecode;
mod control_flow;
mod functions;
mod semantics;
