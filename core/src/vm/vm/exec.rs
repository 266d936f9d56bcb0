use std::io::Write;

use tracing::{debug, trace};

use super::Vm;
use super::frame::CallFrameMeta;
use crate::{
    op::{BinOp, UnaryOp},
    val::Value,
    vm::{BytecodeModule, Instr, VmError, decode_instr},
};

impl Vm {
    /// Execute `module` from offset 0 until `HALT`, writing `print`/`println`
    /// output to `out`. Output produced before an error is flushed, not discarded.
    pub fn run<W: Write>(&mut self, module: &BytecodeModule, out: &mut W) -> Result<(), VmError> {
        self.reset();
        let result = self.dispatch(module, out);
        match &result {
            Ok(()) => {
                out.flush()?;
                debug!(steps = self.steps, "vm halted");
            }
            Err(err) => {
                let _ = out.flush();
                debug!(pc = self.pc, steps = self.steps, error = %err, "vm stopped");
            }
        }
        result
    }

    fn dispatch<W: Write>(&mut self, module: &BytecodeModule, out: &mut W) -> Result<(), VmError> {
        let code = module.code.as_slice();
        loop {
            if let Some(limit) = self.limits.max_steps {
                if self.steps >= limit {
                    return Err(VmError::StepLimit(limit));
                }
            }
            let at = self.pc;
            let (instr, next) = decode_instr(code, at)?;
            self.pc = next;
            self.steps += 1;

            match instr {
                Instr::Halt => return Ok(()),
                Instr::PushI(v) => self.push(Value::Int(v))?,
                Instr::PushStr(idx) => self.push(Value::Str(idx))?,
                Instr::Binary(op) => {
                    let Some(bin) = BinOp::from_opcode(op) else {
                        return Err(VmError::UnknownOpcode { op: op.byte(), pc: at });
                    };
                    let r = self.pop(at)?;
                    let l = self.pop(at)?;
                    self.push(bin.eval(l, r)?)?;
                }
                Instr::Not => {
                    let v = self.pop(at)?;
                    self.push(UnaryOp::Not.eval(v))?;
                }
                Instr::Jmp(offset) => self.jump(code.len(), at, offset)?,
                Instr::Jz(offset) => {
                    if !self.pop(at)?.is_truthy() {
                        self.jump(code.len(), at, offset)?;
                    }
                }
                Instr::Load(slot) => {
                    let v = *self.globals.get(slot as usize).ok_or(VmError::SlotOverflow(slot))?;
                    self.push(v)?;
                }
                Instr::Store(slot) => {
                    let v = self.pop(at)?;
                    let cell = self.globals.get_mut(slot as usize).ok_or(VmError::SlotOverflow(slot))?;
                    *cell = v;
                }
                Instr::Call { target, argc } => self.call(code.len(), at, target, argc)?,
                Instr::Ret { has_value } => self.ret(at, has_value)?,
                Instr::Arg(idx) => {
                    let v = *self
                        .stack
                        .get(self.fp + idx as usize)
                        .ok_or(VmError::BadParameter(idx))?;
                    self.push(v)?;
                }
                Instr::Print => self.print(module, at, out, false)?,
                Instr::Println => self.print(module, at, out, true)?,
            }
        }
    }

    #[inline]
    fn push(&mut self, v: Value) -> Result<(), VmError> {
        if self.stack.len() >= self.limits.max_stack {
            return Err(VmError::StackOverflow(self.limits.max_stack));
        }
        self.stack.push(v);
        Ok(())
    }

    #[inline]
    fn pop(&mut self, pc: usize) -> Result<Value, VmError> {
        self.stack.pop().ok_or(VmError::StackUnderflow { pc })
    }

    /// Relative jump from the end of the current instruction.
    fn jump(&mut self, code_len: usize, at: usize, offset: i32) -> Result<(), VmError> {
        let target = self.pc as i64 + i64::from(offset);
        if target < 0 || target > code_len as i64 {
            return Err(VmError::BadJumpTarget { target, pc: at });
        }
        self.pc = target as usize;
        Ok(())
    }

    fn call(&mut self, code_len: usize, at: usize, target: u32, argc: u32) -> Result<(), VmError> {
        if target as usize >= code_len {
            return Err(VmError::BadJumpTarget {
                target: i64::from(target),
                pc: at,
            });
        }
        let argc = argc as usize;
        if argc > self.stack.len() {
            return Err(VmError::StackUnderflow { pc: at });
        }
        self.calls.push(CallFrameMeta {
            saved_fp: self.fp,
            resume_pc: self.pc,
        })?;
        self.fp = self.stack.len() - argc;
        trace!(call_target = target, argc, depth = self.calls.depth(), "call");
        self.pc = target as usize;
        Ok(())
    }

    fn ret(&mut self, at: usize, has_value: bool) -> Result<(), VmError> {
        let value = if has_value { Some(self.pop(at)?) } else { None };
        let frame = self.calls.pop().ok_or(VmError::ReturnWithoutCall { pc: at })?;
        // Drop the arguments and anything the callee left above them.
        self.stack.truncate(self.fp);
        self.fp = frame.saved_fp;
        self.pc = frame.resume_pc;
        trace!(resume_pc = self.pc, depth = self.calls.depth(), "return");
        if let Some(v) = value {
            self.push(v)?;
        }
        Ok(())
    }

    fn print<W: Write>(&mut self, module: &BytecodeModule, at: usize, out: &mut W, newline: bool) -> Result<(), VmError> {
        let v = self.pop(at)?;
        trace!(value = %v, kind = v.type_name(), "print");
        match v {
            Value::Int(n) => {
                let mut buf = itoa::Buffer::new();
                out.write_all(buf.format(n).as_bytes())?;
            }
            Value::Str(idx) => {
                let s = module.strings.get(idx as usize).ok_or(VmError::BadStringId(idx))?;
                out.write_all(s)?;
            }
        }
        if newline {
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}
