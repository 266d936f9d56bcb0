use crate::vm::Op;

use super::error::CompileErrorKind;

/// Position of a 4-byte jump placeholder awaiting its target.
///
/// Only relative jumps are ever patched, so the fixup is just the buffer
/// offset of the operand. It must be consumed by [`CodeBuffer::patch_here`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixup {
    at: usize,
}

/// Append-only instruction buffer with in-place patching of jump operands.
#[derive(Debug, Default, Clone)]
pub struct CodeBuffer {
    code: Vec<u8>,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.code.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.code
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.code
    }

    #[inline]
    pub fn emit_op(&mut self, op: Op) {
        self.code.push(op.byte());
    }

    #[inline]
    pub fn emit_i32(&mut self, value: i32) {
        self.code.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn emit_u32(&mut self, value: u32) {
        self.code.extend_from_slice(&value.to_le_bytes());
    }

    /// Emit `op` with a zero placeholder offset.
    pub fn emit_jump(&mut self, op: Op) -> Fixup {
        self.emit_op(op);
        let at = self.code.len();
        self.emit_i32(0);
        Fixup { at }
    }

    /// Point a pending jump at the current end of the buffer.
    pub fn patch_here(&mut self, fixup: Fixup) -> Result<(), CompileErrorKind> {
        let offset = relative(self.code.len(), fixup.at)?;
        self.code[fixup.at..fixup.at + 4].copy_from_slice(&offset.to_le_bytes());
        Ok(())
    }

    /// Emit `op` jumping backwards to an already-known `target`.
    pub fn emit_jump_back(&mut self, op: Op, target: usize) -> Result<(), CompileErrorKind> {
        self.emit_op(op);
        let offset = relative(target, self.code.len())?;
        self.emit_i32(offset);
        Ok(())
    }
}

/// Offset from the end of the operand at `operand_at` to `target`.
fn relative(target: usize, operand_at: usize) -> Result<i32, CompileErrorKind> {
    let offset = target as i64 - operand_at as i64 - 4;
    i32::try_from(offset).map_err(|_| CompileErrorKind::CodeTooLarge(i32::MAX as usize))
}
