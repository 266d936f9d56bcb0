use std::fmt;

/// Failure while decoding a `NOVABC` module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// The 8-byte header is neither `NOVA....` nor `NOVABC..`.
    BadMagic([u8; 8]),
    /// The payload ended while reading the named part.
    Corrupt(&'static str),
}

impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleError::BadMagic(tag) => write!(f, "bad magic: '{}'", String::from_utf8_lossy(tag).trim_end_matches('\0')),
            ModuleError::Corrupt(what) => write!(f, "corrupt module: truncated {}", what),
        }
    }
}

impl std::error::Error for ModuleError {}

/// Runtime failure. Every variant halts the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    DivisionByZero,
    ModuloByZero,
    UnknownOpcode { op: u8, pc: usize },
    TruncatedInstruction { pc: usize },
    /// The program counter left the code without reaching `HALT`.
    UnexpectedEnd { pc: usize },
    BadJumpTarget { target: i64, pc: usize },
    StackOverflow(usize),
    StackUnderflow { pc: usize },
    FrameOverflow(usize),
    ReturnWithoutCall { pc: usize },
    SlotOverflow(u32),
    BadParameter(u32),
    BadStringId(u32),
    StepLimit(u64),
    Io(String),
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmError::DivisionByZero => write!(f, "division by zero"),
            VmError::ModuloByZero => write!(f, "modulo by zero"),
            VmError::UnknownOpcode { op, pc } => write!(f, "unknown opcode {} at pc={}", op, pc),
            VmError::TruncatedInstruction { pc } => write!(f, "truncated instruction at pc={}", pc),
            VmError::UnexpectedEnd { pc } => write!(f, "ran off the end of the code at pc={} without HALT", pc),
            VmError::BadJumpTarget { target, pc } => write!(f, "jump target {} out of range at pc={}", target, pc),
            VmError::StackOverflow(limit) => write!(f, "stack overflow (limit {} cells)", limit),
            VmError::StackUnderflow { pc } => write!(f, "stack underflow at pc={}", pc),
            VmError::FrameOverflow(limit) => write!(f, "call depth exceeded (limit {} frames)", limit),
            VmError::ReturnWithoutCall { pc } => write!(f, "return without a matching call at pc={}", pc),
            VmError::SlotOverflow(slot) => write!(f, "variable slot {} out of range", slot),
            VmError::BadParameter(idx) => write!(f, "parameter {} outside the current frame", idx),
            VmError::BadStringId(id) => write!(f, "bad string id {}", id),
            VmError::StepLimit(limit) => write!(f, "step limit of {} instructions exceeded", limit),
            VmError::Io(msg) => write!(f, "output error: {}", msg),
        }
    }
}

impl std::error::Error for VmError {}

impl From<std::io::Error> for VmError {
    fn from(err: std::io::Error) -> Self {
        VmError::Io(err.to_string())
    }
}
