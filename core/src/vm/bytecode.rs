use std::fmt;

use serde::Serialize;

use super::VmError;

/// One-byte instruction tags. The numbering is part of the module format.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Op {
    Halt = 0,
    PushI = 1,
    PushStr = 2,
    Add = 3,
    Sub = 4,
    Mul = 5,
    Div = 6,
    Mod = 7,
    Eq = 8,
    Ne = 9,
    Lt = 10,
    Le = 11,
    Gt = 12,
    Ge = 13,
    And = 14,
    Or = 15,
    Not = 16,
    Jmp = 17,
    Jz = 18,
    Load = 19,
    Store = 20,
    Call = 21,
    Ret = 22,
    Arg = 23,
    Print = 24,
    Println = 25,
}

const OPS: [Op; 26] = [
    Op::Halt,
    Op::PushI,
    Op::PushStr,
    Op::Add,
    Op::Sub,
    Op::Mul,
    Op::Div,
    Op::Mod,
    Op::Eq,
    Op::Ne,
    Op::Lt,
    Op::Le,
    Op::Gt,
    Op::Ge,
    Op::And,
    Op::Or,
    Op::Not,
    Op::Jmp,
    Op::Jz,
    Op::Load,
    Op::Store,
    Op::Call,
    Op::Ret,
    Op::Arg,
    Op::Print,
    Op::Println,
];

impl Op {
    #[inline]
    pub fn from_byte(byte: u8) -> Option<Op> {
        OPS.get(byte as usize).copied()
    }

    #[inline]
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Size in bytes of the immediate operands following the opcode.
    pub fn operand_len(self) -> usize {
        match self {
            Op::PushI | Op::PushStr | Op::Jmp | Op::Jz | Op::Load | Op::Store | Op::Ret | Op::Arg => 4,
            Op::Call => 8,
            _ => 0,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Halt => "HALT",
            Op::PushI => "PUSHI",
            Op::PushStr => "PUSHSTR",
            Op::Add => "ADD",
            Op::Sub => "SUB",
            Op::Mul => "MUL",
            Op::Div => "DIV",
            Op::Mod => "MOD",
            Op::Eq => "EQ",
            Op::Ne => "NE",
            Op::Lt => "LT",
            Op::Le => "LE",
            Op::Gt => "GT",
            Op::Ge => "GE",
            Op::And => "AND",
            Op::Or => "OR",
            Op::Not => "NOT",
            Op::Jmp => "JMP",
            Op::Jz => "JZ",
            Op::Load => "LOAD",
            Op::Store => "STORE",
            Op::Call => "CALL",
            Op::Ret => "RET",
            Op::Arg => "ARG",
            Op::Print => "PRINT",
            Op::Println => "PRINTLN",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A decoded instruction with its immediates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    Halt,
    PushI(i32),
    PushStr(u32),
    /// Any two-operand arithmetic, comparison or logical opcode.
    Binary(Op),
    Not,
    /// Offset relative to the end of the instruction.
    Jmp(i32),
    Jz(i32),
    Load(u32),
    Store(u32),
    Call { target: u32, argc: u32 },
    Ret { has_value: bool },
    Arg(u32),
    Print,
    Println,
}

impl Instr {
    pub fn op(&self) -> Op {
        match self {
            Instr::Halt => Op::Halt,
            Instr::PushI(_) => Op::PushI,
            Instr::PushStr(_) => Op::PushStr,
            Instr::Binary(op) => *op,
            Instr::Not => Op::Not,
            Instr::Jmp(_) => Op::Jmp,
            Instr::Jz(_) => Op::Jz,
            Instr::Load(_) => Op::Load,
            Instr::Store(_) => Op::Store,
            Instr::Call { .. } => Op::Call,
            Instr::Ret { .. } => Op::Ret,
            Instr::Arg(_) => Op::Arg,
            Instr::Print => Op::Print,
            Instr::Println => Op::Println,
        }
    }
}

#[inline]
fn read_i32_at(code: &[u8], at: usize) -> Option<i32> {
    let bytes = code.get(at..at + 4)?;
    Some(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[inline]
fn read_u32_at(code: &[u8], at: usize) -> Option<u32> {
    read_i32_at(code, at).map(|v| v as u32)
}

/// Decode the instruction starting at `pc`, returning it with the offset of the next one.
pub fn decode_instr(code: &[u8], pc: usize) -> Result<(Instr, usize), VmError> {
    let Some(&byte) = code.get(pc) else {
        return Err(VmError::UnexpectedEnd { pc });
    };
    let op = Op::from_byte(byte).ok_or(VmError::UnknownOpcode { op: byte, pc })?;
    let operands = pc + 1;
    let next = operands + op.operand_len();
    if next > code.len() {
        return Err(VmError::TruncatedInstruction { pc });
    }
    let i32_arg = || read_i32_at(code, operands).ok_or(VmError::TruncatedInstruction { pc });
    let u32_arg = || read_u32_at(code, operands).ok_or(VmError::TruncatedInstruction { pc });

    let instr = match op {
        Op::Halt => Instr::Halt,
        Op::PushI => Instr::PushI(i32_arg()?),
        Op::PushStr => Instr::PushStr(u32_arg()?),
        Op::Add
        | Op::Sub
        | Op::Mul
        | Op::Div
        | Op::Mod
        | Op::Eq
        | Op::Ne
        | Op::Lt
        | Op::Le
        | Op::Gt
        | Op::Ge
        | Op::And
        | Op::Or => Instr::Binary(op),
        Op::Not => Instr::Not,
        Op::Jmp => Instr::Jmp(i32_arg()?),
        Op::Jz => Instr::Jz(i32_arg()?),
        Op::Load => Instr::Load(u32_arg()?),
        Op::Store => Instr::Store(u32_arg()?),
        Op::Call => {
            let target = u32_arg()?;
            let argc = read_u32_at(code, operands + 4).ok_or(VmError::TruncatedInstruction { pc })?;
            Instr::Call { target, argc }
        }
        Op::Ret => Instr::Ret {
            has_value: i32_arg()? != 0,
        },
        Op::Arg => Instr::Arg(u32_arg()?),
        Op::Print => Instr::Print,
        Op::Println => Instr::Println,
    };
    Ok((instr, next))
}
