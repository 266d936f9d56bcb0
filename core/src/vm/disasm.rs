//! Human- and machine-readable listings of a module.

use std::fmt::{self, Write};

use serde::Serialize;

use super::{BytecodeModule, Instr, Op, VmError, decode_instr};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisasmLine {
    pub offset: usize,
    pub op: Op,
    /// Raw immediates in encoding order.
    pub operands: Vec<i64>,
    /// Absolute destination of a jump or call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<i64>,
    /// String contents for `PUSHSTR`, lossily decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub strings: Vec<String>,
    pub code_len: usize,
    pub instructions: Vec<DisasmLine>,
}

/// Decode every instruction in `module`. Stops at the first undecodable byte.
pub fn disassemble(module: &BytecodeModule) -> Result<Listing, VmError> {
    let code = module.code.as_slice();
    let mut instructions = Vec::new();
    let mut pc = 0;
    while pc < code.len() {
        let (instr, next) = decode_instr(code, pc)?;
        let relative = |off: i32| Some(next as i64 + i64::from(off));
        let (operands, target) = match instr {
            Instr::PushI(v) => (vec![i64::from(v)], None),
            Instr::PushStr(idx) | Instr::Load(idx) | Instr::Store(idx) | Instr::Arg(idx) => (vec![i64::from(idx)], None),
            Instr::Jmp(off) | Instr::Jz(off) => (vec![i64::from(off)], relative(off)),
            Instr::Call { target, argc } => (vec![i64::from(target), i64::from(argc)], Some(i64::from(target))),
            Instr::Ret { has_value } => (vec![i64::from(has_value)], None),
            Instr::Halt | Instr::Binary(_) | Instr::Not | Instr::Print | Instr::Println => (Vec::new(), None),
        };
        let string = match instr {
            Instr::PushStr(idx) => module
                .strings
                .get(idx as usize)
                .map(|s| String::from_utf8_lossy(s).into_owned()),
            _ => None,
        };
        instructions.push(DisasmLine {
            offset: pc,
            op: instr.op(),
            operands,
            target,
            string,
        });
        pc = next;
    }
    Ok(Listing {
        strings: module
            .strings
            .iter()
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect(),
        code_len: code.len(),
        instructions,
    })
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== strings ({}) ==", self.strings.len())?;
        for (idx, s) in self.strings.iter().enumerate() {
            writeln!(f, "{:4} {:?}", idx, s)?;
        }
        writeln!(f, "== code ({} bytes) ==", self.code_len)?;
        for line in &self.instructions {
            let mut text = format!("{:06} {:<8}", line.offset, line.op.mnemonic());
            for operand in &line.operands {
                write!(text, " {}", operand)?;
            }
            if let Some(target) = line.target {
                write!(text, "  ; -> {:06}", target)?;
            }
            if let Some(s) = &line.string {
                write!(text, "  ; {:?}", s)?;
            }
            writeln!(f, "{}", text.trim_end())?;
        }
        Ok(())
    }
}
