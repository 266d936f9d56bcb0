use crate::{
    val::Value,
    vm::{Op, VmError},
};

/// Unary operators with a dedicated opcode. Negation has none; the compiler
/// lowers `-x` to `0 - x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
}

impl UnaryOp {
    pub(crate) fn eval(self, val: Value) -> Value {
        match self {
            UnaryOp::Not => Value::from_bool(!val.is_truthy()),
        }
    }

    pub fn opcode(self) -> Op {
        match self {
            UnaryOp::Not => Op::Not,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    /// Both operands are already evaluated; `&&` and `||` never short-circuit.
    pub(crate) fn eval(self, l: Value, r: Value) -> Result<Value, VmError> {
        let (a, b) = (l.as_i32(), r.as_i32());
        let out = match self {
            BinOp::Add => a.wrapping_add(b),
            BinOp::Sub => a.wrapping_sub(b),
            BinOp::Mul => a.wrapping_mul(b),
            BinOp::Div => {
                if b == 0 {
                    return Err(VmError::DivisionByZero);
                }
                a.wrapping_div(b)
            }
            BinOp::Mod => {
                if b == 0 {
                    return Err(VmError::ModuloByZero);
                }
                a.wrapping_rem(b)
            }
            BinOp::Eq => (a == b) as i32,
            BinOp::Ne => (a != b) as i32,
            BinOp::Lt => (a < b) as i32,
            BinOp::Le => (a <= b) as i32,
            BinOp::Gt => (a > b) as i32,
            BinOp::Ge => (a >= b) as i32,
            BinOp::And => (a != 0 && b != 0) as i32,
            BinOp::Or => (a != 0 || b != 0) as i32,
        };
        Ok(Value::Int(out))
    }

    pub fn opcode(self) -> Op {
        match self {
            BinOp::Add => Op::Add,
            BinOp::Sub => Op::Sub,
            BinOp::Mul => Op::Mul,
            BinOp::Div => Op::Div,
            BinOp::Mod => Op::Mod,
            BinOp::Eq => Op::Eq,
            BinOp::Ne => Op::Ne,
            BinOp::Lt => Op::Lt,
            BinOp::Le => Op::Le,
            BinOp::Gt => Op::Gt,
            BinOp::Ge => Op::Ge,
            BinOp::And => Op::And,
            BinOp::Or => Op::Or,
        }
    }

    pub fn from_opcode(op: Op) -> Option<BinOp> {
        let bin = match op {
            Op::Add => BinOp::Add,
            Op::Sub => BinOp::Sub,
            Op::Mul => BinOp::Mul,
            Op::Div => BinOp::Div,
            Op::Mod => BinOp::Mod,
            Op::Eq => BinOp::Eq,
            Op::Ne => BinOp::Ne,
            Op::Lt => BinOp::Lt,
            Op::Le => BinOp::Le,
            Op::Gt => BinOp::Gt,
            Op::Ge => BinOp::Ge,
            Op::And => BinOp::And,
            Op::Or => BinOp::Or,
            _ => return None,
        };
        Some(bin)
    }
}

