use std::fmt;

use serde::Serialize;

/// Bit pattern older modules used to smuggle string-pool indices through `i32` cells.
pub const STR_TAG: i32 = 0x4000_0000;

/// A single operand-stack or global-slot cell.
///
/// String constants are carried as a pool index instead of a tagged integer, so an
/// arithmetic result that happens to have bit 30 set still prints as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Value {
    Int(i32),
    Str(u32),
}

impl Value {
    /// The value as the 32-bit cell the instruction set computes with.
    ///
    /// `Str(i)` maps to `0x40000000 | i`, the encoding `PUSHSTR` produced historically,
    /// so comparisons and arithmetic on string references keep their old results.
    #[inline]
    pub fn as_i32(self) -> i32 {
        match self {
            Value::Int(v) => v,
            Value::Str(idx) => STR_TAG | idx as i32,
        }
    }

    #[inline]
    pub fn is_truthy(self) -> bool {
        self.as_i32() != 0
    }

    #[inline]
    pub fn from_bool(b: bool) -> Value {
        Value::Int(b as i32)
    }

    pub fn type_name(self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Str(_) => "str",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Int(0)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Str(idx) => write!(f, "<str #{}>", idx),
        }
    }
}
