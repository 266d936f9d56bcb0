mod exec;
mod frame;

use crate::val::Value;

use frame::CallStack;

/// Capacities of the machine. Exceeding any of them is a reported error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmLimits {
    /// Operand stack cells.
    pub max_stack: usize,
    /// Nested calls (depth of the frame-pointer and return-address stacks).
    pub max_frames: usize,
    /// Number of global variable slots, zeroed at start.
    pub globals: usize,
    /// Instruction budget; `None` runs until `HALT` or an error.
    pub max_steps: Option<u64>,
}

impl Default for VmLimits {
    fn default() -> Self {
        Self {
            max_stack: 2048,
            max_frames: 256,
            globals: 256,
            max_steps: None,
        }
    }
}

/// Stack machine state. Every [`Vm::run`] starts from a fresh state, so one `Vm`
/// can execute several modules in turn.
pub struct Vm {
    limits: VmLimits,
    stack: Vec<Value>,
    globals: Vec<Value>,
    calls: CallStack,
    fp: usize,
    pc: usize,
    steps: u64,
}

impl Vm {
    pub fn new() -> Self {
        Self::with_limits(VmLimits::default())
    }

    pub fn with_limits(limits: VmLimits) -> Self {
        Self {
            limits,
            stack: Vec::with_capacity(limits.max_stack.min(1024)),
            globals: vec![Value::default(); limits.globals],
            calls: CallStack::new(limits.max_frames),
            fp: 0,
            pc: 0,
            steps: 0,
        }
    }

    pub fn limits(&self) -> &VmLimits {
        &self.limits
    }

    /// Global slots as left by the last run.
    pub fn globals(&self) -> &[Value] {
        &self.globals
    }

    /// Operand stack as left by the last run.
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// Instructions executed by the last run.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Program counter where the last run stopped.
    pub fn pc(&self) -> usize {
        self.pc
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.globals.iter_mut().for_each(|slot| *slot = Value::default());
        self.calls.clear();
        self.fp = 0;
        self.pc = 0;
        self.steps = 0;
    }
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}
