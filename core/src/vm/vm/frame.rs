use crate::vm::VmError;

/// Saved caller state for one active call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct CallFrameMeta {
    /// Frame pointer of the caller.
    pub(super) saved_fp: usize,
    /// Offset of the instruction after the `CALL`.
    pub(super) resume_pc: usize,
}

/// The frame-pointer and return-address stacks, kept in lockstep.
#[derive(Debug)]
pub(super) struct CallStack {
    frames: Vec<CallFrameMeta>,
    max_frames: usize,
}

impl CallStack {
    pub(super) fn new(max_frames: usize) -> Self {
        Self {
            frames: Vec::with_capacity(max_frames.min(64)),
            max_frames,
        }
    }

    pub(super) fn push(&mut self, frame: CallFrameMeta) -> Result<(), VmError> {
        if self.frames.len() >= self.max_frames {
            return Err(VmError::FrameOverflow(self.max_frames));
        }
        self.frames.push(frame);
        Ok(())
    }

    pub(super) fn pop(&mut self) -> Option<CallFrameMeta> {
        self.frames.pop()
    }

    pub(super) fn depth(&self) -> usize {
        self.frames.len()
    }

    pub(super) fn clear(&mut self) {
        self.frames.clear();
    }
}
