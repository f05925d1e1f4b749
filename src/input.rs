//! Jump input
//!
//! The host forwards raw pointer and key events; `QueuedInput` turns them
//! into jump signals according to the profile's `JumpTrigger` and the
//! controller drains them through `InputPort`.

use crate::settings::JumpTrigger;

/// Phase of a touch or mouse gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

/// Source of discrete jump signals
pub trait InputPort {
    /// Number of jumps fired since the last call
    fn take_jumps(&mut self) -> u32;
}

/// Counts jump signals between frames
#[derive(Debug, Clone, Default)]
pub struct QueuedInput {
    trigger: JumpTrigger,
    pending: u32,
}

impl QueuedInput {
    pub fn new(trigger: JumpTrigger) -> Self {
        Self { trigger, pending: 0 }
    }

    /// One call per pointer event; each touch in the event may fire a jump
    pub fn pointer(&mut self, phase: PointerPhase, touches: u32) {
        let fires = match (self.trigger, phase) {
            (_, PointerPhase::Began) => true,
            (JumpTrigger::Continuous, PointerPhase::Moved | PointerPhase::Ended) => true,
            _ => false,
        };
        if fires {
            self.pending += touches;
        }
    }

    /// Mouse button down (desktop)
    pub fn mouse_down(&mut self) {
        self.pointer(PointerPhase::Began, 1);
    }

    pub fn pending(&self) -> u32 {
        self.pending
    }
}

impl InputPort for QueuedInput {
    fn take_jumps(&mut self) -> u32 {
        std::mem::take(&mut self.pending)
    }
}
