use crate::state::ButtonId;

/// A rising edge reported by the GPIO backend.
///
/// Interrupt callbacks never touch daemon state directly; they forward one of
/// these to the daemon loop, which hands it to
/// [`ButtonStateMachine::intake`](crate::machine::ButtonStateMachine::intake).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    /// The button whose pin raised the edge.
    pub button: ButtonId,

    /// Microsecond tick of the edge. Wraps modulo 2^32.
    pub tick: u32,
}

impl EdgeEvent {
    #[must_use]
    pub const fn new(button: ButtonId, tick: u32) -> Self {
        Self { button, tick }
    }
}
