use crate::state::{LogicalState, Mood};

/// One complete write to the tri-color LED. Every field is always written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedPattern {
    pub blue: bool,
    pub red: bool,
    pub green: bool,
}

impl LedPattern {
    pub const OFF: Self = Self::new(false, false, false);

    #[must_use]
    pub const fn new(blue: bool, red: bool, green: bool) -> Self {
        Self { blue, red, green }
    }

    /// The pattern displayed for `state`.
    #[must_use]
    pub const fn for_state(state: LogicalState) -> Self {
        match (state.mood(), state.phase()) {
            (Mood::Stopped, _) => Self::new(false, true, false),
            (Mood::Playing, 0) => Self::new(false, false, true),
            (Mood::Playing, _) => Self::OFF,
            (Mood::AllPressed, 0) => Self::new(false, true, true),
            (Mood::AllPressed, 1) => Self::new(true, false, true),
            (Mood::AllPressed, _) => Self::new(true, true, false),
            (Mood::Pending, _) => Self::new(true, false, false),
            (Mood::Error, _) => Self::new(true, true, true),
        }
    }
}

impl From<LogicalState> for LedPattern {
    fn from(state: LogicalState) -> Self {
        Self::for_state(state)
    }
}
