use std::fmt;

/// A physical button, or a derived identity for presses that are not a
/// single button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonId {
    Blue,
    Red,
    Green,
    /// No button: a plain refresh of the remote state.
    None,
    /// Two or more buttons held at the same time.
    All,
}

impl ButtonId {
    /// The UDP message announcing a press, if this identity announces one.
    #[must_use]
    pub const fn notification(self) -> Option<&'static str> {
        match self {
            Self::Blue => Some("press blue"),
            Self::Red => Some("press red"),
            Self::Green => Some("press green"),
            Self::All => Some("press all"),
            Self::None => None,
        }
    }
}

/// The semantic part of a [`LogicalState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mood {
    Stopped,
    Playing,
    Error,
    Pending,
    AllPressed,
}

impl Mood {
    /// Number of animation phases the LED cycles through for this mood.
    #[must_use]
    pub const fn phases(self) -> u8 {
        match self {
            Self::Playing => 2,
            Self::AllPressed => 3,
            Self::Stopped | Self::Error | Self::Pending => 1,
        }
    }
}

/// What the daemon currently believes, and what the LED shows.
///
/// The phase only selects a visual variant of the mood so the LED can
/// flicker; it carries no other meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogicalState {
    mood: Mood,
    phase: u8,
}

impl LogicalState {
    pub const STOPPED: Self = Self::new(Mood::Stopped);
    pub const PLAYING: Self = Self::new(Mood::Playing);
    pub const ERROR: Self = Self::new(Mood::Error);
    pub const PENDING: Self = Self::new(Mood::Pending);
    pub const ALL_PRESSED: Self = Self::new(Mood::AllPressed);

    /// Every state, in display order.
    pub const ALL: [Self; 8] = [
        Self::STOPPED,
        Self::PLAYING,
        Self { mood: Mood::Playing, phase: 1 },
        Self::ERROR,
        Self::PENDING,
        Self::ALL_PRESSED,
        Self { mood: Mood::AllPressed, phase: 1 },
        Self { mood: Mood::AllPressed, phase: 2 },
    ];

    /// The entry phase of `mood`.
    #[must_use]
    pub const fn new(mood: Mood) -> Self {
        Self { mood, phase: 0 }
    }

    #[must_use]
    pub const fn mood(self) -> Mood {
        self.mood
    }

    #[must_use]
    pub const fn phase(self) -> u8 {
        self.phase
    }

    #[must_use]
    pub const fn is_playing(self) -> bool {
        matches!(self.mood, Mood::Playing)
    }

    /// Step to the next animation phase, wrapping. Single-phase moods are
    /// returned unchanged.
    #[must_use]
    pub const fn advance(self) -> Self {
        Self {
            mood: self.mood,
            phase: (self.phase + 1) % self.mood.phases(),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match (self.mood, self.phase) {
            (Mood::Stopped, _) => "STOPPED",
            (Mood::Playing, 0) => "PLAYING_1",
            (Mood::Playing, _) => "PLAYING_2",
            (Mood::Error, _) => "ERROR",
            (Mood::Pending, _) => "PENDING",
            (Mood::AllPressed, 0) => "ALL_PRESSED_1",
            (Mood::AllPressed, 1) => "ALL_PRESSED_2",
            (Mood::AllPressed, _) => "ALL_PRESSED_3",
        }
    }
}

impl fmt::Display for LogicalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playing_flickers_between_two_phases() {
        let a = LogicalState::PLAYING;
        let b = a.advance();
        assert_eq!(b.name(), "PLAYING_2");
        assert_eq!(b.advance(), a);
    }

    #[test]
    fn all_pressed_cycles_through_three_phases() {
        let names: Vec<_> = std::iter::successors(Some(LogicalState::ALL_PRESSED), |s| {
            Some(s.advance())
        })
        .take(4)
        .map(LogicalState::name)
        .collect();
        assert_eq!(
            names,
            ["ALL_PRESSED_1", "ALL_PRESSED_2", "ALL_PRESSED_3", "ALL_PRESSED_1"]
        );
    }

    #[test]
    fn single_phase_moods_do_not_advance() {
        for state in [LogicalState::STOPPED, LogicalState::ERROR, LogicalState::PENDING] {
            assert_eq!(state.advance(), state);
        }
    }

    #[test]
    fn names_are_distinct() {
        let mut names: Vec<_> = LogicalState::ALL.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), LogicalState::ALL.len());
    }

    #[test]
    fn only_real_presses_announce() {
        assert_eq!(ButtonId::Blue.notification(), Some("press blue"));
        assert_eq!(ButtonId::All.notification(), Some("press all"));
        assert_eq!(ButtonId::None.notification(), None);
    }
}
