pub mod filter;
pub mod gpio;
pub mod led;

use led::LedPattern;

/// Logical level of a button input. Buttons pull up, so `Low` means pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    #[must_use]
    pub const fn is_pressed(self) -> bool {
        matches!(self, Self::Low)
    }
}

impl From<rppal::gpio::Level> for Level {
    fn from(level: rppal::gpio::Level) -> Self {
        match level {
            rppal::gpio::Level::Low => Self::Low,
            rppal::gpio::Level::High => Self::High,
        }
    }
}

/// Instantaneous levels of the three button inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonLevels {
    pub blue: Level,
    pub red: Level,
    pub green: Level,
}

impl ButtonLevels {
    pub const RELEASED: Self = Self::new(Level::High, Level::High, Level::High);

    #[must_use]
    pub const fn new(blue: Level, red: Level, green: Level) -> Self {
        Self { blue, red, green }
    }

    /// How many buttons are held down right now.
    #[must_use]
    pub fn pressed_count(self) -> usize {
        [self.blue, self.red, self.green]
            .into_iter()
            .filter(|level| level.is_pressed())
            .count()
    }
}

/// The button and LED hardware as seen by the state machine.
///
/// Both operations are assumed to be near-instantaneous; they are only called
/// while the state lock is held. Writes cannot fail once the backend has been
/// opened.
pub trait Hardware: Send {
    fn read_buttons(&self) -> ButtonLevels;

    fn show(&mut self, pattern: LedPattern);
}
