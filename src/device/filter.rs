use crate::device::ButtonLevels;
use crate::state::ButtonId;
use std::collections::HashMap;
use tracing::debug;

/// Default debounce window in microseconds.
pub const DEBOUNCE_US: u32 = 200_000;

/// Debounces edges per effective button identity and folds simultaneous
/// presses into [`ButtonId::All`].
#[derive(Debug)]
pub struct EdgeFilter {
    window_us: u32,
    /// Tick of the most recent edge per identity, accepted or not.
    last_tick: HashMap<ButtonId, u32>,
}

impl EdgeFilter {
    #[must_use]
    pub fn new(window_us: u32) -> Self {
        Self {
            window_us,
            last_tick: HashMap::new(),
        }
    }

    /// Decide whether an edge on `button` at `tick` is a real press.
    ///
    /// Every edge resets the debounce clock of its identity, so a burst of
    /// bounces extends the quiet period rather than sneaking a second press
    /// through once the first one's window expires.
    pub fn accept(&mut self, button: ButtonId, tick: u32, levels: ButtonLevels) -> Option<ButtonId> {
        let identity = if levels.pressed_count() >= 2 {
            ButtonId::All
        } else {
            button
        };

        let previous = self.last_tick.insert(identity, tick);
        match previous {
            Some(last) if tick.wrapping_sub(last) <= self.window_us => {
                debug!(
                    "{identity:?} edge at {tick} rejected ({} us after previous)",
                    tick.wrapping_sub(last)
                );
                None
            }
            _ => Some(identity),
        }
    }
}

impl Default for EdgeFilter {
    fn default() -> Self {
        Self::new(DEBOUNCE_US)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Level;

    const RELEASED: ButtonLevels = ButtonLevels::new(Level::High, Level::High, Level::High);

    #[test]
    fn first_edge_accepted() {
        let mut filter = EdgeFilter::default();
        assert_eq!(filter.accept(ButtonId::Blue, 1000, RELEASED), Some(ButtonId::Blue));
    }

    #[test]
    fn bounce_within_window_rejected_then_later_accepted() {
        let mut filter = EdgeFilter::default();
        assert_eq!(filter.accept(ButtonId::Blue, 1000, RELEASED), Some(ButtonId::Blue));
        assert_eq!(filter.accept(ButtonId::Blue, 101_000, RELEASED), None);
        assert_eq!(filter.accept(ButtonId::Blue, 301_001, RELEASED), Some(ButtonId::Blue));
    }

    #[test]
    fn window_counts_from_the_bounce_not_the_press() {
        let mut filter = EdgeFilter::default();
        filter.accept(ButtonId::Blue, 1000, RELEASED);
        filter.accept(ButtonId::Blue, 101_000, RELEASED);
        // 300 ms after the press, but exactly one window after the bounce.
        assert_eq!(filter.accept(ButtonId::Blue, 301_000, RELEASED), None);
    }

    #[test]
    fn exactly_window_is_rejected() {
        let mut filter = EdgeFilter::new(200_000);
        filter.accept(ButtonId::Red, 0, RELEASED);
        assert_eq!(filter.accept(ButtonId::Red, 200_000, RELEASED), None);
        assert_eq!(filter.accept(ButtonId::Red, 400_001, RELEASED), Some(ButtonId::Red));
    }

    #[test]
    fn rejected_edge_resets_the_clock() {
        let mut filter = EdgeFilter::default();
        filter.accept(ButtonId::Green, 0, RELEASED);
        assert_eq!(filter.accept(ButtonId::Green, 150_000, RELEASED), None);
        // 250 ms after the first edge but only 100 ms after the bounce.
        assert_eq!(filter.accept(ButtonId::Green, 250_000, RELEASED), None);
        assert_eq!(
            filter.accept(ButtonId::Green, 450_001, RELEASED),
            Some(ButtonId::Green)
        );
    }

    #[test]
    fn identities_debounce_independently() {
        let mut filter = EdgeFilter::default();
        assert!(filter.accept(ButtonId::Blue, 1000, RELEASED).is_some());
        assert!(filter.accept(ButtonId::Red, 2000, RELEASED).is_some());
        assert!(filter.accept(ButtonId::Green, 3000, RELEASED).is_some());
    }

    #[test]
    fn tick_wraparound() {
        let mut filter = EdgeFilter::default();
        filter.accept(ButtonId::Blue, u32::MAX - 50_000, RELEASED);
        // 100 ms later, across the wrap.
        assert_eq!(filter.accept(ButtonId::Blue, 49_999, RELEASED), None);
        // 300 ms after that.
        assert_eq!(
            filter.accept(ButtonId::Blue, 349_999, RELEASED),
            Some(ButtonId::Blue)
        );
    }

    #[test]
    fn two_held_buttons_become_all_regardless_of_pin() {
        let levels = ButtonLevels::new(Level::Low, Level::Low, Level::High);
        for pin in [ButtonId::Blue, ButtonId::Red, ButtonId::Green] {
            let mut filter = EdgeFilter::default();
            assert_eq!(filter.accept(pin, 1000, levels), Some(ButtonId::All));
        }
    }

    #[test]
    fn all_has_its_own_debounce_record() {
        let held = ButtonLevels::new(Level::Low, Level::Low, Level::Low);
        let mut filter = EdgeFilter::default();
        assert_eq!(filter.accept(ButtonId::Blue, 1000, RELEASED), Some(ButtonId::Blue));
        assert_eq!(filter.accept(ButtonId::Red, 2000, held), Some(ButtonId::All));
        assert_eq!(filter.accept(ButtonId::Green, 3000, held), None);
    }

    #[test]
    fn single_held_button_is_not_all() {
        let levels = ButtonLevels::new(Level::High, Level::Low, Level::High);
        let mut filter = EdgeFilter::default();
        assert_eq!(filter.accept(ButtonId::Red, 1000, levels), Some(ButtonId::Red));
    }
}
