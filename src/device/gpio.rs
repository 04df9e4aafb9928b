use crate::config::schema::GpioConfig;
use crate::device::led::LedPattern;
use crate::device::{ButtonLevels, Hardware};
use crate::error::Result;
use crate::event::EdgeEvent;
use crate::state::ButtonId;
use rppal::gpio::{Event, Gpio, InputPin, Level, OutputPin, Trigger};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Raspberry Pi buttons and LED driven through `/dev/gpiomem`.
pub struct RpiHardware {
    blue_button: InputPin,
    red_button: InputPin,
    green_button: InputPin,
    blue_led: OutputPin,
    red_led: OutputPin,
    green_led: OutputPin,
}

impl RpiHardware {
    /// Claim the configured pins and start forwarding rising edges on the
    /// button inputs to `tx`.
    ///
    /// # Errors
    /// Returns `ButtonError::Gpio` if the GPIO peripheral or any pin cannot be
    /// claimed, or if an interrupt cannot be registered.
    pub fn open(pins: &GpioConfig, tx: mpsc::UnboundedSender<EdgeEvent>) -> Result<Self> {
        let gpio = Gpio::new()?;

        let mut hw = Self {
            blue_button: gpio.get(pins.blue_button)?.into_input_pullup(),
            red_button: gpio.get(pins.red_button)?.into_input_pullup(),
            green_button: gpio.get(pins.green_button)?.into_input_pullup(),
            blue_led: gpio.get(pins.blue_led)?.into_output_low(),
            red_led: gpio.get(pins.red_led)?.into_output_low(),
            green_led: gpio.get(pins.green_led)?.into_output_low(),
        };

        watch(&mut hw.blue_button, ButtonId::Blue, tx.clone())?;
        watch(&mut hw.red_button, ButtonId::Red, tx.clone())?;
        watch(&mut hw.green_button, ButtonId::Green, tx)?;

        info!(
            "GPIO ready: buttons {}/{}/{}, LED {}/{}/{} (blue/red/green)",
            pins.blue_button,
            pins.red_button,
            pins.green_button,
            pins.blue_led,
            pins.red_led,
            pins.green_led
        );
        Ok(hw)
    }
}

/// Forward rising edges (button release) on `pin` as [`EdgeEvent`]s.
fn watch(pin: &mut InputPin, button: ButtonId, tx: mpsc::UnboundedSender<EdgeEvent>) -> Result<()> {
    pin.set_async_interrupt(Trigger::RisingEdge, None, move |event: Event| {
        let tick = event.timestamp.as_micros() as u32;
        debug!("{button:?} edge at {tick}");
        // Closed channel means the daemon is shutting down.
        let _ = tx.send(EdgeEvent::new(button, tick));
    })?;
    Ok(())
}

impl Hardware for RpiHardware {
    fn read_buttons(&self) -> ButtonLevels {
        ButtonLevels::new(
            self.blue_button.read().into(),
            self.red_button.read().into(),
            self.green_button.read().into(),
        )
    }

    fn show(&mut self, pattern: LedPattern) {
        self.blue_led.write(drive(pattern.blue));
        self.red_led.write(drive(pattern.red));
        self.green_led.write(drive(pattern.green));
    }
}

const fn drive(on: bool) -> Level {
    if on {
        Level::High
    } else {
        Level::Low
    }
}
