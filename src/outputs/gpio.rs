//! Raspberry Pi GPIO output driver

use std::collections::HashMap;

use anyhow::{Context, Result};
use rppal::gpio::{Gpio, OutputPin};
use tracing::trace;

use super::TallyOutput;

/// Drives tally lights through the Pi's GPIO header (BCM numbering).
pub struct GpioOutput {
    gpio: Gpio,
    pins: HashMap<u8, OutputPin>,
}

impl GpioOutput {
    /// Probe for GPIO hardware. Fails on anything that is not a Raspberry Pi.
    pub fn new() -> Result<Self> {
        let gpio = Gpio::new().context("no GPIO peripheral found")?;
        Ok(Self {
            gpio,
            pins: HashMap::new(),
        })
    }
}

impl TallyOutput for GpioOutput {
    fn configure(&mut self, pin: u8) -> Result<()> {
        let mut output = self
            .gpio
            .get(pin)
            .with_context(|| format!("GPIO pin {} unavailable", pin))?
            .into_output();
        output.set_low();
        self.pins.insert(pin, output);
        Ok(())
    }

    fn write(&mut self, pin: u8, level: bool) {
        trace!("GPIO {} -> {}", pin, level);
        // Pins are configured up front from the binding set; anything else
        // is a no-op.
        let Some(output) = self.pins.get_mut(&pin) else {
            return;
        };
        if level {
            output.set_high();
        } else {
            output.set_low();
        }
    }
}
