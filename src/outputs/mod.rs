//! Physical tally outputs
//!
//! The projector drives tally lights through the [`TallyOutput`] capability.
//! At startup the Raspberry Pi GPIO driver is probed; when the hardware is
//! unavailable the console driver takes over, so the rest of the program
//! behaves identically on a development machine.

use anyhow::Result;
use tracing::{info, warn};

pub mod console;
#[cfg(target_os = "linux")]
pub mod gpio;

pub use console::ConsoleOutput;

/// One set of tally output pins.
///
/// Writes are fire-and-forget: the hardware gives no feedback signal, so
/// only `configure` can fail.
pub trait TallyOutput: Send {
    /// Prepare a pin for output and drive it low.
    fn configure(&mut self, pin: u8) -> Result<()>;

    /// Drive a configured pin high or low.
    fn write(&mut self, pin: u8, level: bool);
}

/// Select the best available output driver.
pub fn probe() -> Box<dyn TallyOutput> {
    #[cfg(target_os = "linux")]
    match gpio::GpioOutput::new() {
        Ok(output) => {
            info!("using Raspberry Pi GPIO outputs");
            return Box::new(output);
        }
        Err(e) => warn!("GPIO unavailable ({}), falling back to console outputs", e),
    }

    Box::new(ConsoleOutput::new())
}
