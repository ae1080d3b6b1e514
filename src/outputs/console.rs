//! Console output driver - logs pin writes for development without hardware

use anyhow::Result;
use tracing::info;

use super::TallyOutput;

/// Logs every pin write instead of touching hardware.
///
/// This is useful for:
/// - Validating assignments before wiring anything up
/// - Watching the sync engine run on a machine without a GPIO header
#[derive(Debug, Default)]
pub struct ConsoleOutput {
    /// Write counter for debugging
    write_count: u64,
}

impl ConsoleOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TallyOutput for ConsoleOutput {
    fn configure(&mut self, pin: u8) -> Result<()> {
        info!("🔌 console output: pin {} configured", pin);
        Ok(())
    }

    fn write(&mut self, pin: u8, level: bool) {
        self.write_count += 1;
        info!(
            "💡 pin {} -> {} [write #{}]",
            pin,
            if level { "on" } else { "off" },
            self.write_count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_output_counts_writes() {
        let mut output = ConsoleOutput::new();
        output.configure(17).unwrap();
        output.write(17, true);
        output.write(17, false);
        assert_eq!(output.write_count, 2);
    }
}
