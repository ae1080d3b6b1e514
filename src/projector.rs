//! Output projection with write debouncing
//!
//! Turns an activity snapshot into pin levels. A pin is driven high when any
//! source bound to it is active, and a physical write only happens when the
//! level differs from what was last written.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::bindings::SourceBindings;
use crate::outputs::TallyOutput;

pub struct OutputProjector {
    output: Box<dyn TallyOutput>,
    bindings: Arc<SourceBindings>,
    /// Level last written per pin, for debouncing.
    last_written: HashMap<u8, bool>,
}

impl OutputProjector {
    /// Configure every bound pin and drive it low.
    pub fn new(mut output: Box<dyn TallyOutput>, bindings: Arc<SourceBindings>) -> Result<Self> {
        let mut last_written = HashMap::new();
        for pin in bindings.pins() {
            output.configure(pin)?;
            output.write(pin, false);
            last_written.insert(pin, false);
        }
        Ok(Self {
            output,
            bindings,
            last_written,
        })
    }

    /// Project an activity snapshot onto the pins.
    ///
    /// A pin's desired level is the OR over all sources bound to it. Only
    /// changed levels are written; the last-written record is replaced
    /// wholesale afterwards.
    pub fn project(&mut self, snapshot: &HashMap<String, bool>) {
        let mut desired: HashMap<u8, bool> = HashMap::new();
        for pin in self.bindings.pins() {
            desired.insert(pin, false);
        }
        for (source, active) in snapshot {
            if !active {
                continue;
            }
            if let Some(pin) = self.bindings.pin_for(source) {
                desired.insert(pin, true);
            }
        }

        for (pin, level) in &desired {
            if self.last_written.get(pin) == Some(level) {
                continue;
            }
            debug!("tally pin {} -> {}", pin, level);
            self.output.write(*pin, *level);
        }
        self.last_written = desired;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Assignment;
    use crate::outputs::testing::RecordingOutput;
    use std::sync::Mutex;

    fn bindings(pairs: &[(u8, &str)]) -> Arc<SourceBindings> {
        let assigns: Vec<Assignment> = pairs
            .iter()
            .map(|(pin, source)| Assignment {
                pin: *pin,
                source: source.to_string(),
            })
            .collect();
        Arc::new(SourceBindings::new(&assigns))
    }

    fn snapshot(pairs: &[(&str, bool)]) -> HashMap<String, bool> {
        pairs
            .iter()
            .map(|(source, active)| (source.to_string(), *active))
            .collect()
    }

    fn drain(writes: &Mutex<Vec<(u8, bool)>>) -> Vec<(u8, bool)> {
        std::mem::take(&mut *writes.lock().unwrap())
    }

    #[test]
    fn test_new_drives_every_pin_low() {
        let (output, writes) = RecordingOutput::new();
        let _projector =
            OutputProjector::new(Box::new(output), bindings(&[(17, "Camera 1"), (22, "Camera 2")]))
                .unwrap();

        let mut initial = drain(&writes);
        initial.sort_unstable();
        assert_eq!(initial, vec![(17, false), (22, false)]);
    }

    #[test]
    fn test_active_source_writes_once() {
        let (output, writes) = RecordingOutput::new();
        let mut projector =
            OutputProjector::new(Box::new(output), bindings(&[(17, "Camera 1"), (22, "Camera 2")]))
                .unwrap();
        drain(&writes);

        projector.project(&snapshot(&[("Camera 1", true)]));
        assert_eq!(drain(&writes), vec![(17, true)]);

        // Unchanged state: debounce suppresses every write.
        projector.project(&snapshot(&[("Camera 1", true)]));
        assert!(drain(&writes).is_empty());
    }

    #[test]
    fn test_all_inactive_turns_pins_off() {
        let (output, writes) = RecordingOutput::new();
        let mut projector =
            OutputProjector::new(Box::new(output), bindings(&[(17, "Camera 1"), (22, "Camera 2")]))
                .unwrap();
        projector.project(&snapshot(&[("Camera 1", true), ("Camera 2", true)]));
        drain(&writes);

        projector.project(&snapshot(&[("Camera 1", false), ("Camera 2", false)]));
        let mut off = drain(&writes);
        off.sort_unstable();
        assert_eq!(off, vec![(17, false), (22, false)]);
    }

    #[test]
    fn test_unbound_sources_never_write() {
        let (output, writes) = RecordingOutput::new();
        let mut projector =
            OutputProjector::new(Box::new(output), bindings(&[(17, "Camera 1")])).unwrap();
        drain(&writes);

        projector.project(&snapshot(&[("Speaker", true)]));
        assert!(drain(&writes).is_empty());
    }

    #[test]
    fn test_shared_pin_is_or_of_sources() {
        let (output, writes) = RecordingOutput::new();
        let mut projector =
            OutputProjector::new(Box::new(output), bindings(&[(5, "Cam A"), (5, "Cam B")])).unwrap();
        drain(&writes);

        projector.project(&snapshot(&[("Cam A", true), ("Cam B", false)]));
        assert_eq!(drain(&writes), vec![(5, true)]);

        // The active source changes hands but the OR does not: no write.
        projector.project(&snapshot(&[("Cam A", false), ("Cam B", true)]));
        assert!(drain(&writes).is_empty());

        projector.project(&snapshot(&[("Cam A", false), ("Cam B", false)]));
        assert_eq!(drain(&writes), vec![(5, false)]);
    }

    #[test]
    fn test_push_scenario_two_cameras() {
        let (output, writes) = RecordingOutput::new();
        let mut projector =
            OutputProjector::new(Box::new(output), bindings(&[(17, "Camera 1"), (22, "Camera 2")]))
                .unwrap();
        drain(&writes);

        projector.project(&snapshot(&[("Camera 1", true)]));
        assert_eq!(drain(&writes), vec![(17, true)]);

        projector.project(&snapshot(&[("Camera 1", false)]));
        assert_eq!(drain(&writes), vec![(17, false)]);
    }
}
