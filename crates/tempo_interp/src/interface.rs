//! The host-facing callback surface for outputs and system tasks.

use crate::snapshot::VId;
use std::collections::HashMap;
use tempo_common::Bits;

/// Callbacks the kernel invokes to reach the outside world.
///
/// The outer runtime supplies one implementation per module instance. Output
/// values are delivered through [`write`](Interface::write) at the end of
/// every `evaluate`/`update`; `$display`, `$write`, and `$finish` arrive
/// through the remaining methods in the exact order their statements
/// execute.
pub trait Interface {
    /// Delivers the current value of an output binding.
    fn write(&mut self, vid: VId, value: &Bits);

    /// Emits one line of `$display` output (newline added by the host).
    fn display(&mut self, text: &str);

    /// Emits `$write` output (no trailing newline).
    fn print(&mut self, text: &str);

    /// Signals host-level termination with the given status code.
    fn finish(&mut self, code: u64);
}

/// An [`Interface`] that records everything it receives.
///
/// Used by tests and by hosts that want to inspect a region's side effects
/// after the fact. Output writes keep only the latest value per VId;
/// display lines and finish codes accumulate in arrival order.
#[derive(Debug, Default)]
pub struct RecordingInterface {
    /// Latest output value per VId.
    pub outputs: HashMap<VId, Bits>,
    /// `$display` lines in arrival order.
    pub displays: Vec<String>,
    /// Concatenated `$write` output.
    pub printed: String,
    /// `$finish` codes in arrival order.
    pub finishes: Vec<u64>,
}

impl RecordingInterface {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the latest output value delivered for a VId.
    pub fn output(&self, vid: VId) -> Option<&Bits> {
        self.outputs.get(&vid)
    }
}

impl Interface for RecordingInterface {
    fn write(&mut self, vid: VId, value: &Bits) {
        self.outputs.insert(vid, value.clone());
    }

    fn display(&mut self, text: &str) {
        self.displays.push(text.to_string());
    }

    fn print(&mut self, text: &str) {
        self.printed.push_str(text);
    }

    fn finish(&mut self, code: u64) {
        self.finishes.push(code);
    }
}

/// An [`Interface`] that routes task output to stdout.
///
/// Output-value writes are traced rather than printed; a standalone host
/// that cares about them should use its own implementation.
#[derive(Debug, Default)]
pub struct ConsoleInterface;

impl Interface for ConsoleInterface {
    fn write(&mut self, vid: VId, value: &Bits) {
        log::trace!("write {} = {:?}", vid.as_raw(), value);
    }

    fn display(&mut self, text: &str) {
        println!("{text}");
    }

    fn print(&mut self, text: &str) {
        print!("{text}");
    }

    fn finish(&mut self, code: u64) {
        log::info!("$finish({code})");
    }
}
