//! Interrupt-safe pulse source
//!
//! The sensor interrupt handler calls [`PulseSource::record`]; the sampling
//! task reads [`PulseSource::total`]. The total is a free-running 32-bit
//! counter that wraps, which `PulseAccumulator` accounts for.

use core::cell::Cell;
use critical_section::Mutex;

/// Pulse total shared between an interrupt handler and a task
pub struct PulseSource {
    total: Mutex<Cell<u32>>,
}

impl PulseSource {
    /// Create a pulse source starting at 0
    pub const fn new() -> Self {
        Self {
            total: Mutex::new(Cell::new(0)),
        }
    }

    /// Add `pulses` to the total (call from the interrupt handler)
    pub fn record(&self, pulses: u32) {
        critical_section::with(|cs| {
            let cell = self.total.borrow(cs);
            cell.set(cell.get().wrapping_add(pulses));
        });
    }

    /// Current pulse total
    pub fn total(&self) -> u32 {
        critical_section::with(|cs| self.total.borrow(cs).get())
    }
}

impl Default for PulseSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SOURCE: PulseSource = PulseSource::new();

    #[test]
    fn test_record_and_total() {
        let source = PulseSource::new();
        assert_eq!(source.total(), 0);
        source.record(1);
        source.record(41);
        assert_eq!(source.total(), 42);
    }

    #[test]
    fn test_total_wraps() {
        let source = PulseSource::new();
        source.record(u32::MAX);
        source.record(3);
        assert_eq!(source.total(), 2);
    }

    #[test]
    fn test_static_source() {
        let before = SOURCE.total();
        SOURCE.record(5);
        assert_eq!(SOURCE.total(), before.wrapping_add(5));
    }
}
