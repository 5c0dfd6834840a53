use std::sync::atomic::{AtomicBool, Ordering};

/// Mutual-exclusion gate for a single physical device.
///
/// Non-blocking and non-queuing: a second acquire attempt while the gate is
/// held fails immediately. The flag doubles as the externally readable
/// motion indicator, so reporters can sample it mid-operation without
/// touching any lock.
#[derive(Debug, Default)]
pub struct BusyGate {
    busy: AtomicBool,
}

impl BusyGate {
    pub fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Claims the gate if it is idle. While the returned permit lives, every
    /// other `try_acquire` call fails. The permit releases the gate on drop,
    /// covering all exit paths of the guarded operation, failures included.
    pub fn try_acquire(&self) -> Option<BusyPermit<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Some(BusyPermit { gate: self })
        } else {
            None
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Exclusive claim on the gate, released on drop.
#[derive(Debug)]
pub struct BusyPermit<'a> {
    gate: &'a BusyGate,
}

impl Drop for BusyPermit<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}
