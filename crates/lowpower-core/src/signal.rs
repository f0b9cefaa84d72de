//! ISR-shared wake signalling.
//!
//! During a backend `sleep()` the main flow is suspended and the only code
//! that runs is interrupt handlers: a watchdog expiry decrementing the
//! remaining cycle count, or a GPIO edge ending a pin wait. Both cells here
//! are therefore guarded by a critical-section mutex — the ISR can fire at
//! any point, including mid-update on the main flow side.
//!
//! Cells are passed to backends and to the firmware's interrupt registration
//! as `&'static` references; handlers receive the reference as their context
//! and never need to know about the power-management core at all.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Remaining hardware timer expiries before a split sleep is complete.
///
/// See [`plan_cycles`](crate::duration::plan_cycles) for how a long sleep is
/// split into cycles. The counter saturates at zero: a spurious extra
/// interrupt can never drive it negative, and reaching exactly zero reliably
/// ends the backend's wait loop.
pub struct WakeCycleCounter {
    remaining: Mutex<CriticalSectionRawMutex, Cell<u32>>,
}

impl Default for WakeCycleCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl WakeCycleCounter {
    /// Create a counter with no cycles outstanding.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            remaining: Mutex::new(Cell::new(0)),
        }
    }

    /// Set the number of expiries to wait for.
    pub fn arm(&self, cycles: u32) {
        self.remaining.lock(|cell| cell.set(cycles));
    }

    /// Record one expiry. Safe to call from interrupt context. Returns the
    /// count still outstanding.
    pub fn decrement(&self) -> u32 {
        self.remaining.lock(|cell| {
            let left = cell.get().saturating_sub(1);
            cell.set(left);
            left
        })
    }

    /// Expiries still outstanding.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining.lock(Cell::get)
    }

    /// True when no expiries are outstanding.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.remaining() == 0
    }
}

/// Single-shot wake flag for pin-wait loops.
///
/// The backend arms the flag before suspending, the GPIO interrupt handler
/// calls [`notify_wake`](Self::notify_wake), and the backend's poll loop
/// exits once the flag is no longer armed.
pub struct WakeSignal {
    armed: Mutex<CriticalSectionRawMutex, Cell<bool>>,
}

impl Default for WakeSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl WakeSignal {
    /// Create a disarmed signal.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            armed: Mutex::new(Cell::new(false)),
        }
    }

    /// Arm the signal; the wait loop runs until the next wake notification.
    pub fn arm(&self) {
        self.armed.lock(|cell| cell.set(true));
    }

    /// End the wait. Safe to call from interrupt context; idempotent.
    pub fn notify_wake(&self) {
        self.armed.lock(|cell| cell.set(false));
    }

    /// True while a wake notification is still pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.lock(Cell::get)
    }
}
