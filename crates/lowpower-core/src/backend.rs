//! The contract every chip-family adapter implements.

use crate::error::PowerError;
use crate::mode::{baseline_support, SleepMode};
use crate::wake::{WakePolicy, WakeupPin};

/// Snapshot of the configuration a backend receives when asked to sleep.
#[derive(Debug, Clone, Copy)]
pub struct SleepRequest<'a> {
    /// The selected sleep mode.
    pub mode: SleepMode,
    /// Normalized sleep duration in microseconds; zero when no timed wake
    /// is armed. Modes without a timed wake use this purely as a delay.
    pub sleep_time_us: u64,
    /// The registered wake pins, in registration order.
    pub pins: &'a [WakeupPin],
}

/// A chip-family sleep strategy.
///
/// Implementations are the only place hardware primitives are called. All
/// generic validation (mode/wake-source compatibility, pin cardinality)
/// happens in the [`PowerManager`](crate::manager::PowerManager) before the
/// `arm_*` hooks run, driven by the [`WakePolicy`] this trait reports — a
/// backend only performs the hardware side effects.
pub trait SleepBackend {
    /// Suspend according to `request`.
    ///
    /// Returns `Ok` only when a sleep action was actually attempted; an
    /// error signals a configuration conflict the caller must resolve.
    ///
    /// On families whose deep sleep wakes by rebooting, a successful call
    /// never returns on real hardware — the device restarts and all
    /// in-memory state is lost. Such backends document this on their own
    /// `sleep`.
    fn sleep(&mut self, request: &SleepRequest<'_>) -> Result<(), PowerError>;

    /// Hardware side of arming the timed wake (e.g. programming the RTC
    /// wakeup comparator). Validation has already happened.
    fn arm_timer(&mut self, mode: SleepMode, micros: u64) -> Result<(), PowerError> {
        let _ = (mode, micros);
        Ok(())
    }

    /// Hardware side of registering a wake pin (e.g. enabling the GPIO wake
    /// matrix entry, attaching an interrupt). Validation has already
    /// happened.
    fn arm_pin(&mut self, mode: SleepMode, pin: WakeupPin) -> Result<(), PowerError> {
        let _ = (mode, pin);
        Ok(())
    }

    /// Which wake sources `mode` accepts on this hardware.
    fn wake_policy(&self, mode: SleepMode) -> WakePolicy {
        let _ = mode;
        WakePolicy::unrestricted()
    }

    /// Whether `mode` is supported at all. Defaults to the baseline matrix
    /// (`NoSleep` unsupported, everything else supported).
    fn is_mode_supported(&self, mode: SleepMode) -> bool {
        baseline_support(mode)
    }

    /// Whether application logic keeps executing while `mode` is active.
    fn is_processing_on_sleep(&self, mode: SleepMode) -> bool;

    /// Undo backend-specific configuration (pin masks, radio power-save
    /// state, attached interrupts) on [`clear`](crate::PowerManager::clear).
    fn reset(&mut self) {}
}
