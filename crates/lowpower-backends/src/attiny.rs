//! ATtiny adapter.
//!
//! The only real low-power state is power-down, and the only timer that
//! survives it is the watchdog — whose longest interval is two seconds. A
//! longer sleep is split over the watchdog interval table: pick an interval,
//! arm a shared [`WakeCycleCounter`] with the repetition count, and re-enter
//! power-down until the watchdog ISR has decremented the counter to zero.
//!
//! The firmware wires its `WDT` interrupt handler to
//! [`WakeCycleCounter::decrement`] on the same `&'static` counter it hands
//! to [`AttinyBackend::new`]; the handler needs nothing else. A pin
//! interrupt also wakes the core mid-cycle, but with cycles outstanding the
//! adapter simply goes back to sleep — the pin only ends the wait when no
//! watchdog cycles were armed at all.

use lowpower_core::{
    plan_cycles, PinEdge, PowerError, SleepBackend, SleepMode, SleepRequest, WakeCycleCounter,
    WakeupPin,
};

/// Watchdog intervals this core can be armed with, ascending, in
/// milliseconds. The index into this table is the hardware interval class.
pub const WATCHDOG_INTERVALS_MS: [u32; 8] = [15, 30, 60, 120, 250, 500, 1000, 2000];

/// Hardware primitives the firmware supplies for this family.
pub trait AttinyHal {
    /// Arm the watchdog in interrupt mode with the given interval class
    /// (index into [`WATCHDOG_INTERVALS_MS`]). It re-fires every interval
    /// until disarmed.
    fn arm_watchdog(&mut self, interval_class: usize);
    /// Disarm the watchdog.
    fn disarm_watchdog(&mut self);
    /// Enter power-down until any interrupt (watchdog or pin) fires.
    fn power_down(&mut self);
    /// Idle-mode delay for the non-power-down modes.
    fn idle_delay_ms(&mut self, ms: u64);
    /// Attach a pin-change interrupt that wakes the core.
    fn attach_pin_interrupt(&mut self, pin: u8, edge: PinEdge);
}

/// Sleep strategy for the ATtiny family.
pub struct AttinyBackend<H: AttinyHal> {
    hal: H,
    cycles: &'static WakeCycleCounter,
}

impl<H: AttinyHal> AttinyBackend<H> {
    /// Create the adapter. `cycles` is the counter the firmware's watchdog
    /// interrupt handler decrements; it must live for the program lifetime.
    pub fn new(hal: H, cycles: &'static WakeCycleCounter) -> Self {
        Self { hal, cycles }
    }
}

impl<H: AttinyHal> SleepBackend for AttinyBackend<H> {
    fn sleep(&mut self, request: &SleepRequest<'_>) -> Result<(), PowerError> {
        if request.mode != SleepMode::DeepSleep {
            self.hal.idle_delay_ms(request.sleep_time_us / 1_000);
            return Ok(());
        }

        if request.sleep_time_us > 0 {
            let plan = plan_cycles(request.sleep_time_us, &WATCHDOG_INTERVALS_MS);
            self.cycles.arm(plan.cycles);
            if plan.cycles > 0 {
                self.hal.arm_watchdog(plan.interval_index);
            }
        } else {
            // Pin wake only: nothing to count down.
            self.cycles.arm(0);
        }

        loop {
            self.hal.power_down();
            if self.cycles.is_done() {
                break;
            }
        }
        self.hal.disarm_watchdog();
        Ok(())
    }

    fn arm_pin(&mut self, _mode: SleepMode, pin: WakeupPin) -> Result<(), PowerError> {
        self.hal.attach_pin_interrupt(pin.pin, pin.edge);
        Ok(())
    }

    fn is_mode_supported(&self, _mode: SleepMode) -> bool {
        true
    }

    fn is_processing_on_sleep(&self, _mode: SleepMode) -> bool {
        false
    }

    fn reset(&mut self) {
        self.cycles.arm(0);
    }
}
