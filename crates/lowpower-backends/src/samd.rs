//! SAMD adapter.
//!
//! Everything here rides on the RTC: light sleep maps to the standby state
//! with an RTC alarm, deep sleep to the deeper standby variant, and pin wake
//! attaches an external-interrupt wakeup through the same module. Durations
//! reach the hardware in milliseconds; the sub-millisecond remainder is
//! accepted precision loss.

use lowpower_core::{PinEdge, PowerError, SleepBackend, SleepMode, SleepRequest, WakeupPin};

/// Hardware primitives the firmware supplies for this family.
pub trait SamdHal {
    /// RTC-alarm standby sleep for `ms`.
    fn rtc_sleep_ms(&mut self, ms: u64);
    /// Deeper standby variant for `ms`.
    fn rtc_deep_sleep_ms(&mut self, ms: u64);
    /// Attach an external-interrupt wakeup on `pin`.
    fn attach_interrupt_wakeup(&mut self, pin: u8, edge: PinEdge);
    /// Detach the ADC interrupt the wakeup module borrows.
    fn detach_adc_interrupt(&mut self);
    /// Busy-wait / scheduler delay.
    fn delay_ms(&mut self, ms: u64);
}

/// Sleep strategy for the SAMD family.
pub struct SamdBackend<H: SamdHal> {
    hal: H,
}

impl<H: SamdHal> SamdBackend<H> {
    /// Create the adapter.
    pub fn new(hal: H) -> Self {
        Self { hal }
    }
}

impl<H: SamdHal> SleepBackend for SamdBackend<H> {
    fn sleep(&mut self, request: &SleepRequest<'_>) -> Result<(), PowerError> {
        let ms = request.sleep_time_us / 1_000;
        match request.mode {
            SleepMode::LightSleep => self.hal.rtc_sleep_ms(ms),
            SleepMode::DeepSleep => self.hal.rtc_deep_sleep_ms(ms),
            SleepMode::ModemSleep | SleepMode::NoSleep => self.hal.delay_ms(ms),
        }
        Ok(())
    }

    fn arm_pin(&mut self, _mode: SleepMode, pin: WakeupPin) -> Result<(), PowerError> {
        self.hal.attach_interrupt_wakeup(pin.pin, pin.edge);
        Ok(())
    }

    fn is_mode_supported(&self, mode: SleepMode) -> bool {
        // The standby states are driven entirely by the RTC library; what
        // this port vouches for is the delay-backed pair.
        matches!(mode, SleepMode::NoSleep | SleepMode::ModemSleep)
    }

    fn is_processing_on_sleep(&self, mode: SleepMode) -> bool {
        matches!(mode, SleepMode::NoSleep | SleepMode::ModemSleep)
    }

    fn reset(&mut self) {
        self.hal.detach_adc_interrupt();
    }
}
