//! RP2040 adapter.
//!
//! Light sleep on this chip is not a hardware state at all: the adapter
//! drops the system clock to 10 MHz and the core voltage to 0.95 V, so the
//! program keeps running, just slowly and cheaply. Deep sleep uses the real
//! dormant state — and dormant wakes on **either** a single GPIO edge or the
//! timer, never both.
//!
//! With wake pins registered, light sleep attaches the pin interrupts to a
//! shared [`WakeSignal`] and polls it at a slow tick until the ISR clears
//! it. The handler only touches the signal cell; it knows nothing about the
//! adapter.
//!
//! [`set_restart`](Rp2040Backend::set_restart) turns every wake into a full
//! reboot. That is destructive, not resumable: all in-memory state is lost.

use lowpower_core::{
    PinEdge, PowerError, SleepBackend, SleepMode, SleepRequest, WakePolicy, WakeSignal,
};

/// System clock while the scaled-down light sleep is active.
pub const LIGHT_SLEEP_CLOCK_KHZ: u32 = 10_000;

/// System clock restored after light sleep.
pub const RUN_CLOCK_KHZ: u32 = 48_000;

/// Poll interval of the pin-wait loop, and the settle delay around clock
/// switches.
pub const WAKE_POLL_INTERVAL_MS: u64 = 2;

/// Core voltage selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoreVoltage {
    /// 0.95 V — stable at the scaled-down clock; 0.85 V is not.
    V0_95,
    /// 1.10 V — the regulator default for full speed.
    V1_10,
}

/// Hardware primitives the firmware supplies for this chip.
pub trait Rp2040Hal {
    /// Switch the system PLL.
    fn set_system_clock_khz(&mut self, khz: u32);
    /// Set the core regulator voltage.
    fn set_core_voltage(&mut self, voltage: CoreVoltage);
    /// Enter dormant until an edge on `pin`. Returns after the edge.
    fn dormant_until_edge(&mut self, pin: u8, edge: PinEdge);
    /// Timer-driven sleep for `ms`. Returns after expiry.
    fn sleep_for_ms(&mut self, ms: u64);
    /// Enter dormant with no wake source armed.
    fn dormant(&mut self);
    /// Attach a GPIO interrupt whose handler calls `signal.notify_wake()`.
    fn attach_wake_interrupt(&mut self, pin: u8, edge: PinEdge, signal: &'static WakeSignal);
    /// Busy-wait / scheduler delay.
    fn delay_ms(&mut self, ms: u64);
    /// Hard-reset the device. Does not return on hardware.
    fn reboot(&mut self);
}

/// Sleep strategy for the RP2040.
pub struct Rp2040Backend<H: Rp2040Hal> {
    hal: H,
    signal: &'static WakeSignal,
    restart: bool,
}

impl<H: Rp2040Hal> Rp2040Backend<H> {
    /// Create the adapter. `signal` is the cell the firmware's GPIO
    /// interrupt handler clears; it must live for the program lifetime.
    pub fn new(hal: H, signal: &'static WakeSignal) -> Self {
        Self {
            hal,
            signal,
            restart: false,
        }
    }

    /// Force a reboot after every wake. Destructive: the in-memory state of
    /// the interrupted program is lost.
    pub fn set_restart(&mut self, restart: bool) {
        self.restart = restart;
    }

    /// Slow the chip down for the scaled light sleep.
    fn enter_scaled(&mut self) {
        self.hal.delay_ms(WAKE_POLL_INTERVAL_MS);
        self.hal.set_system_clock_khz(LIGHT_SLEEP_CLOCK_KHZ);
        self.hal.delay_ms(WAKE_POLL_INTERVAL_MS);
        self.hal.set_core_voltage(CoreVoltage::V0_95);
    }

    /// Restore full speed (or reboot, when the restart policy is set).
    fn exit_scaled(&mut self) {
        if self.restart {
            #[cfg(feature = "defmt")]
            defmt::debug!("restart-on-wake: rebooting");
            self.hal.reboot();
        }
        self.hal.set_core_voltage(CoreVoltage::V1_10);
        self.hal.set_system_clock_khz(RUN_CLOCK_KHZ);
        self.hal.delay_ms(WAKE_POLL_INTERVAL_MS);
    }
}

impl<H: Rp2040Hal> SleepBackend for Rp2040Backend<H> {
    fn sleep(&mut self, request: &SleepRequest<'_>) -> Result<(), PowerError> {
        match request.mode {
            SleepMode::LightSleep => {
                if request.pins.is_empty() {
                    self.enter_scaled();
                    self.hal.delay_ms(request.sleep_time_us / 1_000);
                } else {
                    for pin in request.pins {
                        self.hal.attach_wake_interrupt(pin.pin, pin.edge, self.signal);
                    }
                    self.signal.arm();
                    self.enter_scaled();
                    while self.signal.is_armed() {
                        self.hal.delay_ms(WAKE_POLL_INTERVAL_MS);
                    }
                }
                self.exit_scaled();
                Ok(())
            }
            SleepMode::DeepSleep => {
                if let Some(first) = request.pins.first() {
                    self.hal.dormant_until_edge(first.pin, first.edge);
                } else if request.sleep_time_us > 0 {
                    self.hal.sleep_for_ms(request.sleep_time_us / 1_000);
                    if self.restart {
                        self.hal.reboot();
                    }
                } else {
                    // No wake source at all: only a reset brings it back.
                    self.hal.dormant();
                    if self.restart {
                        self.hal.reboot();
                    }
                }
                Ok(())
            }
            SleepMode::ModemSleep => {
                self.hal.delay_ms(request.sleep_time_us / 1_000);
                Ok(())
            }
            SleepMode::NoSleep => {
                self.hal.delay_ms(request.sleep_time_us / 1_000);
                self.exit_scaled();
                Ok(())
            }
        }
    }

    fn wake_policy(&self, mode: SleepMode) -> WakePolicy {
        match mode {
            // Dormant wakes on one GPIO edge or the timer, never both.
            SleepMode::DeepSleep => WakePolicy::exclusive(Some(1)),
            SleepMode::LightSleep => WakePolicy::unrestricted(),
            SleepMode::ModemSleep | SleepMode::NoSleep => WakePolicy::exclusive(None),
        }
    }

    fn is_processing_on_sleep(&self, mode: SleepMode) -> bool {
        !matches!(mode, SleepMode::DeepSleep)
    }

    fn reset(&mut self) {
        self.signal.notify_wake();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lowpower_core::{PowerManager, TimeUnit};

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Clock(u32),
        Voltage(CoreVoltage),
        DormantEdge(u8, PinEdge),
        SleepFor(u64),
        Dormant,
        Attach(u8, PinEdge),
        Delay(u64),
        Reboot,
    }

    /// Fake HAL. `wake_after` simulates the GPIO ISR: after that many poll
    /// delays it clears the signal it was given at attach time.
    #[derive(Default)]
    struct FakeHal {
        calls: Vec<Call>,
        attached: Option<&'static WakeSignal>,
        wake_after: usize,
        polls_seen: usize,
    }

    impl Rp2040Hal for FakeHal {
        fn set_system_clock_khz(&mut self, khz: u32) {
            self.calls.push(Call::Clock(khz));
        }
        fn set_core_voltage(&mut self, voltage: CoreVoltage) {
            self.calls.push(Call::Voltage(voltage));
        }
        fn dormant_until_edge(&mut self, pin: u8, edge: PinEdge) {
            self.calls.push(Call::DormantEdge(pin, edge));
        }
        fn sleep_for_ms(&mut self, ms: u64) {
            self.calls.push(Call::SleepFor(ms));
        }
        fn dormant(&mut self) {
            self.calls.push(Call::Dormant);
        }
        fn attach_wake_interrupt(&mut self, pin: u8, edge: PinEdge, signal: &'static WakeSignal) {
            self.attached = Some(signal);
            self.calls.push(Call::Attach(pin, edge));
        }
        fn delay_ms(&mut self, ms: u64) {
            self.calls.push(Call::Delay(ms));
            if ms == WAKE_POLL_INTERVAL_MS {
                if let Some(signal) = self.attached {
                    if signal.is_armed() {
                        self.polls_seen += 1;
                        if self.polls_seen >= self.wake_after {
                            // The "ISR" fires.
                            signal.notify_wake();
                        }
                    }
                }
            }
        }
        fn reboot(&mut self) {
            self.calls.push(Call::Reboot);
        }
    }

    fn fresh_signal() -> &'static WakeSignal {
        Box::leak(Box::new(WakeSignal::new()))
    }

    fn manager(hal: FakeHal) -> PowerManager<Rp2040Backend<FakeHal>> {
        PowerManager::new(Rp2040Backend::new(hal, fresh_signal()))
    }

    #[test]
    fn test_baseline_support_matrix() {
        let power = manager(FakeHal::default());
        assert!(!power.is_mode_supported(SleepMode::NoSleep));
        assert!(power.is_mode_supported(SleepMode::LightSleep));
        assert!(power.is_mode_supported(SleepMode::DeepSleep));
        assert!(power.is_mode_supported(SleepMode::ModemSleep));
    }

    #[test]
    fn test_deep_sleep_single_pin_cardinality() {
        let mut power = manager(FakeHal::default());
        assert_eq!(power.add_wakeup_pin(2, PinEdge::Rising), Ok(()));
        assert_eq!(
            power.add_wakeup_pin(3, PinEdge::Falling),
            Err(PowerError::CardinalityExceeded)
        );
        // The dormant entry uses pin 2, rising edge, exclusively.
        assert_eq!(power.sleep(), Ok(()));
        let backend = power.backend();
        assert_eq!(
            backend.hal.calls,
            vec![Call::DormantEdge(2, PinEdge::Rising)]
        );
    }

    #[test]
    fn test_deep_sleep_pin_excludes_timer() {
        let mut power = manager(FakeHal::default());
        assert_eq!(power.add_wakeup_pin(2, PinEdge::Rising), Ok(()));
        assert_eq!(
            power.set_sleep_time(1, TimeUnit::Seconds),
            Err(PowerError::WakeSourceConflict)
        );
    }

    #[test]
    fn test_timed_deep_sleep_in_millis() {
        let mut power = manager(FakeHal::default());
        let _ = power.set_sleep_time(1500, TimeUnit::Milliseconds);
        assert_eq!(power.sleep(), Ok(()));
        assert!(power
            .backend()
            .hal
            .calls
            .contains(&Call::SleepFor(1500)));
    }

    #[test]
    fn test_timed_deep_sleep_with_restart_reboots() {
        let mut power = manager(FakeHal::default());
        power.backend_mut().set_restart(true);
        let _ = power.set_sleep_time(1, TimeUnit::Seconds);
        assert_eq!(power.sleep(), Ok(()));
        assert!(power.backend().hal.calls.contains(&Call::Reboot));
    }

    #[test]
    fn test_unarmed_deep_sleep_goes_dormant() {
        let mut power = manager(FakeHal::default());
        assert_eq!(power.sleep(), Ok(()));
        assert_eq!(power.backend().hal.calls, vec![Call::Dormant]);
    }

    #[test]
    fn test_plain_light_sleep_scales_clock_and_voltage() {
        let mut power = manager(FakeHal::default());
        let _ = power.set_sleep_mode(SleepMode::LightSleep);
        let _ = power.set_sleep_time(100, TimeUnit::Milliseconds);
        assert_eq!(power.sleep(), Ok(()));
        let calls = &power.backend().hal.calls;
        assert_eq!(
            *calls,
            vec![
                Call::Delay(WAKE_POLL_INTERVAL_MS),
                Call::Clock(LIGHT_SLEEP_CLOCK_KHZ),
                Call::Delay(WAKE_POLL_INTERVAL_MS),
                Call::Voltage(CoreVoltage::V0_95),
                Call::Delay(100),
                Call::Voltage(CoreVoltage::V1_10),
                Call::Clock(RUN_CLOCK_KHZ),
                Call::Delay(WAKE_POLL_INTERVAL_MS),
            ]
        );
    }

    #[test]
    fn test_light_sleep_pin_wait_ends_on_notify() {
        let hal = FakeHal {
            wake_after: 3,
            ..FakeHal::default()
        };
        let mut power = manager(hal);
        let _ = power.set_sleep_mode(SleepMode::LightSleep);
        let _ = power.add_wakeup_pin(6, PinEdge::Rising);
        assert_eq!(power.sleep(), Ok(()));
        let backend = power.backend();
        assert!(backend
            .hal
            .calls
            .contains(&Call::Attach(6, PinEdge::Rising)));
        // The wait loop ran and the signal ended disarmed.
        assert!(backend.hal.polls_seen >= 3);
        assert!(!backend.signal.is_armed());
    }

    #[test]
    fn test_light_sleep_allows_timer_and_pins_together() {
        let hal = FakeHal {
            wake_after: 1,
            ..FakeHal::default()
        };
        let mut power = manager(hal);
        let _ = power.set_sleep_mode(SleepMode::LightSleep);
        assert_eq!(power.set_sleep_time(1, TimeUnit::Seconds), Ok(()));
        assert_eq!(power.add_wakeup_pin(6, PinEdge::Rising), Ok(()));
    }
}
