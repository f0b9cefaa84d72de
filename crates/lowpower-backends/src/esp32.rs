//! ESP32 family adapter.
//!
//! - In modem sleep the Wi-Fi circuit is closed between DTIM beacon
//!   intervals; the CPU keeps running.
//! - In light sleep the digital peripherals and CPUs are clock-gated and
//!   their supply voltage reduced; execution resumes in place.
//! - In deep sleep the CPUs, most of the RAM, and all APB-clocked digital
//!   peripherals are powered off. **Waking from deep sleep restarts the
//!   program from the top** — only the RTC slow-memory slot exposed through
//!   [`Esp32Hal::retained_load`]/[`retained_store`](Esp32Hal::retained_store)
//!   survives.
//!
//! Pin wake goes through one of two RTC mechanisms, selected with
//! [`Esp32Backend::set_wakeup_kind`]: ext0 drives a single RTC IO and needs
//! the RTC peripherals powered, ext1 matches a pin mask in the RTC
//! controller and does not. Touch-pad wake is an ESP32 extra with no
//! counterpart in the common contract; see
//! [`Esp32Backend::add_wakeup_touch_pin`].

use heapless::Vec;
use lowpower_core::{
    PowerError, SleepBackend, SleepMode, SleepRequest, WakePolicy, WakeupPin, PinEdge,
};

/// Default touch-wake threshold, in controller counts.
pub const DEFAULT_TOUCH_THRESHOLD: u16 = 40;

/// Most touch-capable pads on any chip of the family.
const MAX_TOUCH_PINS: usize = 10;

/// Wi-Fi power-save level (`esp_wifi_set_ps` levels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioPowerSave {
    /// Power save disabled.
    Off,
    /// Wake for every DTIM beacon.
    Minimum,
    /// Sleep between beacons as long as listen-interval allows.
    Maximum,
}

/// Which RTC wake mechanism pin registrations arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeupKind {
    /// Single RTC IO; requires RTC peripherals powered during sleep.
    Ext0,
    /// RTC-controller pin mask; RTC peripherals may stay off.
    Ext1,
}

/// Pin level that triggers an ext0 wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeLevel {
    /// Wake when the pin reads high.
    High,
    /// Wake when the pin reads low.
    Low,
}

/// Mask condition that triggers an ext1 wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ext1Trigger {
    /// Any masked pin high.
    AnyHigh,
    /// All masked pins low.
    AllLow,
}

/// RTC pull resistor to hold a wake pin at its resting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakePull {
    /// Pull-up enabled, pull-down disabled.
    Up,
    /// Pull-down enabled, pull-up disabled.
    Down,
}

/// Hardware primitives the firmware supplies for this family.
pub trait Esp32Hal {
    /// Enter light sleep; returns when a wake source fires.
    fn enter_light_sleep(&mut self);
    /// Enter deep sleep. On hardware this does not return — the chip
    /// restarts from the top on wake.
    fn enter_deep_sleep(&mut self);
    /// Arm the RTC timer wake.
    fn enable_timer_wakeup(&mut self, micros: u64);
    /// Arm ext0 wake on one RTC IO.
    fn enable_ext0_wakeup(&mut self, pin: u8, level: WakeLevel);
    /// Arm ext1 wake on a pin mask.
    fn enable_ext1_wakeup(&mut self, mask: u64, trigger: Ext1Trigger);
    /// Configure the RTC pull resistors on a wake pin.
    fn set_wake_pull(&mut self, pin: u8, pull: WakePull);
    /// Arm touch-pad wake on a pad.
    fn enable_touch_wakeup(&mut self, pin: u8, threshold: u16);
    /// Set the Wi-Fi power-save level.
    fn set_radio_power_save(&mut self, mode: RadioPowerSave);
    /// Scale the CPU clock.
    fn set_cpu_frequency_mhz(&mut self, mhz: u16);
    /// Busy-wait / scheduler delay.
    fn delay_ms(&mut self, ms: u64);
    /// Read the RTC slow-memory slot that survives deep sleep.
    fn retained_load(&self) -> u32;
    /// Write the RTC slow-memory slot that survives deep sleep.
    fn retained_store(&mut self, value: u32);
}

/// Sleep strategy for the ESP32 family.
pub struct Esp32Backend<H: Esp32Hal> {
    hal: H,
    wakeup_kind: WakeupKind,
    pin_mask: u64,
    touch_pins: Vec<u8, MAX_TOUCH_PINS>,
}

impl<H: Esp32Hal> Esp32Backend<H> {
    /// Create the adapter. Pin wake defaults to ext1.
    pub fn new(hal: H) -> Self {
        Self {
            hal,
            wakeup_kind: WakeupKind::Ext1,
            pin_mask: 0,
            touch_pins: Vec::new(),
        }
    }

    /// Select which RTC mechanism future pin registrations arm.
    pub fn set_wakeup_kind(&mut self, kind: WakeupKind) {
        self.wakeup_kind = kind;
    }

    /// Declare which pads of this board are touch-capable. Only declared
    /// pads can be armed for touch wake.
    pub fn set_touch_pins(&mut self, pins: &[u8]) {
        self.touch_pins.clear();
        let _ = self.touch_pins.extend_from_slice(pins);
    }

    /// Arm touch-pad wake.
    ///
    /// Fails with [`PowerError::PreconditionNotMet`] unless `pin` was
    /// declared via [`set_touch_pins`](Self::set_touch_pins).
    pub fn add_wakeup_touch_pin(&mut self, pin: u8, threshold: u16) -> Result<(), PowerError> {
        if !self.touch_pins.contains(&pin) {
            return Err(PowerError::PreconditionNotMet);
        }
        self.hal.enable_touch_wakeup(pin, threshold);
        Ok(())
    }

    /// Scale the CPU clock (e.g. 240 → 80 MHz to shave run current).
    pub fn set_cpu_frequency_mhz(&mut self, mhz: u16) {
        self.hal.set_cpu_frequency_mhz(mhz);
    }

    /// How many times this device has entered deep sleep since the retained
    /// slot was last zeroed. Survives the deep-sleep/reset cycle.
    #[must_use]
    pub fn deep_sleep_count(&self) -> u32 {
        self.hal.retained_load()
    }
}

impl<H: Esp32Hal> SleepBackend for Esp32Backend<H> {
    fn sleep(&mut self, request: &SleepRequest<'_>) -> Result<(), PowerError> {
        match request.mode {
            SleepMode::LightSleep => {
                #[cfg(feature = "defmt")]
                defmt::debug!("light sleep start");
                self.hal.enter_light_sleep();
                #[cfg(feature = "defmt")]
                defmt::debug!("light sleep end");
                Ok(())
            }
            SleepMode::DeepSleep => {
                #[cfg(feature = "defmt")]
                defmt::debug!("deep sleep start");
                let entries = self.hal.retained_load();
                self.hal.retained_store(entries.wrapping_add(1));
                self.hal.enter_deep_sleep();
                Ok(())
            }
            SleepMode::NoSleep => {
                self.hal.set_radio_power_save(RadioPowerSave::Off);
                self.hal.delay_ms(request.sleep_time_us / 1_000);
                Ok(())
            }
            SleepMode::ModemSleep => {
                self.hal.set_radio_power_save(RadioPowerSave::Maximum);
                self.hal.delay_ms(request.sleep_time_us / 1_000);
                Ok(())
            }
        }
    }

    fn arm_timer(&mut self, _mode: SleepMode, micros: u64) -> Result<(), PowerError> {
        self.hal.enable_timer_wakeup(micros);
        Ok(())
    }

    fn arm_pin(&mut self, _mode: SleepMode, pin: WakeupPin) -> Result<(), PowerError> {
        self.pin_mask |= 1u64 << u32::from(pin.pin);
        match (self.wakeup_kind, pin.edge) {
            (WakeupKind::Ext0, PinEdge::Rising) => {
                self.hal.enable_ext0_wakeup(pin.pin, WakeLevel::High);
            }
            (WakeupKind::Ext0, PinEdge::Falling) => {
                self.hal.enable_ext0_wakeup(pin.pin, WakeLevel::Low);
            }
            (WakeupKind::Ext1, PinEdge::Rising) => {
                self.hal.enable_ext1_wakeup(self.pin_mask, Ext1Trigger::AnyHigh);
            }
            (WakeupKind::Ext1, PinEdge::Falling) => {
                self.hal.enable_ext1_wakeup(self.pin_mask, Ext1Trigger::AllLow);
            }
        }
        // Hold the pin at its resting level so only the wake edge fires.
        match pin.edge {
            PinEdge::Rising => self.hal.set_wake_pull(pin.pin, WakePull::Down),
            PinEdge::Falling => self.hal.set_wake_pull(pin.pin, WakePull::Up),
        }
        Ok(())
    }

    fn wake_policy(&self, mode: SleepMode) -> WakePolicy {
        match mode {
            // Modem power-save wakes on its own beacon schedule.
            SleepMode::ModemSleep => WakePolicy::none(),
            _ => WakePolicy::unrestricted(),
        }
    }

    fn is_mode_supported(&self, _mode: SleepMode) -> bool {
        true
    }

    fn is_processing_on_sleep(&self, mode: SleepMode) -> bool {
        matches!(mode, SleepMode::NoSleep | SleepMode::ModemSleep)
    }

    fn reset(&mut self) {
        self.pin_mask = 0;
        self.touch_pins.clear();
        self.hal.set_radio_power_save(RadioPowerSave::Off);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lowpower_core::{PowerManager, TimeUnit};
    use std::vec::Vec;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        LightSleep,
        DeepSleep,
        TimerWakeup(u64),
        Ext0(u8, WakeLevel),
        Ext1(u64, Ext1Trigger),
        Pull(u8, WakePull),
        Touch(u8, u16),
        RadioPs(RadioPowerSave),
        CpuMhz(u16),
        Delay(u64),
    }

    #[derive(Default)]
    struct FakeHal {
        calls: Vec<Call>,
        retained: u32,
    }

    impl Esp32Hal for FakeHal {
        fn enter_light_sleep(&mut self) {
            self.calls.push(Call::LightSleep);
        }
        fn enter_deep_sleep(&mut self) {
            self.calls.push(Call::DeepSleep);
        }
        fn enable_timer_wakeup(&mut self, micros: u64) {
            self.calls.push(Call::TimerWakeup(micros));
        }
        fn enable_ext0_wakeup(&mut self, pin: u8, level: WakeLevel) {
            self.calls.push(Call::Ext0(pin, level));
        }
        fn enable_ext1_wakeup(&mut self, mask: u64, trigger: Ext1Trigger) {
            self.calls.push(Call::Ext1(mask, trigger));
        }
        fn set_wake_pull(&mut self, pin: u8, pull: WakePull) {
            self.calls.push(Call::Pull(pin, pull));
        }
        fn enable_touch_wakeup(&mut self, pin: u8, threshold: u16) {
            self.calls.push(Call::Touch(pin, threshold));
        }
        fn set_radio_power_save(&mut self, mode: RadioPowerSave) {
            self.calls.push(Call::RadioPs(mode));
        }
        fn set_cpu_frequency_mhz(&mut self, mhz: u16) {
            self.calls.push(Call::CpuMhz(mhz));
        }
        fn delay_ms(&mut self, ms: u64) {
            self.calls.push(Call::Delay(ms));
        }
        fn retained_load(&self) -> u32 {
            self.retained
        }
        fn retained_store(&mut self, value: u32) {
            self.retained = value;
        }
    }

    fn manager() -> PowerManager<Esp32Backend<FakeHal>> {
        PowerManager::new(Esp32Backend::new(FakeHal::default()))
    }

    #[test]
    fn test_all_modes_supported() {
        let power = manager();
        assert!(power.is_mode_supported(SleepMode::NoSleep));
        assert!(power.is_mode_supported(SleepMode::LightSleep));
        assert!(power.is_mode_supported(SleepMode::DeepSleep));
        assert!(power.is_mode_supported(SleepMode::ModemSleep));
    }

    #[test]
    fn test_timer_wakeup_armed_in_micros() {
        let mut power = manager();
        assert_eq!(power.set_sleep_time(500, TimeUnit::Milliseconds), Ok(()));
        let hal = &power.backend().hal;
        assert!(hal.calls.contains(&Call::TimerWakeup(500_000)));
    }

    #[test]
    fn test_rising_pin_arms_ext1_any_high_with_pulldown() {
        let mut power = manager();
        assert_eq!(power.add_wakeup_pin(4, PinEdge::Rising), Ok(()));
        let hal = &power.backend().hal;
        assert_eq!(
            hal.calls,
            vec![
                Call::Ext1(1 << 4, Ext1Trigger::AnyHigh),
                Call::Pull(4, WakePull::Down),
            ]
        );
    }

    #[test]
    fn test_second_pin_extends_ext1_mask() {
        let mut power = manager();
        let _ = power.add_wakeup_pin(4, PinEdge::Rising);
        let _ = power.add_wakeup_pin(12, PinEdge::Rising);
        let hal = &power.backend().hal;
        assert!(hal
            .calls
            .contains(&Call::Ext1((1 << 4) | (1 << 12), Ext1Trigger::AnyHigh)));
    }

    #[test]
    fn test_ext0_falling_pin_arms_low_level_with_pullup() {
        let mut power = manager();
        power.backend_mut().set_wakeup_kind(WakeupKind::Ext0);
        assert_eq!(power.add_wakeup_pin(27, PinEdge::Falling), Ok(()));
        let hal = &power.backend().hal;
        assert_eq!(
            hal.calls,
            vec![Call::Ext0(27, WakeLevel::Low), Call::Pull(27, WakePull::Up)]
        );
    }

    #[test]
    fn test_modem_sleep_accepts_no_wake_sources() {
        let mut power = manager();
        assert_eq!(power.set_sleep_mode(SleepMode::ModemSleep), Ok(()));
        assert_eq!(
            power.set_sleep_time(1, TimeUnit::Seconds),
            Err(PowerError::PreconditionNotMet)
        );
        assert_eq!(
            power.add_wakeup_pin(4, PinEdge::Rising),
            Err(PowerError::PreconditionNotMet)
        );
    }

    #[test]
    fn test_modem_sleep_selection_raises_radio_power_save() {
        let mut power = manager();
        assert_eq!(power.set_sleep_mode(SleepMode::ModemSleep), Ok(()));
        let hal = &power.backend().hal;
        assert!(hal.calls.contains(&Call::RadioPs(RadioPowerSave::Maximum)));
    }

    #[test]
    fn test_no_sleep_is_a_delay_with_power_save_off() {
        let mut power = manager();
        let _ = power.set_sleep_mode(SleepMode::NoSleep);
        let _ = power.set_sleep_time(250, TimeUnit::Milliseconds);
        assert_eq!(power.sleep(), Ok(()));
        let hal = &power.backend().hal;
        assert!(hal.calls.contains(&Call::RadioPs(RadioPowerSave::Off)));
        assert!(hal.calls.contains(&Call::Delay(250)));
    }

    #[test]
    fn test_deep_sleep_bumps_retained_counter() {
        let mut power = manager();
        assert_eq!(power.backend().deep_sleep_count(), 0);
        assert_eq!(power.sleep(), Ok(()));
        assert_eq!(power.backend().deep_sleep_count(), 1);
        assert!(power.backend().hal.calls.contains(&Call::DeepSleep));
    }

    #[test]
    fn test_touch_wake_requires_declared_pad() {
        let mut power = manager();
        assert_eq!(
            power
                .backend_mut()
                .add_wakeup_touch_pin(2, DEFAULT_TOUCH_THRESHOLD),
            Err(PowerError::PreconditionNotMet)
        );
        power.backend_mut().set_touch_pins(&[2, 4]);
        assert_eq!(
            power
                .backend_mut()
                .add_wakeup_touch_pin(2, DEFAULT_TOUCH_THRESHOLD),
            Ok(())
        );
        assert!(power.backend().hal.calls.contains(&Call::Touch(2, 40)));
    }

    #[test]
    fn test_clear_drops_mask_and_disables_power_save() {
        let mut power = manager();
        let _ = power.add_wakeup_pin(4, PinEdge::Rising);
        power.clear();
        assert_eq!(power.backend().pin_mask, 0);
        assert!(power
            .backend()
            .hal
            .calls
            .contains(&Call::RadioPs(RadioPowerSave::Off)));
        // A pin registered after clear starts a fresh mask.
        let _ = power.add_wakeup_pin(5, PinEdge::Rising);
        assert!(power
            .backend()
            .hal
            .calls
            .contains(&Call::Ext1(1 << 5, Ext1Trigger::AnyHigh)));
    }
}
