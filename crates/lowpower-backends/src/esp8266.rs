//! ESP8266 adapter.
//!
//! - In modem sleep the Wi-Fi circuit is closed between DTIM beacon
//!   intervals; the CPU keeps running.
//! - During light sleep the CPU is suspended and does not respond to
//!   peripheral interrupts — waking requires an external GPIO, so a light
//!   sleep with no registered pin (or with a timer armed) is rejected.
//! - During deep sleep only the RTC stays powered, and it handles the
//!   periodic wake-up — so a deep sleep needs a nonzero timer and no pins.
//!   On this chip GPIO16 must be strapped to EXT_RSTB for the RTC to reset
//!   the core at all; after wake the program restarts from the top.
//!
//! The wake-source classes are strictly exclusive here: whichever of timer
//! or pin is configured first claims the sleep cycle.

use lowpower_core::{
    PinEdge, PowerError, SleepBackend, SleepMode, SleepRequest, WakePolicy, WakeupPin,
};

/// Radio sleep policy (`wifi_set_sleep_type` values).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioSleepType {
    /// Radio always on.
    None,
    /// Radio off between DTIM beacons.
    Modem,
    /// CPU suspended as well; GPIO wake only.
    Light,
}

/// RF behavior after a deep-sleep wake (`system_deep_sleep_set_option`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeepSleepRf {
    /// Whatever the boot strap pins select.
    Default,
    /// Full RF calibration on wake; highest wake current.
    Calibrate,
    /// Skip calibration; lower wake current.
    SkipCalibration,
    /// Radio stays off entirely; lowest power.
    RadioOff,
}

impl DeepSleepRf {
    /// The raw option value the ROM expects.
    #[must_use]
    pub const fn option_value(self) -> u8 {
        match self {
            DeepSleepRf::Default => 0,
            DeepSleepRf::Calibrate => 1,
            DeepSleepRf::SkipCalibration => 2,
            DeepSleepRf::RadioOff => 4,
        }
    }
}

/// Hardware primitives the firmware supplies for this chip.
pub trait Esp8266Hal {
    /// Select the radio sleep policy.
    fn set_radio_sleep_type(&mut self, sleep_type: RadioSleepType);
    /// Program the post-wake RF option.
    fn deep_sleep_set_option(&mut self, option: u8);
    /// Enter deep sleep for `micros`, with the usual pre-sleep housekeeping
    /// delay. Does not return on hardware.
    fn deep_sleep(&mut self, micros: u64);
    /// Enter deep sleep immediately, skipping the housekeeping delay.
    fn deep_sleep_instant(&mut self, micros: u64);
    /// Enable GPIO wake on a pin. The chip wakes on level, so the edge maps
    /// to high-level (rising) or low-level (falling) triggering.
    fn enable_pin_wakeup(&mut self, pin: u8, edge: PinEdge);
}

/// Sleep strategy for the ESP8266.
pub struct Esp8266Backend<H: Esp8266Hal> {
    hal: H,
    rf_option: DeepSleepRf,
    instant: bool,
}

impl<H: Esp8266Hal> Esp8266Backend<H> {
    /// Create the adapter with RF calibration on wake and normal (delayed)
    /// deep-sleep entry.
    pub fn new(hal: H) -> Self {
        Self {
            hal,
            rf_option: DeepSleepRf::Calibrate,
            instant: false,
        }
    }

    /// Choose the RF behavior after the next deep-sleep wake.
    pub fn set_deep_sleep_rf(&mut self, option: DeepSleepRf) {
        self.rf_option = option;
    }

    /// When true, deep sleep is entered without the housekeeping delay.
    pub fn set_instant(&mut self, instant: bool) {
        self.instant = instant;
    }
}

impl<H: Esp8266Hal> SleepBackend for Esp8266Backend<H> {
    fn sleep(&mut self, request: &SleepRequest<'_>) -> Result<(), PowerError> {
        match request.mode {
            SleepMode::ModemSleep => {
                self.hal.set_radio_sleep_type(RadioSleepType::Modem);
                Ok(())
            }
            SleepMode::LightSleep => {
                if request.sleep_time_us != 0 {
                    return Err(PowerError::WakeSourceConflict);
                }
                if request.pins.is_empty() {
                    return Err(PowerError::PreconditionNotMet);
                }
                self.hal.set_radio_sleep_type(RadioSleepType::Light);
                Ok(())
            }
            SleepMode::DeepSleep => {
                if !request.pins.is_empty() {
                    return Err(PowerError::WakeSourceConflict);
                }
                if request.sleep_time_us == 0 {
                    return Err(PowerError::PreconditionNotMet);
                }
                self.hal.deep_sleep_set_option(self.rf_option.option_value());
                #[cfg(feature = "defmt")]
                defmt::debug!("deep sleep for {=u64} us", request.sleep_time_us);
                if self.instant {
                    self.hal.deep_sleep_instant(request.sleep_time_us);
                } else {
                    self.hal.deep_sleep(request.sleep_time_us);
                }
                Ok(())
            }
            SleepMode::NoSleep => Ok(()),
        }
    }

    fn arm_pin(&mut self, _mode: SleepMode, pin: WakeupPin) -> Result<(), PowerError> {
        self.hal.enable_pin_wakeup(pin.pin, pin.edge);
        Ok(())
    }

    fn wake_policy(&self, mode: SleepMode) -> WakePolicy {
        match mode {
            SleepMode::ModemSleep => WakePolicy::none(),
            _ => WakePolicy::exclusive(None),
        }
    }

    fn is_mode_supported(&self, _mode: SleepMode) -> bool {
        true
    }

    fn is_processing_on_sleep(&self, mode: SleepMode) -> bool {
        matches!(mode, SleepMode::NoSleep | SleepMode::ModemSleep)
    }

    fn reset(&mut self) {
        self.rf_option = DeepSleepRf::Calibrate;
        self.instant = false;
    }
}
