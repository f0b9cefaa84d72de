//! The scheduling state machine.
//!
//! [`PowerManager`] ties the pieces together: it owns the selected sleep
//! mode, the normalized sleep duration, the wake-source registry, the active
//! window, and the backend adapter. Applications call [`process`] once per
//! iteration of their control loop; everything else is configuration.
//!
//! # The active window
//!
//! [`set_active_time`] opens a window during which [`is_active`] reports
//! `false`. The polarity is deliberate legacy: `is_active()` answers "has
//! the enforced schedule released the device?", not "is code running". A
//! fresh manager is active; an open window makes it inactive until the
//! window elapses; [`set_active`] forces the flag underneath.
//!
//! [`process`] sleeps only when the flag has been cleared *and* the window
//! has elapsed, then re-opens the window. The result is a duty cycle: sleep,
//! wake, run for the window length, sleep again — and calling [`process`] at
//! arbitrary frequency never double-sleeps within one window.
//!
//! [`process`]: PowerManager::process
//! [`is_active`]: PowerManager::is_active
//! [`set_active`]: PowerManager::set_active
//! [`set_active_time`]: PowerManager::set_active_time

use embassy_time::{Duration, Instant};

use crate::backend::{SleepBackend, SleepRequest};
use crate::duration::TimeUnit;
use crate::error::PowerError;
use crate::mode::SleepMode;
use crate::wake::{PinEdge, WakeSourceRegistry, WakeupPin};

/// Scheduling state machine over one backend adapter.
///
/// One instance per device. There is no global: construct it where the
/// firmware wires up its peripherals and pass it by reference. Interrupt
/// handlers never see this type — they talk to the `&'static` wake cells in
/// [`signal`](crate::signal).
pub struct PowerManager<B: SleepBackend> {
    backend: B,
    mode: SleepMode,
    registry: WakeSourceRegistry,
    window_us: u64,
    window_end: Option<Instant>,
    active: bool,
}

impl<B: SleepBackend> PowerManager<B> {
    /// Create a manager in its default state: `DeepSleep` selected, active,
    /// no wake sources, no window.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            mode: SleepMode::DeepSleep,
            registry: WakeSourceRegistry::new(),
            window_us: 0,
            window_end: None,
            active: true,
        }
    }

    /// Select the sleep mode.
    ///
    /// The mode is stored even when unsupported, so a later backend swap or
    /// capability change is picked up; the error only reports the support
    /// query. Selecting a supported [`SleepMode::ModemSleep`] triggers an
    /// immediate [`sleep`](Self::sleep) — modem power-save is a continuous
    /// policy, not a discrete suspend/resume cycle.
    pub fn set_sleep_mode(&mut self, mode: SleepMode) -> Result<(), PowerError> {
        self.mode = mode;
        if !self.backend.is_mode_supported(mode) {
            return Err(PowerError::UnsupportedMode);
        }
        if mode == SleepMode::ModemSleep {
            self.sleep()?;
        }
        Ok(())
    }

    /// Arm the timed wake for the next sleep cycle.
    ///
    /// Validated against the backend's wake policy for the current mode:
    /// fails when the mode has no timed wake or when pins are already
    /// registered under an exclusive policy.
    pub fn set_sleep_time(&mut self, value: u64, unit: TimeUnit) -> Result<(), PowerError> {
        let micros = unit.to_micros(value);
        let policy = self.backend.wake_policy(self.mode);
        self.registry.set_timer(micros, &policy)?;
        self.backend.arm_timer(self.mode, micros)
    }

    /// Register an edge-triggered wake pin for the next sleep cycle.
    pub fn add_wakeup_pin(&mut self, pin: u8, edge: PinEdge) -> Result<(), PowerError> {
        let wakeup = WakeupPin { pin, edge };
        let policy = self.backend.wake_policy(self.mode);
        self.registry.register_pin(wakeup, &policy)?;
        if let Err(err) = self.backend.arm_pin(self.mode, wakeup) {
            self.registry.pop_pin();
            return Err(err);
        }
        Ok(())
    }

    /// Suspend now, using the configured mode and wake sources.
    pub fn sleep(&mut self) -> Result<(), PowerError> {
        let request = SleepRequest {
            mode: self.mode,
            sleep_time_us: self.registry.timer_us(),
            pins: self.registry.pins(),
        };
        self.backend.sleep(&request)
    }

    /// Arm the timed wake and suspend in one call.
    ///
    /// The sleep happens even when the timer registration is rejected (the
    /// backend then falls back to whatever wake sources it has), matching
    /// the fire-and-forget shape this call is for.
    pub fn sleep_for(&mut self, value: u64, unit: TimeUnit) -> Result<(), PowerError> {
        let _ = self.set_sleep_time(value, unit);
        self.sleep()
    }

    /// Force the active flag. `false` hands the schedule to
    /// [`process`](Self::process); `true` takes it back.
    pub fn set_active(&mut self, flag: bool) {
        self.active = flag;
    }

    /// Open an active window of the given length, and remember the length
    /// for the re-arm in [`process`](Self::process).
    pub fn set_active_time(&mut self, value: u64, unit: TimeUnit) {
        let micros = unit.to_micros(value);
        self.window_us = micros;
        self.window_end = Some(Instant::now() + Duration::from_micros(micros));
    }

    /// Whether the enforced schedule currently holds the device.
    ///
    /// `false` while an active window is open or after the flag was
    /// explicitly cleared; `true` otherwise.
    #[must_use]
    pub fn is_active(&self) -> bool {
        if self.window_is_open() {
            return false;
        }
        self.active
    }

    /// One scheduling tick. Call once per control-loop iteration.
    ///
    /// Does nothing while [`is_active`](Self::is_active) is true, and does
    /// nothing while the current window is still open — so the device never
    /// double-sleeps within one window no matter how often this is called.
    /// Once the window elapses (with the active flag cleared), it sleeps and
    /// re-opens the window from the stored length.
    pub fn process(&mut self) {
        if self.is_active() {
            return;
        }
        if self.window_is_open() {
            return;
        }
        let _ = self.sleep();
        self.window_end = Some(Instant::now() + Duration::from_micros(self.window_us));
    }

    /// Reset to the default-constructed state: `DeepSleep`, active, no wake
    /// sources, no window. Also runs the backend's reset hook. Idempotent.
    pub fn clear(&mut self) {
        self.mode = SleepMode::DeepSleep;
        self.window_us = 0;
        self.window_end = None;
        self.active = true;
        self.registry.clear();
        self.backend.reset();
    }

    /// Whether the backend supports `mode`.
    #[must_use]
    pub fn is_mode_supported(&self, mode: SleepMode) -> bool {
        self.backend.is_mode_supported(mode)
    }

    /// Whether application logic keeps executing in the current mode.
    #[must_use]
    pub fn is_processing_on_sleep(&self) -> bool {
        self.backend.is_processing_on_sleep(self.mode)
    }

    /// The currently selected sleep mode.
    #[must_use]
    pub fn sleep_mode(&self) -> SleepMode {
        self.mode
    }

    /// The armed sleep duration in microseconds (zero when unarmed).
    #[must_use]
    pub fn sleep_time_us(&self) -> u64 {
        self.registry.timer_us()
    }

    /// Borrow the backend, e.g. for family-specific queries.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Borrow the backend mutably, e.g. for family-specific configuration
    /// (touch pins, restart policy, RF options).
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn window_is_open(&self) -> bool {
        self.window_end.is_some_and(|end| Instant::now() < end)
    }
}
