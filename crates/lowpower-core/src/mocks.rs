//! Mock backend for testing.
//!
//! Records every call the [`PowerManager`](crate::manager::PowerManager)
//! makes so host tests can assert on scheduling behavior without hardware.
//! Available to downstream crates via the `std` feature.

#![cfg(any(test, feature = "std"))]

use heapless::Vec;

use crate::backend::{SleepBackend, SleepRequest};
use crate::error::PowerError;
use crate::mode::{baseline_support, SleepMode};
use crate::wake::{WakePolicy, WakeupPin, MAX_WAKEUP_PINS};

/// Call-recording backend with a configurable policy and support matrix.
pub struct MockBackend {
    policy: WakePolicy,
    baseline_support: bool,
    fail_arm_pin: bool,
    sleep_count: usize,
    reset_count: usize,
    last_mode: Option<SleepMode>,
    last_sleep_time_us: u64,
    last_pins: Vec<WakeupPin, MAX_WAKEUP_PINS>,
}

impl MockBackend {
    /// All four modes supported, unrestricted wake policy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            policy: WakePolicy::unrestricted(),
            baseline_support: false,
            fail_arm_pin: false,
            sleep_count: 0,
            reset_count: 0,
            last_mode: None,
            last_sleep_time_us: 0,
            last_pins: Vec::new(),
        }
    }

    /// Use the baseline support matrix instead of all-modes-supported.
    #[must_use]
    pub fn with_baseline_support(mut self) -> Self {
        self.baseline_support = true;
        self
    }

    /// Answer `policy` for every mode.
    #[must_use]
    pub fn with_policy(mut self, policy: WakePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Make the hardware pin-arming hook fail.
    #[must_use]
    pub fn with_failing_arm_pin(mut self) -> Self {
        self.fail_arm_pin = true;
        self
    }

    /// Number of `sleep` calls observed.
    #[must_use]
    pub fn sleep_count(&self) -> usize {
        self.sleep_count
    }

    /// Number of `reset` calls observed.
    #[must_use]
    pub fn reset_count(&self) -> usize {
        self.reset_count
    }

    /// Mode of the most recent `sleep` call.
    #[must_use]
    pub fn last_mode(&self) -> Option<SleepMode> {
        self.last_mode
    }

    /// Sleep duration of the most recent `sleep` call.
    #[must_use]
    pub fn last_sleep_time_us(&self) -> u64 {
        self.last_sleep_time_us
    }

    /// Wake pins of the most recent `sleep` call.
    #[must_use]
    pub fn last_pins(&self) -> &[WakeupPin] {
        &self.last_pins
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SleepBackend for MockBackend {
    fn sleep(&mut self, request: &SleepRequest<'_>) -> Result<(), PowerError> {
        self.sleep_count = self.sleep_count.saturating_add(1);
        self.last_mode = Some(request.mode);
        self.last_sleep_time_us = request.sleep_time_us;
        self.last_pins.clear();
        let _ = self.last_pins.extend_from_slice(request.pins);
        Ok(())
    }

    fn arm_pin(&mut self, _mode: SleepMode, _pin: WakeupPin) -> Result<(), PowerError> {
        if self.fail_arm_pin {
            return Err(PowerError::PreconditionNotMet);
        }
        Ok(())
    }

    fn wake_policy(&self, _mode: SleepMode) -> WakePolicy {
        self.policy
    }

    fn is_mode_supported(&self, mode: SleepMode) -> bool {
        if self.baseline_support {
            baseline_support(mode)
        } else {
            true
        }
    }

    fn is_processing_on_sleep(&self, mode: SleepMode) -> bool {
        matches!(mode, SleepMode::NoSleep | SleepMode::ModemSleep)
    }

    fn reset(&mut self) {
        self.reset_count = self.reset_count.saturating_add(1);
    }
}
