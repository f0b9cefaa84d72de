//! Wake sources: pins, policies, and the registration routine.
//!
//! Backends do not implement their own registration rules. They describe
//! what the hardware accepts for a given sleep mode as a [`WakePolicy`], and
//! one generic routine in [`WakeSourceRegistry`] enforces it. This keeps the
//! "mode selects exactly one wake-source class" rule identical across chip
//! families that express it very differently at the register level.

use heapless::Vec;

use crate::error::PowerError;

/// Upper bound on registered wake pins, across all backends.
///
/// Individual backends usually permit far fewer via [`WakePolicy::max_pins`].
pub const MAX_WAKEUP_PINS: usize = 8;

/// Which signal transition on a wake pin ends the sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinEdge {
    /// Low-to-high transition.
    Rising,
    /// High-to-low transition.
    Falling,
}

/// A registered wake condition: a GPIO pin and the edge that wakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WakeupPin {
    /// GPIO pin number.
    pub pin: u8,
    /// Edge that ends the sleep.
    pub edge: PinEdge,
}

/// Per-backend, per-mode description of which wake sources are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WakePolicy {
    /// Maximum number of wake pins; `None` means unlimited (bounded only by
    /// [`MAX_WAKEUP_PINS`]).
    pub max_pins: Option<u8>,
    /// When true, a nonzero sleep timer and registered pins are mutually
    /// exclusive: whichever class is configured first wins.
    pub exclusive: bool,
    /// Whether this mode consumes pin wake sources at all.
    pub accepts_pins: bool,
    /// Whether this mode consumes a timed wake at all.
    pub accepts_timer: bool,
}

impl WakePolicy {
    /// Both wake-source classes accepted, no cardinality or exclusivity
    /// limits.
    #[must_use]
    pub const fn unrestricted() -> Self {
        Self {
            max_pins: None,
            exclusive: false,
            accepts_pins: true,
            accepts_timer: true,
        }
    }

    /// Both classes accepted but mutually exclusive, with an optional pin
    /// limit.
    #[must_use]
    pub const fn exclusive(max_pins: Option<u8>) -> Self {
        Self {
            max_pins,
            exclusive: true,
            accepts_pins: true,
            accepts_timer: true,
        }
    }

    /// Neither class accepted (e.g. modem power-save, which wakes on its own
    /// schedule).
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_pins: Some(0),
            exclusive: false,
            accepts_pins: false,
            accepts_timer: false,
        }
    }
}

/// Tracks the configured wake conditions for the next sleep cycle.
#[derive(Debug, Default)]
pub struct WakeSourceRegistry {
    pins: Vec<WakeupPin, MAX_WAKEUP_PINS>,
    timer_us: u64,
}

impl WakeSourceRegistry {
    /// Create an empty registry: no pins, no timer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pins: Vec::new(),
            timer_us: 0,
        }
    }

    /// Register a wake pin under `policy`.
    ///
    /// Fails with [`PowerError::PreconditionNotMet`] when the mode consumes
    /// no pin wake, [`PowerError::WakeSourceConflict`] when a timer is armed
    /// under an exclusive policy, and [`PowerError::CardinalityExceeded`]
    /// past the pin limit.
    pub fn register_pin(&mut self, pin: WakeupPin, policy: &WakePolicy) -> Result<(), PowerError> {
        if !policy.accepts_pins {
            return Err(PowerError::PreconditionNotMet);
        }
        if policy.exclusive && self.timer_us != 0 {
            return Err(PowerError::WakeSourceConflict);
        }
        let limit = policy
            .max_pins
            .map_or(MAX_WAKEUP_PINS, |max| usize::from(max).min(MAX_WAKEUP_PINS));
        if self.pins.len() >= limit {
            return Err(PowerError::CardinalityExceeded);
        }
        self.pins
            .push(pin)
            .map_err(|_| PowerError::CardinalityExceeded)
    }

    /// Arm (or, with zero, clear) the timed wake under `policy`.
    ///
    /// Symmetric to [`register_pin`](Self::register_pin): fails with
    /// [`PowerError::PreconditionNotMet`] when the mode has no timed wake
    /// and [`PowerError::WakeSourceConflict`] when pins are already
    /// registered under an exclusive policy.
    pub fn set_timer(&mut self, micros: u64, policy: &WakePolicy) -> Result<(), PowerError> {
        if !policy.accepts_timer {
            return Err(PowerError::PreconditionNotMet);
        }
        if policy.exclusive && micros != 0 && !self.pins.is_empty() {
            return Err(PowerError::WakeSourceConflict);
        }
        self.timer_us = micros;
        Ok(())
    }

    /// The registered wake pins, in registration order.
    #[must_use]
    pub fn pins(&self) -> &[WakeupPin] {
        &self.pins
    }

    /// The armed timer duration in microseconds (zero when unarmed).
    #[must_use]
    pub fn timer_us(&self) -> u64 {
        self.timer_us
    }

    /// Drop all registrations.
    pub fn clear(&mut self) {
        self.pins.clear();
        self.timer_us = 0;
    }

    /// Roll back the most recent pin registration (used when hardware
    /// arming fails after generic validation passed).
    pub(crate) fn pop_pin(&mut self) {
        let _ = self.pins.pop();
    }
}
