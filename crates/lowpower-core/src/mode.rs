//! Sleep modes and the baseline capability matrix.

/// A selectable hardware power state.
///
/// What each mode maps to is up to the backend adapter: a true hardware
/// dormant state, a radio power-save policy, a clock/voltage reduction, or a
/// plain busy-wait on chips without the corresponding primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepMode {
    /// No power saving; the backend degrades `sleep()` to a delay.
    NoSleep,
    /// CPU and peripherals clock-gated; execution resumes in place on wake.
    LightSleep,
    /// Deepest state the chip offers. On several families this powers down
    /// the CPU and SRAM, and waking is a full restart.
    DeepSleep,
    /// Radio/modem power-save. A continuous policy rather than a discrete
    /// suspend/resume cycle: selecting it takes effect immediately.
    ModemSleep,
}

/// Baseline support matrix shared by all backends that do not override it.
///
/// `NoSleep` is unsupported by default; backends that degrade it to a delay
/// declare it supported themselves.
#[must_use]
pub const fn baseline_support(mode: SleepMode) -> bool {
    !matches!(mode, SleepMode::NoSleep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_rejects_no_sleep() {
        assert!(!baseline_support(SleepMode::NoSleep));
    }

    #[test]
    fn test_baseline_accepts_real_sleep_modes() {
        assert!(baseline_support(SleepMode::LightSleep));
        assert!(baseline_support(SleepMode::DeepSleep));
        assert!(baseline_support(SleepMode::ModemSleep));
    }
}
