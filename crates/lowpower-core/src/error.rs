//! Error type shared by the manager, the registry, and all backends.

use thiserror_no_std::Error;

/// Why a power-management operation was rejected.
///
/// No variant is fatal: callers are expected to adjust configuration and
/// retry. The one caveat is a backend whose wake mechanism is a hardware
/// reboot — after such a `sleep()` succeeds, no further code in the current
/// execution runs at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerError {
    /// The requested sleep mode is not supported on this backend.
    #[error("sleep mode not supported on this backend")]
    UnsupportedMode,
    /// A timer wake and a pin wake were combined under a mode that accepts
    /// only one wake-source class per sleep cycle.
    #[error("timer and pin wake sources are mutually exclusive here")]
    WakeSourceConflict,
    /// More wake pins were registered than the backend permits.
    #[error("wake pin limit exceeded")]
    CardinalityExceeded,
    /// Required prior state is absent — e.g. the current mode consumes no
    /// wake source of this class, or a touch pin was never declared.
    #[error("operation precondition not met")]
    PreconditionNotMet,
}
