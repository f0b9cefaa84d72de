//! Chip-family sleep adapters.
//!
//! One module per hardware family, each implementing
//! [`lowpower_core::SleepBackend`] against a narrow trait of hardware
//! primitives that the firmware supplies (and tests mock):
//!
//! - [`esp32`] — light/deep sleep, ext0/ext1 and touch wake, radio
//!   power-save, RTC-retained deep-sleep counter
//! - [`esp8266`] — radio sleep types, RTC deep sleep with RF options
//! - [`rp2040`] — dormant states, clock/voltage-scaled light sleep,
//!   optional restart-on-wake
//! - [`samd`] — RTC standby sleep
//! - [`attiny`] — watchdog-cycle deep sleep
//!
//! The adapters contain no register access themselves; they translate the
//! common contract into primitive calls and own the quirks (wake-source
//! exclusivity, pin limits, reboot-on-wake) of their family.

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod attiny;
pub mod esp32;
pub mod esp8266;
pub mod rp2040;
pub mod samd;

pub use attiny::{AttinyBackend, AttinyHal, WATCHDOG_INTERVALS_MS};
pub use esp32::{Esp32Backend, Esp32Hal, Ext1Trigger, RadioPowerSave, WakeLevel, WakePull, WakeupKind};
pub use esp8266::{DeepSleepRf, Esp8266Backend, Esp8266Hal, RadioSleepType};
pub use rp2040::{CoreVoltage, Rp2040Backend, Rp2040Hal};
pub use samd::{SamdBackend, SamdHal};
