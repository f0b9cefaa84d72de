//! Cross-platform low-power management core.
//!
//! This crate holds everything about putting a microcontroller to sleep that
//! does **not** depend on the chip family: the duration model, the sleep-mode
//! capability matrix, the wake-source registry, and the scheduling state
//! machine. Chip-specific adapters live in the companion `lowpower-backends`
//! crate and plug in through the [`SleepBackend`] trait.
//!
//! # Architecture Layers
//!
//! ```text
//! Application control loop
//!         ↓
//! PowerManager (this crate — scheduling state machine)
//!         ↓
//! SleepBackend adapter (lowpower-backends — one per chip family)
//!         ↓
//! Hardware primitives (vendor HAL, supplied by the firmware)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use lowpower_core::{PowerManager, SleepBackend, SleepMode, TimeUnit};
//!
//! fn duty_cycle<B: SleepBackend>(backend: B) {
//!     let mut power = PowerManager::new(backend);
//!     let _ = power.set_sleep_mode(SleepMode::DeepSleep);
//!     let _ = power.set_sleep_time(500, TimeUnit::Milliseconds);
//!     power.set_active_time(2, TimeUnit::Seconds);
//!     power.set_active(false);
//!     loop {
//!         // application work ...
//!         power.process();
//!     }
//! }
//! ```
//!
//! # Features
//!
//! - `std`: expose the mock backend outside of tests
//! - `defmt`: enable defmt logging derives

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

pub mod backend;
pub mod duration;
pub mod error;
pub mod manager;
pub mod mocks;
pub mod mode;
pub mod signal;
pub mod wake;

pub use backend::{SleepBackend, SleepRequest};
pub use duration::{plan_cycles, CyclePlan, TimeUnit};
pub use error::PowerError;
pub use manager::PowerManager;
pub use mode::SleepMode;
pub use signal::{WakeCycleCounter, WakeSignal};
pub use wake::{PinEdge, WakePolicy, WakeSourceRegistry, WakeupPin, MAX_WAKEUP_PINS};
