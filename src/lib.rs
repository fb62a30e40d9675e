//! # Doorbell chime
//!
//! Audible feedback subsystem of the smart doorbell: keypad clicks,
//! password results, reset and doorbell tones streamed over I2S.
//!
//! ## Architecture
//!
//! Two strictly layered components:
//! - Peripheral configurator ([`hal::initialize`]): one-time I2S setup from
//!   the fixed [`AudioConfig`], yields the single [`OutputChannel`]
//! - Tone emitter ([`ToneEmitter`]): synthesizes a block per voice and
//!   writes it repeatedly following the event's [`PlaybackPattern`]
//!
//! Everything is blocking and single-owner. The only cross-task signals are
//! the [`CancelToken`] and the [`FaultState`] latch, both lock-free.

#![cfg_attr(not(test), no_std)]

pub mod audio;
pub mod cancel;
pub mod config;
pub mod fault;
pub mod hal;

pub use audio::{PlaybackPattern, PlaybackReport, ToneEmitter, ToneError, ToneEvent};
pub use cancel::CancelToken;
pub use config::AudioConfig;
pub use fault::{FaultCode, FaultSnapshot, FaultState};
pub use hal::{initialize, ChannelError, OutputChannel, PeripheralDriver, PeripheralInitError};
