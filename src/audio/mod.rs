//! Audible feedback for the doorbell keypad
//!
//! Architecture:
//! - Tone generator: explicit phase accumulator, one block per voice
//! - Pattern table: per-event repeats, bursts and pauses
//! - Emitter: blocking writes with bounded wait and cancellation
//! - I2S output @ 44.1 kHz, 16-bit mono, 64-sample blocks

pub mod emitter;
pub mod pattern;
pub mod tone;

pub use emitter::{PlaybackReport, ToneEmitter, ToneError, PAUSE_SLICE_MS};
pub use pattern::{PlaybackPattern, Step, ToneEvent, PATTERNS};
pub use tone::{PhaseState, Tone, ToneBlock, Waveform, MAX_AMPLITUDE};
