//! Tone emitter: plays feedback patterns on the output channel
//!
//! One generic routine walks a [`PlaybackPattern`]:
//!
//! ```text
//! idle ──▶ generating ──▶ writing ──▶ idle
//!          (1 block/voice)  (block × repeats, pauses, bursts)
//! ```
//!
//! Every call blocks until the whole pattern is written. Each write waits at
//! most `write_timeout_ms`; a stalled peripheral ends the event with
//! [`ToneError::WriteTimeout`] instead of hanging the device. The shared
//! [`CancelToken`] is polled before every block and every pause slice.

use embedded_hal::delay::DelayNs;
use log::{debug, warn};
use thiserror::Error;

use super::pattern::{PlaybackPattern, Step, ToneEvent, MAX_VOICES};
use super::tone::{PhaseState, ToneBlock};
use crate::cancel::CancelToken;
use crate::config::{AudioConfig, BLOCK_SAMPLES};
use crate::fault::{FaultCode, FaultState};
use crate::hal::{ChannelError, OutputChannel, PeripheralInitError};

/// Pauses are slept in slices this long so cancellation stays responsive.
pub const PAUSE_SLICE_MS: u32 = 10;

const BLOCK_BYTES: usize = BLOCK_SAMPLES * 2;

/// Why a tone did not play to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ToneError {
    #[error("audio output unavailable: {0}")]
    Peripheral(PeripheralInitError),
    #[error("output stalled after {blocks_written} blocks")]
    WriteTimeout { blocks_written: u32 },
    #[error("cancelled after {blocks_written} blocks")]
    Cancelled { blocks_written: u32 },
    #[error("output error after {blocks_written} blocks: {error}")]
    Channel {
        error: ChannelError,
        blocks_written: u32,
    },
}

impl ToneError {
    /// Blocks accepted by the channel before the event stopped.
    pub fn blocks_written(&self) -> u32 {
        match self {
            Self::Peripheral(_) => 0,
            Self::WriteTimeout { blocks_written }
            | Self::Cancelled { blocks_written }
            | Self::Channel { blocks_written, .. } => *blocks_written,
        }
    }

    /// Matching fault latch code.
    pub fn fault_code(&self) -> FaultCode {
        match self {
            Self::Peripheral(_) => FaultCode::NotInitialized,
            Self::WriteTimeout { .. } => FaultCode::WriteTimeout,
            Self::Cancelled { .. } => FaultCode::Cancelled,
            Self::Channel { .. } => FaultCode::ChannelFault,
        }
    }
}

/// Summary of a completed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackReport {
    pub event: ToneEvent,
    pub blocks_written: u32,
    pub bursts: u32,
    /// Total blocking silence inserted
    pub silence_ms: u32,
}

/// Feedback tone player.
///
/// Owns the output channel (or the error that prevented creating it), the
/// pause delay, and one [`PhaseState`] per voice per event so each event's
/// waveform continues where its previous invocation stopped.
pub struct ToneEmitter<'a, C, D> {
    output: Result<C, PeripheralInitError>,
    delay: D,
    sample_rate: u32,
    write_timeout_ms: u32,
    phases: [[PhaseState; MAX_VOICES]; ToneEvent::COUNT],
    fault: &'a FaultState,
    cancel: &'a CancelToken,
}

impl<'a, C, D> ToneEmitter<'a, C, D>
where
    C: OutputChannel,
    D: DelayNs,
{
    /// Build from the result of [`hal::initialize`](crate::hal::initialize).
    ///
    /// A failed initialization is kept and reported by every tone request.
    pub fn new(
        output: Result<C, PeripheralInitError>,
        delay: D,
        config: &AudioConfig,
        fault: &'a FaultState,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            output,
            delay,
            sample_rate: config.sample_rate,
            write_timeout_ms: config.write_timeout_ms,
            phases: [[PhaseState::ZERO; MAX_VOICES]; ToneEvent::COUNT],
            fault,
            cancel,
        }
    }

    /// Emitter with no channel; every tone fails with `NotInitialized`.
    pub fn uninitialized(
        delay: D,
        config: &AudioConfig,
        fault: &'a FaultState,
        cancel: &'a CancelToken,
    ) -> Self {
        Self::new(Err(PeripheralInitError::NotInitialized), delay, config, fault, cancel)
    }

    /// True if an output channel is attached.
    pub fn is_ready(&self) -> bool {
        self.output.is_ok()
    }

    /// Phase the next invocation of `event` will start `voice` from.
    pub fn phase(&self, event: ToneEvent, voice: usize) -> PhaseState {
        self.phases[event.index()][voice]
    }

    pub fn on_key_pressed(&mut self) -> Result<PlaybackReport, ToneError> {
        self.play(ToneEvent::KeyPressed)
    }

    pub fn on_empty_password(&mut self) -> Result<PlaybackReport, ToneError> {
        self.play(ToneEvent::EmptyPassword)
    }

    pub fn on_correct_password(&mut self) -> Result<PlaybackReport, ToneError> {
        self.play(ToneEvent::CorrectPassword)
    }

    pub fn on_wrong_password(&mut self) -> Result<PlaybackReport, ToneError> {
        self.play(ToneEvent::WrongPassword)
    }

    pub fn on_password_reset(&mut self) -> Result<PlaybackReport, ToneError> {
        self.play(ToneEvent::PasswordReset)
    }

    pub fn on_doorbell_ring(&mut self) -> Result<PlaybackReport, ToneError> {
        self.play(ToneEvent::DoorbellRing)
    }

    /// Play `event`'s pattern to completion (blocking).
    pub fn play(&mut self, event: ToneEvent) -> Result<PlaybackReport, ToneError> {
        let pattern = event.pattern();

        let channel = match self.output.as_mut() {
            Ok(channel) => channel,
            Err(e) => {
                let err = ToneError::Peripheral(*e);
                self.fault.record(event, &err);
                warn!("{}: {}", event.name(), err);
                return Err(err);
            }
        };

        debug!("{}: start", event.name());

        // Generate one block per voice, continuing each voice's phase
        let mut images = [[0u8; BLOCK_BYTES]; MAX_VOICES];
        let phases = &mut self.phases[event.index()];
        for (voice, tone) in pattern.voices.iter().enumerate() {
            let block: ToneBlock = ToneBlock::generate(&mut phases[voice], *tone, self.sample_rate);
            block.write_le_bytes(&mut images[voice]);
        }

        let mut writer = BlockWriter {
            channel,
            delay: &mut self.delay,
            cancel: self.cancel,
            timeout_ms: self.write_timeout_ms,
            blocks_written: 0,
        };

        match writer.run(pattern, &images) {
            Ok(()) => {
                debug!("{}: done, {} blocks", event.name(), writer.blocks_written);
                Ok(PlaybackReport {
                    event,
                    blocks_written: writer.blocks_written,
                    bursts: pattern.bursts,
                    silence_ms: pattern.silence_ms(),
                })
            }
            Err(err) => {
                self.fault.record(event, &err);
                warn!("{}: {}", event.name(), err);
                Err(err)
            }
        }
    }
}

/// Streams one pattern; tracks progress for error reports.
struct BlockWriter<'e, C, D> {
    channel: &'e mut C,
    delay: &'e mut D,
    cancel: &'e CancelToken,
    timeout_ms: u32,
    blocks_written: u32,
}

impl<C: OutputChannel, D: DelayNs> BlockWriter<'_, C, D> {
    fn run(
        &mut self,
        pattern: &PlaybackPattern,
        images: &[[u8; BLOCK_BYTES]; MAX_VOICES],
    ) -> Result<(), ToneError> {
        for burst in 0..pattern.bursts {
            if burst > 0 {
                self.pause(pattern.burst_gap_ms)?;
            }
            for step in pattern.steps {
                match *step {
                    Step::Play { voice, repeats } => {
                        for _ in 0..repeats {
                            self.write_block(&images[voice])?;
                        }
                    }
                    Step::Pause { ms } => self.pause(ms)?,
                }
            }
        }
        Ok(())
    }

    fn check_cancel(&self) -> Result<(), ToneError> {
        if self.cancel.take() {
            return Err(ToneError::Cancelled {
                blocks_written: self.blocks_written,
            });
        }
        Ok(())
    }

    /// Push one whole block, resuming partial writes.
    fn write_block(&mut self, image: &[u8]) -> Result<(), ToneError> {
        self.check_cancel()?;

        let mut rest = image;
        while !rest.is_empty() {
            match self.channel.write(rest, self.timeout_ms) {
                Ok(0) | Err(ChannelError::Timeout) => {
                    return Err(ToneError::WriteTimeout {
                        blocks_written: self.blocks_written,
                    });
                }
                Ok(n) => rest = &rest[n.min(rest.len())..],
                Err(error) => {
                    return Err(ToneError::Channel {
                        error,
                        blocks_written: self.blocks_written,
                    });
                }
            }
        }

        self.blocks_written += 1;
        Ok(())
    }

    fn pause(&mut self, ms: u32) -> Result<(), ToneError> {
        let mut left = ms;
        while left > 0 {
            self.check_cancel()?;
            let slice = left.min(PAUSE_SLICE_MS);
            self.delay.delay_ms(slice);
            left -= slice;
        }
        Ok(())
    }
}
