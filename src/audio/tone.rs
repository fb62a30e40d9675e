//! Pure-tone block generator with explicit phase accumulator
//!
//! Each waveform stream owns a [`PhaseState`]. Generating a block advances
//! it, wrapping at 2π, so the next block starts exactly where the previous
//! one ended.

use core::f32::consts::TAU;

use crate::config::BLOCK_SAMPLES;

/// Largest magnitude a 16-bit signed sample can carry.
pub const MAX_AMPLITUDE: i32 = i16::MAX as i32;

/// Waveform shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    /// Starts at zero
    Sine,
    /// Starts at full amplitude (quarter-period phase offset)
    Cosine,
}

impl Waveform {
    #[inline]
    fn eval(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => libm::sinf(phase),
            Waveform::Cosine => libm::cosf(phase),
        }
    }
}

/// Fixed-frequency tone description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub frequency_hz: u32,
    /// Peak sample value, must satisfy `|amplitude| <= MAX_AMPLITUDE`
    pub amplitude: i32,
    pub waveform: Waveform,
}

impl Tone {
    pub const fn sine(frequency_hz: u32, amplitude: i32) -> Self {
        Self {
            frequency_hz,
            amplitude,
            waveform: Waveform::Sine,
        }
    }

    pub const fn cosine(frequency_hz: u32, amplitude: i32) -> Self {
        Self {
            frequency_hz,
            amplitude,
            waveform: Waveform::Cosine,
        }
    }

    /// Phase advance per sample in radians.
    #[inline]
    pub fn phase_increment(&self, sample_rate: u32) -> f32 {
        TAU * self.frequency_hz as f32 / sample_rate as f32
    }
}

/// Running phase of one waveform stream, always in `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhaseState(f32);

impl PhaseState {
    /// Phase at zero radians.
    pub const ZERO: Self = Self(0.0);

    /// Start from an arbitrary phase, normalized into `[0, 2π)`.
    /// Non-finite input starts at zero.
    pub fn new(radians: f32) -> Self {
        Self(wrap(radians))
    }

    /// Current phase in radians.
    #[inline]
    pub fn radians(&self) -> f32 {
        self.0
    }

    /// Advance by `increment` radians, wrapping (not resetting) at 2π.
    #[inline]
    pub fn advance(&mut self, increment: f32) {
        self.0 = wrap(self.0 + increment);
    }
}

#[inline]
fn wrap(phase: f32) -> f32 {
    if !phase.is_finite() {
        return 0.0;
    }
    let mut phase = libm::fmodf(phase, TAU);
    if phase < 0.0 {
        phase += TAU;
    }
    // f32 rounding can land exactly on TAU after adding to a tiny negative
    if phase >= TAU {
        0.0
    } else {
        phase
    }
}

/// Fixed-length block of signed 16-bit mono samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneBlock<const N: usize = BLOCK_SAMPLES> {
    samples: [i16; N],
}

impl<const N: usize> ToneBlock<N> {
    /// A block of silence.
    pub const fn silent() -> Self {
        Self { samples: [0; N] }
    }

    /// Synthesize `N` samples of `tone`, advancing `phase`.
    ///
    /// `sample[i] = round(amplitude * waveform(phase_i))`. Output is
    /// bit-identical for identical inputs.
    pub fn generate(phase: &mut PhaseState, tone: Tone, sample_rate: u32) -> Self {
        let mut block = Self::silent();
        block.fill(phase, tone, sample_rate);
        block
    }

    /// Regenerate in place (same contract as [`generate`](Self::generate)).
    pub fn fill(&mut self, phase: &mut PhaseState, tone: Tone, sample_rate: u32) {
        let inc = tone.phase_increment(sample_rate);
        let amp = tone.amplitude as f32;

        for sample in self.samples.iter_mut() {
            *sample = libm::roundf(amp * tone.waveform.eval(phase.radians())) as i16;
            phase.advance(inc);
        }
    }

    /// Samples in playback order.
    #[inline]
    pub fn samples(&self) -> &[i16; N] {
        &self.samples
    }

    /// Number of samples in the block.
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Little-endian byte image, as the I2S DMA expects it.
    ///
    /// `out` must hold at least `2 * N` bytes; returns the written prefix.
    pub fn write_le_bytes<'a>(&self, out: &'a mut [u8]) -> &'a [u8] {
        let len = N * 2;
        for (chunk, sample) in out[..len].chunks_exact_mut(2).zip(self.samples.iter()) {
            chunk.copy_from_slice(&sample.to_le_bytes());
        }
        &out[..len]
    }
}

impl<const N: usize> Default for ToneBlock<N> {
    fn default() -> Self {
        Self::silent()
    }
}
