//! Declarative playback patterns, one per feedback event
//!
//! A pattern is a list of steps (write a voice's block N times, or stay
//! silent) repeated for a number of bursts, with a silence between bursts.
//! Duration follows directly from the counts: `repeats * BLOCK_SAMPLES /
//! SAMPLE_RATE` seconds of audio per play step.

use super::tone::{Tone, MAX_AMPLITUDE};

/// Most voices (independently phased waveforms) a pattern may use.
pub const MAX_VOICES: usize = 2;

/// Fixed output level of every feedback tone.
pub const AMPLITUDE: i32 = 2000;

/// Pitch of keypad feedback tones (Hz).
pub const UI_FREQUENCY_HZ: u32 = 5000;

/// Pitch of the doorbell chime (Hz), lower than the keypad tones.
pub const DOORBELL_FREQUENCY_HZ: u32 = 2000;

/// Feedback events raised by the access-control logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneEvent {
    KeyPressed,
    EmptyPassword,
    CorrectPassword,
    WrongPassword,
    PasswordReset,
    DoorbellRing,
}

impl ToneEvent {
    pub const COUNT: usize = 6;

    pub const ALL: [ToneEvent; Self::COUNT] = [
        ToneEvent::KeyPressed,
        ToneEvent::EmptyPassword,
        ToneEvent::CorrectPassword,
        ToneEvent::WrongPassword,
        ToneEvent::PasswordReset,
        ToneEvent::DoorbellRing,
    ];

    /// Position in [`PATTERNS`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::KeyPressed => "key-pressed",
            Self::EmptyPassword => "empty-password",
            Self::CorrectPassword => "correct-password",
            Self::WrongPassword => "wrong-password",
            Self::PasswordReset => "password-reset",
            Self::DoorbellRing => "doorbell-ring",
        }
    }

    /// Inverse of [`index`](Self::index).
    pub fn from_index(index: usize) -> Option<ToneEvent> {
        Self::ALL.get(index).copied()
    }

    #[inline]
    pub fn pattern(self) -> &'static PlaybackPattern {
        &PATTERNS[self.index()]
    }
}

/// One step inside a burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Write the block of `voice` to the channel `repeats` times
    Play { voice: usize, repeats: u32 },
    /// Blocking silence
    Pause { ms: u32 },
}

/// Per-event timing and timbre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackPattern {
    /// Waveforms, each with its own phase stream
    pub voices: &'static [Tone],
    /// Steps making up one burst
    pub steps: &'static [Step],
    pub bursts: u32,
    /// Silence between consecutive bursts (none after the last)
    pub burst_gap_ms: u32,
}

impl PlaybackPattern {
    /// Block writes in one burst.
    pub fn blocks_per_burst(&self) -> u32 {
        self.steps
            .iter()
            .map(|step| match step {
                Step::Play { repeats, .. } => *repeats,
                Step::Pause { .. } => 0,
            })
            .sum()
    }

    /// Block writes for the whole event.
    pub fn total_blocks(&self) -> u32 {
        self.blocks_per_burst() * self.bursts
    }

    /// Silence for the whole event in milliseconds.
    pub fn silence_ms(&self) -> u32 {
        let per_burst: u32 = self
            .steps
            .iter()
            .map(|step| match step {
                Step::Pause { ms } => *ms,
                Step::Play { .. } => 0,
            })
            .sum();
        per_burst * self.bursts + self.burst_gap_ms * self.bursts.saturating_sub(1)
    }

    /// Audible time in microseconds for blocks of `block_len` samples.
    pub fn audible_duration_us(&self, block_len: usize, sample_rate: u32) -> u64 {
        self.total_blocks() as u64 * block_len as u64 * 1_000_000 / sample_rate as u64
    }

    /// Wall-clock time (audio plus silences) in milliseconds.
    pub fn total_duration_ms(&self, block_len: usize, sample_rate: u32) -> u64 {
        self.audible_duration_us(block_len, sample_rate) / 1000 + self.silence_ms() as u64
    }
}

const SINE_UI: Tone = Tone::sine(UI_FREQUENCY_HZ, AMPLITUDE);
const COSINE_UI: Tone = Tone::cosine(UI_FREQUENCY_HZ, AMPLITUDE);

const TABLE: [PlaybackPattern; ToneEvent::COUNT] = [
    // Key pressed: short click
    PlaybackPattern {
        voices: &[SINE_UI],
        steps: &[Step::Play { voice: 0, repeats: 200 }],
        bursts: 1,
        burst_gap_ms: 0,
    },
    // Empty password: longer, cosine timbre
    PlaybackPattern {
        voices: &[COSINE_UI],
        steps: &[Step::Play { voice: 0, repeats: 1000 }],
        bursts: 1,
        burst_gap_ms: 0,
    },
    // Correct password: longest single tone
    PlaybackPattern {
        voices: &[SINE_UI],
        steps: &[Step::Play { voice: 0, repeats: 1900 }],
        bursts: 1,
        burst_gap_ms: 0,
    },
    // Wrong password: five-burst buzz
    PlaybackPattern {
        voices: &[SINE_UI],
        steps: &[Step::Play { voice: 0, repeats: 200 }],
        bursts: 5,
        burst_gap_ms: 300,
    },
    // Password reset: alternating sine/cosine, each followed by 50ms
    PlaybackPattern {
        voices: &[SINE_UI, COSINE_UI],
        steps: &[
            Step::Play { voice: 0, repeats: 100 },
            Step::Pause { ms: 50 },
            Step::Play { voice: 1, repeats: 100 },
            Step::Pause { ms: 50 },
        ],
        bursts: 3,
        burst_gap_ms: 0,
    },
    // Doorbell ring
    PlaybackPattern {
        voices: &[Tone::sine(DOORBELL_FREQUENCY_HZ, AMPLITUDE)],
        steps: &[Step::Play { voice: 0, repeats: 300 }],
        bursts: 1,
        burst_gap_ms: 0,
    },
];

/// Playback table, indexed by [`ToneEvent::index`].
pub static PATTERNS: [PlaybackPattern; ToneEvent::COUNT] = TABLE;

// Table sanity, checked at compile time
const _: () = {
    let mut p = 0;
    while p < TABLE.len() {
        let pattern = &TABLE[p];
        assert!(pattern.bursts > 0);
        assert!(!pattern.voices.is_empty() && pattern.voices.len() <= MAX_VOICES);

        let mut v = 0;
        while v < pattern.voices.len() {
            let amp = pattern.voices[v].amplitude;
            assert!(amp <= MAX_AMPLITUDE && amp >= -MAX_AMPLITUDE);
            v += 1;
        }

        let mut s = 0;
        while s < pattern.steps.len() {
            if let Step::Play { voice, .. } = pattern.steps[s] {
                assert!(voice < pattern.voices.len());
            }
            s += 1;
        }
        p += 1;
    }
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_events() {
        assert_eq!(ToneEvent::DoorbellRing.pattern().voices[0].frequency_hz, 2000);
        assert_eq!(ToneEvent::PasswordReset.pattern().voices.len(), 2);
        for (i, event) in ToneEvent::ALL.iter().enumerate() {
            assert_eq!(event.index(), i);
        }
    }

    #[test]
    fn test_reset_silence() {
        // 2 x 50ms per burst, including after the last one
        assert_eq!(ToneEvent::PasswordReset.pattern().silence_ms(), 300);
        assert_eq!(ToneEvent::PasswordReset.pattern().total_blocks(), 600);
    }
}
