//! Module: config
//!
//! Purpose: Fixed audio peripheral configuration for the doorbell.
//!
//! Architecture:
//! - `AudioConfig::DEFAULT`: single source of truth for the I2S setup
//! - Compile-time constants, validated once at initialization
//! - Never mutated after startup
//!
//! Wiring (MAX98357-style I2S amplifier):
//!
//! ```text
//! VIN   -> 3.3V
//! GND   -> GND
//! BCLK  -> GPIO2
//! LRCLK -> GPIO4
//! DIN   -> GPIO15
//! ```

use thiserror::Error;

/// Sample rate used by every tone pattern (Hz).
pub const SAMPLE_RATE: u32 = 44_100;

/// Samples per tone block; one block fills one DMA buffer.
pub const BLOCK_SAMPLES: usize = 64;

/// Sample width the tone generator produces.
pub const BITS_PER_SAMPLE: u8 = 16;

/// Channel slot layout on the I2S bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelFormat {
    /// Both slots carry data
    RightLeft,
    /// Same sample duplicated on both slots
    AllRight,
    /// Only the right slot carries data
    OnlyRight,
    /// Only the left slot carries data
    OnlyLeft,
}

impl ChannelFormat {
    /// True if the format carries a single (mono) stream.
    pub fn is_mono(self) -> bool {
        matches!(self, Self::OnlyRight | Self::OnlyLeft | Self::AllRight)
    }
}

/// Frame alignment on the serial data line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommFormat {
    /// Philips I2S: data delayed one bit clock after word select
    StandardI2s,
    /// MSB-justified: data aligned with word select edge
    StandardMsb,
}

/// Bus role of the ESP32 on the I2S interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// ESP32 drives bit clock and word select
    Master,
    /// External device drives the clocks
    Slave,
}

/// GPIO assignment for the I2S lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinConfig {
    /// Bit clock (BCLK)
    pub bck: u8,
    /// Word select (LRCLK)
    pub ws: u8,
    /// Serial data out (DIN on the amplifier)
    pub data_out: u8,
}

impl PinConfig {
    /// Check that all three pins are distinct output-capable GPIOs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for pin in [self.bck, self.ws, self.data_out] {
            if !is_output_capable(pin) {
                return Err(ConfigError::PinNotOutput(pin));
            }
        }
        if self.bck == self.ws || self.bck == self.data_out {
            return Err(ConfigError::DuplicatePin(self.bck));
        }
        if self.ws == self.data_out {
            return Err(ConfigError::DuplicatePin(self.ws));
        }
        Ok(())
    }
}

/// Output-capable GPIOs on ESP32-S3 (26..=32 are wired to flash/PSRAM).
#[cfg(feature = "esp32s3")]
pub fn is_output_capable(pin: u8) -> bool {
    pin <= 48 && !(26..=32).contains(&pin)
}

/// Output-capable GPIOs on ESP32 (6..=11 are wired to flash, 34..=39 are input only).
#[cfg(not(feature = "esp32s3"))]
pub fn is_output_capable(pin: u8) -> bool {
    pin <= 33 && !(6..=11).contains(&pin)
}

/// Audio peripheral configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub bits_per_sample: u8,
    pub channel_format: ChannelFormat,
    pub comm_format: CommFormat,
    pub role: Role,
    pub pins: PinConfig,
    /// Number of DMA descriptors
    pub dma_buf_count: u16,
    /// Frames per DMA buffer
    pub dma_buf_len: u16,
    /// Upper bound on a single blocking write, in milliseconds
    pub write_timeout_ms: u32,
}

impl AudioConfig {
    /// The doorbell's fixed hardware configuration.
    pub const DEFAULT: Self = Self {
        sample_rate: SAMPLE_RATE,
        bits_per_sample: BITS_PER_SAMPLE,
        channel_format: ChannelFormat::OnlyRight,
        comm_format: CommFormat::StandardMsb,
        role: Role::Master,
        pins: PinConfig {
            bck: 2,
            ws: 4,
            data_out: 15,
        },
        dma_buf_count: 8,
        dma_buf_len: BLOCK_SAMPLES as u16,
        write_timeout_ms: 100,
    };

    /// Validate against what the I2S driver and the tone generator accept.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bits_per_sample != BITS_PER_SAMPLE {
            return Err(ConfigError::UnsupportedBitDepth(self.bits_per_sample));
        }
        if !self.channel_format.is_mono() {
            return Err(ConfigError::NotMono);
        }
        if !(8_000..=96_000).contains(&self.sample_rate) {
            return Err(ConfigError::SampleRateOutOfRange(self.sample_rate));
        }
        if !(2..=128).contains(&self.dma_buf_count) {
            return Err(ConfigError::DmaBufCount(self.dma_buf_count));
        }
        if !(8..=1024).contains(&self.dma_buf_len) {
            return Err(ConfigError::DmaBufLen(self.dma_buf_len));
        }
        if self.write_timeout_ms == 0 {
            return Err(ConfigError::ZeroWriteTimeout);
        }
        self.pins.validate()
    }

    /// Duration of one block of `samples` samples, in microseconds.
    pub fn block_duration_us(&self, samples: usize) -> u64 {
        samples as u64 * 1_000_000 / self.sample_rate as u64
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Rejected configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unsupported bit depth {0} (only 16-bit samples)")]
    UnsupportedBitDepth(u8),
    #[error("channel format must be single slot")]
    NotMono,
    #[error("sample rate {0} Hz out of range")]
    SampleRateOutOfRange(u32),
    #[error("DMA buffer count {0} out of range 2..=128")]
    DmaBufCount(u16),
    #[error("DMA buffer length {0} out of range 8..=1024")]
    DmaBufLen(u16),
    #[error("write timeout must be non-zero")]
    ZeroWriteTimeout,
    #[error("GPIO{0} cannot drive an output")]
    PinNotOutput(u8),
    #[error("GPIO{0} assigned to more than one I2S line")]
    DuplicatePin(u8),
}

impl ConfigError {
    /// Short diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedBitDepth(_) => "C01",
            Self::NotMono => "C02",
            Self::SampleRateOutOfRange(_) => "C03",
            Self::DmaBufCount(_) => "C04",
            Self::DmaBufLen(_) => "C05",
            Self::ZeroWriteTimeout => "C06",
            Self::PinNotOutput(_) => "C07",
            Self::DuplicatePin(_) => "C08",
        }
    }
}
