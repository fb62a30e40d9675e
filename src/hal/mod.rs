//! Hardware Abstraction Layer for the doorbell audio output.
//!
//! Thin seam between the tone emitter and the I2S peripheral.
//! Business logic stays in `audio`, the HAL is just I/O:
//!
//! - [`PeripheralDriver`] installs the driver once and yields a channel
//! - [`OutputChannel`] accepts sample bytes with a bounded wait
//! - [`initialize`] validates the config and performs the one-time install

use log::{error, info};
use thiserror::Error;

use crate::config::{AudioConfig, ConfigError};

#[cfg(target_os = "espidf")]
pub mod i2s;

#[cfg(target_os = "espidf")]
pub use i2s::{EspI2sChannel, EspI2sDriver};

/// Write-side failure of the output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// Peripheral did not accept data within the timeout
    #[error("write not accepted within timeout")]
    Timeout,
    /// Driver error code (ESP-IDF `esp_err_t`)
    #[error("driver error {0}")]
    Driver(i32),
}

/// Handle to a configured audio output peripheral.
///
/// Samples are 16-bit signed mono, little-endian, at the rate the channel
/// was initialized with.
pub trait OutputChannel {
    /// Queue `bytes` for transmission, waiting at most `timeout_ms` for
    /// buffer space. Returns how many bytes were accepted (may be fewer
    /// than `bytes.len()`).
    fn write(&mut self, bytes: &[u8], timeout_ms: u32) -> Result<usize, ChannelError>;
}

impl<T: OutputChannel + ?Sized> OutputChannel for &mut T {
    fn write(&mut self, bytes: &[u8], timeout_ms: u32) -> Result<usize, ChannelError> {
        (**self).write(bytes, timeout_ms)
    }
}

/// Why the audio peripheral could not be brought up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PeripheralInitError {
    /// I2S interface already owned by someone else
    #[error("I2S interface already claimed")]
    AlreadyClaimed,
    /// Configuration rejected before touching hardware
    #[error("invalid audio configuration: {0}")]
    InvalidConfig(ConfigError),
    /// Pin refused by the driver
    #[error("GPIO{0} cannot be bound to the I2S interface")]
    InvalidPin(u8),
    /// Driver install failed (ESP-IDF `esp_err_t`)
    #[error("audio driver unavailable (error {0})")]
    DriverUnavailable(i32),
    /// Output used before initialization
    #[error("audio output not initialized")]
    NotInitialized,
}

impl PeripheralInitError {
    /// Short diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyClaimed => "P01",
            Self::InvalidConfig(_) => "P02",
            Self::InvalidPin(_) => "P03",
            Self::DriverUnavailable(_) => "P04",
            Self::NotInitialized => "P05",
        }
    }
}

impl From<ConfigError> for PeripheralInitError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::PinNotOutput(pin) => Self::InvalidPin(pin),
            other => Self::InvalidConfig(other),
        }
    }
}

/// One-shot installer for the audio output driver.
///
/// `install` consumes the driver, so the interface can be claimed at most
/// once per driver value. Implementations own the peripheral singleton.
pub trait PeripheralDriver {
    type Channel: OutputChannel;

    /// Install the driver, bind pins and start the transmitter.
    fn install(self, config: &AudioConfig) -> Result<Self::Channel, PeripheralInitError>;
}

/// Bring up the audio output. Call once at startup, before any tone.
///
/// Failure is fatal for audio: the caller keeps the error and every tone
/// request reports it.
pub fn initialize<D: PeripheralDriver>(
    driver: D,
    config: AudioConfig,
) -> Result<D::Channel, PeripheralInitError> {
    if let Err(e) = config.validate() {
        error!("audio config rejected [{}]: {}", e.code(), e);
        return Err(e.into());
    }

    match driver.install(&config) {
        Ok(channel) => {
            info!(
                "I2S output ready: {} Hz, {}-bit, bck={} ws={} dout={}, {}x{} DMA ({} us per buffer)",
                config.sample_rate,
                config.bits_per_sample,
                config.pins.bck,
                config.pins.ws,
                config.pins.data_out,
                config.dma_buf_count,
                config.dma_buf_len,
                config.block_duration_us(config.dma_buf_len as usize),
            );
            Ok(channel)
        }
        Err(e) => {
            error!("I2S install failed [{}]: {}", e.code(), e);
            Err(e)
        }
    }
}
