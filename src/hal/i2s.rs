//! ESP-IDF I2S backend for the doorbell amplifier.
//!
//! Standard-mode TX channel, MSB-justified, 16-bit mono on the right slot,
//! pins taken from [`AudioConfig::pins`].

use core::sync::atomic::{AtomicBool, Ordering};

use esp_idf_svc::hal::delay::TickType;
use esp_idf_svc::hal::gpio::AnyIOPin;
use esp_idf_svc::hal::i2s::config::{
    Config, DataBitWidth, Role as I2sRole, SlotMode, StdClkConfig, StdConfig, StdGpioConfig,
    StdSlotConfig, StdSlotMask,
};
use esp_idf_svc::hal::i2s::{I2sDriver, I2sTx, I2S0};
use esp_idf_svc::sys::{EspError, ESP_ERR_INVALID_STATE, ESP_ERR_TIMEOUT};

use super::{ChannelError, OutputChannel, PeripheralDriver, PeripheralInitError};
use crate::config::{AudioConfig, ChannelFormat, CommFormat, Role};

// bindgen exposes the codes as u32, esp_err_t is i32
const ERR_INVALID_STATE: i32 = ESP_ERR_INVALID_STATE as i32;
const ERR_TIMEOUT: i32 = ESP_ERR_TIMEOUT as i32;

/// Set once the I2S0 singleton has been handed out by [`EspI2sDriver::take`].
static I2S0_CLAIMED: AtomicBool = AtomicBool::new(false);

/// Owner of the I2S0 peripheral until [`install`](PeripheralDriver::install).
pub struct EspI2sDriver {
    i2s: I2S0,
}

impl EspI2sDriver {
    /// Wrap an I2S0 taken from `Peripherals`.
    pub fn new(i2s: I2S0) -> Self {
        Self { i2s }
    }

    /// Claim I2S0 directly. Only the first call succeeds.
    pub fn take() -> Result<Self, PeripheralInitError> {
        if I2S0_CLAIMED.swap(true, Ordering::AcqRel) {
            return Err(PeripheralInitError::AlreadyClaimed);
        }
        // SAFETY: the claim flag above hands out at most one I2S0 from this path,
        // and the firmware does not take I2S0 out of `Peripherals`.
        let i2s = unsafe { I2S0::new() };
        Ok(Self { i2s })
    }
}

fn init_error(err: EspError) -> PeripheralInitError {
    match err.code() {
        ERR_INVALID_STATE => PeripheralInitError::AlreadyClaimed,
        code => PeripheralInitError::DriverUnavailable(code),
    }
}

fn std_config(config: &AudioConfig) -> StdConfig {
    let role = match config.role {
        Role::Master => I2sRole::Controller,
        Role::Slave => I2sRole::Target,
    };
    let channel = Config::default()
        .role(role)
        .dma_buffer_count(config.dma_buf_count as u32)
        .frames_per_buffer(config.dma_buf_len as u32)
        .auto_clear(true);

    let slot = match config.comm_format {
        CommFormat::StandardI2s => StdSlotConfig::philips_slot_default(DataBitWidth::Bits16, SlotMode::Mono),
        CommFormat::StandardMsb => StdSlotConfig::msb_slot_default(DataBitWidth::Bits16, SlotMode::Mono),
    };
    let slot = match config.channel_format {
        ChannelFormat::OnlyLeft => slot.slot_mode_mask(StdSlotMask::Left),
        ChannelFormat::OnlyRight => slot.slot_mode_mask(StdSlotMask::Right),
        ChannelFormat::AllRight | ChannelFormat::RightLeft => slot.slot_mode_mask(StdSlotMask::Both),
    };

    StdConfig::new(
        channel,
        StdClkConfig::from_sample_rate_hz(config.sample_rate),
        slot,
        StdGpioConfig::default(),
    )
}

impl PeripheralDriver for EspI2sDriver {
    type Channel = EspI2sChannel;

    fn install(self, config: &AudioConfig) -> Result<EspI2sChannel, PeripheralInitError> {
        let pins = config.pins;
        // SAFETY: pin numbers were validated as output-capable GPIOs and the
        // I2S lines are not driven by any other peripheral on this board.
        let (bck, ws, dout) = unsafe {
            (
                AnyIOPin::new(i32::from(pins.bck)),
                AnyIOPin::new(i32::from(pins.ws)),
                AnyIOPin::new(i32::from(pins.data_out)),
            )
        };

        let mut driver = I2sDriver::new_std_tx(
            self.i2s,
            &std_config(config),
            bck,
            dout,
            Option::<AnyIOPin>::None,
            ws,
        )
        .map_err(init_error)?;
        driver.tx_enable().map_err(init_error)?;

        Ok(EspI2sChannel { driver })
    }
}

/// Running I2S transmitter.
pub struct EspI2sChannel {
    driver: I2sDriver<'static, I2sTx>,
}

impl OutputChannel for EspI2sChannel {
    fn write(&mut self, bytes: &[u8], timeout_ms: u32) -> Result<usize, ChannelError> {
        let ticks = TickType::new_millis(u64::from(timeout_ms)).into();
        self.driver.write(bytes, ticks).map_err(|e| match e.code() {
            ERR_TIMEOUT => ChannelError::Timeout,
            code => ChannelError::Driver(code),
        })
    }
}
