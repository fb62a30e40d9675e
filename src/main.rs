//! Doorbell chime - firmware entry point
//!
//! 1. Bind `log` to the ESP-IDF logger
//! 2. Initialize the I2S output from the fixed config
//! 3. Play the doorbell chime once as a power-on check
//! 4. Idle, reporting playback faults
//!
//! The keypad / access-control task that calls the tone entry points lives
//! outside this crate. On the host this binary prints the pattern table.

#[cfg(target_os = "espidf")]
use doorbell_chime::{CancelToken, FaultState};

// Shared with the access-control task (cancel) and status reporting (fault)
#[cfg(target_os = "espidf")]
static PLAYBACK_FAULT: FaultState = FaultState::new();
#[cfg(target_os = "espidf")]
static CANCEL: CancelToken = CancelToken::new();

#[cfg(target_os = "espidf")]
fn main() {
    use doorbell_chime::hal::EspI2sDriver;
    use doorbell_chime::{initialize, AudioConfig, ToneEmitter};
    use esp_idf_svc::hal::delay::FreeRtos;

    // Runtime patches from esp-idf-sys must be linked in
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("{} starting", env!("VERSION_STRING"));

    let config = AudioConfig::DEFAULT;
    let output = EspI2sDriver::take().and_then(|driver| initialize(driver, config));
    if let Err(e) = &output {
        log::error!("audio disabled [{}]: {}", e.code(), e);
    }

    let mut emitter = ToneEmitter::new(output, FreeRtos, &config, &PLAYBACK_FAULT, &CANCEL);

    match emitter.on_doorbell_ring() {
        Ok(report) => log::info!("self test: {} blocks", report.blocks_written),
        Err(e) => log::warn!("self test failed: {}", e),
    }

    loop {
        if let Some(fault) = PLAYBACK_FAULT.take() {
            log::warn!(
                "{}: {:?} after {} blocks ({} since boot)",
                fault.event.name(),
                fault.code,
                fault.blocks_written,
                fault.count
            );
        }
        FreeRtos::delay_ms(1000);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    use doorbell_chime::config::{AudioConfig, BLOCK_SAMPLES};
    use doorbell_chime::ToneEvent;

    let config = AudioConfig::DEFAULT;
    println!(
        "{} (host build, {} Hz, {}-sample blocks)",
        env!("VERSION_STRING"),
        config.sample_rate,
        BLOCK_SAMPLES
    );
    println!("{:<18} {:>7} {:>7} {:>9} {:>9}", "event", "blocks", "bursts", "audio ms", "total ms");

    for event in ToneEvent::ALL {
        let pattern = event.pattern();
        println!(
            "{:<18} {:>7} {:>7} {:>9} {:>9}",
            event.name(),
            pattern.total_blocks(),
            pattern.bursts,
            pattern.audible_duration_us(BLOCK_SAMPLES, config.sample_rate) / 1000,
            pattern.total_duration_ms(BLOCK_SAMPLES, config.sample_rate),
        );
    }
}
