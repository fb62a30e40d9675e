//! Playback fault latch.
//!
//! A tone that cannot finish must not hang the device. When the emitter
//! gives up on an event it records which event failed, why, and how far it
//! got. A status task (or the access-control loop) drains the latch without
//! touching the emitter.
//!
//! ```text
//! tag word:  [15..8] event index + 1 (0 = none)   [7..0] FaultCode
//! ```

use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

use crate::audio::{ToneError, ToneEvent};

/// Why the last recorded playback stopped early.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    /// Nothing recorded since the last drain.
    None = 0,

    /// Output channel did not accept a block within the write timeout.
    WriteTimeout = 1,

    /// Playback was preempted through the cancel token.
    Cancelled = 2,

    /// Output driver reported an error other than a timeout.
    ChannelFault = 3,

    /// Tone requested while no output channel exists.
    NotInitialized = 4,
}

impl FaultCode {
    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Self::WriteTimeout,
            2 => Self::Cancelled,
            3 => Self::ChannelFault,
            4 => Self::NotInitialized,
            _ => Self::None,
        }
    }
}

fn pack(code: FaultCode, event: ToneEvent) -> u16 {
    ((event.index() as u16 + 1) << 8) | code as u16
}

/// What [`FaultState::take`] hands to the status task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaultSnapshot {
    pub code: FaultCode,
    pub event: ToneEvent,
    /// Blocks the channel accepted before the event was abandoned
    pub blocks_written: u32,
    /// Faults recorded since boot, this one included
    pub count: u32,
}

/// Lock-free record of the most recent playback fault.
///
/// Code and event share one atomic word so a reader never pairs the code
/// of one fault with the event of another.
///
/// ```ignore
/// static PLAYBACK_FAULT: FaultState = FaultState::new();
///
/// // status task
/// if let Some(fault) = PLAYBACK_FAULT.take() {
///     warn!("{} stopped: {:?}", fault.event.name(), fault.code);
/// }
/// ```
pub struct FaultState {
    tag: AtomicU16,
    blocks_written: AtomicU32,
    /// Never cleared
    count: AtomicU32,
}

impl FaultState {
    pub const fn new() -> Self {
        Self {
            tag: AtomicU16::new(0),
            blocks_written: AtomicU32::new(0),
            count: AtomicU32::new(0),
        }
    }

    /// Latch `error` as the outcome of `event`, replacing any earlier fault.
    pub fn record(&self, event: ToneEvent, error: &ToneError) {
        self.blocks_written.store(error.blocks_written(), Ordering::Relaxed);
        self.tag.store(pack(error.fault_code(), event), Ordering::Release);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.code() != FaultCode::None
    }

    /// Reason of the latched fault, `None` when nothing is latched.
    pub fn code(&self) -> FaultCode {
        FaultCode::from_bits(self.tag.load(Ordering::Acquire) as u8)
    }

    /// Event the latched fault belongs to.
    pub fn event(&self) -> Option<ToneEvent> {
        let index = (self.tag.load(Ordering::Acquire) >> 8) as usize;
        index.checked_sub(1).and_then(ToneEvent::from_index)
    }

    /// Progress of the latched event when it stopped.
    pub fn blocks_written(&self) -> u32 {
        self.blocks_written.load(Ordering::Acquire)
    }

    /// Faults recorded since boot.
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Drain the latch. The boot counter is kept.
    pub fn take(&self) -> Option<FaultSnapshot> {
        let tag = self.tag.swap(0, Ordering::AcqRel);
        let code = FaultCode::from_bits(tag as u8);
        let event = ((tag >> 8) as usize)
            .checked_sub(1)
            .and_then(ToneEvent::from_index)?;
        if code == FaultCode::None {
            return None;
        }
        Some(FaultSnapshot {
            code,
            event,
            blocks_written: self.blocks_written(),
            count: self.count(),
        })
    }
}

impl Default for FaultState {
    fn default() -> Self {
        Self::new()
    }
}
