//! Host-side fakes for the audio HAL

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use doorbell_chime::config::AudioConfig;
use doorbell_chime::hal::{ChannelError, OutputChannel, PeripheralDriver, PeripheralInitError};
use embedded_hal::delay::DelayNs;

/// What happened on the fake hardware, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trace {
    /// Bytes accepted by the channel
    Write(usize),
    /// Nanoseconds slept
    Delay(u64),
}

pub type Timeline = Rc<RefCell<Vec<Trace>>>;

pub fn timeline() -> Timeline {
    Rc::new(RefCell::new(Vec::new()))
}

/// Channel that accepts everything and keeps the decoded samples
pub struct RecordingChannel {
    pub samples: Vec<i16>,
    pub write_calls: usize,
    pub last_timeout_ms: Option<u32>,
    /// Accept at most this many bytes per call (partial writes)
    max_chunk: usize,
    /// Stop accepting once this many bytes went through
    stall_after: Option<usize>,
    /// Fail every call with this error
    fail_with: Option<ChannelError>,
    accepted: usize,
    timeline: Option<Timeline>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
            write_calls: 0,
            last_timeout_ms: None,
            max_chunk: usize::MAX,
            stall_after: None,
            fail_with: None,
            accepted: 0,
            timeline: None,
        }
    }

    pub fn with_timeline(timeline: &Timeline) -> Self {
        let mut channel = Self::new();
        channel.timeline = Some(Rc::clone(timeline));
        channel
    }

    pub fn chunked(mut self, max_chunk: usize) -> Self {
        self.max_chunk = max_chunk;
        self
    }

    pub fn stalling_after(mut self, bytes: usize) -> Self {
        self.stall_after = Some(bytes);
        self
    }

    pub fn failing(mut self, error: ChannelError) -> Self {
        self.fail_with = Some(error);
        self
    }

    pub fn blocks(&self, block_len: usize) -> usize {
        self.samples.len() / block_len
    }
}

impl OutputChannel for RecordingChannel {
    fn write(&mut self, bytes: &[u8], timeout_ms: u32) -> Result<usize, ChannelError> {
        self.write_calls += 1;
        self.last_timeout_ms = Some(timeout_ms);

        if let Some(error) = self.fail_with {
            return Err(error);
        }

        let mut n = bytes.len().min(self.max_chunk);
        if let Some(limit) = self.stall_after {
            let room = limit.saturating_sub(self.accepted);
            if room == 0 {
                return Err(ChannelError::Timeout);
            }
            n = n.min(room);
        }
        // Keep sample alignment simple for the decoder below
        n -= n % 2;

        for pair in bytes[..n].chunks_exact(2) {
            self.samples.push(i16::from_le_bytes([pair[0], pair[1]]));
        }
        self.accepted += n;

        if let Some(timeline) = &self.timeline {
            timeline.borrow_mut().push(Trace::Write(n));
        }
        Ok(n)
    }
}

/// Delay that only records how long it was asked to sleep
pub struct FakeDelay {
    pub total_ns: u64,
    timeline: Option<Timeline>,
}

impl FakeDelay {
    pub fn new() -> Self {
        Self {
            total_ns: 0,
            timeline: None,
        }
    }

    pub fn with_timeline(timeline: &Timeline) -> Self {
        Self {
            total_ns: 0,
            timeline: Some(Rc::clone(timeline)),
        }
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
        if let Some(timeline) = &self.timeline {
            let mut timeline = timeline.borrow_mut();
            // Merge consecutive slices into one pause
            if let Some(Trace::Delay(prev)) = timeline.last_mut() {
                *prev += ns as u64;
            } else {
                timeline.push(Trace::Delay(ns as u64));
            }
        }
    }
}

/// Driver stand-in: either hands out a channel or fails the install
pub struct FakeDriver {
    pub result: Result<(), PeripheralInitError>,
}

impl FakeDriver {
    pub fn ok() -> Self {
        Self { result: Ok(()) }
    }

    pub fn failing(error: PeripheralInitError) -> Self {
        Self { result: Err(error) }
    }
}

impl PeripheralDriver for FakeDriver {
    type Channel = RecordingChannel;

    fn install(self, _config: &AudioConfig) -> Result<RecordingChannel, PeripheralInitError> {
        self.result.map(|()| RecordingChannel::new())
    }
}
