//! Stream parameters negotiated between the host and the driver.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Device id meaning "let the platform pick its default device".
pub const DEFAULT_DEVICE_ID: u32 = 0;

/// Stream direction requested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    Capture,
    Playback,
    #[default]
    CapturePlayback,
}

impl Direction {
    pub fn has_capture(self) -> bool {
        matches!(self, Direction::Capture | Direction::CapturePlayback)
    }

    pub fn has_playback(self) -> bool {
        matches!(self, Direction::Playback | Direction::CapturePlayback)
    }
}

/// Device capabilities known to the host interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    OutputVolumeSetting,
    InputSource,
}

/// Value carried by a capability get/set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityValue {
    /// Output volume in percent.
    OutputVolume(u32),
    /// Platform input source identifier.
    InputSource(u32),
}

impl CapabilityValue {
    pub fn capability(&self) -> Capability {
        match self {
            CapabilityValue::OutputVolume(_) => Capability::OutputVolumeSetting,
            CapabilityValue::InputSource(_) => Capability::InputSource,
        }
    }
}

/// Parameters of one audio stream. Immutable once the stream is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamParams {
    pub direction: Direction,
    /// Capture device id (0 = platform default)
    pub rec_id: u32,
    /// Playback device id (0 = platform default)
    pub play_id: u32,
    /// Sample rate in Hz
    pub clock_rate: u32,
    pub channel_count: u16,
    /// Interleaved samples per application frame (all channels)
    pub samples_per_frame: u32,
    /// 8 or 16. Samples are always exchanged as 16-bit PCM.
    pub bits_per_sample: u16,
    pub input_latency_ms: u32,
    pub output_latency_ms: u32,
    /// Set by `get_param` only when the output volume can be queried.
    #[serde(default)]
    pub output_volume: Option<u32>,
}

impl Default for StreamParams {
    fn default() -> Self {
        Self {
            direction: Direction::CapturePlayback,
            rec_id: DEFAULT_DEVICE_ID,
            play_id: DEFAULT_DEVICE_ID,
            clock_rate: 8000,
            channel_count: 1,
            samples_per_frame: 160,
            bits_per_sample: 16,
            input_latency_ms: 100,
            output_latency_ms: 140,
            output_volume: None,
        }
    }
}

impl StreamParams {
    pub fn validate(&self) -> Result<()> {
        if !(1..=2).contains(&self.channel_count) {
            return Err(Error::InvalidArgument(format!(
                "channel_count {} out of range (1-2)",
                self.channel_count
            )));
        }
        if self.bits_per_sample != 8 && self.bits_per_sample != 16 {
            return Err(Error::InvalidArgument(format!(
                "bits_per_sample {} not supported (8 or 16)",
                self.bits_per_sample
            )));
        }
        if self.clock_rate == 0 {
            return Err(Error::InvalidArgument("clock_rate must be non-zero".into()));
        }
        if self.samples_per_frame == 0 || self.samples_per_frame % self.channel_count as u32 != 0 {
            return Err(Error::InvalidArgument(format!(
                "samples_per_frame {} must be a non-zero multiple of channel_count {}",
                self.samples_per_frame, self.channel_count
            )));
        }
        Ok(())
    }

    /// Samples per channel in one application frame (also the hardware period in frames).
    pub fn frames_per_period(&self) -> u32 {
        self.samples_per_frame / self.channel_count as u32
    }

    /// Duration of one application frame in milliseconds.
    pub fn frame_duration_ms(&self) -> u64 {
        u64::from(self.samples_per_frame) * 1000
            / (u64::from(self.clock_rate) * u64::from(self.channel_count))
    }
}
