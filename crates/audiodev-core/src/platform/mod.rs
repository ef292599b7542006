//! Platform audio seam.
//!
//! A platform opens hardware streams from a [`StreamRequest`] and drives the
//! attached [`DataCallback`] from its own real-time thread:
//! - [`sim::SimPlatform`]: manually pumped streams for tests and offline runs
//! - [`CpalPlatform`]: hardware I/O through CPAL (feature `cpal`)

use crate::error::PlatformError;

#[cfg(feature = "cpal")]
mod cpal_backend;
pub mod sim;

#[cfg(feature = "cpal")]
pub use cpal_backend::CpalPlatform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformDirection {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SharingMode {
    #[default]
    Exclusive,
    Shared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFormat {
    #[default]
    I16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PerformanceMode {
    #[default]
    None,
    LowLatency,
    PowerSaving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleRateConversionQuality {
    #[default]
    None,
    Fastest,
    Low,
    Medium,
    High,
    Best,
}

/// Everything a platform needs to open one hardware stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub direction: PlatformDirection,
    /// 0 selects the platform default device
    pub device_id: u32,
    pub sample_rate: u32,
    pub channel_count: u16,
    pub sharing_mode: SharingMode,
    pub format: SampleFormat,
    pub frames_per_callback: u32,
    pub performance_mode: PerformanceMode,
    pub sample_rate_conversion_quality: SampleRateConversionQuality,
}

impl StreamRequest {
    pub fn new(direction: PlatformDirection) -> Self {
        Self {
            direction,
            device_id: 0,
            sample_rate: 0,
            channel_count: 1,
            sharing_mode: SharingMode::default(),
            format: SampleFormat::default(),
            frames_per_callback: 0,
            performance_mode: PerformanceMode::default(),
            sample_rate_conversion_quality: SampleRateConversionQuality::default(),
        }
    }

    pub fn device_id(mut self, id: u32) -> Self {
        self.device_id = id;
        self
    }

    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }

    pub fn channel_count(mut self, channels: u16) -> Self {
        self.channel_count = channels;
        self
    }

    pub fn sharing_mode(mut self, mode: SharingMode) -> Self {
        self.sharing_mode = mode;
        self
    }

    pub fn format(mut self, format: SampleFormat) -> Self {
        self.format = format;
        self
    }

    pub fn frames_per_callback(mut self, frames: u32) -> Self {
        self.frames_per_callback = frames;
        self
    }

    pub fn performance_mode(mut self, mode: PerformanceMode) -> Self {
        self.performance_mode = mode;
        self
    }

    pub fn sample_rate_conversion_quality(mut self, quality: SampleRateConversionQuality) -> Self {
        self.sample_rate_conversion_quality = quality;
        self
    }

    /// Interleaved samples in one hardware period.
    pub fn samples_per_callback(&self) -> usize {
        self.frames_per_callback as usize * self.channel_count as usize
    }
}

/// Device buffer handed to the data callback for one hardware period.
#[derive(Debug)]
pub enum AudioData<'a> {
    /// Captured samples, read-only
    Input(&'a [i16]),
    /// Samples to be played, to be filled by the callback
    Output(&'a mut [i16]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataCallbackResult {
    Continue,
    Stop,
}

/// Hardware data handler attached to a platform stream at open time.
///
/// Runs on the platform's real-time thread and must return quickly.
pub trait DataCallback: Send {
    fn on_data(&mut self, data: AudioData<'_>, num_frames: usize) -> DataCallbackResult;
}

/// Platform audio library: opens hardware streams.
pub trait AudioPlatform: Send + Sync {
    /// Human-readable name of this platform (e.g. "cpal", "sim").
    fn name(&self) -> &str;

    fn open_stream(
        &self,
        request: &StreamRequest,
        callback: Box<dyn DataCallback>,
    ) -> Result<Box<dyn PlatformStream>, PlatformError>;
}

/// An open hardware stream.
pub trait PlatformStream: Send {
    fn request_start(&mut self) -> Result<(), PlatformError>;

    /// Stop and release the stream. Once this returns the data callback
    /// never runs again.
    fn close(&mut self) -> Result<(), PlatformError>;
}
