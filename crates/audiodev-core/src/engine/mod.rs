//! Per-direction stream engine.
//!
//! One engine owns one platform stream, one ring buffer, one semaphore and
//! one worker thread. The platform's hardware callback and the worker never
//! share anything but the [`SyncHandle`]:
//!
//! ```text
//! capture:  hardware ──write──▶ ring buffer ──read──▶ worker ──▶ record callback
//! playback: hardware ◀──read─── ring buffer ◀──write── worker ◀── playback callback
//! ```
//!
//! Every hardware period posts the semaphore once; the worker wakes once per
//! post and exchanges exactly one application frame.

mod callback;
mod stats;
mod worker;

pub use stats::{EngineStats, EngineStatsSnapshot};

use crate::config::EngineConfig;
use crate::frame::{PlaybackCallback, RecordCallback};
use crate::params::StreamParams;
use crate::platform::{
    AudioPlatform, PerformanceMode, PlatformDirection, PlatformStream, SampleFormat,
    SampleRateConversionQuality, SharingMode, StreamRequest,
};
use crate::ring_buffer::RingBuffer;
use crate::sync::SyncHandle;
use crate::{Error, Result};
use callback::HardwareCallback;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use worker::{AppCallback, WorkerContext};

/// Direction of a single engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineDirection {
    Capture,
    Playback,
}

impl EngineDirection {
    pub fn platform(self) -> PlatformDirection {
        match self {
            EngineDirection::Capture => PlatformDirection::Input,
            EngineDirection::Playback => PlatformDirection::Output,
        }
    }
}

impl fmt::Display for EngineDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineDirection::Capture => f.write_str("capture"),
            EngineDirection::Playback => f.write_str("playback"),
        }
    }
}

/// Engine lifecycle.
///
/// `Idle → Opening → Running → Stopping → Idle`, and `Closed` once the
/// engine is closed or dropped. `Opening` and `Stopping` are only observable
/// from inside `start`/`stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Opening,
    Running,
    Stopping,
    Closed,
}

/// Runs one direction of an audio stream.
pub struct StreamEngine {
    direction: EngineDirection,
    params: StreamParams,
    config: EngineConfig,
    platform: Arc<dyn AudioPlatform>,
    app: AppCallback,
    state: EngineState,

    stream: Option<Box<dyn PlatformStream>>,
    sync: Option<Arc<SyncHandle>>,
    worker: Option<JoinHandle<()>>,

    timestamp: Arc<AtomicU64>,
    stats: Arc<EngineStats>,
}

impl StreamEngine {
    /// Create a capture engine delivering frames to `callback`.
    pub fn capture(
        params: StreamParams,
        config: EngineConfig,
        platform: Arc<dyn AudioPlatform>,
        callback: RecordCallback,
    ) -> Result<Self> {
        let app = AppCallback::Record(Arc::new(Mutex::new(callback)));
        Self::new(EngineDirection::Capture, params, config, platform, app)
    }

    /// Create a playback engine pulling frames from `callback`.
    pub fn playback(
        params: StreamParams,
        config: EngineConfig,
        platform: Arc<dyn AudioPlatform>,
        callback: PlaybackCallback,
    ) -> Result<Self> {
        let app = AppCallback::Playback(Arc::new(Mutex::new(callback)));
        Self::new(EngineDirection::Playback, params, config, platform, app)
    }

    fn new(
        direction: EngineDirection,
        params: StreamParams,
        config: EngineConfig,
        platform: Arc<dyn AudioPlatform>,
        app: AppCallback,
    ) -> Result<Self> {
        params.validate()?;
        config.validate()?;

        Ok(Self {
            direction,
            params,
            config,
            platform,
            app,
            state: EngineState::Idle,
            stream: None,
            sync: None,
            worker: None,
            timestamp: Arc::new(AtomicU64::new(0)),
            stats: Arc::new(EngineStats::new()),
        })
    }

    /// Open the platform stream and start transferring frames.
    ///
    /// A no-op if already running. On failure everything acquired so far is
    /// released and the engine is back to `Idle`.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            EngineState::Idle => {}
            EngineState::Closed => {
                return Err(Error::InvalidArgument(format!(
                    "{} engine is closed",
                    self.direction
                )));
            }
            _ => return Ok(()),
        }

        tracing::info!(
            direction = %self.direction,
            device_id = self.device_id(),
            clock_rate = self.params.clock_rate,
            channels = self.params.channel_count,
            samples_per_frame = self.params.samples_per_frame,
            frame_ms = self.params.frame_duration_ms(),
            "Starting {} engine",
            self.direction
        );

        self.state = EngineState::Opening;
        if let Err(e) = self.open() {
            tracing::warn!(direction = %self.direction, "Failed to start engine: {e}");
            self.release();
            self.state = EngineState::Idle;
            return Err(e);
        }
        self.state = EngineState::Running;

        tracing::info!(direction = %self.direction, "{} engine started", self.direction);
        Ok(())
    }

    fn open(&mut self) -> Result<()> {
        let samples_per_frame = self.params.samples_per_frame as usize;
        let buffer = RingBuffer::new(self.config.buffer_samples(samples_per_frame)?)?;
        let sync = Arc::new(SyncHandle::new(buffer));
        self.sync = Some(Arc::clone(&sync));

        self.worker = Some(worker::spawn(WorkerContext {
            direction: self.direction,
            sync: Arc::clone(&sync),
            app: self.app.clone(),
            samples_per_frame,
            ts_step: u64::from(self.params.frames_per_period()),
            timestamp: Arc::clone(&self.timestamp),
            stats: Arc::clone(&self.stats),
            priority: self.config.worker_priority,
        })?);

        let request = self.stream_request();
        let callback = HardwareCallback::new(
            self.direction,
            sync,
            self.params.channel_count as usize,
            self.config.underflow_policy,
            Arc::clone(&self.stats),
        );

        let stream = self.platform.open_stream(&request, Box::new(callback))?;
        let stream = self.stream.insert(stream);
        stream.request_start()?;
        Ok(())
    }

    fn device_id(&self) -> u32 {
        match self.direction {
            EngineDirection::Capture => self.params.rec_id,
            EngineDirection::Playback => self.params.play_id,
        }
    }

    /// Hardware stream request for this engine.
    pub fn stream_request(&self) -> StreamRequest {
        let request = StreamRequest::new(self.direction.platform())
            .device_id(self.device_id())
            .sample_rate(self.params.clock_rate)
            .channel_count(self.params.channel_count)
            .sharing_mode(SharingMode::Exclusive)
            .format(SampleFormat::I16)
            .frames_per_callback(self.params.frames_per_period())
            .sample_rate_conversion_quality(SampleRateConversionQuality::High);

        // Low-latency mode breaks capture on some devices
        match self.direction {
            EngineDirection::Playback => request.performance_mode(PerformanceMode::LowLatency),
            EngineDirection::Capture => request,
        }
    }

    /// Stop transferring frames and release the platform stream.
    ///
    /// A no-op unless running. The engine can be started again afterwards.
    pub fn stop(&mut self) {
        match self.state {
            EngineState::Idle | EngineState::Closed => return,
            _ => {}
        }

        tracing::info!(direction = %self.direction, "Stopping {} engine", self.direction);
        self.state = EngineState::Stopping;
        self.release();
        self.state = EngineState::Idle;
        tracing::info!(direction = %self.direction, "{} engine stopped", self.direction);
    }

    /// Stop and retire the engine. Further starts are rejected.
    pub fn close(&mut self) {
        self.stop();
        self.state = EngineState::Closed;
    }

    /// Tear down in the order that keeps both threads safe: no hardware
    /// callback may run once the worker is gone, and the sync handle outlives
    /// both.
    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.close() {
                tracing::warn!(direction = %self.direction, "Failed to close platform stream: {e}");
            }
        }

        if let Some(worker) = self.worker.take() {
            if let Some(sync) = &self.sync {
                sync.request_quit();
            }
            if worker.join().is_err() {
                tracing::error!(direction = %self.direction, "Worker thread panicked");
            }
        }

        self.sync = None;
    }

    pub fn direction(&self) -> EngineDirection {
        self.direction
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn params(&self) -> &StreamParams {
        &self.params
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// Whether the worker thread is still exchanging frames. Goes false when
    /// the application callback stops the stream, even though the engine
    /// stays `Running` until stopped.
    pub fn is_worker_active(&self) -> bool {
        self.sync.as_ref().is_some_and(|s| s.is_worker_active())
    }

    /// Timestamp of the next application frame, in samples per channel.
    /// Monotonic across restarts.
    pub fn timestamp(&self) -> u64 {
        self.timestamp.load(Ordering::Acquire)
    }

    /// Samples currently held in the ring buffer, if running.
    pub fn buffered_samples(&self) -> Option<usize> {
        self.sync.as_ref().map(|s| s.lock_buffer().available())
    }

    pub fn stats(&self) -> EngineStatsSnapshot {
        self.stats.snapshot()
    }
}

impl Drop for StreamEngine {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for StreamEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamEngine")
            .field("direction", &self.direction)
            .field("state", &self.state)
            .field("platform", &self.platform.name())
            .field("timestamp", &self.timestamp())
            .finish_non_exhaustive()
    }
}
