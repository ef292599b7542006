//! Streaming engine for callback-driven audio devices.
//!
//! A platform audio library calls back on its own real-time thread; the
//! application is called back on a dedicated worker thread. The two meet
//! only at a bounded ring buffer paced by a counting semaphore.
//!
//! # Primary API
//!
//! - [`AudioStream`]: capture and/or playback stream over a platform
//! - [`StreamEngine`]: a single direction, usable on its own
//! - [`AudioPlatform`]: the platform seam ([`platform::sim::SimPlatform`],
//!   [`platform::CpalPlatform`])
//!
//! # Feature flags
//!
//! - `"cpal"`: hardware I/O through CPAL (enabled by default)
//!
//! # Example
//!
//! ```ignore
//! use audiodev_core::prelude::*;
//!
//! let callbacks = StreamCallbacks::new().on_record(|frame| {
//!     println!("{} samples at {}", frame.samples.len(), frame.timestamp);
//!     ControlFlow::Continue(())
//! });
//! let params = StreamParams { direction: Direction::Capture, ..Default::default() };
//! let mut stream = AudioStream::new(platform, params, EngineConfig::default(), callbacks)?;
//! stream.start()?;
//! ```

pub mod error;
pub use error::{Error, PlatformError, Result, RingBufferError, Status};

pub mod params;
pub use params::{Capability, CapabilityValue, Direction, StreamParams, DEFAULT_DEVICE_ID};

pub mod config;
pub use config::{EngineConfig, UnderflowPolicy, WorkerPriority};

pub mod frame;
pub use frame::{AudioFrame, FrameType, PlaybackCallback, RecordCallback, StreamCallbacks};

pub mod ring_buffer;
pub use ring_buffer::RingBuffer;

pub mod sync;
pub use sync::{Semaphore, SyncHandle};

pub mod platform;
pub use platform::{AudioPlatform, DataCallback, PlatformStream, StreamRequest};

pub mod engine;
pub use engine::{EngineDirection, EngineState, EngineStats, EngineStatsSnapshot, StreamEngine};

mod stream;
pub use stream::AudioStream;

pub mod prelude {
    pub use crate::{
        AudioFrame, AudioPlatform, AudioStream, Capability, CapabilityValue, Direction,
        EngineConfig, Error, Result, StreamCallbacks, StreamParams, UnderflowPolicy,
    };
    pub use std::ops::ControlFlow;
}
