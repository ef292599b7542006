//! # audiodev - Callback-driven audio device driver
//!
//! Bridges a platform audio library's real-time data callback with an
//! application frame callback running on its own worker thread.
//!
//! ## Architecture
//!
//! `audiodev` is an umbrella crate over:
//! - **audiodev-core** - Ring buffer, sync handle, stream engine, stream
//!   facade and the platform seam (CPAL and simulated platforms)
//!
//! and adds the [`DeviceFactory`] that enumerates the device and creates
//! streams.
//!
//! ## Quick Start
//!
//! ```ignore
//! use audiodev::prelude::*;
//!
//! let factory = DeviceFactory::builder().build()?;
//! let params = factory.default_params(0)?;
//!
//! let callbacks = StreamCallbacks::new()
//!     .on_record(|frame| {
//!         // consume frame.samples
//!         ControlFlow::Continue(())
//!     })
//!     .on_playback(|frame| {
//!         frame.samples.fill(0);
//!         ControlFlow::Continue(())
//!     });
//!
//! let mut stream = factory.create_stream(params, callbacks)?;
//! stream.start()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - CPAL platform
//! - `cpal` - Hardware I/O through CPAL

/// Re-export of audiodev-core for direct access
pub use audiodev_core as core;

pub use audiodev_core::{
    platform, AudioFrame, AudioPlatform, AudioStream, Capability, CapabilityValue, Direction,
    EngineConfig, EngineDirection, EngineState, EngineStatsSnapshot, FrameType,
    PlaybackCallback, RecordCallback, Status, StreamCallbacks, StreamEngine, StreamParams,
    UnderflowPolicy, WorkerPriority,
};

#[cfg(feature = "cpal")]
pub use audiodev_core::platform::CpalPlatform;

mod error;
pub use error::{Error, Result};

mod builder;
pub use builder::DeviceFactoryBuilder;

mod factory;
pub use factory::{AudioRoute, DeviceFactory, DeviceInfo};

pub mod prelude {
    pub use crate::{
        AudioFrame, AudioRoute, AudioStream, Capability, CapabilityValue, DeviceFactory,
        DeviceInfo, Direction, EngineConfig, Error, Result, Status, StreamCallbacks,
        StreamParams, UnderflowPolicy, WorkerPriority,
    };
    pub use std::ops::ControlFlow;
}
