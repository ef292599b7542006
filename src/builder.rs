//! Builder for configuring and constructing a `DeviceFactory`.

use crate::{DeviceFactory, Result};
use audiodev_core::{AudioPlatform, EngineConfig, UnderflowPolicy, WorkerPriority};
use std::sync::Arc;

/// The platform defaults to CPAL when the `cpal` feature is enabled; without
/// it a platform must be supplied.
///
/// # Example
///
/// ```ignore
/// use audiodev::prelude::*;
///
/// let factory = DeviceFactory::builder()
///     .buffer_frames(4)
///     .underflow_policy(UnderflowPolicy::Retain)
///     .build()?;
///
/// let params = factory.default_params(0)?;
/// let mut stream = factory.create_stream(params, callbacks)?;
/// stream.start()?;
/// ```
#[derive(Default)]
pub struct DeviceFactoryBuilder {
    platform: Option<Arc<dyn AudioPlatform>>,
    config: EngineConfig,
}

impl DeviceFactoryBuilder {
    pub fn platform(mut self, platform: Arc<dyn AudioPlatform>) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Replace the whole engine configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 3
    pub fn buffer_frames(mut self, frames: usize) -> Self {
        self.config.buffer_frames = frames;
        self
    }

    /// Default: [`UnderflowPolicy::Silence`]
    pub fn underflow_policy(mut self, policy: UnderflowPolicy) -> Self {
        self.config.underflow_policy = policy;
        self
    }

    /// Default: [`WorkerPriority::Max`]
    pub fn worker_priority(mut self, priority: WorkerPriority) -> Self {
        self.config.worker_priority = priority;
        self
    }

    /// Build and initialize the factory.
    pub fn build(self) -> Result<DeviceFactory> {
        let platform = match self.platform {
            Some(platform) => platform,
            None => default_platform()?,
        };

        let mut factory = DeviceFactory::new(platform, self.config);
        factory.init()?;
        Ok(factory)
    }
}

#[cfg(feature = "cpal")]
fn default_platform() -> Result<Arc<dyn AudioPlatform>> {
    Ok(Arc::new(audiodev_core::platform::CpalPlatform::new()))
}

#[cfg(not(feature = "cpal"))]
fn default_platform() -> Result<Arc<dyn AudioPlatform>> {
    Err(audiodev_core::Error::InvalidArgument(
        "no platform given and the cpal feature is disabled".into(),
    )
    .into())
}
