//! Driver factory: exposes one device backed by the platform's default
//! input and output, and creates streams on it.

use crate::{Error, Result};
use audiodev_core::{
    AudioPlatform, AudioStream, Capability, Direction, EngineConfig, StreamCallbacks,
    StreamParams,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Output routes a device can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioRoute {
    Default,
    Loudspeaker,
    Earpiece,
    Bluetooth,
    /// Routing decided by the platform
    Custom,
}

/// Static description of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    pub default_sample_rate: u32,
    pub input_count: u16,
    pub output_count: u16,
    pub caps: Vec<Capability>,
    pub routes: Vec<AudioRoute>,
}

/// Creates [`AudioStream`]s on a platform.
///
/// Build with [`DeviceFactory::builder`], which also initializes the factory.
pub struct DeviceFactory {
    platform: Arc<dyn AudioPlatform>,
    config: EngineConfig,
    initialized: bool,
}

impl DeviceFactory {
    pub fn builder() -> crate::DeviceFactoryBuilder {
        crate::DeviceFactoryBuilder::default()
    }

    /// Create an uninitialized factory. Call [`DeviceFactory::init`] before
    /// creating streams.
    pub fn new(platform: Arc<dyn AudioPlatform>, config: EngineConfig) -> Self {
        Self {
            platform,
            config,
            initialized: false,
        }
    }

    pub fn init(&mut self) -> Result<()> {
        self.config.validate()?;
        self.initialized = true;
        tracing::info!(platform = self.platform.name(), "Device factory initialized");
        Ok(())
    }

    /// Device list is fixed; nothing to rescan.
    pub fn refresh(&mut self) -> Result<()> {
        Ok(())
    }

    pub fn destroy(&mut self) -> Result<()> {
        if self.initialized {
            self.initialized = false;
            tracing::info!(platform = self.platform.name(), "Device factory shut down");
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn platform(&self) -> &Arc<dyn AudioPlatform> {
        &self.platform
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn device_count(&self) -> usize {
        1
    }

    pub fn device_info(&self, index: usize) -> Result<DeviceInfo> {
        self.check_index(index)?;
        Ok(DeviceInfo {
            name: self.platform.name().to_string(),
            default_sample_rate: 8000,
            input_count: 1,
            output_count: 1,
            caps: vec![Capability::OutputVolumeSetting, Capability::InputSource],
            routes: vec![AudioRoute::Custom],
        })
    }

    /// Default parameters for a duplex stream on device `index`.
    pub fn default_params(&self, index: usize) -> Result<StreamParams> {
        self.check_index(index)?;
        let id = index as u32;
        Ok(StreamParams {
            direction: Direction::CapturePlayback,
            rec_id: id,
            play_id: id,
            clock_rate: 8000,
            channel_count: 1,
            samples_per_frame: 160,
            bits_per_sample: 16,
            input_latency_ms: 100,
            output_latency_ms: 140,
            output_volume: None,
        })
    }

    /// Create a stream. The stream is returned stopped.
    pub fn create_stream(
        &self,
        params: StreamParams,
        callbacks: StreamCallbacks,
    ) -> Result<AudioStream> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        let stream = AudioStream::new(Arc::clone(&self.platform), params, self.config, callbacks)?;
        Ok(stream)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.device_count() {
            return Err(Error::InvalidDevice(index));
        }
        Ok(())
    }
}

impl Drop for DeviceFactory {
    fn drop(&mut self) {
        let _ = self.destroy();
    }
}
