//! Two-direction audio stream.

use crate::config::EngineConfig;
use crate::engine::{EngineStatsSnapshot, StreamEngine};
use crate::frame::StreamCallbacks;
use crate::params::{Capability, CapabilityValue, StreamParams};
use crate::platform::AudioPlatform;
use crate::{Error, Result};
use std::sync::Arc;

/// An audio stream with a capture engine, a playback engine, or both.
///
/// Starting brings up capture before playback; stopping tears down both
/// regardless of what failed. Dropping the stream stops it.
pub struct AudioStream {
    name: String,
    params: StreamParams,
    capture: Option<StreamEngine>,
    playback: Option<StreamEngine>,
    running: bool,
}

impl AudioStream {
    /// Create a stream. Engines are built for each direction `params`
    /// requests; each needs the matching callback in `callbacks`.
    pub fn new(
        platform: Arc<dyn AudioPlatform>,
        params: StreamParams,
        config: EngineConfig,
        callbacks: StreamCallbacks,
    ) -> Result<Self> {
        params.validate()?;
        config.validate()?;

        let name = format!("{} stream", platform.name());
        tracing::info!(
            stream = %name,
            direction = ?params.direction,
            clock_rate = params.clock_rate,
            channels = params.channel_count,
            "Creating stream"
        );

        let StreamCallbacks { record, playback } = callbacks;

        let capture = if params.direction.has_capture() {
            let callback = record.ok_or_else(|| {
                Error::InvalidArgument("capture stream requires a record callback".into())
            })?;
            Some(StreamEngine::capture(
                params.clone(),
                config,
                Arc::clone(&platform),
                callback,
            )?)
        } else {
            None
        };

        let playback = if params.direction.has_playback() {
            let callback = playback.ok_or_else(|| {
                Error::InvalidArgument("playback stream requires a playback callback".into())
            })?;
            Some(StreamEngine::playback(
                params.clone(),
                config,
                Arc::clone(&platform),
                callback,
            )?)
        } else {
            None
        };

        Ok(Self {
            name,
            params,
            capture,
            playback,
            running: false,
        })
    }

    /// Start every engine. On failure all engines are stopped again.
    pub fn start(&mut self) -> Result<()> {
        if self.running {
            return Ok(());
        }

        tracing::info!(stream = %self.name, "Starting stream");
        if let Err(e) = self.start_engines() {
            tracing::warn!(stream = %self.name, "Failed to start stream: {e}");
            self.stop_engines();
            return Err(e);
        }
        self.running = true;
        tracing::info!(stream = %self.name, "Stream started");
        Ok(())
    }

    fn start_engines(&mut self) -> Result<()> {
        if let Some(engine) = self.capture.as_mut() {
            engine.start()?;
        }
        if let Some(engine) = self.playback.as_mut() {
            engine.start()?;
        }
        Ok(())
    }

    fn stop_engines(&mut self) {
        if let Some(engine) = self.capture.as_mut() {
            engine.stop();
        }
        if let Some(engine) = self.playback.as_mut() {
            engine.stop();
        }
    }

    /// Stop every engine. A no-op if not running.
    pub fn stop(&mut self) -> Result<()> {
        if !self.running {
            return Ok(());
        }

        tracing::info!(stream = %self.name, "Stopping stream");
        self.stop_engines();
        self.running = false;
        tracing::info!(stream = %self.name, "Stream stopped");
        Ok(())
    }

    /// Stop and release the stream.
    pub fn destroy(mut self) -> Result<()> {
        tracing::info!(stream = %self.name, "Destroying stream");
        self.stop()
    }

    /// Current stream parameters, with the output volume filled in when the
    /// platform can report it.
    pub fn params(&self) -> StreamParams {
        let mut params = self.params.clone();
        if let Ok(CapabilityValue::OutputVolume(volume)) =
            self.get_capability(Capability::OutputVolumeSetting)
        {
            params.output_volume = Some(volume);
        }
        params
    }

    /// Query a stream capability. None are supported.
    pub fn get_capability(&self, capability: Capability) -> Result<CapabilityValue> {
        tracing::debug!(stream = %self.name, ?capability, "Capability query not supported");
        Err(Error::InvalidCapability(capability))
    }

    /// Change a stream capability. None are supported.
    pub fn set_capability(&mut self, value: CapabilityValue) -> Result<()> {
        let capability = value.capability();
        tracing::debug!(stream = %self.name, ?capability, "Capability change not supported");
        Err(Error::InvalidCapability(capability))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn capture_engine(&self) -> Option<&StreamEngine> {
        self.capture.as_ref()
    }

    pub fn playback_engine(&self) -> Option<&StreamEngine> {
        self.playback.as_ref()
    }

    /// Combined counters of every engine.
    pub fn stats(&self) -> EngineStatsSnapshot {
        self.capture
            .iter()
            .chain(self.playback.iter())
            .map(StreamEngine::stats)
            .fold(EngineStatsSnapshot::default(), |acc, s| acc + s)
    }
}

impl Drop for AudioStream {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

impl std::fmt::Debug for AudioStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioStream")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}
