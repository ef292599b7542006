//! Stream engine configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// What the hardware callback does with the device buffer when playback underflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnderflowPolicy {
    /// Zero-fill the device buffer for this period.
    #[default]
    Silence,
    /// Leave the device buffer untouched (stale data).
    Retain,
}

/// Scheduling priority requested by the worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorkerPriority {
    /// Best-effort maximum priority; failure is logged, not fatal.
    #[default]
    Max,
    /// Keep the priority of the spawning thread.
    Inherit,
}

/// Configuration shared by every engine of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ring buffer capacity in application frames (default: 3)
    pub buffer_frames: usize,
    /// Playback underflow handling (default: silence)
    pub underflow_policy: UnderflowPolicy,
    /// Worker thread priority (default: max)
    pub worker_priority: WorkerPriority,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_frames: 3,
            underflow_policy: UnderflowPolicy::Silence,
            worker_priority: WorkerPriority::Max,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.buffer_frames == 0 {
            return Err(Error::InvalidArgument(
                "buffer_frames must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Ring buffer capacity in samples for a given application frame size.
    pub fn buffer_samples(&self, samples_per_frame: usize) -> Result<usize> {
        self.buffer_frames
            .checked_mul(samples_per_frame)
            .ok_or_else(|| {
                Error::OutOfMemory(format!(
                    "{} frames of {} samples overflow usize",
                    self.buffer_frames, samples_per_frame
                ))
            })
    }
}
