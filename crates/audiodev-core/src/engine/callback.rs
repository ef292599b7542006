//! Hardware-callback side of the engine.
//!
//! Runs on the platform's real-time thread: one locked fixed-size copy, one
//! semaphore post, nothing else. Never calls the application, never blocks
//! beyond the copy, never allocates.

use super::stats::EngineStats;
use super::EngineDirection;
use crate::config::UnderflowPolicy;
use crate::error::RingBufferError;
use crate::platform::{AudioData, DataCallback, DataCallbackResult};
use crate::sync::SyncHandle;
use std::sync::Arc;

pub(crate) struct HardwareCallback {
    direction: EngineDirection,
    sync: Arc<SyncHandle>,
    channels: usize,
    underflow_policy: UnderflowPolicy,
    stats: Arc<EngineStats>,
    /// Previous period also failed; counters keep the totals
    in_xrun: bool,
}

impl HardwareCallback {
    pub(crate) fn new(
        direction: EngineDirection,
        sync: Arc<SyncHandle>,
        channels: usize,
        underflow_policy: UnderflowPolicy,
        stats: Arc<EngineStats>,
    ) -> Self {
        Self {
            direction,
            sync,
            channels,
            underflow_policy,
            stats,
            in_xrun: false,
        }
    }

    /// Warn on the first failing period of a run only.
    fn report_xrun(&mut self, failed: Option<(RingBufferError, &'static str)>) {
        match failed {
            Some((e, action)) if self.in_xrun => {
                tracing::trace!(direction = %self.direction, "{e}, {action}");
            }
            Some((e, action)) => {
                tracing::warn!(direction = %self.direction, "{e}, {action}");
                self.in_xrun = true;
            }
            None => self.in_xrun = false,
        }
    }
}

impl DataCallback for HardwareCallback {
    fn on_data(&mut self, data: AudioData<'_>, num_frames: usize) -> DataCallbackResult {
        let count = num_frames * self.channels;

        let failed = match data {
            AudioData::Input(samples) => {
                let samples = &samples[..count.min(samples.len())];
                let result = self.sync.lock_buffer().write(samples);
                result.err().map(|e| {
                    self.stats.record_overflow();
                    (e, "dropping hardware period")
                })
            }
            AudioData::Output(out) => {
                let n = count.min(out.len());
                let result = self.sync.lock_buffer().read(&mut out[..n]);
                result.err().map(|e| {
                    self.stats.record_underflow();
                    if self.underflow_policy == UnderflowPolicy::Silence {
                        out[..n].fill(0);
                    }
                    (e, "hardware period not filled")
                })
            }
        };
        self.report_xrun(failed);

        self.stats.record_callback();
        self.sync.notify();

        DataCallbackResult::Continue
    }
}
