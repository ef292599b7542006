//! Simulated platform with manually pumped hardware periods.
//!
//! Each opened stream is recorded as a [`SimStreamHandle`]. Calling
//! [`SimStreamHandle::pump_input`] or [`SimStreamHandle::pump_output`] runs
//! the attached data callback on the calling thread, exactly as a hardware
//! thread would. The callback runs under the stream's own lock, so `close`
//! waits for an in-flight period and nothing fires afterwards.

use super::{
    AudioData, AudioPlatform, DataCallback, DataCallbackResult, PlatformDirection,
    PlatformStream, StreamRequest,
};
use crate::error::PlatformError;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct Failures {
    open: Vec<PlatformDirection>,
    start: Vec<PlatformDirection>,
}

/// Platform whose hardware periods are driven by the caller.
#[derive(Clone, Default)]
pub struct SimPlatform {
    streams: Arc<Mutex<Vec<SimStreamHandle>>>,
    failures: Arc<Mutex<Failures>>,
}

impl SimPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next open in `direction` fail.
    pub fn fail_next_open(&self, direction: PlatformDirection) {
        self.failures.lock().open.push(direction);
    }

    /// Make the next start in `direction` fail.
    pub fn fail_next_start(&self, direction: PlatformDirection) {
        self.failures.lock().start.push(direction);
    }

    /// All streams opened so far, oldest first.
    pub fn streams(&self) -> Vec<SimStreamHandle> {
        self.streams.lock().clone()
    }

    /// Most recently opened stream in `direction`.
    pub fn last_stream(&self, direction: PlatformDirection) -> Option<SimStreamHandle> {
        self.streams
            .lock()
            .iter()
            .rev()
            .find(|s| s.request().direction == direction)
            .cloned()
    }

    fn take_failure(list: &mut Vec<PlatformDirection>, direction: PlatformDirection) -> bool {
        match list.iter().position(|d| *d == direction) {
            Some(idx) => {
                list.remove(idx);
                true
            }
            None => false,
        }
    }
}

impl AudioPlatform for SimPlatform {
    fn name(&self) -> &str {
        "sim"
    }

    fn open_stream(
        &self,
        request: &StreamRequest,
        callback: Box<dyn DataCallback>,
    ) -> Result<Box<dyn PlatformStream>, PlatformError> {
        if Self::take_failure(&mut self.failures.lock().open, request.direction) {
            return Err(PlatformError::Open(format!(
                "simulated {:?} open failure",
                request.direction
            )));
        }

        let fail_start = Self::take_failure(&mut self.failures.lock().start, request.direction);
        let handle = SimStreamHandle {
            shared: Arc::new(SimShared {
                request: request.clone(),
                state: Mutex::new(SimState {
                    callback: Some(callback),
                    started: false,
                    closed: false,
                    periods: 0,
                }),
            }),
        };
        self.streams.lock().push(handle.clone());

        Ok(Box::new(SimStream { handle, fail_start }))
    }
}

struct SimState {
    callback: Option<Box<dyn DataCallback>>,
    started: bool,
    closed: bool,
    periods: u64,
}

struct SimShared {
    request: StreamRequest,
    state: Mutex<SimState>,
}

/// Test-side view of an opened simulated stream.
#[derive(Clone)]
pub struct SimStreamHandle {
    shared: Arc<SimShared>,
}

impl SimStreamHandle {
    pub fn request(&self) -> &StreamRequest {
        &self.shared.request
    }

    pub fn is_started(&self) -> bool {
        self.shared.state.lock().started
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Hardware periods delivered so far.
    pub fn periods(&self) -> u64 {
        self.shared.state.lock().periods
    }

    /// Deliver one captured period. Returns `None` when the stream is not
    /// running (not started, closed, or stopped by its callback).
    pub fn pump_input(&self, samples: &[i16]) -> Option<DataCallbackResult> {
        let frames = samples.len() / self.shared.request.channel_count.max(1) as usize;
        self.pump(AudioData::Input(samples), frames)
    }

    /// Request one period of playback into `out`. Returns `None` when the
    /// stream is not running.
    pub fn pump_output(&self, out: &mut [i16]) -> Option<DataCallbackResult> {
        let frames = out.len() / self.shared.request.channel_count.max(1) as usize;
        self.pump(AudioData::Output(out), frames)
    }

    fn pump(&self, data: AudioData<'_>, frames: usize) -> Option<DataCallbackResult> {
        let mut state = self.shared.state.lock();
        if !state.started || state.closed {
            return None;
        }
        let result = state.callback.as_mut()?.on_data(data, frames);
        state.periods += 1;
        if result == DataCallbackResult::Stop {
            state.started = false;
        }
        Some(result)
    }
}

struct SimStream {
    handle: SimStreamHandle,
    fail_start: bool,
}

impl PlatformStream for SimStream {
    fn request_start(&mut self) -> Result<(), PlatformError> {
        if self.fail_start {
            return Err(PlatformError::Start(format!(
                "simulated {:?} start failure",
                self.handle.request().direction
            )));
        }
        let mut state = self.handle.shared.state.lock();
        if state.closed {
            return Err(PlatformError::Start("stream already closed".into()));
        }
        state.started = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), PlatformError> {
        let mut state = self.handle.shared.state.lock();
        state.started = false;
        state.closed = true;
        state.callback = None;
        Ok(())
    }
}

impl Drop for SimStream {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
