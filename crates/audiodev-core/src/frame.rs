//! Application-level audio frames and the callbacks that exchange them.

use std::ops::ControlFlow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameType {
    #[default]
    Audio,
}

/// One application frame of interleaved 16-bit samples.
#[derive(Debug)]
pub struct AudioFrame<'a> {
    pub frame_type: FrameType,
    /// Position of the first sample, in samples per channel
    pub timestamp: u64,
    pub bit_info: u32,
    pub samples: &'a mut [i16],
}

impl<'a> AudioFrame<'a> {
    pub fn new(samples: &'a mut [i16], timestamp: u64) -> Self {
        Self {
            frame_type: FrameType::Audio,
            timestamp,
            bit_info: 0,
            samples,
        }
    }

    /// Payload size in bytes.
    pub fn size(&self) -> usize {
        std::mem::size_of_val(self.samples)
    }
}

/// Receives captured frames on the worker thread. `Break` stops the stream.
pub type RecordCallback = Box<dyn FnMut(&AudioFrame<'_>) -> ControlFlow<()> + Send>;

/// Fills frames for playback on the worker thread. `Break` stops the stream.
pub type PlaybackCallback = Box<dyn FnMut(&mut AudioFrame<'_>) -> ControlFlow<()> + Send>;

/// Application callbacks for a stream; each active direction needs its own.
#[derive(Default)]
pub struct StreamCallbacks {
    pub record: Option<RecordCallback>,
    pub playback: Option<PlaybackCallback>,
}

impl StreamCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_record<F>(mut self, f: F) -> Self
    where
        F: FnMut(&AudioFrame<'_>) -> ControlFlow<()> + Send + 'static,
    {
        self.record = Some(Box::new(f));
        self
    }

    pub fn on_playback<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut AudioFrame<'_>) -> ControlFlow<()> + Send + 'static,
    {
        self.playback = Some(Box::new(f));
        self
    }
}
