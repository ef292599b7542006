//! Fixed-capacity FIFO of interleaved 16-bit PCM samples.
//!
//! Not self-synchronizing: callers hold the engine's exclusive lock around
//! every access. Transfers are all-or-nothing, so a rejected write or read
//! leaves the buffer exactly as it was.

use crate::error::RingBufferError;
use crate::{Error, Result};
use ringbuf::{
    traits::{Consumer, Observer, Producer},
    HeapRb,
};

pub struct RingBuffer {
    rb: HeapRb<i16>,
}

impl RingBuffer {
    /// Allocate a buffer holding `capacity` samples.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidArgument(
                "ring buffer capacity must be non-zero".into(),
            ));
        }
        let rb = HeapRb::try_new(capacity).map_err(|e| {
            Error::OutOfMemory(format!("ring buffer of {capacity} samples: {e}"))
        })?;
        Ok(Self { rb })
    }

    pub fn capacity(&self) -> usize {
        self.rb.capacity().get()
    }

    /// Samples available for reading.
    pub fn available(&self) -> usize {
        self.rb.occupied_len()
    }

    /// Free space in samples.
    pub fn vacant(&self) -> usize {
        self.rb.vacant_len()
    }

    pub fn is_empty(&self) -> bool {
        self.rb.is_empty()
    }

    /// Append all of `samples`, or nothing if they do not fit.
    pub fn write(&mut self, samples: &[i16]) -> std::result::Result<(), RingBufferError> {
        let vacant = self.rb.vacant_len();
        if samples.len() > vacant {
            return Err(RingBufferError::Overflow {
                requested: samples.len(),
                vacant,
            });
        }
        let written = self.rb.push_slice(samples);
        debug_assert_eq!(written, samples.len());
        Ok(())
    }

    /// Fill all of `out` with the oldest samples, or take nothing if too few are buffered.
    pub fn read(&mut self, out: &mut [i16]) -> std::result::Result<(), RingBufferError> {
        let available = self.rb.occupied_len();
        if out.len() > available {
            return Err(RingBufferError::Underflow {
                requested: out.len(),
                available,
            });
        }
        let read = self.rb.pop_slice(out);
        debug_assert_eq!(read, out.len());
        Ok(())
    }
}
