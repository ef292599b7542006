//! Synchronization between the hardware callback and the worker thread.

use crate::ring_buffer::RingBuffer;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};

/// Counting semaphore. Waits are unbounded; every wait is eventually
/// matched by a post from the hardware callback or the stop sequence.
pub struct Semaphore {
    count: Mutex<usize>,
    cond: Condvar,
}

impl Semaphore {
    pub fn new(initial: usize) -> Self {
        Self {
            count: Mutex::new(initial),
            cond: Condvar::new(),
        }
    }

    /// Increment the count and wake one waiter.
    #[inline]
    pub fn post(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_add(1);
        self.cond.notify_one();
    }

    /// Block until the count is positive, then decrement it.
    pub fn wait(&self) {
        let mut count = self.count.lock();
        while *count == 0 {
            self.cond.wait(&mut count);
        }
        *count -= 1;
    }

    #[cfg(test)]
    pub(crate) fn count(&self) -> usize {
        *self.count.lock()
    }
}

/// Everything the two threads of one engine share.
///
/// Created on start and released on stop. The ring buffer is only reachable
/// through [`SyncHandle::lock_buffer`], so every access holds the lock and
/// the guard releases it on every exit path.
pub struct SyncHandle {
    buffer: Mutex<RingBuffer>,
    semaphore: Semaphore,
    quit: AtomicBool,
    worker_active: AtomicBool,
}

impl SyncHandle {
    pub fn new(buffer: RingBuffer) -> Self {
        Self {
            buffer: Mutex::new(buffer),
            semaphore: Semaphore::new(0),
            quit: AtomicBool::new(false),
            worker_active: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn lock_buffer(&self) -> MutexGuard<'_, RingBuffer> {
        self.buffer.lock()
    }

    /// Signal one hardware period to the worker.
    #[inline]
    pub fn notify(&self) {
        self.semaphore.post();
    }

    /// Park until the next hardware period or a quit request.
    pub fn wait(&self) {
        self.semaphore.wait();
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.semaphore.count()
    }

    /// Ask the worker to exit and wake it if parked.
    pub fn request_quit(&self) {
        self.quit.store(true, Ordering::SeqCst);
        self.semaphore.post();
    }

    #[inline]
    pub fn should_quit(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }

    pub fn set_worker_active(&self, active: bool) {
        self.worker_active.store(active, Ordering::Release);
    }

    pub fn is_worker_active(&self) -> bool {
        self.worker_active.load(Ordering::Acquire)
    }
}
