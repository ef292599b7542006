//! Worker thread: moves application frames between the ring buffer and the
//! application callbacks, paced by the hardware callback's semaphore posts.

use super::stats::EngineStats;
use super::EngineDirection;
use crate::config::WorkerPriority;
use crate::frame::{AudioFrame, PlaybackCallback, RecordCallback};
use crate::sync::SyncHandle;
use crate::{Error, Result};
use parking_lot::Mutex;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thread_priority::ThreadPriority;

/// Application side of an engine. Survives stop/start cycles.
#[derive(Clone)]
pub(crate) enum AppCallback {
    Record(Arc<Mutex<RecordCallback>>),
    Playback(Arc<Mutex<PlaybackCallback>>),
}

pub(crate) struct WorkerContext {
    pub direction: EngineDirection,
    pub sync: Arc<SyncHandle>,
    pub app: AppCallback,
    pub samples_per_frame: usize,
    /// Timestamp advance per frame (samples per channel)
    pub ts_step: u64,
    pub timestamp: Arc<AtomicU64>,
    pub stats: Arc<EngineStats>,
    pub priority: WorkerPriority,
}

enum Step {
    /// Frame exchanged, advance the timestamp
    Advance,
    /// Nothing to deliver this period
    Skip,
    /// Application asked to stop
    Stop,
}

/// Spawn the worker. The worker is marked active before this returns.
pub(crate) fn spawn(ctx: WorkerContext) -> Result<JoinHandle<()>> {
    let sync = Arc::clone(&ctx.sync);
    sync.set_worker_active(true);

    let spawned = thread::Builder::new()
        .name(format!("audiodev-{}", ctx.direction))
        .spawn(move || run(ctx));

    spawned.map_err(|e| {
        sync.set_worker_active(false);
        Error::from(e)
    })
}

fn run(ctx: WorkerContext) {
    raise_priority(ctx.priority, ctx.direction);

    let mut scratch = vec![0i16; ctx.samples_per_frame];
    tracing::debug!(direction = %ctx.direction, "worker thread running");

    loop {
        ctx.sync.wait();
        if ctx.sync.should_quit() {
            break;
        }

        let timestamp = ctx.timestamp.load(Ordering::Acquire);
        let step = match &ctx.app {
            AppCallback::Record(callback) => capture(&ctx, callback, &mut scratch, timestamp),
            AppCallback::Playback(callback) => playback(&ctx, callback, &mut scratch, timestamp),
        };

        match step {
            Step::Advance => {
                ctx.timestamp.fetch_add(ctx.ts_step, Ordering::AcqRel);
                ctx.stats.record_frame();
            }
            Step::Skip => {}
            Step::Stop => {
                tracing::info!(direction = %ctx.direction, "application callback requested stop");
                break;
            }
        }
    }

    ctx.sync.set_worker_active(false);
    tracing::debug!(direction = %ctx.direction, "worker thread exiting");
}

fn raise_priority(priority: WorkerPriority, direction: EngineDirection) {
    if priority == WorkerPriority::Inherit {
        return;
    }
    if let Err(e) = thread_priority::set_current_thread_priority(ThreadPriority::Max) {
        tracing::warn!(%direction, "failed to raise worker thread priority: {e:?}");
    }
}

fn capture(
    ctx: &WorkerContext,
    callback: &Mutex<RecordCallback>,
    scratch: &mut [i16],
    timestamp: u64,
) -> Step {
    let read = ctx.sync.lock_buffer().read(scratch);
    if let Err(e) = read {
        tracing::warn!(direction = %ctx.direction, "{e}, skipping frame");
        ctx.stats.record_underflow();
        return Step::Skip;
    }

    let frame = AudioFrame::new(scratch, timestamp);
    let flow = {
        let mut callback = callback.lock();
        (*callback)(&frame)
    };

    match flow {
        ControlFlow::Continue(()) => Step::Advance,
        ControlFlow::Break(()) => Step::Stop,
    }
}

fn playback(
    ctx: &WorkerContext,
    callback: &Mutex<PlaybackCallback>,
    scratch: &mut [i16],
    timestamp: u64,
) -> Step {
    scratch.fill(0);

    let flow = {
        let mut frame = AudioFrame::new(scratch, timestamp);
        let mut callback = callback.lock();
        (*callback)(&mut frame)
    };
    if flow.is_break() {
        return Step::Stop;
    }

    let written = ctx.sync.lock_buffer().write(scratch);
    if let Err(e) = written {
        tracing::warn!(direction = %ctx.direction, "{e}, dropping frame");
        ctx.stats.record_overflow();
    }

    Step::Advance
}
