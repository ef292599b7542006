//! Single-direction transfer tests
//!
//! The test thread stands in for the hardware thread and paces every period
//! on the worker's progress, so the ring buffer never fills by accident.

use crate::helpers::*;
use audiodev::platform::sim::SimPlatform;
use audiodev::platform::PlatformDirection;
use audiodev::prelude::*;
use audiodev::{EngineState, StreamEngine};
use crossbeam_channel::{bounded, unbounded};
use std::sync::Arc;

fn capture_engine(platform: &SimPlatform, callback: audiodev::RecordCallback) -> StreamEngine {
    init_tracing();
    StreamEngine::capture(
        StreamParams::default(),
        EngineConfig::default(),
        Arc::new(platform.clone()),
        callback,
    )
    .unwrap()
}

/// Ten captured periods reach the application in order, stamped 0, 160, ... 1440.
#[test]
fn test_capture_delivers_ten_frames() {
    let platform = SimPlatform::new();
    let (tx, rx) = unbounded();
    let mut engine = capture_engine(
        &platform,
        Box::new(move |frame| {
            let _ = tx.send((frame.timestamp, frame.samples.to_vec()));
            ControlFlow::Continue(())
        }),
    );
    engine.start().unwrap();
    let hw = platform.last_stream(PlatformDirection::Input).unwrap();

    for k in 0..10i16 {
        assert_eq!(hw.pump_input(&period(k)), Some(audiodev::platform::DataCallbackResult::Continue));
        let (timestamp, samples) = rx.recv_timeout(TIMEOUT).expect("frame not delivered");
        assert_eq!(timestamp, k as u64 * 160);
        assert_eq!(samples, period(k));
    }

    let stats = engine.stats();
    assert_eq!(stats.callbacks, 10);
    assert_eq!(stats.frames, 10);
    assert_eq!(stats.overflows, 0);
    assert_eq!(engine.timestamp(), 1600);

    engine.stop();
    assert!(hw.is_closed());
}

/// Stereo frames advance the timestamp by samples per channel.
#[test]
fn test_stereo_timestamp_step() {
    init_tracing();
    let platform = SimPlatform::new();
    let (tx, rx) = unbounded();
    let params = StreamParams {
        channel_count: 2,
        samples_per_frame: 320,
        ..Default::default()
    };
    let mut engine = StreamEngine::capture(
        params,
        EngineConfig::default(),
        Arc::new(platform.clone()),
        Box::new(move |frame| {
            let _ = tx.send(frame.timestamp);
            ControlFlow::Continue(())
        }),
    )
    .unwrap();
    engine.start().unwrap();
    let hw = platform.last_stream(PlatformDirection::Input).unwrap();
    assert_eq!(hw.request().channel_count, 2);

    for expected in [0u64, 160, 320] {
        hw.pump_input(&[0; 320]).unwrap();
        assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), expected);
    }
}

/// A capture worker stuck in the application callback makes the hardware
/// side overflow, which drops whole periods and leaves the buffer intact.
#[test]
fn test_capture_overflow_drops_period() {
    let platform = SimPlatform::new();
    let (entered_tx, entered_rx) = bounded(1);
    let (gate_tx, gate_rx) = bounded::<()>(0);
    let mut engine = capture_engine(
        &platform,
        Box::new(move |_| {
            let _ = entered_tx.try_send(());
            let _ = gate_rx.recv();
            ControlFlow::Continue(())
        }),
    );
    engine.start().unwrap();
    let hw = platform.last_stream(PlatformDirection::Input).unwrap();

    hw.pump_input(&period(1)).unwrap();
    entered_rx.recv_timeout(TIMEOUT).expect("worker never reached the callback");

    // worker is parked in the callback: three periods fit, the fourth does not
    for _ in 0..4 {
        hw.pump_input(&period(2)).unwrap();
    }
    assert_eq!(engine.stats().overflows, 1);
    assert_eq!(engine.buffered_samples(), Some(3 * FRAME_SAMPLES));

    drop(gate_tx);
    engine.stop();
    assert_eq!(engine.state(), EngineState::Idle);
}

/// The playback callback stopping on its fifth call ends the worker after
/// four frames, while the engine stays running until stopped.
#[test]
fn test_playback_application_stop() {
    init_tracing();
    let platform = SimPlatform::new();
    let mut calls = 0;
    let mut engine = StreamEngine::playback(
        StreamParams::default(),
        EngineConfig::default(),
        Arc::new(platform.clone()),
        Box::new(move |frame| {
            calls += 1;
            if calls == 5 {
                return ControlFlow::Break(());
            }
            frame.samples.fill(calls as i16);
            ControlFlow::Continue(())
        }),
    )
    .unwrap();
    engine.start().unwrap();
    let hw = platform.last_stream(PlatformDirection::Output).unwrap();
    assert!(engine.is_worker_active());

    let mut out = vec![0i16; FRAME_SAMPLES];
    for n in 1..=4u64 {
        hw.pump_output(&mut out).unwrap();
        assert!(wait_until(|| engine.stats().frames == n));
    }
    hw.pump_output(&mut out).unwrap();
    assert!(wait_until(|| !engine.is_worker_active()));

    assert_eq!(engine.stats().frames, 4);
    assert_eq!(engine.timestamp(), 4 * 160);
    assert!(engine.is_running());

    // hardware keeps running on whatever is left, then silence
    hw.pump_output(&mut out).unwrap();
    engine.stop();
    assert_eq!(engine.state(), EngineState::Idle);
}

/// Frames written by the playback worker come out of the hardware side in order.
#[test]
fn test_playback_output_order() {
    init_tracing();
    let platform = SimPlatform::new();
    let mut next = 0i16;
    let mut engine = StreamEngine::playback(
        StreamParams::default(),
        EngineConfig::default(),
        Arc::new(platform.clone()),
        Box::new(move |frame| {
            next += 1;
            frame.samples.fill(next);
            ControlFlow::Continue(())
        }),
    )
    .unwrap();
    engine.start().unwrap();
    let hw = platform.last_stream(PlatformDirection::Output).unwrap();

    // first period underflows (silence) and primes the worker
    let mut out = vec![7i16; FRAME_SAMPLES];
    hw.pump_output(&mut out).unwrap();
    assert!(out.iter().all(|&s| s == 0));
    assert!(wait_until(|| engine.stats().frames == 1));

    for expected in 1..=3i16 {
        hw.pump_output(&mut out).unwrap();
        assert!(out.iter().all(|&s| s == expected));
        assert!(wait_until(|| engine.stats().frames == expected as u64 + 1));
    }
    assert_eq!(engine.stats().underflows, 1);
}

/// Stopping with the worker parked on the semaphore returns promptly.
#[test]
fn test_stop_wakes_parked_worker() {
    let platform = SimPlatform::new();
    let mut engine = capture_engine(&platform, Box::new(|_| ControlFlow::Continue(())));
    engine.start().unwrap();
    assert!(engine.is_worker_active());

    let (done_tx, done_rx) = bounded(1);
    std::thread::spawn(move || {
        engine.stop();
        let _ = done_tx.send(engine.is_worker_active());
    });

    let still_active = done_rx.recv_timeout(TIMEOUT).expect("stop deadlocked");
    assert!(!still_active);
}

/// Dropping a running engine closes the hardware stream and joins the worker.
#[test]
fn test_drop_closes_stream() {
    let platform = SimPlatform::new();
    let mut engine = capture_engine(&platform, Box::new(|_| ControlFlow::Continue(())));
    engine.start().unwrap();
    let hw = platform.last_stream(PlatformDirection::Input).unwrap();

    drop(engine);
    assert!(hw.is_closed());
    assert!(hw.pump_input(&period(0)).is_none());
}

/// A capture period shorter than an application frame leaves the worker
/// short: it skips the frame without calling the application or advancing
/// the timestamp, and delivers once a full frame has accumulated.
#[test]
fn test_capture_short_period_skips_frame() {
    let platform = SimPlatform::new();
    let (tx, rx) = unbounded();
    let mut engine = capture_engine(
        &platform,
        Box::new(move |frame| {
            let _ = tx.send(frame.timestamp);
            ControlFlow::Continue(())
        }),
    );
    engine.start().unwrap();
    let hw = platform.last_stream(PlatformDirection::Input).unwrap();

    hw.pump_input(&[1; 80]).unwrap();
    assert!(wait_until(|| engine.stats().underflows == 1));
    assert!(rx.try_recv().is_err());
    assert_eq!(engine.timestamp(), 0);
    assert_eq!(engine.stats().frames, 0);

    hw.pump_input(&[2; 80]).unwrap();
    assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), 0);
    assert!(wait_until(|| engine.timestamp() == 160));
    assert_eq!(engine.stats().underflows, 1);
}

/// When the hardware stops draining, the playback worker drops the frame it
/// cannot store but still advances the timestamp.
#[test]
fn test_playback_overflow_drops_frame() {
    init_tracing();
    let platform = SimPlatform::new();
    let mut engine = StreamEngine::playback(
        StreamParams::default(),
        EngineConfig::default(),
        Arc::new(platform.clone()),
        Box::new(|frame| {
            frame.samples.fill(1);
            ControlFlow::Continue(())
        }),
    )
    .unwrap();
    engine.start().unwrap();
    let hw = platform.last_stream(PlatformDirection::Output).unwrap();

    // zero-length periods wake the worker without draining anything
    let mut empty: [i16; 0] = [];
    for n in 1..=3u64 {
        hw.pump_output(&mut empty).unwrap();
        assert!(wait_until(|| engine.stats().frames == n));
    }
    assert_eq!(engine.buffered_samples(), Some(3 * FRAME_SAMPLES));
    assert_eq!(engine.stats().overflows, 0);

    hw.pump_output(&mut empty).unwrap();
    assert!(wait_until(|| engine.stats().frames == 4));
    assert_eq!(engine.stats().overflows, 1);
    assert_eq!(engine.timestamp(), 4 * 160);
    assert_eq!(engine.buffered_samples(), Some(3 * FRAME_SAMPLES));
}

/// Parameters at the edge of what validation accepts start cleanly with
/// logging enabled.
#[test]
fn test_start_with_extreme_params() {
    init_tracing();
    let platform = SimPlatform::new();
    let params = StreamParams {
        clock_rate: 3_000_000_000,
        channel_count: 2,
        samples_per_frame: 320,
        ..Default::default()
    };
    let mut engine = StreamEngine::capture(
        params,
        EngineConfig::default(),
        Arc::new(platform.clone()),
        Box::new(|_| ControlFlow::Continue(())),
    )
    .unwrap();

    engine.start().unwrap();
    assert!(engine.is_running());
    engine.stop();
}
