//! Stream facade lifecycle tests

use crate::helpers::*;
use audiodev::platform::PlatformDirection;
use audiodev::prelude::*;
use audiodev::EngineState;
use crossbeam_channel::unbounded;

/// A duplex stream moves captured frames to the record callback and
/// playback frames to the hardware at the same time.
#[test]
fn test_duplex_transfer() {
    let (platform, factory) = sim_factory();
    let (rec_tx, rec_rx) = unbounded();

    let callbacks = StreamCallbacks::new()
        .on_record(move |frame| {
            let _ = rec_tx.send(frame.samples[0]);
            ControlFlow::Continue(())
        })
        .on_playback(|frame| {
            frame.samples.fill(42);
            ControlFlow::Continue(())
        });
    let mut stream = factory
        .create_stream(factory.default_params(0).unwrap(), callbacks)
        .unwrap();
    stream.start().unwrap();

    let capture = platform.last_stream(PlatformDirection::Input).unwrap();
    let playback = platform.last_stream(PlatformDirection::Output).unwrap();
    assert!(capture.is_started() && playback.is_started());

    let mut out = period(0);
    playback.pump_output(&mut out).unwrap();
    let engine = stream.playback_engine().unwrap();
    assert!(wait_until(|| engine.stats().frames == 1));
    playback.pump_output(&mut out).unwrap();
    assert_eq!(out, period(42));

    capture.pump_input(&period(-3)).unwrap();
    assert_eq!(rec_rx.recv_timeout(TIMEOUT).unwrap(), -3);

    let stats = stream.stats();
    assert_eq!(stats.callbacks, 3);
    assert_eq!(stats.overflows, 0);

    stream.destroy().unwrap();
    assert!(capture.is_closed() && playback.is_closed());
}

/// Repeated start/stop pairs are no-ops and restarts reopen the hardware.
#[test]
fn test_start_stop_idempotent() {
    let (platform, factory) = sim_factory();
    let callbacks = StreamCallbacks::new().on_record(|_| ControlFlow::Continue(()));
    let mut stream = factory
        .create_stream(params(Direction::Capture), callbacks)
        .unwrap();

    stream.stop().unwrap();
    assert!(platform.streams().is_empty());

    stream.start().unwrap();
    stream.start().unwrap();
    assert_eq!(platform.streams().len(), 1);

    stream.stop().unwrap();
    stream.stop().unwrap();
    assert!(!stream.is_running());

    stream.start().unwrap();
    assert_eq!(platform.streams().len(), 2);
    assert!(stream.is_running());
}

/// Capture timestamps keep counting across a stop/start cycle.
#[test]
fn test_timestamps_monotonic_across_restart() {
    let (platform, factory) = sim_factory();
    let (tx, rx) = unbounded();
    let callbacks = StreamCallbacks::new().on_record(move |frame| {
        let _ = tx.send(frame.timestamp);
        ControlFlow::Continue(())
    });
    let mut stream = factory
        .create_stream(params(Direction::Capture), callbacks)
        .unwrap();

    let mut seen = Vec::new();
    for _ in 0..2 {
        stream.start().unwrap();
        let hw = platform.last_stream(PlatformDirection::Input).unwrap();
        for _ in 0..3 {
            hw.pump_input(&period(0)).unwrap();
            seen.push(rx.recv_timeout(TIMEOUT).unwrap());
        }
        stream.stop().unwrap();
    }

    assert_eq!(seen, vec![0, 160, 320, 480, 640, 800]);
}

/// A failing playback start leaves nothing running, and the next start works.
#[test]
fn test_start_failure_rolls_back() {
    let (platform, factory) = sim_factory();
    let callbacks = StreamCallbacks::new()
        .on_record(|_| ControlFlow::Continue(()))
        .on_playback(|_| ControlFlow::Continue(()));
    let mut stream = factory
        .create_stream(StreamParams::default(), callbacks)
        .unwrap();

    platform.fail_next_start(PlatformDirection::Output);
    let err = stream.start().unwrap_err();
    assert_eq!(err.status(), Status::SystemError);
    assert!(!stream.is_running());
    assert_eq!(stream.capture_engine().unwrap().state(), EngineState::Idle);
    assert_eq!(stream.playback_engine().unwrap().state(), EngineState::Idle);
    assert!(platform.streams().iter().all(|hw| hw.is_closed()));

    stream.start().unwrap();
    assert!(stream.is_running());
}

/// Capability queries and changes are not supported.
#[test]
fn test_capabilities() {
    let (_platform, factory) = sim_factory();
    let callbacks = StreamCallbacks::new().on_playback(|_| ControlFlow::Continue(()));
    let mut stream = factory
        .create_stream(params(Direction::Playback), callbacks)
        .unwrap();

    let result = stream.get_capability(Capability::OutputVolumeSetting);
    assert_eq!(Status::of(&result), Status::InvalidCapability);
    let result = stream.set_capability(CapabilityValue::InputSource(1));
    assert_eq!(Status::of(&result), Status::InvalidCapability);

    let params = stream.params();
    assert_eq!(params.direction, Direction::Playback);
    assert_eq!(params.output_volume, None);
}

/// The playback underflow policy decides what the hardware plays when the
/// worker has not supplied a frame yet.
#[test]
fn test_underflow_policy() {
    for (policy, expected) in [(UnderflowPolicy::Silence, 0), (UnderflowPolicy::Retain, 9)] {
        let config = EngineConfig {
            underflow_policy: policy,
            ..Default::default()
        };
        let (platform, factory) = sim_factory_with(config);
        let callbacks = StreamCallbacks::new().on_playback(|_| ControlFlow::Continue(()));
        let mut stream = factory
            .create_stream(params(Direction::Playback), callbacks)
            .unwrap();
        stream.start().unwrap();

        let hw = platform.last_stream(PlatformDirection::Output).unwrap();
        let mut out = period(9);
        hw.pump_output(&mut out).unwrap();
        assert!(out.iter().all(|&s| s == expected), "{policy:?}");
        assert_eq!(stream.stats().underflows, 1);
    }
}
