//! Test helpers and fixtures for audiodev integration tests

#![allow(dead_code)]

use audiodev::platform::sim::SimPlatform;
use audiodev::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Upper bound for anything a test waits on. Generous for loaded CI hosts.
pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Samples in one application frame at the default parameters (20 ms at 8 kHz mono)
pub const FRAME_SAMPLES: usize = 160;

/// Route engine logs to the test output. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Initialized factory over a fresh simulated platform.
pub fn sim_factory() -> (SimPlatform, DeviceFactory) {
    sim_factory_with(EngineConfig::default())
}

pub fn sim_factory_with(config: EngineConfig) -> (SimPlatform, DeviceFactory) {
    init_tracing();
    let platform = SimPlatform::new();
    let factory = DeviceFactory::builder()
        .platform(Arc::new(platform.clone()))
        .config(config)
        .build()
        .expect("Failed to build sim factory");
    (platform, factory)
}

/// Default parameters restricted to one direction.
pub fn params(direction: Direction) -> StreamParams {
    StreamParams {
        direction,
        ..Default::default()
    }
}

/// Poll `cond` until it holds or [`TIMEOUT`] passes.
pub fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}

/// One hardware period of a constant value.
pub fn period(value: i16) -> Vec<i16> {
    vec![value; FRAME_SAMPLES]
}
