//! Error types for audiodev-core.

use crate::params::Capability;
use thiserror::Error;

/// Error type for audiodev-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    #[error("Capability not supported: {0:?}")]
    InvalidCapability(Capability),

    #[error("Platform audio error: {0}")]
    Platform(#[from] PlatformError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Status code reported to the host driver framework.
    pub fn status(&self) -> Status {
        match self {
            Error::InvalidArgument(_) => Status::InvalidArgument,
            Error::OutOfMemory(_) => Status::OutOfMemory,
            Error::InvalidCapability(_) => Status::InvalidCapability,
            Error::Platform(_) | Error::Io(_) => Status::SystemError,
        }
    }
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Fixed status-code space of the host driver interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    InvalidArgument,
    OutOfMemory,
    InvalidCapability,
    SystemError,
}

impl Status {
    /// Collapse a result into its status code.
    pub fn of<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(e) => e.status(),
        }
    }

    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

/// Ring buffer capacity violations.
///
/// Never propagated as stream errors: the engine logs them and drops or
/// skips the affected period.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingBufferError {
    #[error("ring buffer overflow: {requested} samples requested, {vacant} vacant")]
    Overflow { requested: usize, vacant: usize },

    #[error("ring buffer underflow: {requested} samples requested, {available} available")]
    Underflow { requested: usize, available: usize },
}

/// Errors reported by a platform audio backend.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("Audio device not found: {0}")]
    DeviceNotFound(String),

    #[error("Unsupported stream config: {0}")]
    UnsupportedConfig(String),

    #[error("Failed to open stream: {0}")]
    Open(String),

    #[error("Failed to start stream: {0}")]
    Start(String),

    #[error("Failed to close stream: {0}")]
    Close(String),

    #[cfg(feature = "cpal")]
    #[error("Failed to enumerate devices")]
    Devices(#[from] cpal::DevicesError),

    #[cfg(feature = "cpal")]
    #[error("Failed to query supported stream configs")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[cfg(feature = "cpal")]
    #[error("Failed to build audio stream")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[cfg(feature = "cpal")]
    #[error("Failed to play audio stream")]
    PlayStream(#[from] cpal::PlayStreamError),
}
