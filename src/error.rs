//! Centralized error type for the audiodev umbrella crate.
//!
//! Wraps the engine errors so `?` propagates naturally from the core crate.

use audiodev_core::Status;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] audiodev_core::Error),

    #[error("Invalid device index: {0}")]
    InvalidDevice(usize),

    #[error("Device factory is not initialized")]
    NotInitialized,
}

impl Error {
    /// Status code reported to the host driver framework.
    pub fn status(&self) -> Status {
        match self {
            Error::Core(e) => e.status(),
            Error::InvalidDevice(_) => Status::InvalidArgument,
            Error::NotInitialized => Status::SystemError,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
