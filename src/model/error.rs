//! Error types for simulation construction.
//!
//! Runtime absences (no target found, an empty bin) are `Option`s, and
//! energy/size underflow is the death signal rather than an error; the only
//! failure mode the core reports is invalid configuration, rejected before
//! the first tick runs.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    /// Configuration rejected at construction/spawn time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SimError {
    #[must_use]
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
