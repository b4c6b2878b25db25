//! Admission gate bounding how often a guarded operation may run.
//!
//! [`RateGate`] hands out at most `capacity` concurrent permits. Whenever the
//! pool is drained, new admissions are held back for one full period.

use thiserror::Error;

mod rate_gate;

pub use rate_gate::{GatePermit, RateGate};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("Invalid gate configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Interrupted while waiting for admission")]
    Interrupted,
}
