pub mod analytics;
pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod gate;
pub mod http;
pub mod utils;

pub use client::CrptApi;
pub use gate::{GateError, GatePermit, RateGate};
