//! Domain layer for ETHOS practice scenarios.
//!
//! Contains the pure scoring engine, the session store and its turn log,
//! the controller state model, and the traits that describe the two
//! network boundaries (scenario service and result persistence).

pub mod config;
pub mod error;
pub mod event;
pub mod scenario;
pub mod scoring;
pub mod session;

// Re-export common error type
pub use error::{EthosError, Result};
