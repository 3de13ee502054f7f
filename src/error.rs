//! Errors reported by the elevator system.

use thiserror::Error;

/// Failures of the dispatch API. Cancellation is not one of them.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("an elevator system needs at least one elevator")]
    NoElevators,

    #[error("elevator '{0}' is registered more than once")]
    DuplicateElevator(String),

    #[error("no elevator registered as '{0}'")]
    UnknownElevator(String),

    /// Workers are Tokio tasks, so construction needs a running runtime.
    #[error("elevator workers need a Tokio runtime: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// Returned by a wait that observed shutdown. Stays inside the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("elevator shutdown requested")]
pub(crate) struct Cancelled;
