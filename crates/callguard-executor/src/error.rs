use callguard_core::{ErrorStatus, GuardError};
use thiserror::Error;

/// Errors returned by [`RateLimitExecutor::execute`](crate::RateLimitExecutor::execute).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecuteError<E> {
    /// The key's circuit is open; the operation was not invoked.
    #[error("Rate limit circuit is open. Please wait and try again.")]
    CircuitOpen { key: String },

    /// The operation's own error, returned untouched.
    #[error("{0}")]
    Operation(E),
}

impl<E> ExecuteError<E> {
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, ExecuteError::CircuitOpen { .. })
    }

    /// Returns the operation's error, if the operation ran and failed.
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            ExecuteError::Operation(e) => Some(e),
            ExecuteError::CircuitOpen { .. } => None,
        }
    }

    pub fn operation_error(&self) -> Option<&E> {
        match self {
            ExecuteError::Operation(e) => Some(e),
            ExecuteError::CircuitOpen { .. } => None,
        }
    }
}

impl<E: ErrorStatus> ErrorStatus for ExecuteError<E> {
    fn status(&self) -> Option<u16> {
        match self {
            ExecuteError::CircuitOpen { .. } => None,
            ExecuteError::Operation(e) => e.status(),
        }
    }
}

impl<E> From<ExecuteError<E>> for GuardError<E> {
    fn from(err: ExecuteError<E>) -> Self {
        match err {
            ExecuteError::CircuitOpen { key } => GuardError::CircuitOpen { key },
            ExecuteError::Operation(e) => GuardError::Application(e),
        }
    }
}
