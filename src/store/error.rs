//! Errors raised by storage backends and the group store.

use derive_more::{Display, Error};
use tracing::instrument;

/// A storage failure, tagged with the source line that raised it.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error: {} at {}:{}", message, file, line)]
pub struct StoreError {
    /// What went wrong.
    pub message: String,
    /// Line of the call that built this error.
    pub line: u32,
    /// File of the call that built this error.
    pub file: &'static str,
}

impl StoreError {
    /// Builds an error stamped with the caller's file and line.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for StoreError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("JSON error: {}", err))
    }
}
