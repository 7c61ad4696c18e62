//! Error types for reference operations.

use thiserror::Error;

/// Errors that can occur while loading or querying references.
#[derive(Debug, Error)]
pub enum RefError {
    /// Growing the registry, a cached list, or the list table failed.
    ///
    /// The operation is aborted and the prior state is left untouched.
    #[error("allocation failure while growing {what}")]
    AllocationFailure { what: &'static str },

    /// The external reference-enumeration command could not run.
    #[error("reference source unavailable: {command}: {reason}")]
    SourceUnavailable { command: String, reason: String },

    /// A command override variable was set but named no program.
    #[error("command override {var} is empty")]
    InvalidCommand { var: String },

    /// A configuration file could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error while reading configuration or process output.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RefError {
    pub(crate) fn alloc(
        what: &'static str,
    ) -> impl FnOnce(std::collections::TryReserveError) -> Self {
        move |_| RefError::AllocationFailure { what }
    }
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
