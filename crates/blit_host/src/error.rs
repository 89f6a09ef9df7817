//! # Host Error Types

use blit_core::BlitError;
use thiserror::Error;

/// Errors raised by the host side.
#[derive(Error, Debug)]
pub enum HostError {
    /// The OS refused to start a timer or loop thread.
    #[error("failed to spawn thread {name}: {source}")]
    Spawn {
        /// Thread name.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A loop thread panicked; its state is lost.
    #[error("thread {0} panicked")]
    Panicked(String),

    /// The host thread has already exited.
    #[error("host has stopped")]
    Stopped,

    /// Core failure (configuration or a draw pass).
    #[error(transparent)]
    Core(#[from] BlitError),
}

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;
