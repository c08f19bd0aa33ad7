//! Unified error type for the controller.
//!
//! Every fallible operation in the crate funnels into [`Error`].  The worker
//! never propagates these back to command submitters; they are logged where
//! they occur and the queue moves on.  The only error a submitter ever sees
//! is [`Error::QueueClosed`].

use crate::app::ports::RemoteError;
use crate::config::ConfigError;

/// Controller-wide error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A remote call on the bus failed.
    #[error("remote: {0}")]
    Remote(#[from] RemoteError),

    /// Fetching a discovered peer's metadata failed.
    #[error("property query: {0}")]
    PropertyQuery(RemoteError),

    /// Local file I/O failed during a chunked transfer.
    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    /// Notification text lacks the `title:body` delimiter.
    #[error("malformed notification {0:?}: missing ':' delimiter")]
    MalformedNotification(String),

    /// The worker has processed `Disconnect`; no further commands are accepted.
    #[error("command queue closed")]
    QueueClosed,

    /// Configuration failed to load or validate.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// The worker thread could not be spawned.
    #[error("worker spawn failed: {0}")]
    Spawn(std::io::Error),

    /// The worker thread panicked.
    #[error("dispatcher worker panicked")]
    WorkerPanicked,
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
