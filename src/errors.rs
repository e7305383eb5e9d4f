//! Watch Multiplexer Error Hierarchy
//!
//! Defines the error types for the shared watch layer, categorized by
//! the surface they belong to: per-key watch lifecycle, caller-supplied
//! registration handles, key-to-watch lookups, and local cache reads.
//!
//! All variants are logic/state errors returned to the immediate caller;
//! none of them are retriable. Transient I/O on the watch stream is the
//! watch source's concern and never surfaces through these types.

use crate::HandlerToken;
use crate::ObjectKey;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Lifecycle violations on a per-key watch
    #[error(transparent)]
    Watch(#[from] WatchError),

    /// Caller-supplied registration handle problems
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// Key-to-watch table lookup failures
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    /// Local cache read failures
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Configuration validation failures
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The watch reached its terminal state; handler operations are
    /// rejected from then on.
    #[error("watch for {key} is already stopped")]
    AlreadyStopped { key: ObjectKey },
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// No registration handle was supplied
    #[error("registration handle is nil")]
    Nil,

    /// Handle was issued by a watch for a different key
    #[error("registration for {got} does not belong to watch {expected}")]
    WrongMonitor { expected: ObjectKey, got: ObjectKey },

    /// Handle's token is unknown to the watch source, e.g. it was
    /// already removed
    #[error("no handler registered under token {token}")]
    UnknownToken { token: HandlerToken },
}

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Lookup for a key with no current watch
    #[error("no watch exists for {key}")]
    NoSuchWatch { key: ObjectKey },
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The key is watched but the object is currently absent from the
    /// local cache (not yet listed, or deleted remotely)
    #[error("object {key} not present in local cache")]
    NotFound { key: ObjectKey },

    /// The watch source's cache returned something other than the
    /// expected object shape; a collaborator contract violation
    #[error("cache entry for {key} has unexpected type")]
    UnexpectedEntryType { key: ObjectKey },
}
