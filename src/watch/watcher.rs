//! The watch-source boundary.
//!
//! This crate does not implement list+watch mechanics itself; it drives
//! an external watch source through the [`ObjectWatcher`] contract and
//! builds one source per watched key through [`WatcherFactory`]. A
//! broken watch stream is the source's concern: it is expected to
//! re-establish itself transparently and never report transport
//! failures through this seam.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::sync::watch;

use crate::EventHandler;
use crate::ObjectKey;
use crate::ObjectStore;
use crate::Result;

/// Opaque per-handler id issued by a watch source on registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerToken(u64);

impl HandlerToken {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandlerToken {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One list+watch instance for exactly one named remote object.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectWatcher<T: Send + Sync + 'static>: Send + Sync + 'static {
    /// Lists the object's current state, then streams changes until the
    /// shutdown signal fires. Sole writer of the local store; invokes
    /// every registered handler on each change.
    async fn run(
        &self,
        shutdown: watch::Receiver<()>,
    );

    /// True once the initial listing has been committed to the store.
    fn has_synced(&self) -> bool;

    /// Registers a handler and returns its per-handler token.
    fn add_handler(
        &self,
        handler: Arc<dyn EventHandler<T>>,
    ) -> Result<HandlerToken>;

    /// Unregisters a handler. A token that is not currently registered
    /// must be rejected with `RegistrationError::UnknownToken`.
    fn remove_handler(
        &self,
        token: HandlerToken,
    ) -> Result<()>;

    /// The local read-through cache keyed by `namespace/name`.
    fn store(&self) -> Arc<ObjectStore>;
}

/// Builds one watch source per key. Production callers wire this to
/// their API client; tests inject in-memory sources.
pub trait WatcherFactory<T>: Send + Sync + 'static
where
    T: Send + Sync + 'static,
{
    fn create(
        &self,
        key: &ObjectKey,
    ) -> Arc<dyn ObjectWatcher<T>>;
}

impl<T, F> WatcherFactory<T> for F
where
    T: Send + Sync + 'static,
    F: Fn(&ObjectKey) -> Arc<dyn ObjectWatcher<T>> + Send + Sync + 'static,
{
    fn create(
        &self,
        key: &ObjectKey,
    ) -> Arc<dyn ObjectWatcher<T>> {
        self(key)
    }
}
