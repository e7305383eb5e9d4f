mod object_key;
mod object_monitor;
mod single_item_monitor;
pub use object_key::*;
pub use object_monitor::*;
pub use single_item_monitor::*;


use std::sync::Arc;

use crate::EventHandler;
use crate::HandlerToken;
use crate::Result;

/// Opaque handle returned to a caller on successful handler
/// registration. It carries the watched key and the watch source's
/// per-handler token, and is presented back to remove the handler or to
/// read the cached object. The core never mutates it after issuing it.
#[derive(Debug, Clone)]
pub struct HandlerRegistration {
    key: ObjectKey,
    token: HandlerToken,
}

impl HandlerRegistration {
    pub(crate) fn new(
        key: ObjectKey,
        token: HandlerToken,
    ) -> Self {
        Self { key, token }
    }

    /// The key this registration was issued for.
    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    /// The watch source's per-handler token.
    pub fn token(&self) -> HandlerToken {
        self.token
    }
}

/// Shared watch layer: many independent consumers observe one named
/// remote object over exactly one underlying watch per key.
pub trait ObjectMonitor<T>: Send + Sync + 'static
where
    T: Send + Sync + 'static,
{
    /// Registers interest in `(namespace, name)`. The first
    /// registration for a key starts its watch; later ones share it.
    fn add_event_handler(
        &self,
        namespace: &str,
        name: &str,
        handler: Arc<dyn EventHandler<T>>,
    ) -> Result<HandlerRegistration>;

    /// Removes a previously registered handler. Tears the underlying
    /// watch down when the last handler for its key is gone. A `None`
    /// registration is an error; a registration whose watch was already
    /// torn down is a benign no-op.
    fn remove_event_handler(
        &self,
        registration: Option<HandlerRegistration>,
    ) -> Result<()>;

    /// Point lookup of the watched object from the watch's local cache.
    /// Absence is reported as a typed error, never as a silent empty
    /// success.
    fn get_cached(
        &self,
        registration: Option<&HandlerRegistration>,
    ) -> Result<Arc<T>>;

    /// True once the registration's watch has completed its initial
    /// listing.
    fn has_synced(
        &self,
        registration: Option<&HandlerRegistration>,
    ) -> Result<bool>;
}
