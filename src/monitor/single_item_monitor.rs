//! Per-key watch ownership and handler fan-out.
//!
//! One `SingleItemMonitor` owns exactly one watch-source instance for
//! exactly one [`ObjectKey`]. It tracks the live handler count, gates
//! every handler operation on the running/stopped transition, and
//! serves point reads from the source's local cache. It never decides
//! its own teardown: the owner observes the post-removal handler count
//! and stops it.

use std::sync::atomic::AtomicI32;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::info;

use super::HandlerRegistration;
use super::ObjectKey;
use crate::CacheError;
use crate::EventHandler;
use crate::ObjectWatcher;
use crate::RegistrationError;
use crate::Result;
use crate::WatchError;

pub struct SingleItemMonitor<T>
where
    T: Send + Sync + 'static,
{
    key: ObjectKey,
    watcher: Arc<dyn ObjectWatcher<T>>,
    num_handlers: AtomicI32,
    // Guards the running/stopped transition together with every handler
    // mutation; the counter is only touched while holding it.
    stopped: Mutex<bool>,
    shutdown_tx: watch::Sender<()>,
    shutdown_rx: watch::Receiver<()>,
}

impl<T> SingleItemMonitor<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(
        key: ObjectKey,
        watcher: Arc<dyn ObjectWatcher<T>>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(());
        Self {
            key,
            watcher,
            num_handlers: AtomicI32::new(0),
            stopped: Mutex::new(false),
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    /// Drives the watch source's list+watch loop. Runs on its own task
    /// and returns only after [`stop`](Self::stop) fires the shutdown
    /// signal.
    pub async fn start(self: Arc<Self>) {
        info!("starting watch for {}", self.key);
        self.watcher.run(self.shutdown_rx.clone()).await;
    }

    /// True once the initial listing has completed and the local cache
    /// reflects a consistent snapshot.
    pub fn has_synced(&self) -> bool {
        self.watcher.has_synced()
    }

    /// Transitions the watch to its terminal stopped state and fires
    /// the shutdown signal. Idempotent: exactly one caller observes
    /// `true`, every later call returns `false`. Returning does not
    /// imply the loop task has fully exited, only that it was signalled
    /// and no new handlers will be accepted.
    pub fn stop(&self) -> bool {
        let mut stopped = self.stopped.lock();
        if *stopped {
            return false;
        }
        *stopped = true;
        let _ = self.shutdown_tx.send(());
        info!("watch for {} stopped", self.key);
        true
    }

    /// Registers `handler` with the watch source and returns a handle
    /// embedding this monitor's key.
    pub fn add_event_handler(
        &self,
        handler: Arc<dyn EventHandler<T>>,
    ) -> Result<HandlerRegistration> {
        let stopped = self.stopped.lock();
        if *stopped {
            return Err(WatchError::AlreadyStopped { key: self.key.clone() }.into());
        }

        let token = self.watcher.add_handler(handler)?;
        self.num_handlers.fetch_add(1, Ordering::SeqCst);

        Ok(HandlerRegistration::new(self.key.clone(), token))
    }

    /// Unregisters the handler behind `registration`. The counter is
    /// only decremented after the watch source accepted the removal, so
    /// it cannot underflow: a stale or foreign token is rejected first.
    pub fn remove_event_handler(
        &self,
        registration: &HandlerRegistration,
    ) -> Result<()> {
        let stopped = self.stopped.lock();
        if *stopped {
            return Err(WatchError::AlreadyStopped { key: self.key.clone() }.into());
        }

        if registration.key() != &self.key {
            return Err(RegistrationError::WrongMonitor {
                expected: self.key.clone(),
                got: registration.key().clone(),
            }
            .into());
        }

        self.watcher.remove_handler(registration.token())?;
        self.num_handlers.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    /// Number of currently registered handlers.
    pub fn num_handlers(&self) -> i32 {
        self.num_handlers.load(Ordering::SeqCst)
    }

    /// Point lookup of this key's object from the watch source's local
    /// cache. `Ok(None)` when absent; an error only when the store
    /// entry fails to downcast to `T`, which signals a collaborator
    /// contract violation rather than a normal miss.
    pub fn get_cached(&self) -> Result<Option<Arc<T>>> {
        match self.watcher.store().get_by_key(&self.key.cache_key()) {
            None => Ok(None),
            Some(entry) => match entry.downcast::<T>() {
                Ok(object) => Ok(Some(object)),
                Err(_) => Err(CacheError::UnexpectedEntryType { key: self.key.clone() }.into()),
            },
        }
    }
}
