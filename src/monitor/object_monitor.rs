//! The key-to-watch multiplexer.
//!
//! `SharedObjectMonitor` owns the mapping from [`ObjectKey`] to
//! [`SingleItemMonitor`]. It creates a watch lazily on first interest,
//! routes further registrations to the existing watch, and tears the
//! watch down exactly when the last handler departs. All structural map
//! mutations (single-entry insert/delete) happen under one exclusive
//! lock, acquired strictly outside any per-watch lock, so no two
//! watches can ever exist for the same key and an entry is present iff
//! its handler count is positive.

use std::collections::HashMap;
use std::sync::Arc;

use autometrics::autometrics;
use parking_lot::RwLock;
use tracing::error;
use tracing::info;

use super::HandlerRegistration;
use super::ObjectKey;
use super::ObjectMonitor;
use super::SingleItemMonitor;
use crate::metrics::ACTIVE_WATCHES_METRIC;
use crate::metrics::HANDLER_REGISTRATIONS_METRIC;
use crate::metrics::WATCH_STOPS_METRIC;
use crate::utils::wait_for_cache_sync;
use crate::CacheError;
use crate::EventHandler;
use crate::MonitorError;
use crate::RegistrationError;
use crate::Result;
use crate::WatchConfig;
use crate::WatcherFactory;
use crate::API_SLO;

pub struct SharedObjectMonitor<T>
where
    T: Send + Sync + 'static,
{
    watcher_factory: Arc<dyn WatcherFactory<T>>,
    watches: RwLock<HashMap<ObjectKey, Arc<SingleItemMonitor<T>>>>,
    config: WatchConfig,
}

impl<T> SharedObjectMonitor<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(watcher_factory: Arc<dyn WatcherFactory<T>>) -> Self {
        Self {
            watcher_factory,
            watches: RwLock::new(HashMap::new()),
            config: WatchConfig::default(),
        }
    }

    pub fn with_config(
        watcher_factory: Arc<dyn WatcherFactory<T>>,
        config: WatchConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            watcher_factory,
            watches: RwLock::new(HashMap::new()),
            config,
        })
    }

    /// Number of keys with a live watch.
    pub fn active_watches(&self) -> usize {
        self.watches.read().len()
    }

    /// Blocks until the registration's watch has completed its initial
    /// listing, or the configured sync timeout elapses. Returns whether
    /// the watch synced in time.
    pub async fn wait_for_sync(
        &self,
        registration: Option<&HandlerRegistration>,
    ) -> Result<bool> {
        let registration = registration.ok_or(RegistrationError::Nil)?;
        let monitor = self.lookup(registration.key())?;

        Ok(wait_for_cache_sync(
            self.config.sync_poll_interval(),
            self.config.sync_timeout(),
            move || monitor.has_synced(),
        )
        .await)
    }

    /// Stops every watch and clears the map. Part of the owner's
    /// shutdown path; handler registrations become invalid afterwards.
    pub fn shutdown(&self) {
        let mut watches = self.watches.write();
        for (key, monitor) in watches.drain() {
            if !monitor.stop() {
                error!("watch for {} was already stopped", key);
            }
            WATCH_STOPS_METRIC.inc();
        }
        ACTIVE_WATCHES_METRIC.set(0);
        info!("all watches stopped");
    }

    fn lookup(
        &self,
        key: &ObjectKey,
    ) -> Result<Arc<SingleItemMonitor<T>>> {
        match self.watches.read().get(key) {
            Some(monitor) => Ok(monitor.clone()),
            None => Err(MonitorError::NoSuchWatch { key: key.clone() }.into()),
        }
    }
}

impl<T> ObjectMonitor<T> for SharedObjectMonitor<T>
where
    T: Send + Sync + 'static,
{
    #[autometrics(objective = API_SLO)]
    fn add_event_handler(
        &self,
        namespace: &str,
        name: &str,
        handler: Arc<dyn EventHandler<T>>,
    ) -> Result<HandlerRegistration> {
        let key = ObjectKey::new(namespace, name);
        let mut watches = self.watches.write();

        let monitor = match watches.get(&key) {
            Some(existing) => existing.clone(),
            None => {
                // First interest in this key: create the watch and
                // start its loop before the map lock is released, so a
                // concurrent lookup never observes a half-created
                // entry.
                let watcher = self.watcher_factory.create(&key);
                let monitor = Arc::new(SingleItemMonitor::new(key.clone(), watcher));
                tokio::spawn(monitor.clone().start());
                watches.insert(key.clone(), monitor.clone());

                ACTIVE_WATCHES_METRIC.set(watches.len() as i64);
                info!("watch started for {}", key);
                monitor
            }
        };

        let registration = monitor.add_event_handler(handler)?;
        HANDLER_REGISTRATIONS_METRIC.with_label_values(&["add"]).inc();
        info!("handler added for {}", key);

        Ok(registration)
    }

    #[autometrics(objective = API_SLO)]
    fn remove_event_handler(
        &self,
        registration: Option<HandlerRegistration>,
    ) -> Result<()> {
        let registration = registration.ok_or(RegistrationError::Nil)?;
        let key = registration.key().clone();
        let mut watches = self.watches.write();

        let Some(monitor) = watches.get(&key).cloned() else {
            // Benign race: a concurrent removal already reduced the
            // count to zero and tore this watch down.
            info!("watch for {} already removed", key);
            return Ok(());
        };

        monitor.remove_event_handler(&registration)?;
        HANDLER_REGISTRATIONS_METRIC.with_label_values(&["remove"]).inc();
        info!("handler removed for {}", key);

        // Tear the watch down once the last handler is gone.
        if monitor.num_handlers() <= 0 {
            if !monitor.stop() {
                error!("watch for {} was already stopped", key);
            }
            watches.remove(&key);
            WATCH_STOPS_METRIC.inc();
            ACTIVE_WATCHES_METRIC.set(watches.len() as i64);
            info!("watch stopped for {}", key);
        }

        Ok(())
    }

    #[autometrics(objective = API_SLO)]
    fn get_cached(
        &self,
        registration: Option<&HandlerRegistration>,
    ) -> Result<Arc<T>> {
        let registration = registration.ok_or(RegistrationError::Nil)?;
        let key = registration.key();
        let monitor = self.lookup(key)?;

        match monitor.get_cached()? {
            Some(object) => Ok(object),
            None => Err(CacheError::NotFound { key: key.clone() }.into()),
        }
    }

    #[autometrics(objective = API_SLO)]
    fn has_synced(
        &self,
        registration: Option<&HandlerRegistration>,
    ) -> Result<bool> {
        let registration = registration.ok_or(RegistrationError::Nil)?;
        Ok(self.lookup(registration.key())?.has_synced())
    }
}
